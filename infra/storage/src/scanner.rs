use crate::atomic::TMP_SUFFIX;
use crate::error::StoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// One resource file found in a collection directory.
#[derive(Debug)]
pub(crate) struct Entry {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

/// Lists the resource files of a collection in directory-listing order.
///
/// Subdirectories (nested collections) and in-flight `*.tmp` publish files are
/// not resources and are skipped.
///
/// # Errors
///
/// [`StoreError::CollectionNotFound`] if `dir` does not exist or is not a
/// directory, [`StoreError::ReadFailed`] if listing fails or a file name is
/// not valid UTF-8.
pub(crate) async fn list(dir: &Path, collection: &str) -> Result<Vec<Entry>, StoreError> {
    let read_failed =
        |source| StoreError::ReadFailed { path: dir.to_path_buf(), source, context: None };

    let mut listing = match fs::read_dir(dir).await {
        Ok(listing) => listing,
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            return Err(StoreError::CollectionNotFound {
                collection: collection.to_owned(),
                context: Some(format!("Directory '{}' does not exist", dir.display()).into()),
            });
        },
        Err(err) => return Err(read_failed(err)),
    };

    let mut entries = Vec::new();
    while let Some(entry) = listing.next_entry().await.map_err(read_failed)? {
        let file_type = entry.file_type().await.map_err(|source| StoreError::ReadFailed {
            path: entry.path(),
            source,
            context: Some("file type".into()),
        })?;
        if file_type.is_dir() {
            continue;
        }

        let name = entry.file_name().into_string().map_err(|raw| StoreError::ReadFailed {
            path: entry.path(),
            source: std::io::Error::new(
                ErrorKind::InvalidData,
                format!("non UTF-8 resource name {}", raw.to_string_lossy()),
            ),
            context: None,
        })?;
        if name.ends_with(TMP_SUFFIX) {
            continue;
        }

        entries.push(Entry { name, path: entry.path() });
    }

    Ok(entries)
}

/// Reads every listed entry fully; the first failure aborts the whole scan.
pub(crate) async fn read_entries(entries: Vec<Entry>) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
    let mut records = Vec::with_capacity(entries.len());
    for Entry { name, path } in entries {
        let data = fs::read(&path)
            .await
            .map_err(|source| StoreError::ReadFailed { path, source, context: None })?;
        records.push((name, data));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_skips_directories_and_temp_files() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("0"), b"a").unwrap();
        std::fs::write(temp.path().join("1"), b"b").unwrap();
        std::fs::write(temp.path().join("1.tmp"), b"partial").unwrap();
        std::fs::create_dir(temp.path().join("nested")).unwrap();

        let mut names: Vec<String> =
            list(temp.path(), "fish").await.unwrap().into_iter().map(|e| e.name).collect();
        names.sort();

        assert_eq!(names, ["0", "1"]);
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let err = list(&temp.path().join("nothinghere"), "nothinghere").await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_file_in_place_of_directory() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fish"), b"x").unwrap();

        let err = list(&temp.path().join("fish"), "fish").await.unwrap_err();
        assert!(matches!(err, StoreError::CollectionNotFound { .. }), "{err}");
    }

    #[tokio::test]
    async fn test_read_entries_fails_whole_scan() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("0"), b"a").unwrap();

        let mut entries = list(temp.path(), "fish").await.unwrap();
        entries.push(Entry { name: "gone".to_owned(), path: temp.path().join("gone") });

        let err = read_entries(entries).await.unwrap_err();
        assert!(matches!(err, StoreError::ReadFailed { .. }), "{err}");
    }
}
