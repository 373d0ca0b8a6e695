//! Atomic publish of a record: write a sibling temporary file, flush it, then
//! rename it over the target in one step.

use crate::error::StoreError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Suffix of the temporary sibling a record is staged in before publishing.
pub(crate) const TMP_SUFFIX: &str = ".tmp";

/// `<target>.tmp`, in the same directory as `target` so the rename never
/// crosses a device boundary.
pub(crate) fn tmp_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(TMP_SUFFIX);
    target.with_file_name(name)
}

/// Replaces `target` with `data` so that readers only ever see the old file,
/// no file, or the complete new file.
///
/// A failed rename leaves the temporary file in place.
///
/// # Errors
///
/// [`StoreError::DirectoryCreateFailed`] if the parent cannot be created,
/// [`StoreError::WriteFailed`] if the temporary file cannot be written and
/// [`StoreError::RenameFailed`] if it cannot be published.
pub(crate) async fn write_atomic(target: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await.map_err(|source| StoreError::DirectoryCreateFailed {
            path: parent.to_path_buf(),
            source,
            context: Some("Collection directory".into()),
        })?;
    }

    let temp = tmp_path(target);
    stage(&temp, data)
        .await
        .map_err(|source| StoreError::WriteFailed { path: temp.clone(), source, context: None })?;

    publish(&temp, target).await.map_err(|source| StoreError::RenameFailed {
        from: temp.clone(),
        to: target.to_path_buf(),
        source,
        context: None,
    })?;

    if let Some(parent) = target.parent() {
        sync_dir(parent).await;
    }

    Ok(())
}

async fn stage(temp: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file =
        fs::OpenOptions::new().create(true).truncate(true).write(true).open(temp).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

/// Rename, falling back to remove-then-rename where the platform refuses to
/// replace an existing target.
async fn publish(temp: &Path, target: &Path) -> std::io::Result<()> {
    match fs::rename(temp, target).await {
        Err(err) if err.kind() == ErrorKind::AlreadyExists => {
            fs::remove_file(target).await?;
            fs::rename(temp, target).await
        },
        other => other,
    }
}

#[cfg(unix)]
async fn sync_dir(path: &Path) {
    if let Ok(dir) = fs::File::open(path).await {
        let _ = dir.sync_all().await;
    }
}

#[cfg(not(unix))]
async fn sync_dir(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_tmp_path_is_sibling() {
        assert_eq!(tmp_path(Path::new("/db/fish/redfish")), PathBuf::from("/db/fish/redfish.tmp"));
    }

    #[tokio::test]
    async fn test_creates_parents_and_publishes() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("sea").join("fish").join("redfish");

        write_atomic(&target, b"{}").await.unwrap();

        assert_eq!(fs::read(&target).await.unwrap(), b"{}");
        assert!(!tmp_path(&target).exists(), "temporary file must be consumed by the rename");
    }

    #[tokio::test]
    async fn test_replaces_existing_content() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("redfish");

        write_atomic(&target, b"a much longer first payload").await.unwrap();
        write_atomic(&target, b"short").await.unwrap();

        assert_eq!(fs::read(&target).await.unwrap(), b"short");
    }

    #[tokio::test]
    async fn test_stale_temp_is_overwritten() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("redfish");
        fs::write(tmp_path(&target), b"garbage from a crashed writer").await.unwrap();

        write_atomic(&target, b"fresh").await.unwrap();

        assert_eq!(fs::read(&target).await.unwrap(), b"fresh");
    }

    #[tokio::test]
    async fn test_rename_failure_keeps_temp() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("redfish");
        std::fs::create_dir_all(target.join("occupied")).unwrap();

        let err = write_atomic(&target, b"payload").await.expect_err("target is a non-empty dir");

        assert!(matches!(err, StoreError::RenameFailed { .. }), "{err}");
        assert!(tmp_path(&target).exists());
    }

    #[tokio::test]
    async fn test_parent_blocked_by_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("fish"), b"not a directory").unwrap();

        let err = write_atomic(&temp.path().join("fish").join("redfish"), b"x").await.unwrap_err();

        assert!(matches!(err, StoreError::DirectoryCreateFailed { .. }), "{err}");
    }
}
