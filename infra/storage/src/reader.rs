use crate::error::StoreError;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Reads a single record file.
///
/// Absence (including a directory sitting where the record should be) is
/// [`StoreError::NotFound`]; any other I/O failure is [`StoreError::ReadFailed`].
pub(crate) async fn read_record(
    path: &Path,
    collection: &str,
    resource: &str,
) -> Result<Vec<u8>, StoreError> {
    let not_found = || StoreError::NotFound {
        collection: collection.to_owned(),
        resource: resource.to_owned(),
        context: None,
    };

    match fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => return Err(not_found()),
        Ok(_) => {},
        Err(err) if err.kind() == ErrorKind::NotFound => return Err(not_found()),
        Err(source) => {
            return Err(StoreError::ReadFailed {
                path: path.to_path_buf(),
                source,
                context: Some("stat".into()),
            });
        },
    }

    match fs::read(path).await {
        Ok(data) => Ok(data),
        Err(err) if err.kind() == ErrorKind::NotFound => Err(not_found()),
        Err(source) => Err(StoreError::ReadFailed { path: path.to_path_buf(), source, context: None }),
    }
}
