//! The database handle composing path validation, per-key locking, atomic
//! publishing and collection scans.

use crate::builder::{DriverBuilder, Options};
use crate::codec;
use crate::error::StoreError;
use crate::locks::LockRegistry;
use crate::maintenance::{self, PurgeReport};
use crate::security::{self, CollectionName};
use crate::{atomic, reader, scanner};
use quire_logger::Sink;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, trace};

/// The internal shared state of a [`Driver`].
#[derive(Debug)]
pub struct DriverInner {
    /// Canonical physical path owning the whole on-disk tree.
    pub(crate) root: PathBuf,
    /// One lock per collection (writes) or collection/resource path (deletes).
    pub(crate) locks: LockRegistry,
    pub(crate) sink: Sink,
}

/// A thread-safe handle to a file-backed JSON document store.
///
/// Records live at `<root>/<collection>/<resource>`, one pretty-printed JSON
/// document per file.
///
/// - **Atomic Writes**: a record is staged in `<resource>.tmp` and renamed into
///   place, so readers see the old record or the new one, never a fragment.
/// - **Per-Key Locking**: writes to one collection, and deletes of one
///   collection/resource path, are serialized; different keys run in parallel.
/// - **Lock-Free Reads**: `read`, `read_all` and `read_all_map` never wait on a lock.
///
/// This handle is internally reference-counted (`Arc`) and can be cheaply cloned
/// across threads or tasks. Independent handles (even on the same root) do not
/// share locks.
///
/// # Example
///
/// ```rust
/// use quire_storage::{Driver, StoreError};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, PartialEq, Serialize, Deserialize)]
/// struct Fish {
///     #[serde(rename = "type")]
///     kind: String,
/// }
///
/// #[tokio::main]
/// async fn main() -> Result<(), StoreError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     # let root = tmp.path().join("school");
///     let db = Driver::builder().root(&root).connect().await?;
///
///     db.write("fish", "redfish", &Fish { kind: "red".into() }).await?;
///     let fish: Fish = db.read("fish", "redfish").await?;
///     assert_eq!(fish.kind, "red");
///
///     assert_eq!(db.read_all("fish").await?.len(), 1);
///     db.delete("fish", "redfish").await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Driver {
    pub(crate) inner: Arc<DriverInner>,
}

impl Deref for Driver {
    type Target = DriverInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Driver {
    #[must_use = "The database is not opened until you call .connect()"]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Opens (or creates) a database at `root`.
    ///
    /// # Errors
    ///
    /// See [`DriverBuilder::connect`].
    pub async fn new(root: impl Into<PathBuf>, options: Options) -> Result<Self, StoreError> {
        DriverBuilder::with_options(options).root(root).connect().await
    }

    /// The canonical root directory of this database.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Serializes `value` and atomically stores it as `collection/resource`.
    ///
    /// The collection directory is created on first write. Concurrent writes to
    /// the same collection are applied one at a time.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingCollection`] / [`StoreError::MissingResource`] for
    /// empty names, [`StoreError::InvalidName`] for names leaving the database,
    /// [`StoreError::SerializationFailed`] if `value` has no JSON form, and the
    /// write errors of the atomic publish: [`StoreError::DirectoryCreateFailed`],
    /// [`StoreError::WriteFailed`], [`StoreError::RenameFailed`].
    pub async fn write<T>(
        &self,
        collection: &str,
        resource: &str,
        value: &T,
    ) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let (collection, resource) = record_names(collection, resource)?;

        let _guard = self.locks.acquire(&collection.key()).await;

        let data = codec::encode(value)?;
        let target = collection.dir(&self.root).join(&resource);
        atomic::write_atomic(&target, &data).await?;

        self.sink.in_scope(|| {
            trace!(%collection, resource = %resource, bytes = data.len(), "Record written");
        });
        Ok(())
    }

    /// Reads `collection/resource` and decodes it into `T`.
    ///
    /// Reads take no lock.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] if the record does not exist,
    /// [`StoreError::ReadFailed`] on I/O failure and
    /// [`StoreError::DecodeFailed`] if the stored JSON does not fit `T`.
    pub async fn read<T: DeserializeOwned>(
        &self,
        collection: &str,
        resource: &str,
    ) -> Result<T, StoreError> {
        let (collection, resource) = record_names(collection, resource)?;
        let path = collection.dir(&self.root).join(&resource);
        let data = reader::read_record(&path, &collection.key(), &resource).await?;
        codec::decode(&data, &path)
    }

    /// Reads the stored bytes of `collection/resource` without decoding them.
    ///
    /// # Errors
    ///
    /// As [`Driver::read`], minus decoding.
    pub async fn read_raw(&self, collection: &str, resource: &str) -> Result<Vec<u8>, StoreError> {
        let (collection, resource) = record_names(collection, resource)?;
        let path = collection.dir(&self.root).join(&resource);
        reader::read_record(&path, &collection.key(), &resource).await
    }

    /// Raw contents of every record in `collection`, in directory-listing order.
    ///
    /// The order is whatever the filesystem yields; sort if you need stability.
    ///
    /// # Errors
    ///
    /// [`StoreError::CollectionNotFound`] if the collection directory is absent
    /// and [`StoreError::ReadFailed`] if any record cannot be read.
    pub async fn read_all(&self, collection: &str) -> Result<Vec<Vec<u8>>, StoreError> {
        let records = self.scan(collection).await?;
        Ok(records.into_iter().map(|(_, data)| data).collect())
    }

    /// Raw contents of every record in `collection`, keyed by resource name.
    ///
    /// # Errors
    ///
    /// As [`Driver::read_all`].
    pub async fn read_all_map(
        &self,
        collection: &str,
    ) -> Result<BTreeMap<String, Vec<u8>>, StoreError> {
        Ok(self.scan(collection).await?.into_iter().collect())
    }

    /// Resource names in `collection`, in directory-listing order.
    ///
    /// # Errors
    ///
    /// As [`Driver::read_all`].
    pub async fn list(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let collection = CollectionName::parse(collection)?;
        let entries = scanner::list(&collection.dir(&self.root), &collection.key()).await?;
        Ok(entries.into_iter().map(|entry| entry.name).collect())
    }

    /// `true` if `collection/resource` is a stored record.
    ///
    /// # Errors
    ///
    /// Name validation errors, or [`StoreError::ReadFailed`] if the record's
    /// metadata cannot be inspected.
    pub async fn exists(&self, collection: &str, resource: &str) -> Result<bool, StoreError> {
        let (collection, resource) = record_names(collection, resource)?;
        let path = collection.dir(&self.root).join(&resource);
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::ReadFailed { path, source, context: None }),
        }
    }

    /// Removes `collection/resource`, or the whole collection when `resource`
    /// is empty after cleaning.
    ///
    /// Deleting something that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// [`StoreError::MissingCollection`] if the collection cleans down to
    /// nothing, [`StoreError::InvalidName`] for names leaving the database and
    /// [`StoreError::RemoveFailed`] if the filesystem refuses the removal.
    pub async fn delete(&self, collection: &str, resource: &str) -> Result<(), StoreError> {
        let collection = CollectionName::parse(collection)?;
        let resource = security::resource_name(resource)?;

        let key = match &resource {
            Some(resource) => format!("{}/{resource}", collection.key()),
            None => collection.key(),
        };
        let _guard = self.locks.acquire(&key).await;

        let dir = collection.dir(&self.root);
        let target = match &resource {
            Some(resource) => dir.join(resource),
            None => dir,
        };

        let meta = match fs::symlink_metadata(&target).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(StoreError::RemoveFailed {
                    path: target,
                    source,
                    context: Some("stat".into()),
                });
            },
        };

        let removed = if meta.is_dir() {
            fs::remove_dir_all(&target).await
        } else {
            fs::remove_file(&target).await
        };
        match removed {
            Ok(()) => {},
            Err(err) if err.kind() == ErrorKind::NotFound => {},
            Err(source) => return Err(StoreError::RemoveFailed { path: target, source, context: None }),
        }

        self.sink.in_scope(|| trace!(path = %target.display(), "Deleted"));
        Ok(())
    }

    /// Removes every record of `collection` together with its directory.
    ///
    /// # Errors
    ///
    /// As [`Driver::delete`].
    pub async fn delete_all(&self, collection: &str) -> Result<(), StoreError> {
        self.delete(collection, "").await
    }

    /// Removes `*.tmp` leftovers of interrupted writes that are older than five
    /// minutes. Records and directories are never touched.
    pub async fn purge_tmp(&self) -> PurgeReport {
        let report = maintenance::purge_tmp(&self.root).await;
        if report.removed > 0 || report.failed > 0 {
            self.sink.in_scope(|| {
                info!(removed = report.removed, failed = report.failed, "Cleaned up temporary files");
            });
        }
        report
    }

    async fn scan(&self, collection: &str) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        let collection = CollectionName::parse(collection)?;
        let entries = scanner::list(&collection.dir(&self.root), &collection.key()).await?;
        scanner::read_entries(entries).await
    }
}

fn record_names(collection: &str, resource: &str) -> Result<(CollectionName, String), StoreError> {
    let collection = CollectionName::parse(collection)?;
    let resource = security::resource_name(resource)?.ok_or_else(|| StoreError::MissingResource {
        context: Some("A record needs a name".into()),
    })?;
    Ok((collection, resource))
}
