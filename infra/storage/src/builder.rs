use crate::driver::{Driver, DriverInner};
use crate::error::StoreError;
use crate::locks::LockRegistry;
use crate::security;
use private::Sealed;
use quire_logger::Sink;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

/// Construction options of a [`Driver`].
#[derive(Debug, Clone)]
pub struct Options {
    /// Create the root directory tree when it does not exist yet.
    pub create: bool,
    /// Where lifecycle diagnostics go.
    pub sink: Sink,
    /// Remove stale `*.tmp` leftovers of interrupted writes while connecting.
    pub purge_stale: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { create: true, sink: Sink::default(), purge_stale: false }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct DriverBuilder<S: Sealed = NoRoot> {
    state: S,
    options: Options,
}

#[allow(private_bounds)]
impl<S: Sealed> DriverBuilder<S> {
    #[must_use = "Sets whether the database root should be created if it does not exist"]
    pub fn create(mut self, enable: bool) -> Self {
        self.options.create = enable;
        self
    }

    #[must_use = "Sets the diagnostic sink for lifecycle events"]
    pub fn sink(mut self, sink: Sink) -> Self {
        self.options.sink = sink;
        self
    }

    #[must_use = "Sets whether stale temporary files are purged on connect"]
    pub fn purge_stale(mut self, enable: bool) -> Self {
        self.options.purge_stale = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> DriverBuilder<N> {
        DriverBuilder { state, options: self.options }
    }
}

impl DriverBuilder<NoRoot> {
    #[must_use = "Creates a new driver builder with default options"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Creates a new driver builder with the given options"]
    pub fn with_options(options: Options) -> Self {
        Self { state: NoRoot, options }
    }

    #[must_use = "Sets the root directory of the database"]
    pub fn root(self, path: impl Into<PathBuf>) -> DriverBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl DriverBuilder<WithRoot> {
    /// Validates the root and opens (or creates) the database there.
    ///
    /// Boot sequence:
    /// 1. **Guard**: the root is made absolute, cleaned and checked against the
    ///    unsafe-location deny list. Nothing is created for a rejected root.
    /// 2. **Bootstrapping**: an existing directory is reused unchanged; a missing
    ///    one is created with all ancestors when `create(true)` (the default).
    /// 3. **Canonicalization**: the root is resolved to its physical path and
    ///    checked again, so a symlink cannot smuggle in an unsafe location.
    /// 4. **Self-Healing** (opt-in): stale `*.tmp` files are purged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsafeLocation`] for a rejected root and
    /// [`StoreError::DirectoryCreateFailed`] if the root is missing with
    /// `create(false)`, is not a directory, or cannot be created or resolved.
    pub async fn connect(self) -> Result<Driver, StoreError> {
        let root = security::validate_root(&self.state.0)?;
        let Options { create, sink, purge_stale } = self.options;

        if root_exists(&root).await? {
            sink.in_scope(|| debug!(path = %root.display(), "Using existing database"));
        } else {
            if !create {
                return Err(StoreError::DirectoryCreateFailed {
                    path: root,
                    source: ErrorKind::NotFound.into(),
                    context: Some("Database root does not exist and creation is disabled".into()),
                });
            }
            fs::create_dir_all(&root).await.map_err(|source| {
                StoreError::DirectoryCreateFailed { path: root.clone(), source, context: None }
            })?;
            sink.in_scope(|| info!(path = %root.display(), "Created database"));
        }

        let canonical =
            fs::canonicalize(&root).await.map_err(|source| StoreError::DirectoryCreateFailed {
                path: root.clone(),
                source,
                context: Some("Failed to resolve database root".into()),
            })?;
        security::check_location(&canonical)?;

        let driver = Driver {
            inner: Arc::new(DriverInner { root: canonical, locks: LockRegistry::new(), sink }),
        };

        if purge_stale {
            driver.purge_tmp().await;
        }

        Ok(driver)
    }
}

async fn root_exists(root: &Path) -> Result<bool, StoreError> {
    match fs::metadata(root).await {
        Ok(meta) if meta.is_dir() => Ok(true),
        Ok(_) => Err(StoreError::DirectoryCreateFailed {
            path: root.to_path_buf(),
            source: ErrorKind::NotADirectory.into(),
            context: Some("Database root exists and is not a directory".into()),
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(source) => Err(StoreError::DirectoryCreateFailed {
            path: root.to_path_buf(),
            source,
            context: Some("Failed to inspect database root".into()),
        }),
    }
}
