use crate::builder::{LoggerBuilder, NoFile, NoName};
use crate::error::LoggerError;
use crate::sink::Sink;
use tracing::Dispatch;
use tracing_appender::non_blocking::WorkerGuard;

/// A configured logging pipeline.
///
/// Drop this handle only when the application shuts down: it owns the
/// background worker guard that flushes file output.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    dispatch: Dispatch,
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use quire_logger::{LevelFilter, Logger};
    ///
    /// let _logger = Logger::builder()
    ///     .name("my-app")
    ///     .level(LevelFilter::DEBUG)
    ///     .init()
    ///     .unwrap();
    /// ```
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder<NoName, NoFile> {
        LoggerBuilder::new()
    }

    pub(crate) const fn new(dispatch: Dispatch, guard: Option<WorkerGuard>) -> Self {
        Self { dispatch, guard }
    }

    /// Installs this pipeline as the process-wide default dispatcher.
    ///
    /// # Errors
    /// Returns [`LoggerError::Subscriber`] if a global dispatcher has already been set.
    pub fn install(&self) -> Result<(), LoggerError> {
        tracing::dispatcher::set_global_default(self.dispatch.clone())?;
        Ok(())
    }

    /// A [`Sink`] that writes through this pipeline without installing it.
    #[must_use]
    pub fn sink(&self) -> Sink {
        Sink::from_dispatch(self.dispatch.clone())
    }

    /// The file writer's guard, `None` for console-only pipelines.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::dispatcher::with_default(&self.dispatch, || {
                tracing::debug!("Flushing log files");
            });
        }
    }
}
