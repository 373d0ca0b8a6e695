use crate::error::{LoggerError, LoggerErrorExt};
use crate::layers::{self, Format};
use crate::logger::Logger;
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

#[derive(Debug, Clone)]
struct ConsoleOutput {
    enabled: bool,
    ansi: bool,
    format: Format,
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self { enabled: true, ansi: true, format: Format::Compact }
    }
}

/// Rolling file output settings, only reachable once a directory is chosen.
#[derive(Debug, Clone)]
struct FileOutput {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
    format: Format,
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);
#[derive(Debug)]
pub struct NoFile;
#[derive(Debug)]
pub struct WithFile(FileOutput);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}
impl Sealed for NoFile {}
impl Sealed for WithFile {}

/// A builder for the application-wide logging pipeline.
///
/// A name is required before anything can be built; it prefixes rolling
/// log files (`<name>.<date>.log`). File output settings become available
/// after [`LoggerBuilder::path`].
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName, F: Sealed = NoFile> {
    name: N,
    file: F,
    console: ConsoleOutput,
    level: LevelFilter,
    directives: Option<String>,
}

impl LoggerBuilder<NoName, NoFile> {
    pub(crate) fn new() -> Self {
        Self {
            name: NoName,
            file: NoFile,
            console: ConsoleOutput::default(),
            level: LevelFilter::INFO,
            directives: None,
        }
    }

    /// Sets the name of the logger, used as the log file prefix.
    #[must_use = "The logger needs a name before it can be built"]
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName, NoFile> {
        LoggerBuilder {
            name: WithName(name.into()),
            file: self.file,
            console: self.console,
            level: self.level,
            directives: self.directives,
        }
    }
}

impl<F: Sealed> LoggerBuilder<WithName, F> {
    /// Minimum level emitted when no directive says otherwise.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Explicit filter directives (e.g., `quire_storage=debug`).
    ///
    /// Without them, `RUST_LOG` is honored on top of [`LoggerBuilder::level`].
    /// Malformed directives make [`LoggerBuilder::build`] fail.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        self.directives = Some(directives.into());
        self
    }

    /// Turns console output on or off.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console.enabled = enabled;
        self
    }

    /// Colors console output. Ignored for JSON.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.console.ansi = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console_format(mut self, format: Format) -> Self {
        self.console.format = format;
        self
    }

    fn filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => {
                builder.parse(directives).map_err(|e| LoggerError::InvalidConfiguration {
                    message: format!("Invalid env filter '{directives}': {e}").into(),
                    context: None,
                })
            },
        }
    }

    fn check_name(&self) -> Result<(), LoggerError> {
        if self.name.0.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        Ok(())
    }
}

impl LoggerBuilder<WithName, NoFile> {
    /// Adds rolling file output in `dir` (daily rotation, ten files kept).
    pub fn path(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithName, WithFile> {
        let file = FileOutput {
            dir: dir.into(),
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
            format: Format::Compact,
        };
        LoggerBuilder {
            name: self.name,
            file: WithFile(file),
            console: self.console,
            level: self.level,
            directives: self.directives,
        }
    }

    /// Builds a console-only pipeline without installing it.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, disabled console
    /// or malformed filter directives.
    pub fn build(self) -> Result<Logger, LoggerError> {
        self.check_name()?;
        if !self.console.enabled {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging output enabled. Enable console or file output.".into(),
                context: None,
            });
        }

        let subscriber = tracing_subscriber::registry()
            .with(self.filter()?)
            .with(layers::console(self.console.ansi, self.console.format));

        Ok(Logger::new(Dispatch::new(subscriber), None))
    }

    /// Builds the pipeline and installs it as the global default.
    ///
    /// # Errors
    /// Everything [`LoggerBuilder::build`] returns, plus [`LoggerError::Subscriber`]
    /// if a global dispatcher has already been set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let logger = self.build()?;
        logger.install()?;
        Ok(logger)
    }
}

impl LoggerBuilder<WithName, WithFile> {
    /// Maximum number of rolled files kept on disk.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.file.0.max_files = max;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: Rotation) -> Self {
        self.file.0.rotation = rotation;
        self
    }

    /// Writes file output as JSON lines.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self) -> Self {
        self.file.0.format = Format::Json;
        self
    }

    /// Builds the pipeline without installing it.
    ///
    /// The returned [`Logger`] owns the file writer's [`WorkerGuard`]; events
    /// stop reaching the file once it is dropped.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for a blank name, zero `max_files`
    /// or malformed filter directives, [`LoggerError::Directory`] or
    /// [`LoggerError::Appender`] if the log directory cannot be prepared.
    ///
    /// [`WorkerGuard`]: tracing_appender::non_blocking::WorkerGuard
    pub fn build(self) -> Result<Logger, LoggerError> {
        self.check_name()?;
        let filter = self.filter()?;
        let FileOutput { dir, rotation, max_files, format } = self.file.0;

        if max_files == 0 {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }

        fs::create_dir_all(&dir).context(format!("Failed to create path: {}", dir.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(&self.name.0)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(max_files)
            .build(&dir)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let console = self
            .console
            .enabled
            .then(|| layers::console(self.console.ansi, self.console.format));
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(console)
            .with(layers::file(writer, format));

        Ok(Logger::new(Dispatch::new(subscriber), Some(guard)))
    }

    /// Builds the pipeline and installs it as the global default.
    ///
    /// # Errors
    /// Everything [`LoggerBuilder::build`] returns, plus [`LoggerError::Subscriber`]
    /// if a global dispatcher has already been set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let logger = self.build()?;
        logger.install()?;
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let builder = Logger::builder().name("quire-test").env_filter("quire=debug");
        assert!(builder.console.enabled);
        assert!(builder.console.ansi);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.directives.as_deref(), Some("quire=debug"));
    }

    #[test]
    fn test_file_settings() {
        let tmp_dir = tempdir().unwrap();
        let log_dir = tmp_dir.path().join("logs");
        let builder = Logger::builder()
            .name("quire-test")
            .level(LevelFilter::DEBUG)
            .path(&log_dir)
            .max_files(5)
            .rotation(Rotation::HOURLY)
            .json();

        assert_eq!(builder.level, LevelFilter::DEBUG);
        assert_eq!(builder.file.0.dir, log_dir);
        assert_eq!(builder.file.0.max_files, 5);
        assert_eq!(builder.file.0.format, Format::Json);
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let err = Logger::builder().name("  ").build().expect_err("blank name");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder().name("app").console(false).build().expect_err("no output");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder()
            .name("app")
            .env_filter("quire=verbose")
            .build()
            .expect_err("malformed filter");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let tmp_dir = tempdir().unwrap();
        let err = Logger::builder()
            .name("app")
            .path(tmp_dir.path())
            .max_files(0)
            .build()
            .expect_err("zero max files");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_file_output_without_console() {
        let tmp_dir = tempdir().unwrap();
        let log_dir = tmp_dir.path().join("logs");

        let logger = Logger::builder()
            .name("quire-test")
            .console(false)
            .env_filter("info")
            .path(&log_dir)
            .build()
            .unwrap();

        assert!(log_dir.is_dir(), "log directory should be created by build");
        assert!(logger.guard().is_some());
    }
}
