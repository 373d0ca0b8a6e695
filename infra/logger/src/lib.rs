//! # Logger
//!
//! Diagnostics plumbing for the `quire` crates.
//!
//! * [`Sink`] is the pluggable diagnostic sink handed to components such as the
//!   storage driver. Events are emitted inside the sink only, never leaking into
//!   the process-wide subscriber unless [`Sink::global`] is chosen.
//! * [`Logger`] configures an application-wide pipeline: console and rolling
//!   file output with non-blocking I/O and `RUST_LOG`-compatible filtering.
//!
//! There is no `fatal` level in `tracing`; fatal conditions are reported at
//! [`tracing::Level::ERROR`].
//!
//! ## Example
//!
//! ```rust
//! # use quire_logger::{Logger, LevelFilter};
//!
//! let logger = Logger::builder()
//!     .name("my-app")
//!     .console(true)
//!     .level(LevelFilter::DEBUG)
//!     .build()
//!     .unwrap();
//!
//! // Use it for a single component, or call `logger.install()` to make it global.
//! let sink = logger.sink();
//! sink.in_scope(|| tracing::debug!("scoped to the sink"));
//! ```

mod builder;
mod error;
mod layers;
mod logger;
mod sink;

pub use crate::builder::{LoggerBuilder, NoFile, NoName, WithFile, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::layers::Format;
pub use crate::logger::Logger;
pub use crate::sink::Sink;
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;
