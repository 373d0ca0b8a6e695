use crate::layers;
use tracing::Dispatch;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;

#[derive(Debug, Clone)]
enum Target {
    Global,
    Scoped(Dispatch),
}

/// A pluggable diagnostic sink.
///
/// Components that accept a [`Sink`] emit their `tracing` events inside it
/// instead of the process-wide default subscriber, so independent components
/// in one process can log to different places (or nowhere).
///
/// Verbosity maps onto `tracing` levels; `fatal` conditions are reported at
/// [`tracing::Level::ERROR`].
///
/// # Example
///
/// ```rust
/// use quire_logger::{LevelFilter, Sink};
///
/// let sink = Sink::console(LevelFilter::WARN);
/// sink.in_scope(|| tracing::warn!("visible"));
/// sink.in_scope(|| tracing::info!("filtered out"));
/// ```
#[derive(Debug, Clone)]
pub struct Sink {
    target: Target,
}

impl Sink {
    /// Compact console output filtered at `level`.
    #[must_use]
    pub fn console(level: LevelFilter) -> Self {
        let subscriber = tracing_subscriber::registry().with(layers::filtered_console(level));
        Self::from_dispatch(Dispatch::new(subscriber))
    }

    /// Forwards events to whatever default subscriber is active when they are emitted.
    #[must_use]
    pub const fn global() -> Self {
        Self { target: Target::Global }
    }

    /// Discards every event.
    #[must_use]
    pub fn silent() -> Self {
        Self::from_dispatch(Dispatch::none())
    }

    #[must_use]
    pub const fn from_dispatch(dispatch: Dispatch) -> Self {
        Self { target: Target::Scoped(dispatch) }
    }

    /// Runs `f` with this sink as the current default dispatcher.
    pub fn in_scope<R>(&self, f: impl FnOnce() -> R) -> R {
        match &self.target {
            Target::Global => f(),
            Target::Scoped(dispatch) => tracing::dispatcher::with_default(dispatch, f),
        }
    }

    /// The dispatcher backing this sink, `None` for [`Sink::global`].
    #[must_use]
    pub const fn dispatch(&self) -> Option<&Dispatch> {
        match &self.target {
            Target::Global => None,
            Target::Scoped(dispatch) => Some(dispatch),
        }
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::console(LevelFilter::INFO)
    }
}

impl From<Dispatch> for Sink {
    fn from(dispatch: Dispatch) -> Self {
        Self::from_dispatch(dispatch)
    }
}
