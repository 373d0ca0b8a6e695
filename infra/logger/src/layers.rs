use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::Layer;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::registry::LookupSpan;

/// Boxed layer over any registry-like subscriber.
pub(crate) type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Line format of a log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// One compact human-readable line per event.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Console output on stdout.
pub(crate) fn console<S>(ansi: bool, format: Format) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    match format {
        Format::Compact => layer().compact().with_ansi(ansi).boxed(),
        Format::Json => layer().json().with_ansi(false).boxed(),
    }
}

/// Console output with its own level gate, for sinks that have no env filter.
pub(crate) fn filtered_console<S>(level: LevelFilter) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    layer().compact().with_ansi(true).with_filter(level).boxed()
}

/// File output through a non-blocking writer. Never colored.
pub(crate) fn file<S>(writer: NonBlocking, format: Format) -> BoxedLayer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a> + 'static,
{
    let base = layer().with_writer(writer).with_ansi(false);
    match format {
        Format::Compact => base.boxed(),
        Format::Json => base.json().boxed(),
    }
}
