use std::fs::OpenOptions;
use std::io;
use std::path::Path;

use tracing::{Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::Settings;

/// Target of the per-call tool audit records
pub const TOOL_CALLS_TARGET: &str = "tool_calls";

/// Console filter used when `RUST_LOG` is not set
pub const DEFAULT_CONSOLE_FILTER: &str = "warn,tool_calls=info";

/// Keeps the background log writer alive. Dropping it flushes pending records.
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// A layer that appends tool audit records to `path`, creating it if needed.
pub fn file_layer<S>(path: &Path) -> io::Result<(impl Layer<S>, WorkerGuard)>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(Targets::new().with_target(TOOL_CALLS_TARGET, Level::INFO));

    Ok((layer, guard))
}

/// Install the global subscriber: tool audit records go to the configured log
/// file, everything else to stderr under `RUST_LOG` (or
/// [`DEFAULT_CONSOLE_FILTER`]).
pub fn init_tracing(settings: &Settings) -> anyhow::Result<LogGuard> {
    let (file, guard, file_error) = match file_layer::<Registry>(&settings.tool_log_file) {
        Ok((layer, guard)) => (Some(layer), Some(guard), None),
        Err(e) => (None, None, Some(e)),
    };

    let console = fmt::layer().with_writer(io::stderr).with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER)),
    );

    tracing_subscriber::registry()
        .with(file)
        .with(console)
        .try_init()?;

    if let Some(e) = file_error {
        tracing::warn!(
            path = %settings.tool_log_file.display(),
            error = %e,
            "could not open tool call log, audit records go to the console only"
        );
    }

    Ok(LogGuard { _file: guard })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_file_layer_keeps_only_tool_calls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool_calls.log");

        let (layer, guard) = file_layer::<Registry>(&path).unwrap();
        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: TOOL_CALLS_TARGET, tool = "ping", "calling tool");
            tracing::info!(target: "pingagent::agent", "unrelated record");
            tracing::debug!(target: TOOL_CALLS_TARGET, "below threshold");
        });
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("calling tool"));
        assert!(contents.contains("tool=\"ping\""));
        assert!(!contents.contains("unrelated record"));
        assert!(!contents.contains("below threshold"));
    }

    #[test]
    fn test_file_layer_appends() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tool_calls.log");
        fs::write(&path, "existing line\n").unwrap();

        let (layer, guard) = file_layer::<Registry>(&path).unwrap();
        tracing::subscriber::with_default(tracing_subscriber::registry().with(layer), || {
            tracing::info!(target: TOOL_CALLS_TARGET, "new record");
        });
        drop(guard);

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing line\n"));
        assert!(contents.contains("new record"));
    }

    #[test]
    fn test_file_layer_missing_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("tool_calls.log");
        assert!(file_layer::<Registry>(&path).is_err());
    }
}
