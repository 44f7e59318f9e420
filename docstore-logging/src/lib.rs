//! Tracing subscriber setup shared by docstore binaries.
//!
//! Behaviour is driven by environment variables:
//!
//! - `DOCSTORE_LOG` (falls back to `RUST_LOG`, then `info`): an `EnvFilter` directive
//! - `DOCSTORE_LOG_FORMAT`: `human` (default) or `json`
//! - `DOCSTORE_LOG_FILE`: when set, events are also written to a daily-rolling file
//!
//! Console output goes to stderr so command output on stdout stays machine readable.

use std::env;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::MakeWriter, layer::SubscriberExt, registry, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Output encoding for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Human,
        }
    }
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub filter: String,
    pub format: LogFormat,
    pub file: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let filter = env::var("DOCSTORE_LOG")
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| "info".to_string());
        let format = env::var("DOCSTORE_LOG_FORMAT")
            .map(|v| LogFormat::parse(&v))
            .unwrap_or(LogFormat::Human);
        let file = env::var("DOCSTORE_LOG_FILE")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        Self {
            filter,
            format,
            file,
        }
    }
}

fn fmt_layer<W>(writer: W, format: LogFormat, ansi: bool) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);
    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Human => layer.boxed(),
    }
}

/// Installs the global subscriber described by `settings`.
///
/// The returned guard must be held for the lifetime of the process when file
/// output is enabled, otherwise buffered events are dropped. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_with(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_new(&settings.filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(std::io::stderr, settings.format, true)];
    let mut guard = None;

    if let Some(path) = &settings.file {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "docstore.log".into());
        let appender = tracing_appender::rolling::daily(dir, file_name);
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
        layers.push(fmt_layer(non_blocking, settings.format, false));
        guard = Some(worker_guard);
    }

    // A subscriber may already be installed (tests, embedding binaries).
    let _ = registry().with(layers).with(env_filter).try_init();

    guard
}

/// Initializes the global subscriber from environment variables.
pub fn init_subscriber() -> Option<WorkerGuard> {
    init_with(&LogSettings::from_env())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("human"), LogFormat::Human);
        assert_eq!(LogFormat::parse("anything"), LogFormat::Human);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        let settings = LogSettings {
            filter: "debug".to_string(),
            format: LogFormat::Human,
            file: None,
        };
        assert!(init_with(&settings).is_none());
        assert!(init_with(&settings).is_none());
    }
}
