//! Tracing subscriber setup.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the filter directive.
pub const LOG_ENV: &str = "KBPICK_LOG";
const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_PREFIX: &str = "kbpick.log";

/// Installs the global subscriber: stderr always, plus a daily-rolling file
/// under `logs_dir` when given. Keep the returned guard alive until exit so
/// buffered file output is flushed.
pub fn init_logging(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time();

    let (file_layer, guard) = match logs_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = logs_dir {
        tracing::info!("[Logging] Writing log files to {}", dir.display());
    }
    guard
}
