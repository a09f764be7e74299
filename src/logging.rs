use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::constants::{DEFAULT_LOG_FILTER, LOG_DIR, LOG_FILE_PREFIX};

/// Installs the global subscriber: readable lines on stdout plus a JSON
/// file under `logs/`, rotated daily.
///
/// The returned guard flushes the file writer when dropped, so binaries bind
/// it for the whole of `main`. When the log directory cannot be created the
/// clerk keeps running with console output only.
pub fn init_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console = fmt::layer().with_target(true).with_line_number(true).with_writer(std::io::stdout);

    let appender = std::fs::create_dir_all(LOG_DIR).map_err(|e| e.to_string()).and_then(|_| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(LOG_DIR)
            .map_err(|e| e.to_string())
    });

    match appender {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let json = fmt::layer().json().with_writer(writer);
            // A subscriber installed earlier (tests, embedding) wins
            let _ = tracing_subscriber::registry().with(filter).with(console).with(json).try_init();
            Some(guard)
        }
        Err(reason) => {
            let _ = tracing_subscriber::registry().with(filter).with(console).try_init();
            tracing::warn!("File logging disabled, {} unavailable: {}", LOG_DIR, reason);
            None
        }
    }
}
