//! Structured Logger
//!
//! Wraps `tracing` to provide console output, optional JSON formatting,
//! file rotation (NDJSON), and environment-based level control.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_FILE_PREFIX: &str = "charmline.log";

#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Fallback filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Directory for daily-rotated NDJSON logs; console only when `None`.
    pub dir: Option<PathBuf>,
    /// Emit console lines as JSON instead of the human format.
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            json: false,
        }
    }
}

/// Initialize the global structured logger.
///
/// Returns the file writer's guard; dropping it flushes and stops file logging.
/// Calling this twice is harmless: the second subscriber is ignored.
pub fn init_logger(options: &LogOptions) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&options.level));

    let console_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stdout)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
            .boxed()
    };

    // Rolling file appender: writes NDJSON to `<dir>/charmline.log.YYYY-MM-DD`
    let (file_layer, guard) = match &options.dir {
        Some(dir) => {
            let appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().json().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_log_to_console_only() {
        let options = LogOptions::default();
        assert_eq!(options.level, "info");
        assert!(options.dir.is_none());
        assert!(init_logger(&options).is_none());
    }
}
