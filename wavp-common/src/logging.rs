//! Tracing subscriber setup shared by wavp binaries

use crate::config::LoggingConfig;
use crate::{Error, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter: `RUST_LOG` wins, else the configured level.
pub fn build_filter(level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(level)
        .map_err(|e| Error::Config(format!("Invalid log level '{}': {}", level, e)))
}

/// Install the global tracing subscriber.
///
/// Logs go to stderr unless `logging.file` is set, in which case they are
/// appended to that file without ANSI colors. Stdout is never used since it
/// may carry PCM output.
pub fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&logging.level)?;

    let (stderr_layer, file_layer) = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    Error::Config(format!("Failed to open log file {:?}: {}", path, e))
                })?;
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            (None, Some(layer))
        }
        None => (
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
            None,
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to initialize logging: {}", e)))
}
