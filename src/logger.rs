//! Logging setup.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{LogFormat, LoggerConfig};

/// Build the level filter: `RUST_LOG` wins, then the configured level.
pub fn filter(config: &LoggerConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global `tracing` subscriber. Returns `false` if one was
/// already installed (e.g. by a test harness).
pub fn init(config: &LoggerConfig) -> bool {
    let builder = fmt().with_env_filter(filter(config)).with_target(true);
    match config.format {
        LogFormat::Json => builder.json().try_init().is_ok(),
        LogFormat::Text => builder.try_init().is_ok(),
    }
}
