//! Diagnostic logging setup.
//!
//! Everything the recorder reports (boot, connection state, stored lines,
//! sink failures) goes through `tracing`. `RUST_LOG` wins over the configured
//! filter.

use crate::config::model::LogConfig;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init(config: &LogConfig) {
    fmt()
        .with_env_filter(filter(config))
        .with_target(false)
        .with_ansi(config.ansi)
        .init();
}

fn filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
