//! Logging bootstrap

use crate::config::LoggingConfig;
use std::io;
use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Returns `false` if
/// a global subscriber was already installed, in which case nothing changes.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
