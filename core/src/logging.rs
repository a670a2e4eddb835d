//! `tracing` subscriber setup shared by every binary and test that wants log output.

use crate::config::Config;
use tracing_subscriber::EnvFilter;

/// Installs a global fmt subscriber writing to stderr. `RUST_LOG`, when set and valid, takes
/// precedence over `filter`. Returns false if a global subscriber was already installed.
pub fn init(filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// [`init`] with the configured `log_filter`.
pub fn init_from_config(config: &Config) -> bool {
    init(&config.log_filter)
}
