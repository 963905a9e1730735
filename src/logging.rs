// ABOUTME: Tracing subscriber setup for hosts embedding the view engine
// ABOUTME: Honors RUST_LOG first, then the configured level, in pretty or compact format

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. Calling this again once one is set is a no-op.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let log_level = if verbose { "debug" } else { config.level.as_str() };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let installed = match config.format.as_str() {
        "compact" => tracing_subscriber::fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init(),
        _ => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .try_init(),
    };

    match installed {
        Ok(()) => debug!("Logging initialized with level: {}", log_level),
        Err(e) => debug!("Logging already initialized: {}", e),
    }
    Ok(())
}
