use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Environment variable holding the log level
pub const LOG_LEVEL_ENV: &str = "LOGLEVEL";

/// Sets up the logger for processes embedding the exporter
///
/// Environment variables:
/// - LOGLEVEL: Sets the log level (DEBUG, INFO, WARN, ERROR, TRACE)
///
/// Calling it more than once is harmless; only the first call installs a subscriber.
pub fn setup_logger() -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let level = parse_level(&env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "INFO".to_string()));

        let registry = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()));

        // Another subscriber may already be installed by the host process
        if registry.try_init().is_err() {
            tracing::debug!("Global subscriber already set, keeping it");
        }

        tracing::debug!("Log level set to: {}", level);
    });

    Ok(())
}

/// Maps a LOGLEVEL value to a tracing level, defaulting to INFO
pub fn parse_level(value: &str) -> Level {
    match value.to_uppercase().as_str() {
        "DEBUG" => Level::DEBUG,
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}
