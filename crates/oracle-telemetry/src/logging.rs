//! Structured logging.
//!
//! One global `tracing` subscriber with an `EnvFilter`. JSON output carries
//! the same fields as the plain format, so log shippers can parse either.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Fails when the filter does not parse or a subscriber is already set.
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {}", config.log_level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    let result = if config.json_logs {
        builder.json().with_current_span(false).try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Structured logging initialised"
    );
    Ok(())
}
