//! # Oracle Telemetry
//!
//! Logging and metrics for the oracle node.
//!
//! - **Logs**: `tracing` with an `EnvFilter`, plain or JSON
//! - **Metrics**: Prometheus counters, gauge and histogram in one registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oracle_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OC_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `OC_JSON_LOGS` | `false` | JSON log lines |
//! | `OC_SERVICE_NAME` | `oracle-node` | Service name |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, BROADCAST_ERRORS,
    BROADCAST_ERRORS_BY_REASON, EVENTS_DROPPED, HANDLER_DURATION, TRUSTED_HEIGHT,
    VERIFICATION_FAILURES, VOTES_CAST,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Register metrics, then install logging.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::Config("bad".into());
        assert_eq!(err.to_string(), "Invalid configuration: bad");
    }
}
