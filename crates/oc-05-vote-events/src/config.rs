//! # Reactor Configuration

use crate::domain::ReactorError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Event reactor configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReactorConfig {
    /// Upper bound for deciding one event, milliseconds.
    pub handler_timeout_ms: u64,

    /// Time in-flight handlers get to finish at shutdown, milliseconds.
    pub shutdown_grace_ms: u64,

    /// Initial state of every vote event kind.
    pub start_enabled: bool,

    /// Read the active enclave version once before subscribing.
    pub sync_gate_on_start: bool,
}

impl Default for ReactorConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: 60_000,
            shutdown_grace_ms: 10_000,
            start_enabled: true,
            sync_gate_on_start: true,
        }
    }
}

impl ReactorConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self {
            handler_timeout_ms: 5_000,
            shutdown_grace_ms: 200,
            start_enabled: true,
            sync_gate_on_start: false,
        }
    }

    /// Handler timeout.
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }

    /// Shutdown grace period.
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Reject zero timeouts.
    pub fn validate(&self) -> Result<(), ReactorError> {
        if self.handler_timeout_ms == 0 {
            return Err(ReactorError::Config("handler_timeout_ms must be positive".into()));
        }
        if self.shutdown_grace_ms == 0 {
            return Err(ReactorError::Config("shutdown_grace_ms must be positive".into()));
        }
        Ok(())
    }
}
