//! # Light Client Configuration

use crate::algorithms::VerifyOptions;
use crate::domain::TrustThreshold;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Light client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightClientConfig {
    /// Chain every header must belong to.
    pub chain_id: String,

    /// Fraction of trusted power that must sign a skipped-to header.
    pub trust_threshold: TrustThreshold,

    /// How long a trusted header stays usable, seconds.
    pub trusting_period_secs: u64,

    /// Allowed clock drift, seconds.
    pub max_clock_drift_secs: u64,

    /// Upper bound on waiting for a height to be committed, milliseconds.
    pub wait_timeout_ms: u64,

    /// Latest-height poll interval while waiting, milliseconds.
    pub poll_interval_ms: u64,

    /// Timeout of each RPC call, milliseconds.
    pub request_timeout_ms: u64,

    /// Verification steps allowed for one target height.
    pub max_bisection_steps: usize,

    /// Verified blocks kept in the light store.
    pub max_stored_blocks: usize,
}

impl Default for LightClientConfig {
    fn default() -> Self {
        Self {
            chain_id: "oracle-1".to_string(),
            trust_threshold: TrustThreshold::ONE_THIRD,
            trusting_period_secs: 14 * 24 * 3_600,
            max_clock_drift_secs: 10,
            wait_timeout_ms: 30_000,
            poll_interval_ms: 1_000,
            request_timeout_ms: 10_000,
            max_bisection_steps: 64,
            max_stored_blocks: 1_000,
        }
    }
}

impl LightClientConfig {
    /// Create a config for testing (short waits).
    pub fn for_testing(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            trusting_period_secs: 7_200,
            wait_timeout_ms: 500,
            poll_interval_ms: 10,
            request_timeout_ms: 500,
            max_stored_blocks: 100,
            ..Self::default()
        }
    }

    /// Header verification parameters.
    pub fn verify_options(&self) -> VerifyOptions {
        VerifyOptions {
            chain_id: self.chain_id.clone(),
            trust_threshold: self.trust_threshold,
            trusting_period_secs: self.trusting_period_secs,
            max_clock_drift_secs: self.max_clock_drift_secs,
        }
    }

    /// Wait-for-height timeout.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Wait-for-height poll interval.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Per-call RPC timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Reject unusable settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.chain_id.is_empty() {
            return Err("chain id must not be empty".into());
        }
        if !self.trust_threshold.is_valid() {
            return Err(format!(
                "trust level {} outside [1/3, 1]",
                self.trust_threshold
            ));
        }
        if self.trusting_period_secs == 0 {
            return Err("trusting period must be positive".into());
        }
        if self.poll_interval_ms == 0 || self.poll_interval_ms > self.wait_timeout_ms {
            return Err("poll interval must be positive and within the wait timeout".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LightClientConfig::default();
        assert_eq!(config.trust_threshold, TrustThreshold::ONE_THIRD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_testing_config() {
        let config = LightClientConfig::for_testing("oc-mock-1");
        assert_eq!(config.chain_id, "oc-mock-1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_trust_level_bounds() {
        let mut config = LightClientConfig::default();
        config.trust_threshold = TrustThreshold {
            numerator: 1,
            denominator: 5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_chain_id_rejected() {
        let config = LightClientConfig::for_testing("");
        assert!(config.validate().is_err());
    }
}
