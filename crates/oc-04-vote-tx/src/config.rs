//! # Vote Transaction Configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vote transaction configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteTxConfig {
    /// Chain identifier put into every sign doc.
    pub chain_id: String,

    /// Gas limit per vote transaction.
    pub gas_limit: u64,

    /// Fee amount per vote transaction.
    pub fee_amount: u64,

    /// Fee denomination.
    pub fee_denom: String,

    /// Memo attached to every transaction.
    pub memo: String,

    /// Broadcast timeout, milliseconds.
    pub broadcast_timeout_ms: u64,
}

impl Default for VoteTxConfig {
    fn default() -> Self {
        Self {
            chain_id: "oracle-1".to_string(),
            gas_limit: 400_000,
            fee_amount: 2_000,
            fee_denom: "uoc".to_string(),
            memo: String::new(),
            broadcast_timeout_ms: 15_000,
        }
    }
}

impl VoteTxConfig {
    /// Create a config for testing.
    pub fn for_testing(chain_id: &str) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            broadcast_timeout_ms: 500,
            ..Self::default()
        }
    }

    /// Broadcast timeout.
    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_millis(self.broadcast_timeout_ms)
    }
}
