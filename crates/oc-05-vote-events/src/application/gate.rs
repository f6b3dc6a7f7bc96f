//! # Upgrade Gate
//!
//! One `enabled` flag per vote event kind. Only a node running the active
//! enclave version votes; when an upgrade vote ends the gate re-reads the
//! active unique id and flips every flag at once.

use crate::domain::{ReactorError, VoteEventKind};
use oc_03_trusted_query::TrustedQueryApi;
use shared_types::{decode_record, oracle_params_key, EnclaveIdentity, OracleParams, ORACLE_STORE};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Enabled flags for every vote event kind.
#[derive(Debug)]
pub struct UpgradeGate {
    flags: [AtomicBool; 4],
}

impl UpgradeGate {
    /// Gate with every kind set to `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self {
            flags: [
                AtomicBool::new(enabled),
                AtomicBool::new(enabled),
                AtomicBool::new(enabled),
                AtomicBool::new(enabled),
            ],
        }
    }

    /// Whether `kind` currently votes.
    pub fn is_enabled(&self, kind: VoteEventKind) -> bool {
        self.flags[kind.index()].load(Ordering::Acquire)
    }

    /// Enable or disable one kind.
    pub fn set(&self, kind: VoteEventKind, enabled: bool) {
        self.flags[kind.index()].store(enabled, Ordering::Release);
    }

    /// Enable or disable every kind.
    pub fn set_all(&self, enabled: bool) {
        for kind in VoteEventKind::ALL {
            self.set(kind, enabled);
        }
    }

    /// Enable everything when `active_unique_id` is ours, else disable.
    /// Returns the new state.
    pub fn apply_active_unique_id(&self, active_unique_id: &str, identity: &EnclaveIdentity) -> bool {
        let enabled = identity.matches_unique_id(active_unique_id);
        self.set_all(enabled);
        if enabled {
            info!(active = active_unique_id, "[oc-05] Running the active enclave version, votes enabled");
        } else {
            warn!(
                active = active_unique_id,
                own = %identity.unique_id_hex(),
                "[oc-05] Not the active enclave version, votes disabled"
            );
        }
        enabled
    }

    /// Re-read the active unique id from the chain and apply it.
    ///
    /// Flags are left unchanged when the chain cannot be read.
    pub async fn refresh(
        &self,
        query: &dyn TrustedQueryApi,
        identity: &EnclaveIdentity,
    ) -> Result<bool, ReactorError> {
        let bytes = query.read_latest(ORACLE_STORE, &oracle_params_key()).await?;
        let params: OracleParams = decode_record(&bytes).map_err(|e| {
            ReactorError::malformed("oracle_params", e.to_string())
        })?;
        Ok(self.apply_active_unique_id(&params.unique_id, identity))
    }
}

impl Default for UpgradeGate {
    fn default() -> Self {
        Self::new(true)
    }
}
