//! # Attestation Configuration

use crate::adapters::SimulatedEnclave;
use crate::domain::AttestationError;
use serde::{Deserialize, Serialize};
use shared_crypto::Secp256k1PublicKey;

/// Attestation verifier configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AttestationConfig {
    /// Minimum accepted security version, applied to peer and self reports.
    pub min_security_version: u16,

    /// Hex of the pinned vendor root key (compressed secp256k1).
    /// `None` pins the development root of [`SimulatedEnclave`].
    pub vendor_root_key: Option<String>,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            min_security_version: 1,
            vendor_root_key: None,
        }
    }
}

impl AttestationConfig {
    /// Create a config for testing.
    pub fn for_testing() -> Self {
        Self {
            min_security_version: 0,
            vendor_root_key: None,
        }
    }

    /// Resolve the pinned vendor root.
    pub fn vendor_root(&self) -> Result<Secp256k1PublicKey, AttestationError> {
        match &self.vendor_root_key {
            Some(encoded) => {
                let bytes = hex::decode(encoded.trim_start_matches("0x"))
                    .map_err(|e| AttestationError::Malformed(format!("vendor root hex: {e}")))?;
                Secp256k1PublicKey::from_slice(&bytes)
                    .map_err(|e| AttestationError::Malformed(format!("vendor root key: {e}")))
            }
            None => Ok(SimulatedEnclave::dev_vendor_key().public_key()),
        }
    }

    /// Reject a vendor root that does not parse.
    pub fn validate(&self) -> Result<(), AttestationError> {
        self.vendor_root().map(|_| ())
    }
}
