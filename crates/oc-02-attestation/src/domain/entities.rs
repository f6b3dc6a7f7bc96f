//! # Remote Report Format
//!
//! ```text
//! vendor root ──signs──▶ cert[0].pub_key ──signs──▶ ... ──signs──▶ cert[n].pub_key
//!                                                                      │
//!                                                         signs bincode(ReportBody)
//! ```
//!
//! Certificates sign the SHA-256 of the next public key. All keys are
//! compressed secp256k1.

use super::errors::AttestationError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use shared_crypto::sha256;
use shared_types::EnclaveIdentity;

/// Length of the caller-supplied report data.
pub const REPORT_DATA_LEN: usize = 64;

/// Maximum accepted certificate chain length.
pub const MAX_CHAIN_LEN: usize = 4;

/// Measured contents of a report.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportBody {
    /// Security / patch level of the platform.
    pub security_version: u16,
    /// Product identifier.
    pub product_id: Vec<u8>,
    /// Hash of the enclave signing authority.
    pub signer_id: Vec<u8>,
    /// Hash of the enclave code.
    pub unique_id: Vec<u8>,
    /// Caller-supplied data; the first 32 bytes carry the binding hash.
    #[serde_as(as = "Bytes")]
    pub report_data: [u8; REPORT_DATA_LEN],
}

impl ReportBody {
    /// Canonical encoding that the leaf key signs.
    pub fn signing_bytes(&self) -> Result<Vec<u8>, AttestationError> {
        bincode::serialize(self).map_err(|e| AttestationError::Malformed(e.to_string()))
    }

    /// Identity measured in this report.
    pub fn identity(&self) -> EnclaveIdentity {
        EnclaveIdentity {
            product_id: self.product_id.clone(),
            signer_id: self.signer_id.clone(),
            unique_id: self.unique_id.clone(),
        }
    }

    /// Binding carried in the report data.
    pub fn binding(&self) -> &[u8] {
        &self.report_data[..32]
    }
}

/// One link of the signature chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Compressed public key being certified.
    pub pub_key: Vec<u8>,
    /// Issuer signature over SHA-256(`pub_key`).
    pub signature: Vec<u8>,
}

impl Certificate {
    /// Message the issuer signs.
    pub fn signed_message(pub_key: &[u8]) -> [u8; 32] {
        sha256(pub_key)
    }
}

/// A signed attestation report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteReport {
    /// Measured contents.
    pub body: ReportBody,
    /// Leaf-key signature over `body.signing_bytes()`.
    pub signature: Vec<u8>,
    /// Certificates from the vendor root down to the leaf.
    pub cert_chain: Vec<Certificate>,
}

impl RemoteReport {
    /// Encode for transport or on-chain storage.
    pub fn to_bytes(&self) -> Result<Vec<u8>, AttestationError> {
        bincode::serialize(self).map_err(|e| AttestationError::Malformed(e.to_string()))
    }

    /// Decode report bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AttestationError> {
        bincode::deserialize(bytes).map_err(|e| AttestationError::Malformed(e.to_string()))
    }
}

/// Report data binding a 32-byte hash, zero padded.
pub fn report_data_for(binding: &[u8; 32]) -> [u8; REPORT_DATA_LEN] {
    let mut data = [0u8; REPORT_DATA_LEN];
    data[..32].copy_from_slice(binding);
    data
}

/// Binding for a public key: SHA-256 of its bytes.
pub fn key_binding(pub_key: &[u8]) -> [u8; 32] {
    sha256(pub_key)
}
