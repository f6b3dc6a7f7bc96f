//! # Inbound Ports
//!
//! API exposed by the attestation verifier.

use crate::domain::{AttestationError, ReportBody};
use shared_types::EnclaveIdentity;

/// Attestation API.
pub trait AttestationApi: Send + Sync {
    /// Verify a peer report against an expected identity and data binding.
    ///
    /// Pure with respect to the verifier state: no result is cached.
    fn verify(
        &self,
        report_bytes: &[u8],
        expected_binding: &[u8; 32],
        expected_identity: &EnclaveIdentity,
    ) -> Result<ReportBody, AttestationError>;

    /// Identity of the enclave this process runs in.
    fn self_identity(&self) -> &EnclaveIdentity;

    /// Produce a report vouching for `pub_key` from this enclave.
    fn attest_key(&self, pub_key: &[u8]) -> Result<Vec<u8>, AttestationError>;
}
