//! # Attestation Service
//!
//! Bootstraps the self identity from a report over zero data and verifies
//! peer reports against it.

use crate::algorithms::{check_security_version, verify_report, verify_signature_chain};
use crate::config::AttestationConfig;
use crate::domain::{key_binding, report_data_for, AttestationError, RemoteReport, ReportBody, REPORT_DATA_LEN};
use crate::ports::{AttestationApi, EnclavePort};
use shared_crypto::Secp256k1PublicKey;
use shared_types::EnclaveIdentity;
use tracing::{debug, info, warn};

/// Attestation service over the local enclave.
pub struct AttestationService<E: EnclavePort> {
    enclave: E,
    config: AttestationConfig,
    vendor_root: Secp256k1PublicKey,
    identity: EnclaveIdentity,
}

impl<E: EnclavePort> AttestationService<E> {
    /// Derive the self identity from a verified self report.
    ///
    /// Fails when the local report does not chain to the pinned vendor root
    /// or is below the minimum security version.
    pub fn bootstrap(config: AttestationConfig, enclave: E) -> Result<Self, AttestationError> {
        let vendor_root = config.vendor_root()?;
        let bytes = enclave.generate_report([0u8; REPORT_DATA_LEN])?;
        let report = RemoteReport::from_bytes(&bytes)?;
        verify_signature_chain(&report, &vendor_root)?;
        check_security_version(&report.body, config.min_security_version)?;

        let identity = report.body.identity();
        info!(
            unique_id = %identity.unique_id_hex(),
            security_version = report.body.security_version,
            "[oc-02] Self identity established"
        );
        Ok(Self {
            enclave,
            config,
            vendor_root,
            identity,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AttestationConfig {
        &self.config
    }
}

impl<E: EnclavePort> AttestationApi for AttestationService<E> {
    fn verify(
        &self,
        report_bytes: &[u8],
        expected_binding: &[u8; 32],
        expected_identity: &EnclaveIdentity,
    ) -> Result<ReportBody, AttestationError> {
        let result = verify_report(
            report_bytes,
            expected_binding,
            expected_identity,
            self.config.min_security_version,
            &self.vendor_root,
        );
        match &result {
            Ok(_) => debug!("[oc-02] Peer report verified"),
            Err(e) => warn!(reason = e.reason(), "[oc-02] Peer report rejected: {}", e),
        }
        result
    }

    fn self_identity(&self) -> &EnclaveIdentity {
        &self.identity
    }

    fn attest_key(&self, pub_key: &[u8]) -> Result<Vec<u8>, AttestationError> {
        self.enclave
            .generate_report(report_data_for(&key_binding(pub_key)))
    }
}
