//! # Simulated Enclave
//!
//! Software enclave for development and tests. It plays both the vendor
//! (root key, intermediate certificate) and the platform (leaf key signing
//! reports) with configured measurements.

use crate::domain::{
    AttestationError, Certificate, RemoteReport, ReportBody, REPORT_DATA_LEN,
};
use crate::ports::EnclavePort;
use shared_crypto::{sha256, Secp256k1KeyPair, Secp256k1PublicKey};
use shared_types::EnclaveIdentity;
use tracing::debug;

/// Seed of the shared development vendor root.
const DEV_VENDOR_SEED: &[u8] = b"oc-simulated-vendor-root";

/// Software enclave producing signed reports.
pub struct SimulatedEnclave {
    vendor_root: Secp256k1PublicKey,
    cert_chain: Vec<Certificate>,
    leaf: Secp256k1KeyPair,
    identity: EnclaveIdentity,
    security_version: u16,
}

impl SimulatedEnclave {
    /// Create an enclave certified by `vendor_key`.
    pub fn new(
        vendor_key: Secp256k1KeyPair,
        identity: EnclaveIdentity,
        security_version: u16,
    ) -> Self {
        let intermediate = Secp256k1KeyPair::generate();
        let leaf = Secp256k1KeyPair::generate();
        let cert_chain = vec![
            Self::certify(&vendor_key, &intermediate.public_key()),
            Self::certify(&intermediate, &leaf.public_key()),
        ];
        Self {
            vendor_root: vendor_key.public_key(),
            cert_chain,
            leaf,
            identity,
            security_version,
        }
    }

    /// Vendor root shared by every simulated node of a development network.
    pub fn dev_vendor_key() -> Secp256k1KeyPair {
        // A hash output is a valid scalar with overwhelming probability.
        Secp256k1KeyPair::from_bytes(sha256(DEV_VENDOR_SEED))
            .unwrap_or_else(|_| Secp256k1KeyPair::generate())
    }

    fn certify(issuer: &Secp256k1KeyPair, subject: &Secp256k1PublicKey) -> Certificate {
        let pub_key = subject.as_bytes().to_vec();
        let signature = issuer.sign(&Certificate::signed_message(&pub_key));
        Certificate {
            pub_key,
            signature: signature.as_bytes().to_vec(),
        }
    }

    /// Public vendor root to pin in verifier configuration.
    pub fn vendor_root(&self) -> Secp256k1PublicKey {
        self.vendor_root
    }

    /// Identity this enclave reports.
    pub fn identity(&self) -> &EnclaveIdentity {
        &self.identity
    }
}

impl EnclavePort for SimulatedEnclave {
    fn generate_report(
        &self,
        report_data: [u8; REPORT_DATA_LEN],
    ) -> Result<Vec<u8>, AttestationError> {
        let body = ReportBody {
            security_version: self.security_version,
            product_id: self.identity.product_id.clone(),
            signer_id: self.identity.signer_id.clone(),
            unique_id: self.identity.unique_id.clone(),
            report_data,
        };
        let signature = self.leaf.sign(&body.signing_bytes()?);
        let report = RemoteReport {
            body,
            signature: signature.as_bytes().to_vec(),
            cert_chain: self.cert_chain.clone(),
        };
        debug!(
            unique_id = %self.identity.unique_id_hex(),
            "[oc-02] Generated simulated report"
        );
        report.to_bytes()
    }
}
