//! # Report Verification
//!
//! Stages run in a fixed order and the first failure is returned:
//!
//! 1. signature chain to the vendor root (`InvalidReport`)
//! 2. security version floor (`StaleVersion`)
//! 3. `product_id`, `signer_id`, `unique_id` (`IdentityMismatch`)
//! 4. report data binding (`DataMismatch`)

use crate::domain::{AttestationError, Certificate, RemoteReport, ReportBody, MAX_CHAIN_LEN};
use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature};
use shared_types::EnclaveIdentity;

/// Verify the certificate chain and the report signature. Returns the leaf
/// key that signed the body.
pub fn verify_signature_chain(
    report: &RemoteReport,
    vendor_root: &Secp256k1PublicKey,
) -> Result<Secp256k1PublicKey, AttestationError> {
    if report.cert_chain.is_empty() {
        return Err(AttestationError::InvalidReport("empty certificate chain".into()));
    }
    if report.cert_chain.len() > MAX_CHAIN_LEN {
        return Err(AttestationError::InvalidReport(format!(
            "certificate chain too long: {}",
            report.cert_chain.len()
        )));
    }

    let mut issuer = *vendor_root;
    for (depth, cert) in report.cert_chain.iter().enumerate() {
        issuer = verify_certificate(&issuer, cert).map_err(|reason| {
            AttestationError::InvalidReport(format!("certificate {depth}: {reason}"))
        })?;
    }

    let signature = Secp256k1Signature::from_slice(&report.signature)
        .map_err(|_| AttestationError::InvalidReport("malformed report signature".into()))?;
    issuer
        .verify(&report.body.signing_bytes()?, &signature)
        .map_err(|_| AttestationError::InvalidReport("report signature invalid".into()))?;

    Ok(issuer)
}

fn verify_certificate(
    issuer: &Secp256k1PublicKey,
    cert: &Certificate,
) -> Result<Secp256k1PublicKey, &'static str> {
    let subject = Secp256k1PublicKey::from_slice(&cert.pub_key).map_err(|_| "bad subject key")?;
    let signature =
        Secp256k1Signature::from_slice(&cert.signature).map_err(|_| "malformed signature")?;
    issuer
        .verify(&Certificate::signed_message(&cert.pub_key), &signature)
        .map_err(|_| "signature invalid")?;
    Ok(subject)
}

/// Check the security version floor.
pub fn check_security_version(body: &ReportBody, minimum: u16) -> Result<(), AttestationError> {
    if body.security_version < minimum {
        return Err(AttestationError::StaleVersion {
            reported: body.security_version,
            minimum,
        });
    }
    Ok(())
}

/// Compare each measured identity field with the expected identity.
pub fn check_identity(body: &ReportBody, expected: &EnclaveIdentity) -> Result<(), AttestationError> {
    if body.product_id != expected.product_id {
        return Err(AttestationError::IdentityMismatch { field: "product_id" });
    }
    if body.signer_id != expected.signer_id {
        return Err(AttestationError::IdentityMismatch { field: "signer_id" });
    }
    if body.unique_id != expected.unique_id {
        return Err(AttestationError::IdentityMismatch { field: "unique_id" });
    }
    Ok(())
}

/// Check the binding prefix of the report data.
pub fn check_binding(body: &ReportBody, expected: &[u8; 32]) -> Result<(), AttestationError> {
    if body.binding() != expected {
        return Err(AttestationError::DataMismatch);
    }
    Ok(())
}

/// Run all four stages on encoded report bytes.
pub fn verify_report(
    report_bytes: &[u8],
    expected_binding: &[u8; 32],
    expected_identity: &EnclaveIdentity,
    minimum_version: u16,
    vendor_root: &Secp256k1PublicKey,
) -> Result<ReportBody, AttestationError> {
    let report = RemoteReport::from_bytes(report_bytes)?;
    verify_signature_chain(&report, vendor_root)?;
    check_security_version(&report.body, minimum_version)?;
    check_identity(&report.body, expected_identity)?;
    check_binding(&report.body, expected_binding)?;
    Ok(report.body)
}
