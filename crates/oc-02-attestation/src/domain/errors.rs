//! # Domain Errors
//!
//! One variant per verification stage, in the order the stages run.

use thiserror::Error;

/// Attestation verification errors.
///
/// Every variant is terminal for the verification call. Callers voting on
/// a peer map all of them to a No vote.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestationError {
    /// Signature chain does not lead back to the vendor root.
    #[error("Invalid report: {0}")]
    InvalidReport(String),

    /// Security version below the configured minimum.
    #[error("Stale security version: {reported} < {minimum}")]
    StaleVersion {
        /// Version in the report
        reported: u16,
        /// Configured minimum
        minimum: u16,
    },

    /// A measured identity field differs from the expected identity.
    #[error("Enclave identity mismatch on {field}")]
    IdentityMismatch {
        /// `product_id`, `signer_id` or `unique_id`
        field: &'static str,
    },

    /// Report data does not carry the expected binding hash.
    #[error("Report data does not match expected binding")]
    DataMismatch,

    /// Report bytes could not be decoded.
    #[error("Malformed report: {0}")]
    Malformed(String),
}

impl AttestationError {
    /// Metric label for the failure reason.
    pub fn reason(&self) -> &'static str {
        match self {
            AttestationError::InvalidReport(_) => "invalid_report",
            AttestationError::StaleVersion { .. } => "stale_version",
            AttestationError::IdentityMismatch { .. } => "identity_mismatch",
            AttestationError::DataMismatch => "data_mismatch",
            AttestationError::Malformed(_) => "malformed",
        }
    }
}
