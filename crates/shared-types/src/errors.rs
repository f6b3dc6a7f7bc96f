//! # Error Types
//!
//! Errors shared by subsystems that decode chain records.

use thiserror::Error;

/// Errors that occur while encoding or decoding chain records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordError {
    /// Record bytes could not be decoded.
    #[error("Record decode failed: {0}")]
    Decode(String),

    /// Record could not be encoded.
    #[error("Record encode failed: {0}")]
    Encode(String),

    /// A field held a value outside its domain.
    #[error("Invalid record field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}
