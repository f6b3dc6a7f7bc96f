//! # Domain Errors
//!
//! Error types for the sealed key store. `Corrupted` and `Unseal` are kept
//! apart so an operator can tell a damaged file from a blob sealed on other
//! hardware or by another enclave build.

use super::entities::KeySlot;
use thiserror::Error;

/// Sealing error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SealError {
    /// Encryption under the sealing key failed.
    #[error("Seal failed: {0}")]
    Seal(String),

    /// Authentication failed: wrong hardware, wrong measurement or a
    /// tampered body.
    #[error("Unseal failed: {0}")]
    Unseal(String),

    /// Blob is structurally invalid (magic, version, policy, length).
    #[error("Sealed blob corrupted: {0}")]
    Corrupted(String),

    /// A key is already stored in this slot.
    #[error("Key already exists in slot {slot}")]
    AlreadyExists {
        /// Slot that is occupied
        slot: KeySlot,
    },

    /// No sealed blob in this slot.
    #[error("Sealed key not found in slot {slot}")]
    NotFound {
        /// Slot that is empty
        slot: KeySlot,
    },

    /// Oracle key hand-off could not be completed.
    #[error("Key hand-off failed: {0}")]
    Handoff(String),

    /// Filesystem error.
    #[error("I/O error on {path}: {message}")]
    Io {
        /// Path involved
        path: String,
        /// Underlying error
        message: String,
    },
}

impl SealError {
    /// Build an `Io` error from a path and an `std::io::Error`.
    pub fn io(path: &std::path::Path, err: std::io::Error) -> Self {
        SealError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}
