//! # Domain Errors
//!
//! Trust-path failures are fatal to the one query that hit them and are
//! never downgraded to "absent" or "trusted anyway".

use thiserror::Error;

/// Trusted query errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrustedQueryError {
    /// A state proof did not verify against the trusted app hash.
    #[error("Proof verification failed: {0}")]
    Proof(String),

    /// Header verification failed.
    #[error("Header verification failed at height {height}: {reason}")]
    Header {
        /// Height being verified
        height: i64,
        /// What failed
        reason: String,
    },

    /// The key is proven absent.
    #[error("Key {key} not found in store {store}")]
    NotFound {
        /// Module store
        store: String,
        /// Key (lossy UTF-8)
        key: String,
    },

    /// The RPC transport failed.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Waiting for a height ran out of time.
    #[error("Timed out waiting for height {height}")]
    Timeout {
        /// Awaited height
        height: i64,
    },

    /// Bytes from the transport or store could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl TrustedQueryError {
    /// Header failure at `height`.
    pub fn header(height: i64, reason: impl Into<String>) -> Self {
        TrustedQueryError::Header {
            height,
            reason: reason.into(),
        }
    }

    /// Metric label for the verification stage.
    pub fn stage(&self) -> &'static str {
        match self {
            TrustedQueryError::Proof(_) => "proof",
            TrustedQueryError::Header { .. } => "header",
            TrustedQueryError::NotFound { .. } => "not_found",
            TrustedQueryError::Transport(_) => "transport",
            TrustedQueryError::Timeout { .. } => "timeout",
            TrustedQueryError::Decode(_) => "decode",
        }
    }

    /// Whether this is a proven absence rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrustedQueryError::NotFound { .. })
    }
}
