//! # Domain Errors

use thiserror::Error;

/// Vote transaction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VoteTxError {
    /// The chain answered with a non-zero result code.
    #[error("Transaction rejected with code {code}: {log}")]
    Rejected {
        /// Result code
        code: u32,
        /// Raw log
        log: String,
    },

    /// Broadcasting failed or timed out.
    #[error("Broadcast transport error: {0}")]
    Transport(String),

    /// The signer account could not be read.
    #[error("Account unavailable: {0}")]
    Account(String),

    /// A message or transaction could not be encoded.
    #[error("Encoding failed: {0}")]
    Encode(String),
}

impl VoteTxError {
    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            VoteTxError::Rejected { .. } => "rejected",
            VoteTxError::Transport(_) => "transport",
            VoteTxError::Account(_) => "account",
            VoteTxError::Encode(_) => "encode",
        }
    }
}
