//! # Domain Errors
//!
//! Verification failures do not appear here: they become No votes. A
//! `ReactorError` means no vote was cast for the event.

use crate::domain::VoteEventKind;
use oc_03_trusted_query::TrustedQueryError;
use oc_04_vote_tx::VoteTxError;
use shared_types::FieldKind;
use thiserror::Error;

/// Plaintext does not satisfy a deal's data schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    /// Not valid JSON.
    #[error("Plaintext is not JSON: {0}")]
    NotJson(String),

    /// Valid JSON but not an object.
    #[error("Plaintext is not a JSON object")]
    NotObject,

    /// A required field is absent.
    #[error("Missing field {0}")]
    MissingField(String),

    /// A field has another JSON type.
    #[error("Field {field} is not of type {expected:?}")]
    WrongType {
        /// Field name
        field: String,
        /// Declared type
        expected: FieldKind,
    },
}

/// Content store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContentStoreError {
    /// No content under this id.
    #[error("Content {0} not found")]
    NotFound(String),

    /// The store could not be reached.
    #[error("Content store unavailable: {0}")]
    Unavailable(String),
}

/// Reactor errors.
#[derive(Debug, Error)]
pub enum ReactorError {
    /// The event lacks an attribute or carries an unparsable one.
    #[error("Malformed {event_type} event: {reason}")]
    MalformedEvent {
        /// Event type
        event_type: String,
        /// What is wrong
        reason: String,
    },

    /// The chain could not be read, so nothing was decided.
    #[error("Chain query failed: {0}")]
    Query(#[from] TrustedQueryError),

    /// The content store could not be read, so nothing was decided.
    #[error("Content store failed: {0}")]
    Content(#[from] ContentStoreError),

    /// Deciding took longer than the handler timeout.
    #[error("{event} handler timed out after {after_ms} ms")]
    Timeout {
        /// Event kind
        event: VoteEventKind,
        /// Configured timeout
        after_ms: u64,
    },

    /// The kind was disabled while its event was being decided.
    #[error("{event} votes were disabled during the decision")]
    Disabled {
        /// Event kind
        event: VoteEventKind,
    },

    /// The vote was decided but not accepted by the chain.
    #[error("Vote broadcast failed: {0}")]
    Broadcast(#[from] VoteTxError),

    /// Unusable reactor configuration.
    #[error("Invalid reactor configuration: {0}")]
    Config(String),
}

impl ReactorError {
    /// Malformed event of `event_type`.
    pub fn malformed(event_type: &str, reason: impl Into<String>) -> Self {
        ReactorError::MalformedEvent {
            event_type: event_type.to_string(),
            reason: reason.into(),
        }
    }

    /// Metric label.
    pub fn reason(&self) -> &'static str {
        match self {
            ReactorError::MalformedEvent { .. } => "malformed_event",
            ReactorError::Query(e) => e.stage(),
            ReactorError::Content(_) => "content_store",
            ReactorError::Timeout { .. } => "timeout",
            ReactorError::Disabled { .. } => "disabled",
            ReactorError::Broadcast(e) => e.reason(),
            ReactorError::Config(_) => "config",
        }
    }
}
