//! # Decisions
//!
//! A decision always carries a complete vote message. A No vote also
//! records the stage that refused, for logs and metrics.

use oc_04_vote_tx::VoteMessage;
use shared_types::VoteOption;
use std::fmt;

/// Why a vote is No.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// Stage label (`record`, `trusted_block`, `attestation`, ...).
    pub stage: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl Rejection {
    /// Rejection at `stage`.
    pub fn new(stage: &'static str, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.reason)
    }
}

/// Outcome of deciding one event.
#[derive(Debug, Clone)]
pub struct Decision {
    /// Vote to sign and broadcast.
    pub vote: VoteMessage,
    /// Set when the vote is No.
    pub rejection: Option<Rejection>,
}

impl Decision {
    /// Yes vote.
    pub fn approve(vote: VoteMessage) -> Self {
        Self {
            vote,
            rejection: None,
        }
    }

    /// No vote refused at `rejection.stage`.
    pub fn reject(vote: VoteMessage, rejection: Rejection) -> Self {
        Self {
            vote,
            rejection: Some(rejection),
        }
    }

    /// Vote option carried by the message.
    pub fn option(&self) -> VoteOption {
        self.vote.vote_option()
    }
}
