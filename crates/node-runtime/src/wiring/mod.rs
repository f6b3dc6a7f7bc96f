//! # Node Wiring
//!
//! Startup order of the oracle node:
//!
//! ```text
//! config ─→ enclave identity ─→ sealed key store ─→ account / node keys
//!                                                        │
//!        trusted query (root of trust) ←─────────────────┘
//!                │
//!                ├─→ oracle key (unseal, hand-off or init)
//!                ├─→ vote builder (trusted account reads)
//!                └─→ oracle context ─→ event reactor ←─ event bridge ←─ chain
//! ```

pub mod keys;
pub mod node;

pub use keys::{ensure_key, obtain_oracle_key, registration_request};
pub use node::OracleNode;

use crate::adapters::RpcError;
use crate::container::ConfigError;
use oc_01_sealed_keys::SealError;
use oc_02_attestation::AttestationError;
use oc_03_trusted_query::TrustedQueryError;
use oc_05_vote_events::{ContentStoreError, ReactorError};
use thiserror::Error;

/// Reasons the node refuses to start.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration is unusable.
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    /// Sealed keys could not be created or opened.
    #[error("sealed keys: {0}")]
    Keys(#[from] SealError),

    /// This enclave failed its own attestation.
    #[error("attestation: {0}")]
    Attestation(#[from] AttestationError),

    /// No root of trust could be established.
    #[error("trusted query: {0}")]
    Trust(#[from] TrustedQueryError),

    /// The chain endpoint is unusable.
    #[error("chain rpc: {0}")]
    Rpc(#[from] RpcError),

    /// The content store endpoint is unusable.
    #[error("content store: {0}")]
    Content(#[from] ContentStoreError),

    /// The event reactor rejected its configuration.
    #[error("event reactor: {0}")]
    Reactor(#[from] ReactorError),

    /// No oracle key is sealed and no approved request carries one.
    #[error("node {address} is not registered yet")]
    NotRegistered {
        /// Node address (hex)
        address: String,
    },

    /// The sealed oracle key is not the one the chain publishes.
    #[error("sealed oracle key does not match the on-chain oracle public key")]
    OracleKeyMismatch,

    /// Oracle params are missing or malformed.
    #[error("oracle params: {0}")]
    Params(String),
}
