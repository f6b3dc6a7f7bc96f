//! # OC-05 Vote Events
//!
//! The trust decision core. Subscribes to the four chain events that call
//! for a vote, verifies each one against proof-checked chain state, and
//! casts Yes or No.
//!
//! **Subsystem ID:** 5  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Events
//!
//! | Event | Checks | Yes vote carries |
//! |-------|--------|------------------|
//! | `register_oracle` | record, trusted block, peer attestation | oracle key sealed for the node |
//! | `upgrade_oracle` | as above, plus the pending upgrade version | oracle key sealed for the node |
//! | `data_verification` | sale, data hash, schema | - |
//! | `data_delivery` | sale status, data hash | content id of data sealed for the buyer |
//!
//! A verification failure is a No vote. A chain or store outage casts
//! nothing; the event is logged and dropped.
//!
//! ## Upgrade Gate
//!
//! Only nodes running the active enclave version vote. The gate is
//! re-read whenever `oracle_upgrade_vote_ended` fires.
//!
//! ## Module Structure
//!
//! ```text
//! oc-05-vote-events/
//! ├── domain/          # Event kinds, parsed events, decisions, errors
//! ├── algorithms/      # Schema validation, submission re-encryption
//! ├── ports/           # OracleCapabilities, ContentStore, ReactorMetrics
//! ├── adapters/        # OracleContext
//! ├── application/     # decide(), UpgradeGate, EventReactor
//! └── config.rs        # ReactorConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::OracleContext;
pub use algorithms::{delivery_nonce, open_submission, seal_for_buyer, validate_against_schema};
pub use application::{EventReactor, ReactorHandle, UpgradeGate};
pub use config::ReactorConfig;
pub use domain::{
    ContentStoreError, Decision, ReactorError, Rejection, SchemaViolation, VoteEvent,
    VoteEventKind, UPGRADE_VOTE_ENDED,
};
pub use ports::{
    ContentStore, MockContentStore, NoopMetrics, OracleCapabilities, OracleKeyring,
    ReactorMetrics, RecordingMetrics,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
