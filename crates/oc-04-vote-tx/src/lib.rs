//! # OC-04 Vote Transactions
//!
//! Turns oracle decisions into signed vote messages and broadcasts them as
//! transactions from the oracle's account.
//!
//! **Subsystem ID:** 4  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Vote Messages
//!
//! | Message | Cast by |
//! |---------|---------|
//! | `OracleRegistration` | RegisterOracle events |
//! | `OracleUpgrade` | UpgradeOracle events |
//! | `DataVerification` | DataVerification events |
//! | `DataDelivery` | DataDelivery events |
//!
//! A vote that the chain rejects is reported, never resubmitted.
//!
//! ## Module Structure
//!
//! ```text
//! oc-04-vote-tx/
//! ├── domain/          # Vote messages, Tx / SignDoc, errors
//! ├── ports/           # VoteTxApi (inbound), TxBroadcaster + AccountReader (outbound)
//! ├── adapters/        # TrustedAccountReader
//! ├── application/     # VoteTxBuilder
//! └── config.rs        # VoteTxConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::TrustedAccountReader;
pub use application::VoteTxBuilder;
pub use config::VoteTxConfig;
pub use domain::{
    BroadcastResult, DataDeliveryVote, DataVerificationVote, OracleVote, SignedVote, Tx,
    VoteMessage, VoteTxError,
};
pub use ports::{AccountReader, MockAccountReader, MockBroadcaster, TxBroadcaster, VoteTxApi};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
