//! # OC-03 Trusted Query
//!
//! Reads chain state without trusting the RPC endpoint. Headers are
//! verified light-client style from an operator-supplied root of trust, and
//! every value is checked against the verified app hash with Merkle proofs.
//!
//! **Subsystem ID:** 3  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Trust Rules
//!
//! | Rule | Enforcement |
//! |------|-------------|
//! | forward only | targets below the lowest trusted height are refused |
//! | quorum | > 2/3 of the new set signed every accepted header |
//! | skipping | ≥ trust level of the trusted set signed, else bisect |
//! | fail closed | a failed proof is `Proof`, never "absent" |
//!
//! ## Module Structure
//!
//! ```text
//! oc-03-trusted-query/
//! ├── domain/          # LightBlock, LightStore, proofs, TrustThreshold, errors
//! ├── algorithms/      # Header verification, Merkle trees, proof ops
//! ├── ports/           # TrustedQueryApi (inbound), ChainTransport + persistence (outbound)
//! ├── adapters/        # SealedTrustedBlockStore
//! ├── application/     # TrustedQueryClient
//! └── config.rs        # LightClientConfig
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
pub use adapters::SealedTrustedBlockStore;
pub use algorithms::{verify_block, verify_query, MerkleTree, MultiStore, VerifyOptions};
pub use application::TrustedQueryClient;
pub use config::LightClientConfig;
pub use domain::{
    CommitmentProof, LightBlock, ProofOps, QueryResponse, TrustThreshold, TrustedQueryError,
    Verdict,
};
pub use ports::{
    ChainTransport, InMemoryTrustedBlockStore, MockChain, TrustedBlockPersistence, TrustedQueryApi,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
