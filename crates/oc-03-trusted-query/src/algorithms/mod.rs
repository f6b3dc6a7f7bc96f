//! # Algorithms
//!
//! Header verification, sorted Merkle trees and proof operations.

pub mod header_verify;
pub mod merkle;
pub mod proof_ops;

pub use header_verify::{tally_voting_power, validate_light_block, verify_block, VerifyOptions};
pub use merkle::{
    existence_root, inner_hash, leaf_hash, verify_existence, verify_non_existence, MerkleTree,
    EMPTY_ROOT,
};
pub use proof_ops::{verify_query, MultiStore};
