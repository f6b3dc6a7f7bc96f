//! # State Proofs
//!
//! A query response carries two proof operations:
//!
//! ```text
//! module op:  key ∈ module tree            -> module root
//! store op:   (store_key, module root) ∈ multi-store -> app hash
//! ```
//!
//! The app hash of header H+1 commits the state at height H.

use serde::{Deserialize, Serialize};
use shared_types::Hash;

/// Side of a sibling hash relative to the running hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Sibling is on the left.
    Left,
    /// Sibling is on the right.
    Right,
}

/// One step of a Merkle path, leaf to root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofNode {
    /// Sibling hash.
    pub hash: Hash,
    /// Sibling side.
    pub position: Position,
}

/// Proof that `(key, value)` is a leaf of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistenceProof {
    /// Leaf key.
    pub key: Vec<u8>,
    /// Leaf value.
    pub value: Vec<u8>,
    /// Path from the leaf to the root. Promoted levels have no node.
    pub path: Vec<ProofNode>,
}

/// Proof that `key` is not a leaf: its sorted neighbours are adjacent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonExistenceProof {
    /// Missing key.
    pub key: Vec<u8>,
    /// Greatest leaf below `key`.
    pub left: Option<ExistenceProof>,
    /// Smallest leaf above `key`.
    pub right: Option<ExistenceProof>,
}

/// Inclusion or exclusion proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitmentProof {
    /// Key present.
    Exist(ExistenceProof),
    /// Key absent.
    NonExist(NonExistenceProof),
}

/// Module op followed by store op.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofOps {
    /// Proof of the key in the module store.
    pub module: CommitmentProof,
    /// Proof of the module root in the multi-store.
    pub store: ExistenceProof,
}

/// Proof-carrying answer to a state read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// State height the answer is for.
    pub height: i64,
    /// Queried key.
    pub key: Vec<u8>,
    /// Value, if the store claims one.
    pub value: Option<Vec<u8>>,
    /// Proof operations.
    pub proof_ops: ProofOps,
}
