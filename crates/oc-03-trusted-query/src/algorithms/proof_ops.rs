//! # Proof Operations
//!
//! Verifies a query response against a trusted app hash and builds
//! responses from committed multi-store state.

use super::merkle::{existence_root, verify_non_existence, MerkleTree};
use crate::domain::{CommitmentProof, ExistenceProof, ProofOps, QueryResponse, TrustedQueryError};
use shared_types::Hash;
use std::collections::BTreeMap;

fn proof_err(reason: impl Into<String>) -> TrustedQueryError {
    TrustedQueryError::Proof(reason.into())
}

/// Verify `response` for `(store_key, key)` at `height` against `app_hash`.
///
/// Returns `Some(value)` for a proven value, `None` for a proven absence.
/// Every other outcome is a proof error.
pub fn verify_query(
    response: &QueryResponse,
    store_key: &str,
    key: &[u8],
    height: i64,
    app_hash: &Hash,
) -> Result<Option<Vec<u8>>, TrustedQueryError> {
    if response.height != height {
        return Err(proof_err(format!(
            "response height {} != requested {}",
            response.height, height
        )));
    }
    if response.key != key {
        return Err(proof_err("response is for a different key"));
    }

    let module_root = verify_store_op(&response.proof_ops.store, store_key, app_hash)?;

    match (&response.value, &response.proof_ops.module) {
        (Some(value), CommitmentProof::Exist(proof)) => {
            if proof.key != key || &proof.value != value {
                return Err(proof_err("inclusion proof does not cover the returned value"));
            }
            if existence_root(proof) != module_root {
                return Err(proof_err("inclusion proof does not match module root"));
            }
            Ok(Some(value.clone()))
        }
        (None, CommitmentProof::NonExist(proof)) => {
            if proof.key != key {
                return Err(proof_err("exclusion proof is for a different key"));
            }
            verify_non_existence(proof, &module_root).map_err(proof_err)?;
            Ok(None)
        }
        (Some(_), CommitmentProof::NonExist(_)) => {
            Err(proof_err("value returned with an exclusion proof"))
        }
        (None, CommitmentProof::Exist(_)) => {
            Err(proof_err("no value returned with an inclusion proof"))
        }
    }
}

fn verify_store_op(
    op: &ExistenceProof,
    store_key: &str,
    app_hash: &Hash,
) -> Result<Hash, TrustedQueryError> {
    if op.key != store_key.as_bytes() {
        return Err(proof_err(format!(
            "store proof is for {}",
            String::from_utf8_lossy(&op.key)
        )));
    }
    if existence_root(op) != *app_hash {
        return Err(proof_err("store proof does not match app hash"));
    }
    op.value
        .as_slice()
        .try_into()
        .map_err(|_| proof_err("module root is not 32 bytes"))
}

/// Committed state of all module stores at one height.
#[derive(Debug, Clone, Default)]
pub struct MultiStore {
    stores: BTreeMap<String, MerkleTree>,
    root_tree: MerkleTree,
}

impl MultiStore {
    /// Commit `stores`.
    pub fn commit(stores: &BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>) -> Self {
        let stores: BTreeMap<String, MerkleTree> = stores
            .iter()
            .map(|(name, entries)| (name.clone(), MerkleTree::new(entries)))
            .collect();
        let roots: BTreeMap<Vec<u8>, Vec<u8>> = stores
            .iter()
            .map(|(name, tree)| (name.as_bytes().to_vec(), tree.root().to_vec()))
            .collect();
        Self {
            root_tree: MerkleTree::new(&roots),
            stores,
        }
    }

    /// App hash committing every store.
    pub fn app_hash(&self) -> Hash {
        self.root_tree.root()
    }

    /// Proof-carrying answer for `(store_key, key)`; `None` for an unknown
    /// store.
    pub fn query(&self, store_key: &str, key: &[u8], height: i64) -> Option<QueryResponse> {
        let tree = self.stores.get(store_key)?;
        let store = match self.root_tree.prove(store_key.as_bytes()) {
            CommitmentProof::Exist(proof) => proof,
            CommitmentProof::NonExist(_) => return None,
        };
        Some(QueryResponse {
            height,
            key: key.to_vec(),
            value: tree.get(key).map(<[u8]>::to_vec),
            proof_ops: ProofOps {
                module: tree.prove(key),
                store,
            },
        })
    }
}
