//! # Sorted Merkle Tree
//!
//! ```text
//! leaf  = SHA256(0x00 || u32_be(len(key)) || key || SHA256(value))
//! inner = SHA256(0x01 || left || right)
//! ```
//!
//! Leaves are sorted by key. A node without a sibling is promoted to the
//! next level unchanged, so the rightmost path may be shorter.
//!
//! Exclusion proofs rely on path shape alone: a leftmost leaf only has
//! right siblings, a rightmost leaf only left siblings, and two leaves are
//! neighbours when their paths agree above the split and are extreme below.

use crate::domain::{CommitmentProof, ExistenceProof, NonExistenceProof, Position, ProofNode};
use sha2::{Digest, Sha256};
use shared_types::Hash;
use std::collections::BTreeMap;

/// Root of a tree without leaves.
pub const EMPTY_ROOT: Hash = [0u8; 32];

/// Hash of a leaf.
pub fn leaf_hash(key: &[u8], value: &[u8]) -> Hash {
    let value_hash = Sha256::digest(value);
    let mut hasher = Sha256::new();
    hasher.update([0x00]);
    hasher.update((key.len() as u32).to_be_bytes());
    hasher.update(key);
    hasher.update(value_hash);
    hasher.finalize().into()
}

/// Hash of an inner node.
pub fn inner_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([0x01]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Root implied by an existence proof.
///
/// # Time Complexity: O(log n)
pub fn existence_root(proof: &ExistenceProof) -> Hash {
    proof
        .path
        .iter()
        .fold(leaf_hash(&proof.key, &proof.value), |current, node| {
            match node.position {
                Position::Left => inner_hash(&node.hash, &current),
                Position::Right => inner_hash(&current, &node.hash),
            }
        })
}

/// Verify an existence proof against `root`.
pub fn verify_existence(proof: &ExistenceProof, root: &Hash) -> bool {
    existence_root(proof) == *root
}

fn is_leftmost(path: &[ProofNode]) -> bool {
    path.iter().all(|n| n.position == Position::Right)
}

fn is_rightmost(path: &[ProofNode]) -> bool {
    path.iter().all(|n| n.position == Position::Left)
}

fn are_neighbours(left: &[ProofNode], right: &[ProofNode]) -> bool {
    let (mut l, mut r) = (left.len(), right.len());
    while l > 0 && r > 0 && left[l - 1] == right[r - 1] {
        l -= 1;
        r -= 1;
    }
    if l == 0 || r == 0 {
        return false;
    }
    left[l - 1].position == Position::Right
        && right[r - 1].position == Position::Left
        && is_rightmost(&left[..l - 1])
        && is_leftmost(&right[..r - 1])
}

/// Verify an exclusion proof against `root`.
pub fn verify_non_existence(proof: &NonExistenceProof, root: &Hash) -> Result<(), String> {
    if let Some(left) = &proof.left {
        if !verify_existence(left, root) {
            return Err("left neighbour does not verify".into());
        }
        if left.key >= proof.key {
            return Err("left neighbour not below key".into());
        }
    }
    if let Some(right) = &proof.right {
        if !verify_existence(right, root) {
            return Err("right neighbour does not verify".into());
        }
        if right.key <= proof.key {
            return Err("right neighbour not above key".into());
        }
    }

    match (&proof.left, &proof.right) {
        (None, None) if *root == EMPTY_ROOT => Ok(()),
        (None, None) => Err("no neighbours in a non-empty tree".into()),
        (Some(left), None) if is_rightmost(&left.path) => Ok(()),
        (None, Some(right)) if is_leftmost(&right.path) => Ok(()),
        (Some(left), Some(right)) if are_neighbours(&left.path, &right.path) => Ok(()),
        _ => Err("neighbours are not adjacent".into()),
    }
}

/// Sorted key/value tree with proof generation.
#[derive(Debug, Clone, Default)]
pub struct MerkleTree {
    entries: Vec<(Vec<u8>, Vec<u8>)>,
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Build a tree over sorted entries.
    pub fn new(entries: &BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        let entries: Vec<(Vec<u8>, Vec<u8>)> =
            entries.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let mut levels = Vec::new();
        let mut level: Vec<Hash> = entries.iter().map(|(k, v)| leaf_hash(k, v)).collect();
        while level.len() > 1 {
            let next = level
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => inner_hash(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            levels.push(std::mem::replace(&mut level, next));
        }
        levels.push(level);
        Self { entries, levels }
    }

    /// Tree root.
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or(EMPTY_ROOT)
    }

    fn path(&self, mut index: usize) -> Vec<ProofNode> {
        let mut path = Vec::new();
        for level in &self.levels[..self.levels.len().saturating_sub(1)] {
            if index % 2 == 1 {
                path.push(ProofNode {
                    hash: level[index - 1],
                    position: Position::Left,
                });
            } else if index + 1 < level.len() {
                path.push(ProofNode {
                    hash: level[index + 1],
                    position: Position::Right,
                });
            }
            index /= 2;
        }
        path
    }

    fn existence_at(&self, index: usize) -> ExistenceProof {
        let (key, value) = &self.entries[index];
        ExistenceProof {
            key: key.clone(),
            value: value.clone(),
            path: self.path(index),
        }
    }

    /// Proof for `key`: inclusion when present, exclusion otherwise.
    pub fn prove(&self, key: &[u8]) -> CommitmentProof {
        match self.entries.binary_search_by(|(k, _)| k.as_slice().cmp(key)) {
            Ok(index) => CommitmentProof::Exist(self.existence_at(index)),
            Err(insert_at) => CommitmentProof::NonExist(NonExistenceProof {
                key: key.to_vec(),
                left: insert_at.checked_sub(1).map(|i| self.existence_at(i)),
                right: (insert_at < self.entries.len()).then(|| self.existence_at(insert_at)),
            }),
        }
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries
            .binary_search_by(|(k, _)| k.as_slice().cmp(key))
            .ok()
            .map(|i| self.entries[i].1.as_slice())
    }
}
