//! # Light Blocks
//!
//! Headers, validator sets and commits as the light client sees them.
//! Every hash is SHA-256 over the bincode encoding.

use super::errors::TrustedQueryError;
use serde::{Deserialize, Serialize};
use shared_crypto::{address_from_pub_key, sha256};
use shared_types::{Address, Hash, TrustedBlockInfo};

/// Block header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Chain identifier.
    pub chain_id: String,
    /// Block height.
    pub height: i64,
    /// Block time, unix seconds.
    pub time: u64,
    /// Hash of the previous header.
    pub last_block_hash: Hash,
    /// Hash of the validator set signing this block.
    pub validators_hash: Hash,
    /// Hash of the validator set signing the next block.
    pub next_validators_hash: Hash,
    /// Multi-store root after executing the previous block.
    pub app_hash: Hash,
}

impl Header {
    /// Header hash.
    pub fn hash(&self) -> Hash {
        sha256(&encode(self))
    }
}

/// A validator with its voting power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Compressed secp256k1 public key.
    pub pub_key: Vec<u8>,
    /// Voting power.
    pub power: u64,
}

impl Validator {
    /// Validator address.
    pub fn address(&self) -> Address {
        address_from_pub_key(&self.pub_key)
    }
}

/// Ordered validator set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ValidatorSet {
    /// Validators.
    pub validators: Vec<Validator>,
}

impl ValidatorSet {
    /// Create a set.
    pub fn new(validators: Vec<Validator>) -> Self {
        Self { validators }
    }

    /// Merkle root over the validator hashes.
    pub fn hash(&self) -> Hash {
        let leaves: Vec<Hash> = self.validators.iter().map(|v| sha256(&encode(v))).collect();
        simple_merkle_root(&leaves)
    }

    /// Sum of all voting power, saturating at `u64::MAX`.
    pub fn total_power(&self) -> u64 {
        self.validators
            .iter()
            .fold(0u64, |acc, v| acc.saturating_add(v.power))
    }

    /// Find a validator by address.
    pub fn get(&self, address: &Address) -> Option<&Validator> {
        self.validators.iter().find(|v| &v.address() == address)
    }
}

fn simple_merkle_root(leaves: &[Hash]) -> Hash {
    match leaves.len() {
        0 => sha256(&[]),
        1 => leaves[0],
        n => {
            let split = n.next_power_of_two() / 2;
            let left = simple_merkle_root(&leaves[..split]);
            let right = simple_merkle_root(&leaves[split..]);
            let mut buf = Vec::with_capacity(65);
            buf.push(0x01);
            buf.extend_from_slice(&left);
            buf.extend_from_slice(&right);
            sha256(&buf)
        }
    }
}

/// A validator's signature in a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSig {
    /// Signer address.
    pub validator_address: Address,
    /// 64-byte compact ECDSA signature over the canonical vote.
    pub signature: Vec<u8>,
}

/// Signatures committing a block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Committed height.
    pub height: i64,
    /// Committed header hash.
    pub block_hash: Hash,
    /// Signatures.
    pub signatures: Vec<CommitSig>,
}

/// Message each validator signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalVote {
    /// Chain identifier.
    pub chain_id: String,
    /// Height.
    pub height: i64,
    /// Header hash.
    pub block_hash: Hash,
}

impl CanonicalVote {
    /// Sign bytes.
    pub fn sign_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

/// Header plus its commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedHeader {
    /// Header.
    pub header: Header,
    /// Commit.
    pub commit: Commit,
}

/// Everything needed to verify one height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightBlock {
    /// Signed header.
    pub signed_header: SignedHeader,
    /// Validators of this height.
    pub validators: ValidatorSet,
    /// Validators of the next height.
    pub next_validators: ValidatorSet,
}

impl LightBlock {
    /// Height.
    pub fn height(&self) -> i64 {
        self.signed_header.header.height
    }

    /// Header.
    pub fn header(&self) -> &Header {
        &self.signed_header.header
    }

    /// Header hash.
    pub fn hash(&self) -> Hash {
        self.signed_header.header.hash()
    }

    /// As a trusted block anchor.
    pub fn trusted_block(&self) -> TrustedBlockInfo {
        TrustedBlockInfo::new(self.height(), self.hash())
    }

    /// Decode wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrustedQueryError> {
        bincode::deserialize(bytes).map_err(|e| TrustedQueryError::Decode(e.to_string()))
    }

    /// Encode for the wire.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(self)
    }
}

fn encode<T: Serialize>(value: &T) -> Vec<u8> {
    // Plain structs of integers, strings and byte vectors always encode.
    bincode::serialize(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            chain_id: "oc-test".into(),
            height: 5,
            time: 1_700_000_000,
            last_block_hash: [1; 32],
            validators_hash: [2; 32],
            next_validators_hash: [2; 32],
            app_hash: [3; 32],
        }
    }

    #[test]
    fn test_header_hash_covers_app_hash() {
        let a = header();
        let mut b = header();
        b.app_hash[0] ^= 1;
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validator_set_hash_order_sensitive() {
        let v1 = Validator { pub_key: vec![2; 33], power: 10 };
        let v2 = Validator { pub_key: vec![3; 33], power: 20 };
        let a = ValidatorSet::new(vec![v1.clone(), v2.clone()]);
        let b = ValidatorSet::new(vec![v2, v1]);
        assert_ne!(a.hash(), b.hash());
        assert_eq!(a.total_power(), 30);
    }

    #[test]
    fn test_total_power_saturates() {
        let set = ValidatorSet::new(vec![
            Validator { pub_key: vec![2; 33], power: u64::MAX },
            Validator { pub_key: vec![3; 33], power: u64::MAX - 1 },
        ]);
        assert_eq!(set.total_power(), u64::MAX);

        let set = ValidatorSet::new(vec![
            Validator { pub_key: vec![2; 33], power: 10 },
            Validator { pub_key: vec![3; 33], power: 20 },
        ]);
        assert_eq!(set.total_power(), 30);
    }

    #[test]
    fn test_validator_lookup() {
        let v = Validator { pub_key: vec![2; 33], power: 10 };
        let set = ValidatorSet::new(vec![v.clone()]);
        assert_eq!(set.get(&v.address()), Some(&v));
        assert_eq!(set.get(&[0; 20]), None);
    }
}
