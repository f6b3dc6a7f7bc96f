//! # Core Domain Entities
//!
//! ## Clusters
//!
//! - **Trust**: `TrustedBlockInfo`, `EnclaveIdentity`
//! - **Oracle records**: `OracleRecord` (registration / upgrade), `OracleParams`
//! - **Data deals**: `Deal`, `Sale`, `SchemaField`
//! - **Accounts**: `Account`
//! - **Votes**: `VoteOption`

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::RecordError;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// A 20-byte account address.
pub type Address = [u8; 20];

/// A 12-byte AEAD nonce supplied by the chain protocol.
pub type ProtocolNonce = [u8; 12];

// =============================================================================
// CLUSTER A: TRUST
// =============================================================================

/// Root of trust for the light client: a block height and its header hash.
///
/// The height only moves forward once adopted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrustedBlockInfo {
    /// Block height.
    pub height: i64,
    /// Header hash at `height`.
    pub hash: Hash,
}

impl TrustedBlockInfo {
    /// Create a new trusted block.
    pub fn new(height: i64, hash: Hash) -> Self {
        Self { height, hash }
    }

    /// Parse an operator-supplied seed (`height` + hex hash).
    pub fn from_hex(height: i64, hash_hex: &str) -> Result<Self, RecordError> {
        if height <= 0 {
            return Err(RecordError::InvalidField {
                field: "height",
                reason: format!("must be positive, got {height}"),
            });
        }
        let bytes = hex::decode(hash_hex.trim_start_matches("0x")).map_err(|e| {
            RecordError::InvalidField {
                field: "hash",
                reason: e.to_string(),
            }
        })?;
        let hash: Hash = bytes.try_into().map_err(|v: Vec<u8>| RecordError::InvalidField {
            field: "hash",
            reason: format!("expected 32 bytes, got {}", v.len()),
        })?;
        Ok(Self { height, hash })
    }
}

impl fmt::Display for TrustedBlockInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.height, hex::encode(self.hash))
    }
}

/// Measurement identity of an enclave binary.
///
/// Fixed for the lifetime of a running process; derived once from a
/// self-issued report at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EnclaveIdentity {
    /// Product identifier.
    pub product_id: Vec<u8>,
    /// Hash of the enclave signing authority.
    pub signer_id: Vec<u8>,
    /// Hash of the enclave code and initial data.
    pub unique_id: Vec<u8>,
}

impl EnclaveIdentity {
    /// Hex form of `unique_id`, as it appears in chain events and records.
    pub fn unique_id_hex(&self) -> String {
        hex::encode(&self.unique_id)
    }

    /// Whether `unique_id` equals the given hex string.
    pub fn matches_unique_id(&self, unique_id_hex: &str) -> bool {
        hex::decode(unique_id_hex)
            .map(|id| id == self.unique_id)
            .unwrap_or(false)
    }
}

// =============================================================================
// CLUSTER B: ORACLE RECORDS
// =============================================================================

/// Voting status of a chain record.
///
/// Monotonic: `VotingPeriod` moves to `Passed` or `Rejected` and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RecordStatus {
    /// Votes are still being collected.
    #[default]
    VotingPeriod,
    /// The vote passed.
    Passed,
    /// The vote failed.
    Rejected,
}

/// A request by a node to join the oracle fleet, or to move to a new
/// enclave version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OracleRecord {
    /// Enclave unique id (hex) the node claims to run.
    pub unique_id: String,
    /// Account address of the requesting node.
    pub node_address: Address,
    /// Compressed secp256k1 node public key.
    pub node_pub_key: Vec<u8>,
    /// Remote report vouching for `node_pub_key`.
    pub node_pub_key_remote_report: Vec<u8>,
    /// Height of the trusted block the node bootstrapped from.
    pub trusted_block_height: i64,
    /// Header hash of the trusted block.
    pub trusted_block_hash: Hash,
    /// Oracle key encrypted to the node key, once a vote passed.
    pub encrypted_oracle_priv_key: Option<Vec<u8>>,
    /// Nonce used for the oracle key hand-off.
    pub nonce: ProtocolNonce,
    /// Voting status.
    pub status: RecordStatus,
}

impl OracleRecord {
    /// The trusted block claimed by this record.
    pub fn trusted_block(&self) -> TrustedBlockInfo {
        TrustedBlockInfo::new(self.trusted_block_height, self.trusted_block_hash)
    }
}

/// Registration request of a new oracle node.
pub type RegistrationRecord = OracleRecord;

/// Upgrade request of an existing oracle node.
pub type UpgradeRecord = OracleRecord;

/// Oracle module parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OracleParams {
    /// Unique id (hex) of the currently active enclave version.
    pub unique_id: String,
    /// Compressed public key of the shared oracle key.
    pub oracle_public_key: Vec<u8>,
    /// Unique id (hex) of a pending upgrade, if one is in progress.
    pub upgrade_unique_id: Option<String>,
}

// =============================================================================
// CLUSTER C: DATA DEALS
// =============================================================================

/// JSON type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON object.
    Object,
    /// JSON array.
    Array,
}

/// A required top-level field of a data schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaField {
    /// Field name.
    pub name: String,
    /// Expected JSON type.
    pub kind: FieldKind,
}

impl SchemaField {
    /// Create a schema field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Status of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DealStatus {
    /// Open for sales.
    #[default]
    Active,
    /// All requested data delivered.
    Completed,
    /// Closed by the buyer.
    Deactivated,
}

/// A buyer's request for data matching a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Deal {
    /// Deal identifier.
    pub deal_id: u64,
    /// Required fields of every sold record.
    pub data_schema: Vec<SchemaField>,
    /// Buyer account address.
    pub buyer_address: Address,
    /// Compressed buyer public key used for delivery encryption.
    pub buyer_pub_key: Vec<u8>,
    /// Deal-scoped AEAD nonce.
    pub nonce: ProtocolNonce,
    /// Deal status.
    pub status: DealStatus,
}

/// Status of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SaleStatus {
    /// Oracles are voting on data validity.
    #[default]
    VerificationVotingPeriod,
    /// Oracles are voting on re-encrypted delivery.
    DeliveryVotingPeriod,
    /// Delivered to the buyer.
    Completed,
    /// Rejected by the oracles.
    Failed,
}

/// A seller's offer of one data item for a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Sale {
    /// Deal identifier.
    pub deal_id: u64,
    /// Seller account address.
    pub seller_address: Address,
    /// Compressed seller public key used for submission encryption.
    pub seller_pub_key: Vec<u8>,
    /// SHA-256 of the plaintext claimed by the seller.
    pub data_hash: Hash,
    /// Content id of the ciphertext encrypted for the oracle.
    pub verifiable_cid: String,
    /// Content id of the ciphertext re-encrypted for the buyer.
    pub delivered_cid: Option<String>,
    /// Sale status.
    pub status: SaleStatus,
}

// =============================================================================
// CLUSTER D: ACCOUNTS
// =============================================================================

/// On-chain account used to sign vote transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Account {
    /// Account address.
    pub address: Address,
    /// Compressed public key, once known to the chain.
    pub pub_key: Option<Vec<u8>>,
    /// Account number assigned by the chain.
    pub account_number: u64,
    /// Next expected transaction sequence.
    pub sequence: u64,
}

// =============================================================================
// CLUSTER E: VOTES
// =============================================================================

/// Vote choice. Exactly one per decision; never persisted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VoteOption {
    /// No choice made.
    #[default]
    Unspecified,
    /// Approve.
    Yes,
    /// Reject.
    No,
}

impl VoteOption {
    /// Metric / log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOption::Unspecified => "unspecified",
            VoteOption::Yes => "yes",
            VoteOption::No => "no",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
