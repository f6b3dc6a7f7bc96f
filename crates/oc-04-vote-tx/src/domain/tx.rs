//! # Transactions
//!
//! ```text
//! SignDoc { chain_id, account_number, sequence, body_bytes, auth_info_bytes }
//!    └── signed by the account key ──▶ Tx.signatures[0]
//! ```

use super::errors::VoteTxError;
use super::messages::SignedVote;
use serde::{Deserialize, Serialize};
use shared_crypto::sha256;

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, VoteTxError> {
    bincode::serialize(value).map_err(|e| VoteTxError::Encode(e.to_string()))
}

/// Transaction fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fee {
    /// Amount.
    pub amount: u64,
    /// Denomination.
    pub denom: String,
}

/// Messages and memo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxBody {
    /// Signed votes.
    pub messages: Vec<SignedVote>,
    /// Free text.
    pub memo: String,
}

/// Signer and fee information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    /// Compressed signer public key.
    pub signer_pub_key: Vec<u8>,
    /// Account sequence the transaction consumes.
    pub sequence: u64,
    /// Gas limit.
    pub gas_limit: u64,
    /// Fee.
    pub fee: Fee,
}

/// Document the account key signs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignDoc {
    /// Chain identifier.
    pub chain_id: String,
    /// Account number.
    pub account_number: u64,
    /// Account sequence.
    pub sequence: u64,
    /// Encoded body.
    pub body_bytes: Vec<u8>,
    /// Encoded auth info.
    pub auth_info_bytes: Vec<u8>,
}

impl SignDoc {
    /// Build the sign doc of `body` and `auth_info`.
    pub fn new(
        chain_id: &str,
        account_number: u64,
        body: &TxBody,
        auth_info: &AuthInfo,
    ) -> Result<Self, VoteTxError> {
        Ok(Self {
            chain_id: chain_id.to_string(),
            account_number,
            sequence: auth_info.sequence,
            body_bytes: encode(body)?,
            auth_info_bytes: encode(auth_info)?,
        })
    }

    /// Bytes to sign.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, VoteTxError> {
        encode(self)
    }
}

/// A signed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    /// Body.
    pub body: TxBody,
    /// Auth info.
    pub auth_info: AuthInfo,
    /// Signatures over the sign doc.
    pub signatures: Vec<Vec<u8>>,
}

impl Tx {
    /// Wire encoding.
    pub fn to_bytes(&self) -> Result<Vec<u8>, VoteTxError> {
        encode(self)
    }

    /// Decode wire bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VoteTxError> {
        bincode::deserialize(bytes).map_err(|e| VoteTxError::Encode(e.to_string()))
    }

    /// Transaction hash (hex, upper case).
    pub fn hash_hex(bytes: &[u8]) -> String {
        hex::encode_upper(sha256(bytes))
    }
}

/// Outcome of a broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Transaction hash.
    pub tx_hash: String,
    /// Inclusion height; zero when only checked.
    pub height: i64,
    /// Application result code; non-zero is a rejection.
    pub code: u32,
    /// Log of the result.
    pub raw_log: String,
}

impl BroadcastResult {
    /// Whether the chain accepted the transaction.
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}
