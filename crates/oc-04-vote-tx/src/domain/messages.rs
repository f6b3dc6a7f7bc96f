//! # Vote Messages
//!
//! One message type per vote event. Each is signed by the account key over
//! its bincode encoding before it goes into a transaction.

use super::errors::VoteTxError;
use serde::{Deserialize, Serialize};
use shared_types::{Address, Hash, VoteOption};

/// Vote on a registration or upgrade request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleVote {
    /// Enclave unique id (hex) of the request.
    pub unique_id: String,
    /// Voting oracle's account address.
    pub voter_address: Address,
    /// Address of the requesting node.
    pub voting_target_address: Address,
    /// Decision.
    pub vote_option: VoteOption,
    /// Oracle key encrypted to the requesting node key. Only on Yes.
    pub encrypted_oracle_priv_key: Option<Vec<u8>>,
}

/// Vote on the validity of a sold data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataVerificationVote {
    /// Deal identifier.
    pub deal_id: u64,
    /// Claimed plaintext hash.
    pub data_hash: Hash,
    /// Voting oracle's account address.
    pub voter_address: Address,
    /// Decision.
    pub vote_option: VoteOption,
}

/// Vote on the re-encrypted delivery of a data item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataDeliveryVote {
    /// Deal identifier.
    pub deal_id: u64,
    /// Claimed plaintext hash.
    pub data_hash: Hash,
    /// Content id of the buyer ciphertext; empty on No.
    pub delivered_cid: String,
    /// Voting oracle's account address.
    pub voter_address: Address,
    /// Decision.
    pub vote_option: VoteOption,
}

/// Any vote this node casts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoteMessage {
    /// Registration vote.
    OracleRegistration(OracleVote),
    /// Upgrade vote.
    OracleUpgrade(OracleVote),
    /// Data verification vote.
    DataVerification(DataVerificationVote),
    /// Data delivery vote.
    DataDelivery(DataDeliveryVote),
}

impl VoteMessage {
    /// Message type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            VoteMessage::OracleRegistration(_) => "vote_oracle_registration",
            VoteMessage::OracleUpgrade(_) => "vote_oracle_upgrade",
            VoteMessage::DataVerification(_) => "vote_data_verification",
            VoteMessage::DataDelivery(_) => "vote_data_delivery",
        }
    }

    /// Decision carried by the vote.
    pub fn vote_option(&self) -> VoteOption {
        match self {
            VoteMessage::OracleRegistration(v) | VoteMessage::OracleUpgrade(v) => v.vote_option,
            VoteMessage::DataVerification(v) => v.vote_option,
            VoteMessage::DataDelivery(v) => v.vote_option,
        }
    }

    /// Voter address.
    pub fn voter_address(&self) -> Address {
        match self {
            VoteMessage::OracleRegistration(v) | VoteMessage::OracleUpgrade(v) => v.voter_address,
            VoteMessage::DataVerification(v) => v.voter_address,
            VoteMessage::DataDelivery(v) => v.voter_address,
        }
    }

    /// Bytes the account key signs.
    pub fn sign_bytes(&self) -> Result<Vec<u8>, VoteTxError> {
        bincode::serialize(self).map_err(|e| VoteTxError::Encode(e.to_string()))
    }
}

/// A vote with the account signature over [`VoteMessage::sign_bytes`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVote {
    /// Vote.
    pub vote: VoteMessage,
    /// 64-byte compact ECDSA signature.
    pub signature: Vec<u8>,
}
