//! # Inbound Ports
//!
//! API exposed by the vote transaction builder.

use crate::domain::{BroadcastResult, SignedVote, VoteMessage, VoteTxError};
use async_trait::async_trait;
use shared_types::Address;

/// Vote transaction API.
#[async_trait]
pub trait VoteTxApi: Send + Sync {
    /// Account address votes are cast from.
    fn voter_address(&self) -> Address;

    /// Sign a vote with the account key.
    fn sign_vote(&self, vote: VoteMessage) -> Result<SignedVote, VoteTxError>;

    /// Sign, wrap and broadcast a vote. Never resubmits.
    async fn broadcast_vote(&self, vote: VoteMessage) -> Result<BroadcastResult, VoteTxError>;
}
