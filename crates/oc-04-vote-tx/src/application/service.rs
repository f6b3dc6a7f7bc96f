//! # Vote Transaction Builder
//!
//! Building and broadcasting is serialised by one async mutex that also
//! guards the cached account sequence, so concurrent vote events never sign
//! two transactions with the same sequence.
//!
//! | Broadcast outcome | Cached sequence |
//! |-------------------|-----------------|
//! | code 0 | incremented |
//! | code ≠ 0 | dropped, re-read before the next vote |
//! | transport error / timeout | dropped, re-read before the next vote |

use crate::config::VoteTxConfig;
use crate::domain::{
    AuthInfo, BroadcastResult, Fee, SignDoc, SignedVote, Tx, TxBody, VoteMessage, VoteTxError,
};
use crate::ports::{AccountReader, TxBroadcaster, VoteTxApi};
use async_trait::async_trait;
use shared_crypto::Secp256k1KeyPair;
use shared_types::Address;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
struct SequenceState {
    account_number: u64,
    sequence: u64,
}

/// Signs votes and broadcasts them as transactions.
pub struct VoteTxBuilder<B: TxBroadcaster, A: AccountReader> {
    config: VoteTxConfig,
    account_key: Secp256k1KeyPair,
    broadcaster: B,
    accounts: A,
    sequence: Mutex<Option<SequenceState>>,
}

impl<B: TxBroadcaster + 'static, A: AccountReader + 'static> VoteTxBuilder<B, A> {
    /// Create a builder signing with `account_key`.
    pub fn new(config: VoteTxConfig, account_key: Secp256k1KeyPair, broadcaster: B, accounts: A) -> Self {
        Self {
            config,
            account_key,
            broadcaster,
            accounts,
            sequence: Mutex::new(None),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &VoteTxConfig {
        &self.config
    }

    /// Wrap signed votes into a transaction at `account_number`/`sequence`.
    pub fn build_tx(
        &self,
        messages: Vec<SignedVote>,
        account_number: u64,
        sequence: u64,
    ) -> Result<Tx, VoteTxError> {
        let body = TxBody {
            messages,
            memo: self.config.memo.clone(),
        };
        let auth_info = AuthInfo {
            signer_pub_key: self.account_key.public_key().as_bytes().to_vec(),
            sequence,
            gas_limit: self.config.gas_limit,
            fee: Fee {
                amount: self.config.fee_amount,
                denom: self.config.fee_denom.clone(),
            },
        };
        let sign_doc = SignDoc::new(&self.config.chain_id, account_number, &body, &auth_info)?;
        let signature = self.account_key.sign(&sign_doc.sign_bytes()?);
        Ok(Tx {
            body,
            auth_info,
            signatures: vec![signature.as_bytes().to_vec()],
        })
    }

    async fn current_sequence(
        &self,
        cached: &mut Option<SequenceState>,
    ) -> Result<SequenceState, VoteTxError> {
        if let Some(state) = *cached {
            return Ok(state);
        }
        let account = self.accounts.account(&self.voter_address()).await?;
        let state = SequenceState {
            account_number: account.account_number,
            sequence: account.sequence,
        };
        *cached = Some(state);
        Ok(state)
    }
}

#[async_trait]
impl<B, A> VoteTxApi for VoteTxBuilder<B, A>
where
    B: TxBroadcaster + 'static,
    A: AccountReader + 'static,
{
    fn voter_address(&self) -> Address {
        self.account_key.address()
    }

    fn sign_vote(&self, vote: VoteMessage) -> Result<SignedVote, VoteTxError> {
        let signature = self.account_key.sign(&vote.sign_bytes()?);
        Ok(SignedVote {
            vote,
            signature: signature.as_bytes().to_vec(),
        })
    }

    async fn broadcast_vote(&self, vote: VoteMessage) -> Result<BroadcastResult, VoteTxError> {
        let type_name = vote.type_name();
        let option = vote.vote_option();
        let signed = self.sign_vote(vote)?;

        let mut cached = self.sequence.lock().await;
        let state = self.current_sequence(&mut cached).await?;
        let tx = self.build_tx(vec![signed], state.account_number, state.sequence)?;
        let tx_bytes = tx.to_bytes()?;

        let outcome = timeout(
            self.config.broadcast_timeout(),
            self.broadcaster.broadcast(tx_bytes),
        )
        .await
        .unwrap_or_else(|_| Err(VoteTxError::Transport("broadcast timed out".into())));

        match outcome {
            Ok(result) if result.is_ok() => {
                *cached = Some(SequenceState {
                    sequence: state.sequence + 1,
                    ..state
                });
                info!(
                    msg = type_name,
                    option = option.as_str(),
                    tx_hash = %result.tx_hash,
                    height = result.height,
                    "[oc-04] Vote broadcast"
                );
                Ok(result)
            }
            Ok(result) => {
                *cached = None;
                warn!(
                    msg = type_name,
                    code = result.code,
                    tx_hash = %result.tx_hash,
                    "[oc-04] Vote rejected: {}",
                    result.raw_log
                );
                Err(VoteTxError::Rejected {
                    code: result.code,
                    log: result.raw_log,
                })
            }
            Err(e) => {
                *cached = None;
                warn!(msg = type_name, "[oc-04] Vote broadcast failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataVerificationVote, OracleVote};
    use crate::ports::{MockAccountReader, MockBroadcaster};
    use shared_crypto::{Secp256k1PublicKey, Secp256k1Signature};
    use shared_types::{Account, VoteOption};
    use std::sync::Arc;

    struct Fixture {
        builder: VoteTxBuilder<MockBroadcaster, MockAccountReader>,
        broadcaster: MockBroadcaster,
        accounts: MockAccountReader,
        key: Secp256k1KeyPair,
    }

    fn fixture() -> Fixture {
        let key = Secp256k1KeyPair::generate();
        let broadcaster = MockBroadcaster::new();
        let accounts = MockAccountReader::new(Account {
            address: key.address(),
            pub_key: None,
            account_number: 3,
            sequence: 10,
        });
        let builder = VoteTxBuilder::new(
            VoteTxConfig::for_testing("oc-test"),
            key.clone(),
            broadcaster.clone(),
            accounts.clone(),
        );
        Fixture {
            builder,
            broadcaster,
            accounts,
            key,
        }
    }

    fn vote(voter: Address) -> VoteMessage {
        VoteMessage::DataVerification(DataVerificationVote {
            deal_id: 1,
            data_hash: [5; 32],
            voter_address: voter,
            vote_option: VoteOption::Yes,
        })
    }

    #[test]
    fn test_signed_vote_verifies_with_account_key() {
        let f = fixture();
        let message = VoteMessage::OracleRegistration(OracleVote {
            unique_id: "aa".into(),
            voter_address: f.key.address(),
            voting_target_address: [1; 20],
            vote_option: VoteOption::No,
            encrypted_oracle_priv_key: None,
        });
        let signed = f.builder.sign_vote(message.clone()).unwrap();
        let sig = Secp256k1Signature::from_slice(&signed.signature).unwrap();
        assert!(f
            .key
            .public_key()
            .verify(&message.sign_bytes().unwrap(), &sig)
            .is_ok());
    }

    #[tokio::test]
    async fn test_tx_signature_covers_sign_doc() {
        let f = fixture();
        f.builder.broadcast_vote(vote(f.key.address())).await.unwrap();

        let tx = f.broadcaster.sent().remove(0);
        let doc = SignDoc::new("oc-test", 3, &tx.body, &tx.auth_info).unwrap();
        let signer = Secp256k1PublicKey::from_slice(&tx.auth_info.signer_pub_key).unwrap();
        let sig = Secp256k1Signature::from_slice(&tx.signatures[0]).unwrap();
        assert!(signer.verify(&doc.sign_bytes().unwrap(), &sig).is_ok());
        assert_eq!(tx.auth_info.sequence, 10);
    }

    #[tokio::test]
    async fn test_sequence_increments_after_accept() {
        let f = fixture();
        for _ in 0..3 {
            f.builder.broadcast_vote(vote(f.key.address())).await.unwrap();
        }
        let sequences: Vec<u64> = f.broadcaster.sent().iter().map(|t| t.auth_info.sequence).collect();
        assert_eq!(sequences, vec![10, 11, 12]);
        assert_eq!(f.accounts.reads(), 1);
    }

    #[tokio::test]
    async fn test_rejection_surfaces_and_refreshes_sequence() {
        let f = fixture();
        f.broadcaster.queue_code(32);

        let result = f.builder.broadcast_vote(vote(f.key.address())).await;
        assert!(matches!(result, Err(VoteTxError::Rejected { code: 32, .. })));
        assert_eq!(f.broadcaster.sent().len(), 1);

        f.accounts.set_sequence(15);
        f.builder.broadcast_vote(vote(f.key.address())).await.unwrap();
        assert_eq!(f.broadcaster.sent()[1].auth_info.sequence, 15);
        assert_eq!(f.accounts.reads(), 2);
    }

    #[tokio::test]
    async fn test_transport_error_surfaces() {
        let f = fixture();
        f.broadcaster.set_offline(true);
        let result = f.builder.broadcast_vote(vote(f.key.address())).await;
        assert!(matches!(result, Err(VoteTxError::Transport(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_use_distinct_sequences() {
        let f = fixture();
        let builder = Arc::new(f.builder);
        let address = f.key.address();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let builder = builder.clone();
                tokio::spawn(async move { builder.broadcast_vote(vote(address)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut sequences: Vec<u64> = f.broadcaster.sent().iter().map(|t| t.auth_info.sequence).collect();
        sequences.sort_unstable();
        assert_eq!(sequences, (10..18).collect::<Vec<u64>>());
    }
}
