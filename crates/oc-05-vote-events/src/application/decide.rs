//! # Vote Decisions
//!
//! | Event | Yes when |
//! |-------|----------|
//! | RegisterOracle | own unique id, record present, claimed block verifies, report verifies |
//! | UpgradeOracle | as RegisterOracle, and the record is for the pending upgrade |
//! | DataVerification | submission decrypts, hash matches, plaintext fits the schema |
//! | DataDelivery | sale in delivery voting, submission re-encrypted and stored for the buyer |
//!
//! A failed check is a No vote. Only an unreachable chain or content store
//! aborts the decision without a vote.

use crate::algorithms::{delivery_nonce, open_submission, seal_for_buyer, validate_against_schema};
use crate::domain::{ContentStoreError, Decision, ReactorError, Rejection, VoteEvent};
use crate::ports::OracleCapabilities;
use oc_01_sealed_keys::encrypt_oracle_key;
use oc_02_attestation::key_binding;
use oc_03_trusted_query::TrustedQueryError;
use oc_04_vote_tx::{DataDeliveryVote, DataVerificationVote, OracleVote, VoteMessage};
use serde::de::DeserializeOwned;
use shared_crypto::Secp256k1PublicKey;
use shared_types::{
    decode_record, deal_key, oracle_params_key, registration_key, sale_key, upgrade_key, Address,
    Deal, Hash, OracleParams, OracleRecord, Sale, SaleStatus, VoteOption, DATADEAL_STORE,
    ORACLE_STORE,
};
use tracing::debug;

/// Why a decision stopped early.
enum Halt {
    /// Vote No.
    Refuse(Rejection),
    /// Do not vote.
    Abort(ReactorError),
}

impl From<Rejection> for Halt {
    fn from(rejection: Rejection) -> Self {
        Halt::Refuse(rejection)
    }
}

impl From<ReactorError> for Halt {
    fn from(error: ReactorError) -> Self {
        Halt::Abort(error)
    }
}

fn query_halt(error: TrustedQueryError, stage: &'static str) -> Halt {
    match error {
        TrustedQueryError::Transport(_) | TrustedQueryError::Timeout { .. } => {
            Halt::Abort(error.into())
        }
        other => Halt::Refuse(Rejection::new(stage, other.to_string())),
    }
}

fn content_halt(error: ContentStoreError) -> Halt {
    match error {
        ContentStoreError::NotFound(_) => Halt::Refuse(Rejection::new("content", error.to_string())),
        ContentStoreError::Unavailable(_) => Halt::Abort(error.into()),
    }
}

async fn read_record<T, C>(
    ctx: &C,
    store: &str,
    key: &[u8],
    stage: &'static str,
) -> Result<T, Halt>
where
    T: DeserializeOwned,
    C: OracleCapabilities + ?Sized,
{
    let bytes = ctx
        .query()
        .read_latest(store, key)
        .await
        .map_err(|e| query_halt(e, stage))?;
    decode_record(&bytes).map_err(|e| Rejection::new(stage, e.to_string()).into())
}

/// Split a verification outcome into a decision.
fn conclude<T>(
    outcome: Result<T, Halt>,
    yes: impl FnOnce(T) -> VoteMessage,
    no: impl FnOnce() -> VoteMessage,
) -> Result<Decision, ReactorError> {
    match outcome {
        Ok(value) => Ok(Decision::approve(yes(value))),
        Err(Halt::Refuse(rejection)) => Ok(Decision::reject(no(), rejection)),
        Err(Halt::Abort(error)) => Err(error),
    }
}

impl VoteEvent {
    /// Decide the vote for this event.
    ///
    /// # Errors
    ///
    /// Only when the chain or content store cannot be reached; every
    /// verification failure is a No decision instead.
    pub async fn decide<C>(&self, ctx: &C) -> Result<Decision, ReactorError>
    where
        C: OracleCapabilities + ?Sized,
    {
        let voter = ctx.sign().voter_address();
        match self {
            VoteEvent::RegisterOracle {
                unique_id,
                node_address,
            }
            | VoteEvent::UpgradeOracle {
                unique_id,
                node_address,
            } => {
                let upgrade = matches!(self, VoteEvent::UpgradeOracle { .. });
                let outcome = verify_oracle_request(ctx, unique_id, node_address, upgrade).await;
                let vote = |vote_option, encrypted_oracle_priv_key| {
                    let vote = OracleVote {
                        unique_id: unique_id.clone(),
                        voter_address: voter,
                        voting_target_address: *node_address,
                        vote_option,
                        encrypted_oracle_priv_key,
                    };
                    if upgrade {
                        VoteMessage::OracleUpgrade(vote)
                    } else {
                        VoteMessage::OracleRegistration(vote)
                    }
                };
                conclude(
                    outcome,
                    |encrypted| vote(VoteOption::Yes, Some(encrypted)),
                    || vote(VoteOption::No, None),
                )
            }
            VoteEvent::DataVerification {
                deal_id,
                seller_address,
                data_hash,
            } => {
                let outcome = verify_submission(ctx, *deal_id, seller_address, data_hash).await;
                let vote = |vote_option| {
                    VoteMessage::DataVerification(DataVerificationVote {
                        deal_id: *deal_id,
                        data_hash: *data_hash,
                        voter_address: voter,
                        vote_option,
                    })
                };
                conclude(outcome, |()| vote(VoteOption::Yes), || vote(VoteOption::No))
            }
            VoteEvent::DataDelivery {
                deal_id,
                seller_address,
                data_hash,
            } => {
                let outcome = deliver_submission(ctx, *deal_id, seller_address, data_hash).await;
                let vote = |vote_option, delivered_cid| {
                    VoteMessage::DataDelivery(DataDeliveryVote {
                        deal_id: *deal_id,
                        data_hash: *data_hash,
                        delivered_cid,
                        voter_address: voter,
                        vote_option,
                    })
                };
                conclude(
                    outcome,
                    |cid| vote(VoteOption::Yes, cid),
                    || vote(VoteOption::No, String::new()),
                )
            }
        }
    }
}

/// Checks a registration or upgrade request; returns the oracle key
/// encrypted to the requesting node.
async fn verify_oracle_request<C>(
    ctx: &C,
    unique_id: &str,
    node_address: &Address,
    upgrade: bool,
) -> Result<Vec<u8>, Halt>
where
    C: OracleCapabilities + ?Sized,
{
    let identity = ctx.attest().self_identity();
    if !identity.matches_unique_id(unique_id) {
        return Err(Rejection::new("unique_id", "request is for another enclave version").into());
    }

    let key = if upgrade {
        upgrade_key(unique_id, node_address)
    } else {
        registration_key(unique_id, node_address)
    };
    let record: OracleRecord = read_record(ctx, ORACLE_STORE, &key, "record").await?;
    if record.unique_id != unique_id || record.node_address != *node_address {
        return Err(Rejection::new("record", "record does not match the event").into());
    }

    if upgrade {
        let params: OracleParams =
            read_record(ctx, ORACLE_STORE, &oracle_params_key(), "params").await?;
        if params.upgrade_unique_id.as_deref() != Some(record.unique_id.as_str()) {
            return Err(Rejection::new("upgrade", "record is not for the pending upgrade").into());
        }
    }

    ctx.query()
        .verify_trusted_block(&record.trusted_block())
        .await
        .map_err(|e| query_halt(e, "trusted_block"))?;
    debug!(block = %record.trusted_block(), "[oc-05] Registrant trusted block verified");

    ctx.attest()
        .verify(
            &record.node_pub_key_remote_report,
            &key_binding(&record.node_pub_key),
            identity,
        )
        .map_err(|e| Rejection::new("attestation", e.to_string()))?;

    let node_pub = Secp256k1PublicKey::from_slice(&record.node_pub_key)
        .map_err(|e| Rejection::new("node_key", e.to_string()))?;
    let keys = ctx.keys();
    encrypt_oracle_key(keys.ledger(), keys.oracle_key(), &node_pub, &record.nonce)
        .map_err(|e| Rejection::new("handoff", e.to_string()).into())
}

async fn read_sale<C>(
    ctx: &C,
    deal_id: u64,
    seller_address: &Address,
    data_hash: &Hash,
) -> Result<Sale, Halt>
where
    C: OracleCapabilities + ?Sized,
{
    let sale: Sale = read_record(ctx, DATADEAL_STORE, &sale_key(deal_id, seller_address), "sale").await?;
    if sale.data_hash != *data_hash {
        return Err(Rejection::new("data_hash", "event hash differs from the sale").into());
    }
    Ok(sale)
}

async fn verify_submission<C>(
    ctx: &C,
    deal_id: u64,
    seller_address: &Address,
    data_hash: &Hash,
) -> Result<(), Halt>
where
    C: OracleCapabilities + ?Sized,
{
    let deal: Deal = read_record(ctx, DATADEAL_STORE, &deal_key(deal_id), "deal").await?;
    let sale = read_sale(ctx, deal_id, seller_address, data_hash).await?;

    let ciphertext = ctx
        .store()
        .get(&sale.verifiable_cid)
        .await
        .map_err(content_halt)?;
    let plaintext = open_submission(
        ctx.keys().oracle_key(),
        &sale.seller_pub_key,
        &deal.nonce,
        &ciphertext,
        &sale.data_hash,
    )?;

    validate_against_schema(&deal.data_schema, &plaintext)
        .map_err(|e| Rejection::new("schema", e.to_string()).into())
}

/// Re-encrypts a verified submission for the buyer; returns its content id.
async fn deliver_submission<C>(
    ctx: &C,
    deal_id: u64,
    seller_address: &Address,
    data_hash: &Hash,
) -> Result<String, Halt>
where
    C: OracleCapabilities + ?Sized,
{
    let sale = read_sale(ctx, deal_id, seller_address, data_hash).await?;
    if sale.status != SaleStatus::DeliveryVotingPeriod {
        return Err(Rejection::new(
            "sale_status",
            format!("sale is in {:?}", sale.status),
        )
        .into());
    }
    if sale.verifiable_cid.is_empty() {
        return Err(Rejection::new("content", "sale has no verifiable content id").into());
    }

    let deal: Deal = read_record(ctx, DATADEAL_STORE, &deal_key(deal_id), "deal").await?;
    let ciphertext = ctx
        .store()
        .get(&sale.verifiable_cid)
        .await
        .map_err(content_halt)?;
    let keys = ctx.keys();
    let plaintext = open_submission(
        keys.oracle_key(),
        &sale.seller_pub_key,
        &deal.nonce,
        &ciphertext,
        &sale.data_hash,
    )?;
    let delivered = seal_for_buyer(
        keys.ledger(),
        keys.oracle_key(),
        &deal.buyer_pub_key,
        &delivery_nonce(&deal.nonce, &sale.seller_address, &sale.data_hash),
        &plaintext,
    )?;

    ctx.store()
        .add(delivered)
        .await
        .map_err(|e| Rejection::new("content_add", e.to_string()).into())
}
