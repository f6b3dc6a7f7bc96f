//! # Key Bootstrap
//!
//! Unseals the keys the node runs with, creating the per-node keys on first
//! start. The oracle key is never generated here unless the operator asks
//! for it; a new node obtains it through the hand-off of an approved
//! registration or upgrade request.

use crate::wiring::StartupError;
use oc_01_sealed_keys::{KeyHandoff, KeySlot, SealError, SealedKeyStoreApi};
use oc_02_attestation::AttestationApi;
use oc_03_trusted_query::TrustedQueryApi;
use shared_crypto::{random_nonce, Secp256k1KeyPair, Secp256k1PublicKey};
use shared_types::{
    decode_record, oracle_params_key, registration_key, upgrade_key, OracleParams, OracleRecord,
    ORACLE_STORE,
};
use tracing::{info, warn};

/// Unseal the key in `slot`, generating and sealing one if the slot is empty.
pub fn ensure_key<K: SealedKeyStoreApi>(
    store: &K,
    slot: KeySlot,
) -> Result<Secp256k1KeyPair, SealError> {
    if store.contains(slot)? {
        return store.load_key(slot);
    }
    let key = Secp256k1KeyPair::generate();
    store.store_new_key(slot, &key)?;
    info!(
        slot = %slot,
        address = %hex::encode(key.address()),
        "Generated and sealed a new key"
    );
    Ok(key)
}

async fn read_params<Q: TrustedQueryApi + ?Sized>(
    query: &Q,
) -> Result<Option<OracleParams>, StartupError> {
    match query.read_latest(ORACLE_STORE, &oracle_params_key()).await {
        Ok(bytes) => decode_record(&bytes)
            .map(Some)
            .map_err(|e| StartupError::Params(e.to_string())),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Unseal the oracle key, or obtain it.
///
/// | Sealed key | `init_oracle_key` | Outcome |
/// |------------|-------------------|---------|
/// | present | - | unsealed, checked against the chain's oracle public key |
/// | absent | true | generated and sealed |
/// | absent | false | imported from an approved request, else `NotRegistered` |
pub async fn obtain_oracle_key<K, Q, A>(
    store: &K,
    query: &Q,
    attest: &A,
    node_key: &Secp256k1KeyPair,
    init_oracle_key: bool,
) -> Result<Secp256k1KeyPair, StartupError>
where
    K: SealedKeyStoreApi,
    Q: TrustedQueryApi + ?Sized,
    A: AttestationApi + ?Sized,
{
    if store.contains(KeySlot::OracleKey)? {
        let key = store.load_key(KeySlot::OracleKey)?;
        match read_params(query).await? {
            Some(params) if params.oracle_public_key[..] != key.public_key().as_bytes()[..] => {
                return Err(StartupError::OracleKeyMismatch);
            }
            Some(_) => {}
            None => warn!("Oracle params not on chain yet, sealed oracle key not cross-checked"),
        }
        return Ok(key);
    }

    if init_oracle_key {
        let key = ensure_key(store, KeySlot::OracleKey)?;
        info!(
            oracle_public_key = %hex::encode(key.public_key().as_bytes()),
            "Initialised the oracle key; publish its public key in the oracle params"
        );
        return Ok(key);
    }

    let params = read_params(query)
        .await?
        .ok_or_else(|| StartupError::Params("oracle params not found on chain".into()))?;
    let oracle_pub = Secp256k1PublicKey::from_slice(&params.oracle_public_key)
        .map_err(|e| StartupError::Params(format!("oracle public key: {e}")))?;

    let unique_id = attest.self_identity().unique_id_hex();
    let address = node_key.address();
    for key in [
        registration_key(&unique_id, &address),
        upgrade_key(&unique_id, &address),
    ] {
        let bytes = match query.read_latest(ORACLE_STORE, &key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e.into()),
        };
        let record: OracleRecord =
            decode_record(&bytes).map_err(|e| StartupError::Params(e.to_string()))?;
        if record.encrypted_oracle_priv_key.is_none() {
            info!(status = ?record.status, "Oracle request found, key not handed off yet");
            continue;
        }
        let oracle_key = KeyHandoff::new(store).import_oracle_key(&record, node_key, &oracle_pub)?;
        info!("Imported the oracle key from an approved request");
        return Ok(oracle_key);
    }

    let request = registration_request(query, attest, node_key).await?;
    info!(
        unique_id = %request.unique_id,
        node_address = %hex::encode(request.node_address),
        node_pub_key = %hex::encode(&request.node_pub_key),
        remote_report = %hex::encode(&request.node_pub_key_remote_report),
        trusted_block_height = request.trusted_block_height,
        trusted_block_hash = %hex::encode(request.trusted_block_hash),
        nonce = %hex::encode(request.nonce),
        "Submit this registration request, then restart once it has passed"
    );
    Err(StartupError::NotRegistered {
        address: hex::encode(address),
    })
}

/// The request a node submits to join the fleet: its node key, attested by
/// this enclave, and the block its light client trusts.
pub async fn registration_request<Q, A>(
    query: &Q,
    attest: &A,
    node_key: &Secp256k1KeyPair,
) -> Result<OracleRecord, StartupError>
where
    Q: TrustedQueryApi + ?Sized,
    A: AttestationApi + ?Sized,
{
    let node_pub = node_key.public_key();
    let report = attest.attest_key(node_pub.as_bytes())?;
    let trusted = query.trusted_block().await;
    Ok(OracleRecord {
        unique_id: attest.self_identity().unique_id_hex(),
        node_address: node_key.address(),
        node_pub_key: node_pub.as_bytes().to_vec(),
        node_pub_key_remote_report: report,
        trusted_block_height: trusted.height,
        trusted_block_hash: trusted.hash,
        encrypted_oracle_priv_key: None,
        nonce: random_nonce(),
        ..Default::default()
    })
}
