//! # Outbound Ports
//!
//! The untrusted chain RPC and persistence of the root of trust.

use crate::algorithms::MultiStore;
use crate::domain::{
    CanonicalVote, Commit, CommitSig, Header, LightBlock, QueryResponse, SignedHeader,
    TrustedQueryError, Validator, ValidatorSet,
};
use async_trait::async_trait;
use oc_01_sealed_keys::SealError;
use parking_lot::Mutex;
use serde::Serialize;
use shared_crypto::Secp256k1KeyPair;
use shared_types::{encode_record, TrustedBlockInfo};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Chain RPC. Nothing it returns is trusted before verification.
#[async_trait]
pub trait ChainTransport: Send + Sync {
    /// Light block at `height`.
    async fn light_block(&self, height: i64) -> Result<LightBlock, TrustedQueryError>;

    /// Latest committed height.
    async fn latest_height(&self) -> Result<i64, TrustedQueryError>;

    /// Proof-carrying state read at `height`.
    async fn query(
        &self,
        store_key: &str,
        key: &[u8],
        height: i64,
    ) -> Result<QueryResponse, TrustedQueryError>;
}

/// Durable storage of the latest trusted block.
pub trait TrustedBlockPersistence: Send + Sync {
    /// Persisted block, if any.
    fn load(&self) -> Result<Option<TrustedBlockInfo>, SealError>;

    /// Replace the persisted block.
    fn save(&self, block: &TrustedBlockInfo) -> Result<(), SealError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory trusted block persistence.
#[derive(Default, Clone)]
pub struct InMemoryTrustedBlockStore {
    block: Arc<Mutex<Option<TrustedBlockInfo>>>,
}

impl InMemoryTrustedBlockStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrustedBlockPersistence for InMemoryTrustedBlockStore {
    fn load(&self) -> Result<Option<TrustedBlockInfo>, SealError> {
        Ok(*self.block.lock())
    }

    fn save(&self, block: &TrustedBlockInfo) -> Result<(), SealError> {
        *self.block.lock() = Some(*block);
        Ok(())
    }
}

type StoreState = BTreeMap<String, BTreeMap<Vec<u8>, Vec<u8>>>;

struct ChainState {
    validators: Vec<(Secp256k1KeyPair, u64)>,
    next_validators: Vec<(Secp256k1KeyPair, u64)>,
    blocks: BTreeMap<i64, LightBlock>,
    committed: BTreeMap<i64, MultiStore>,
    working: StoreState,
    genesis_time: u64,
    offline: bool,
    tamper_values: bool,
}

fn validator_set(keys: &[(Secp256k1KeyPair, u64)]) -> ValidatorSet {
    ValidatorSet::new(
        keys.iter()
            .map(|(key, power)| Validator {
                pub_key: key.public_key().as_bytes().to_vec(),
                power: *power,
            })
            .collect(),
    )
}

fn new_keys(count: usize, power: u64) -> Vec<(Secp256k1KeyPair, u64)> {
    (0..count)
        .map(|_| (Secp256k1KeyPair::generate(), power))
        .collect()
}

/// Simulated chain producing correctly signed light blocks and
/// proof-carrying state reads. Cloning shares the chain.
///
/// Block `h` carries the app hash of the state committed at `h - 1`.
#[derive(Clone)]
pub struct MockChain {
    state: Arc<Mutex<ChainState>>,
}

impl MockChain {
    /// Chain id of every mock chain.
    pub const CHAIN_ID: &'static str = "oc-mock-1";

    /// Seconds between blocks.
    pub const BLOCK_INTERVAL_SECS: u64 = 5;

    /// Chain with `count` validators of `power` each and no blocks.
    pub fn with_validators(count: usize, power: u64) -> Self {
        let validators = new_keys(count, power);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            state: Arc::new(Mutex::new(ChainState {
                next_validators: validators.clone(),
                validators,
                blocks: BTreeMap::new(),
                committed: BTreeMap::new(),
                working: StoreState::new(),
                genesis_time: now.saturating_sub(3_600),
                offline: false,
                tamper_values: false,
            })),
        }
    }

    /// Produce `count` blocks.
    pub fn produce_blocks(&self, count: usize) {
        let mut state = self.state.lock();
        for _ in 0..count {
            Self::produce_block(&mut state);
        }
    }

    fn produce_block(state: &mut ChainState) {
        let height = state.blocks.keys().next_back().copied().unwrap_or(0) + 1;
        let app_hash = state
            .committed
            .get(&(height - 1))
            .map(MultiStore::app_hash)
            .unwrap_or_else(|| MultiStore::default().app_hash());
        let last_block_hash = state
            .blocks
            .get(&(height - 1))
            .map(LightBlock::hash)
            .unwrap_or_default();

        let validators = validator_set(&state.validators);
        let next_validators = validator_set(&state.next_validators);
        let header = Header {
            chain_id: Self::CHAIN_ID.to_string(),
            height,
            time: state.genesis_time + height as u64 * Self::BLOCK_INTERVAL_SECS,
            last_block_hash,
            validators_hash: validators.hash(),
            next_validators_hash: next_validators.hash(),
            app_hash,
        };
        let block_hash = header.hash();
        let sign_bytes = CanonicalVote {
            chain_id: Self::CHAIN_ID.to_string(),
            height,
            block_hash,
        }
        .sign_bytes();
        let signatures = state
            .validators
            .iter()
            .map(|(key, _)| CommitSig {
                validator_address: key.address(),
                signature: key.sign(&sign_bytes).as_bytes().to_vec(),
            })
            .collect();

        state.blocks.insert(
            height,
            LightBlock {
                signed_header: SignedHeader {
                    header,
                    commit: Commit {
                        height,
                        block_hash,
                        signatures,
                    },
                },
                validators,
                next_validators,
            },
        );
        state
            .committed
            .insert(height, MultiStore::commit(&state.working));
        state.validators = state.next_validators.clone();
    }

    /// Replace the whole validator set from the block after next.
    pub fn rotate_validators(&self, count: usize, power: u64) {
        self.state.lock().next_validators = new_keys(count, power);
    }

    /// Write a raw value; committed with the next block.
    pub fn set_state(&self, store: &str, key: Vec<u8>, value: Vec<u8>) {
        self.state
            .lock()
            .working
            .entry(store.to_string())
            .or_default()
            .insert(key, value);
    }

    /// Write an encoded record; committed with the next block.
    pub fn set_record<T: Serialize>(&self, store: &str, key: Vec<u8>, record: &T) {
        let value = encode_record(record).unwrap_or_default();
        self.set_state(store, key, value);
    }

    /// Delete a value; committed with the next block.
    pub fn remove_state(&self, store: &str, key: &[u8]) {
        if let Some(entries) = self.state.lock().working.get_mut(store) {
            entries.remove(key);
        }
    }

    /// Stored light block at `height`.
    pub fn block(&self, height: i64) -> Option<LightBlock> {
        self.state.lock().blocks.get(&height).cloned()
    }

    /// Overwrite a light block as a malicious RPC would.
    pub fn replace_block(&self, block: LightBlock) {
        self.state.lock().blocks.insert(block.height(), block);
    }

    /// Latest produced height.
    pub fn height(&self) -> i64 {
        self.state.lock().blocks.keys().next_back().copied().unwrap_or(0)
    }

    /// Time of the latest block.
    pub fn latest_time(&self) -> u64 {
        let state = self.state.lock();
        state
            .blocks
            .values()
            .next_back()
            .map(|b| b.header().time)
            .unwrap_or(state.genesis_time)
    }

    /// Make every call fail with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Corrupt every returned value while keeping its proof.
    pub fn set_tamper_values(&self, tamper: bool) {
        self.state.lock().tamper_values = tamper;
    }

    fn check_online(state: &ChainState) -> Result<(), TrustedQueryError> {
        if state.offline {
            return Err(TrustedQueryError::Transport("mock chain offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainTransport for MockChain {
    async fn light_block(&self, height: i64) -> Result<LightBlock, TrustedQueryError> {
        let state = self.state.lock();
        Self::check_online(&state)?;
        state
            .blocks
            .get(&height)
            .cloned()
            .ok_or_else(|| TrustedQueryError::Transport(format!("height {height} not available")))
    }

    async fn latest_height(&self) -> Result<i64, TrustedQueryError> {
        let state = self.state.lock();
        Self::check_online(&state)?;
        Ok(state.blocks.keys().next_back().copied().unwrap_or(0))
    }

    async fn query(
        &self,
        store_key: &str,
        key: &[u8],
        height: i64,
    ) -> Result<QueryResponse, TrustedQueryError> {
        let state = self.state.lock();
        Self::check_online(&state)?;
        let mut response = state
            .committed
            .get(&height)
            .and_then(|ms| ms.query(store_key, key, height))
            .ok_or_else(|| {
                TrustedQueryError::Transport(format!("no state for {store_key} at {height}"))
            })?;
        if state.tamper_values {
            if let Some(byte) = response.value.as_mut().and_then(|v| v.first_mut()) {
                *byte ^= 0xFF;
            }
        }
        Ok(response)
    }
}
