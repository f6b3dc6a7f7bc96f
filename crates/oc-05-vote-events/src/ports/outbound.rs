//! # Outbound Ports
//!
//! Everything a vote decision may touch: chain queries, attestation,
//! vote signing and the content store, plus the oracle key material and a
//! metrics hook.

use crate::domain::{ContentStoreError, VoteEventKind};
use async_trait::async_trait;
use oc_02_attestation::AttestationApi;
use oc_03_trusted_query::TrustedQueryApi;
use oc_04_vote_tx::VoteTxApi;
use parking_lot::Mutex;
use shared_crypto::{sha256, EncryptionLedger, Secp256k1KeyPair};
use shared_types::VoteOption;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Content-addressed blob store.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Store `bytes`, returning their content id.
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentStoreError>;

    /// Fetch by content id. Unknown ids fail with `NotFound`.
    async fn get(&self, id: &str) -> Result<Vec<u8>, ContentStoreError>;
}

/// The oracle key and the nonce ledger guarding every encryption with it.
pub struct OracleKeyring {
    oracle_key: Secp256k1KeyPair,
    ledger: EncryptionLedger,
}

impl OracleKeyring {
    /// Keyring over an unsealed oracle key.
    pub fn new(oracle_key: Secp256k1KeyPair) -> Self {
        Self {
            oracle_key,
            ledger: EncryptionLedger::default(),
        }
    }

    /// Oracle key pair.
    pub fn oracle_key(&self) -> &Secp256k1KeyPair {
        &self.oracle_key
    }

    /// Nonce ledger.
    pub fn ledger(&self) -> &EncryptionLedger {
        &self.ledger
    }
}

impl fmt::Debug for OracleKeyring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OracleKeyring(***)")
    }
}

/// Capabilities available to vote decisions.
pub trait OracleCapabilities: Send + Sync {
    /// Proof-checked chain reads.
    fn query(&self) -> &dyn TrustedQueryApi;

    /// Peer report verification and own identity.
    fn attest(&self) -> &dyn AttestationApi;

    /// Vote signing and broadcast.
    fn sign(&self) -> &dyn VoteTxApi;

    /// Encrypted payload storage.
    fn store(&self) -> &dyn ContentStore;

    /// Oracle key material.
    fn keys(&self) -> &OracleKeyring;
}

/// Hook for reactor metrics.
pub trait ReactorMetrics: Send + Sync {
    /// A vote was accepted by the chain.
    fn vote_cast(&self, kind: VoteEventKind, option: VoteOption);

    /// A verification step refused; the vote became No.
    fn verification_failed(&self, stage: &str, reason: &str);

    /// Time spent deciding and broadcasting one event.
    fn handler_duration(&self, kind: VoteEventKind, seconds: f64);

    /// Broadcasting a decided vote failed.
    fn broadcast_failed(&self, reason: &str);

    /// An event was dropped without a vote.
    fn event_dropped(&self, kind: VoteEventKind);

    /// Highest verified block height.
    fn trusted_height(&self, height: i64);
}

/// Metrics hook that records nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl ReactorMetrics for NoopMetrics {
    fn vote_cast(&self, _kind: VoteEventKind, _option: VoteOption) {}
    fn verification_failed(&self, _stage: &str, _reason: &str) {}
    fn handler_duration(&self, _kind: VoteEventKind, _seconds: f64) {}
    fn broadcast_failed(&self, _reason: &str) {}
    fn event_dropped(&self, _kind: VoteEventKind) {}
    fn trusted_height(&self, _height: i64) {}
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// In-memory content store; ids are the hex SHA-256 of the content.
#[derive(Clone, Default)]
pub struct MockContentStore {
    blobs: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    offline: Arc<Mutex<bool>>,
    fail_adds: Arc<Mutex<bool>>,
}

impl MockContentStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bytes` directly, returning the id.
    pub fn insert(&self, bytes: Vec<u8>) -> String {
        let id = hex::encode(sha256(&bytes));
        self.blobs.lock().insert(id.clone(), bytes);
        id
    }

    /// Content under `id`.
    pub fn content(&self, id: &str) -> Option<Vec<u8>> {
        self.blobs.lock().get(id).cloned()
    }

    /// Fail every call.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    /// Fail only `add`.
    pub fn fail_adds(&self, fail: bool) {
        *self.fail_adds.lock() = fail;
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentStoreError> {
        if *self.offline.lock() || *self.fail_adds.lock() {
            return Err(ContentStoreError::Unavailable("mock store offline".into()));
        }
        Ok(self.insert(bytes))
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>, ContentStoreError> {
        if *self.offline.lock() {
            return Err(ContentStoreError::Unavailable("mock store offline".into()));
        }
        self.content(id)
            .ok_or_else(|| ContentStoreError::NotFound(id.to_string()))
    }
}

/// Metrics hook counting calls.
#[derive(Debug, Default)]
pub struct RecordingMetrics {
    votes: Mutex<Vec<(VoteEventKind, VoteOption)>>,
    failures: Mutex<Vec<String>>,
    broadcast_failures: Mutex<usize>,
    dropped: Mutex<Vec<VoteEventKind>>,
    trusted_height: Mutex<i64>,
}

impl RecordingMetrics {
    /// Empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes accepted so far.
    pub fn votes(&self) -> Vec<(VoteEventKind, VoteOption)> {
        self.votes.lock().clone()
    }

    /// Stages of refused verifications.
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Number of failed broadcasts.
    pub fn broadcast_failures(&self) -> usize {
        *self.broadcast_failures.lock()
    }

    /// Kinds of dropped events.
    pub fn dropped(&self) -> Vec<VoteEventKind> {
        self.dropped.lock().clone()
    }

    /// Last reported trusted height.
    pub fn last_trusted_height(&self) -> i64 {
        *self.trusted_height.lock()
    }
}

impl ReactorMetrics for RecordingMetrics {
    fn vote_cast(&self, kind: VoteEventKind, option: VoteOption) {
        self.votes.lock().push((kind, option));
    }

    fn verification_failed(&self, stage: &str, _reason: &str) {
        self.failures.lock().push(stage.to_string());
    }

    fn handler_duration(&self, _kind: VoteEventKind, _seconds: f64) {}

    fn broadcast_failed(&self, _reason: &str) {
        *self.broadcast_failures.lock() += 1;
    }

    fn event_dropped(&self, kind: VoteEventKind) {
        self.dropped.lock().push(kind);
    }

    fn trusted_height(&self, height: i64) {
        *self.trusted_height.lock() = height;
    }
}
