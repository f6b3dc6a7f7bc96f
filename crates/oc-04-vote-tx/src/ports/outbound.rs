//! # Outbound Ports
//!
//! Transaction broadcast and signer account lookup.

use crate::domain::{BroadcastResult, Tx, VoteTxError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{Account, Address};
use std::collections::VecDeque;
use std::sync::Arc;

/// Broadcasts encoded transactions.
#[async_trait]
pub trait TxBroadcaster: Send + Sync {
    /// Submit `tx_bytes`. A non-zero code is returned as a result, not an
    /// error; transport failures are errors.
    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult, VoteTxError>;
}

/// Reads the signer's on-chain account.
#[async_trait]
pub trait AccountReader: Send + Sync {
    /// Account at `address`.
    async fn account(&self, address: &Address) -> Result<Account, VoteTxError>;
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Broadcaster recording every transaction.
///
/// Responds with queued codes first, then with code 0.
#[derive(Clone, Default)]
pub struct MockBroadcaster {
    sent: Arc<Mutex<Vec<Tx>>>,
    codes: Arc<Mutex<VecDeque<u32>>>,
    offline: Arc<Mutex<bool>>,
}

impl MockBroadcaster {
    /// Broadcaster accepting everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next broadcast with `code`.
    pub fn queue_code(&self, code: u32) {
        self.codes.lock().push_back(code);
    }

    /// Fail every broadcast with a transport error.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock() = offline;
    }

    /// Transactions received so far.
    pub fn sent(&self) -> Vec<Tx> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl TxBroadcaster for MockBroadcaster {
    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult, VoteTxError> {
        if *self.offline.lock() {
            return Err(VoteTxError::Transport("mock broadcaster offline".into()));
        }
        let tx = Tx::from_bytes(&tx_bytes)?;
        self.sent.lock().push(tx);
        let code = self.codes.lock().pop_front().unwrap_or(0);
        Ok(BroadcastResult {
            tx_hash: Tx::hash_hex(&tx_bytes),
            height: if code == 0 { 1 } else { 0 },
            code,
            raw_log: if code == 0 {
                String::new()
            } else {
                format!("mock rejection {code}")
            },
        })
    }
}

/// Fixed account with a settable sequence.
#[derive(Clone)]
pub struct MockAccountReader {
    account: Arc<Mutex<Account>>,
    reads: Arc<Mutex<usize>>,
}

impl MockAccountReader {
    /// Reader returning `account`.
    pub fn new(account: Account) -> Self {
        Self {
            account: Arc::new(Mutex::new(account)),
            reads: Arc::new(Mutex::new(0)),
        }
    }

    /// Change the on-chain sequence.
    pub fn set_sequence(&self, sequence: u64) {
        self.account.lock().sequence = sequence;
    }

    /// Number of account reads.
    pub fn reads(&self) -> usize {
        *self.reads.lock()
    }
}

#[async_trait]
impl AccountReader for MockAccountReader {
    async fn account(&self, address: &Address) -> Result<Account, VoteTxError> {
        *self.reads.lock() += 1;
        let account = self.account.lock().clone();
        if &account.address != address {
            return Err(VoteTxError::Account(format!(
                "unknown account {}",
                hex::encode(address)
            )));
        }
        Ok(account)
    }
}
