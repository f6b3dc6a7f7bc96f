//! # Sealed Trusted Block Store
//!
//! Persists the root of trust through the sealed key store so a restarted
//! node resumes from the highest block it verified.

use crate::ports::TrustedBlockPersistence;
use oc_01_sealed_keys::{SealError, SealedKeyStoreApi};
use shared_types::TrustedBlockInfo;
use std::sync::Arc;

/// Trusted block persistence backed by a sealed key store.
pub struct SealedTrustedBlockStore<K: SealedKeyStoreApi> {
    keys: Arc<K>,
}

impl<K: SealedKeyStoreApi> SealedTrustedBlockStore<K> {
    /// Wrap a sealed key store.
    pub fn new(keys: Arc<K>) -> Self {
        Self { keys }
    }
}

impl<K: SealedKeyStoreApi> TrustedBlockPersistence for SealedTrustedBlockStore<K> {
    fn load(&self) -> Result<Option<TrustedBlockInfo>, SealError> {
        self.keys.load_trusted_block()
    }

    fn save(&self, block: &TrustedBlockInfo) -> Result<(), SealError> {
        self.keys.save_trusted_block(block)
    }
}
