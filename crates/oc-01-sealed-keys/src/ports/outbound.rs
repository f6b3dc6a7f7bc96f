//! # Outbound Ports
//!
//! Hardware sealing-key access and blob persistence.

use crate::algorithms::derive_sealing_key;
use crate::domain::{KeySlot, SealError, SealPolicy, SecretBytes};
use shared_crypto::SymmetricKey;
use shared_types::EnclaveIdentity;
use std::collections::HashMap;
use parking_lot::Mutex;

/// Source of the sealing key. The key never leaves this boundary in
/// serialized form.
pub trait SealingKeyProvider: Send + Sync {
    /// Sealing key for `policy` on this platform and measurement.
    fn sealing_key(&self, policy: SealPolicy) -> Result<SymmetricKey, SealError>;
}

/// Durable storage of sealed blobs, one per slot.
pub trait SealedBlobStorage: Send + Sync {
    /// Read the raw blob bytes in `slot`, if any.
    fn read(&self, slot: KeySlot) -> Result<Option<Vec<u8>>, SealError>;

    /// Write raw blob bytes to `slot`, replacing any previous content.
    fn write(&self, slot: KeySlot, bytes: &[u8]) -> Result<(), SealError>;

    /// Whether `slot` holds a blob.
    fn exists(&self, slot: KeySlot) -> Result<bool, SealError> {
        Ok(self.read(slot)?.is_some())
    }
}

// =============================================================================
// Mock implementations for testing
// =============================================================================

/// Sealing key provider over a fixed platform secret and identity.
pub struct MockSealingKeyProvider {
    platform_secret: SecretBytes,
    identity: EnclaveIdentity,
}

impl MockSealingKeyProvider {
    /// Provider for the given platform secret byte and identity.
    pub fn new(platform_byte: u8, identity: EnclaveIdentity) -> Self {
        Self {
            platform_secret: SecretBytes::from_slice(&[platform_byte; 32]),
            identity,
        }
    }
}

impl SealingKeyProvider for MockSealingKeyProvider {
    fn sealing_key(&self, policy: SealPolicy) -> Result<SymmetricKey, SealError> {
        Ok(derive_sealing_key(&self.platform_secret, policy, &self.identity))
    }
}

/// In-memory blob storage.
#[derive(Default)]
pub struct InMemoryBlobStorage {
    blobs: Mutex<HashMap<KeySlot, Vec<u8>>>,
}

impl InMemoryBlobStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a slot directly, bypassing the store (for corruption tests).
    pub fn put_raw(&self, slot: KeySlot, bytes: Vec<u8>) {
        self.blobs.lock().insert(slot, bytes);
    }
}

impl SealedBlobStorage for InMemoryBlobStorage {
    fn read(&self, slot: KeySlot) -> Result<Option<Vec<u8>>, SealError> {
        Ok(self.blobs.lock().get(&slot).cloned())
    }

    fn write(&self, slot: KeySlot, bytes: &[u8]) -> Result<(), SealError> {
        self.blobs.lock().insert(slot, bytes.to_vec());
        Ok(())
    }
}
