//! # Inbound Ports
//!
//! API exposed by the sealed key store.

use crate::domain::{KeySlot, SealError, SealedBlob, SecretBytes};
use shared_crypto::Secp256k1KeyPair;
use shared_types::TrustedBlockInfo;

/// Sealed key store API.
pub trait SealedKeyStoreApi: Send + Sync {
    /// Generate a fresh key pair and seal its private key.
    fn generate(&self) -> Result<(Secp256k1KeyPair, SealedBlob), SealError>;

    /// Seal arbitrary plaintext.
    fn seal(&self, plaintext: &[u8]) -> Result<SealedBlob, SealError>;

    /// Unseal a blob.
    fn unseal(&self, blob: &SealedBlob) -> Result<SecretBytes, SealError>;

    /// Whether `slot` holds a sealed blob.
    fn contains(&self, slot: KeySlot) -> Result<bool, SealError>;

    /// Unseal the key pair stored in `slot`.
    fn load_key(&self, slot: KeySlot) -> Result<Secp256k1KeyPair, SealError>;

    /// Seal and store a key pair. Fails with `AlreadyExists` if the slot is
    /// occupied.
    fn store_new_key(&self, slot: KeySlot, key: &Secp256k1KeyPair) -> Result<(), SealError>;

    /// Persist the light client's trusted block.
    fn save_trusted_block(&self, block: &TrustedBlockInfo) -> Result<(), SealError>;

    /// Load the persisted trusted block, if any.
    fn load_trusted_block(&self) -> Result<Option<TrustedBlockInfo>, SealError>;
}
