//! # Sealed Key Store Service
//!
//! Seals under the configured policy and unseals under whatever policy the
//! blob header names, so a store configured for `MrSigner` can still open
//! older `MrEnclave` blobs sealed by this exact build.

use crate::algorithms::{seal_with_key, unseal_with_key};
use crate::config::SealedKeyConfig;
use crate::domain::{KeySlot, SealError, SealedBlob, SecretBytes};
use crate::ports::{SealedBlobStorage, SealedKeyStoreApi, SealingKeyProvider};
use shared_crypto::Secp256k1KeyPair;
use shared_types::{decode_record, encode_record, TrustedBlockInfo};
use tracing::{debug, info, warn};

/// Sealed key store over a sealing-key provider and blob storage.
pub struct SealedKeyStore<P: SealingKeyProvider, S: SealedBlobStorage> {
    provider: P,
    storage: S,
    config: SealedKeyConfig,
}

impl<P: SealingKeyProvider, S: SealedBlobStorage> SealedKeyStore<P, S> {
    /// Create a new store.
    pub fn new(provider: P, storage: S, config: SealedKeyConfig) -> Result<Self, SealError> {
        config.validate()?;
        Ok(Self {
            provider,
            storage,
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &SealedKeyConfig {
        &self.config
    }

    /// Load and parse the blob in `slot`.
    pub fn load_blob(&self, slot: KeySlot) -> Result<SealedBlob, SealError> {
        let bytes = self
            .storage
            .read(slot)?
            .ok_or(SealError::NotFound { slot })?;
        SealedBlob::from_bytes(&bytes)
    }

    /// Load the key in `slot`, or generate and seal a new one when the slot
    /// is empty. A present but unreadable blob is an error, never replaced.
    pub fn load_or_generate(&self, slot: KeySlot) -> Result<Secp256k1KeyPair, SealError> {
        match self.load_key(slot) {
            Ok(key) => {
                info!(slot = %slot, "[oc-01] Unsealed existing key");
                Ok(key)
            }
            Err(SealError::NotFound { .. }) => {
                let (key, blob) = self.generate()?;
                self.storage.write(slot, &blob.to_bytes())?;
                info!(
                    slot = %slot,
                    pub_key = %hex::encode(key.public_key().as_bytes()),
                    "[oc-01] Generated and sealed new key"
                );
                Ok(key)
            }
            Err(e) => Err(e),
        }
    }

    fn key_from_secret(secret: &SecretBytes) -> Result<Secp256k1KeyPair, SealError> {
        Secp256k1KeyPair::from_slice(secret.expose())
            .map_err(|e| SealError::Corrupted(format!("unsealed key material invalid: {e}")))
    }
}

impl<P: SealingKeyProvider, S: SealedBlobStorage> SealedKeyStoreApi for SealedKeyStore<P, S> {
    fn generate(&self) -> Result<(Secp256k1KeyPair, SealedBlob), SealError> {
        let key = Secp256k1KeyPair::generate();
        let secret = key.secret_bytes();
        let blob = self.seal(&secret[..])?;
        Ok((key, blob))
    }

    fn seal(&self, plaintext: &[u8]) -> Result<SealedBlob, SealError> {
        let key = self.provider.sealing_key(self.config.policy)?;
        seal_with_key(&key, self.config.policy, plaintext)
    }

    fn unseal(&self, blob: &SealedBlob) -> Result<SecretBytes, SealError> {
        let key = self.provider.sealing_key(blob.policy)?;
        unseal_with_key(&key, blob)
    }

    fn contains(&self, slot: KeySlot) -> Result<bool, SealError> {
        self.storage.exists(slot)
    }

    fn load_key(&self, slot: KeySlot) -> Result<Secp256k1KeyPair, SealError> {
        let blob = self.load_blob(slot)?;
        let secret = self.unseal(&blob).inspect_err(|e| {
            warn!(slot = %slot, error = %e, "[oc-01] Failed to unseal key");
        })?;
        Self::key_from_secret(&secret)
    }

    fn store_new_key(&self, slot: KeySlot, key: &Secp256k1KeyPair) -> Result<(), SealError> {
        if self.storage.exists(slot)? {
            return Err(SealError::AlreadyExists { slot });
        }
        let secret = key.secret_bytes();
        let blob = self.seal(&secret[..])?;
        self.storage.write(slot, &blob.to_bytes())?;
        info!(slot = %slot, "[oc-01] Stored sealed key");
        Ok(())
    }

    fn save_trusted_block(&self, block: &TrustedBlockInfo) -> Result<(), SealError> {
        let bytes = encode_record(block).map_err(|e| SealError::Seal(e.to_string()))?;
        let blob = self.seal(&bytes)?;
        self.storage.write(KeySlot::TrustedBlock, &blob.to_bytes())?;
        debug!(block = %block, "[oc-01] Persisted trusted block");
        Ok(())
    }

    fn load_trusted_block(&self) -> Result<Option<TrustedBlockInfo>, SealError> {
        let blob = match self.load_blob(KeySlot::TrustedBlock) {
            Ok(blob) => blob,
            Err(SealError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        let secret = self.unseal(&blob)?;
        let block: TrustedBlockInfo = decode_record(secret.expose())
            .map_err(|e| SealError::Corrupted(format!("trusted block record: {e}")))?;
        Ok(Some(block))
    }
}
