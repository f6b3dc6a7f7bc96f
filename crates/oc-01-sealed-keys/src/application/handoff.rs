//! # Oracle Key Hand-off
//!
//! When the fleet votes Yes on a registration or upgrade, each voter
//! encrypts the oracle private key to the registrant's node key:
//!
//! ```text
//! voter:      key = ECDH(oracle_priv, node_pub)   nonce = record.nonce
//! registrant: key = ECDH(node_priv, oracle_pub)   -> decrypt -> seal
//! ```
//!
//! The registrant only accepts the decrypted key if its public key equals
//! the oracle public key published on chain.

use crate::domain::{KeySlot, SealError};
use crate::ports::SealedKeyStoreApi;
use shared_crypto::{
    aead_decrypt, derive_shared_key, CryptoError, EncryptionLedger, Kdf, Secp256k1KeyPair,
    Secp256k1PublicKey,
};
use shared_types::OracleRecord;
use tracing::info;

/// Voter side: encrypt the oracle private key to a registrant's node key.
pub fn encrypt_oracle_key(
    ledger: &EncryptionLedger,
    oracle_key: &Secp256k1KeyPair,
    node_pub: &Secp256k1PublicKey,
    nonce: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let shared = derive_shared_key(oracle_key, node_pub, Kdf::Sha256)?;
    let secret = oracle_key.secret_bytes();
    ledger.encrypt(&shared, nonce, &secret[..])
}

/// Registrant side of the hand-off.
pub struct KeyHandoff<'a, K: SealedKeyStoreApi> {
    store: &'a K,
}

impl<'a, K: SealedKeyStoreApi> KeyHandoff<'a, K> {
    /// Hand-off over a sealed key store.
    pub fn new(store: &'a K) -> Self {
        Self { store }
    }

    /// Decrypt the oracle key from an approved record and seal it into the
    /// oracle-key slot.
    ///
    /// An existing oracle key is a guard (`AlreadyExists`), checked before
    /// any decryption.
    pub fn import_oracle_key(
        &self,
        record: &OracleRecord,
        node_key: &Secp256k1KeyPair,
        oracle_pub: &Secp256k1PublicKey,
    ) -> Result<Secp256k1KeyPair, SealError> {
        if self.store.contains(KeySlot::OracleKey)? {
            return Err(SealError::AlreadyExists {
                slot: KeySlot::OracleKey,
            });
        }

        let encrypted = record
            .encrypted_oracle_priv_key
            .as_ref()
            .ok_or_else(|| SealError::Handoff("record carries no encrypted oracle key".into()))?;

        if node_key.public_key().as_bytes()[..] != record.node_pub_key[..] {
            return Err(SealError::Handoff(
                "record was issued to a different node key".into(),
            ));
        }

        let shared = derive_shared_key(node_key, oracle_pub, Kdf::Sha256)
            .map_err(|e| SealError::Handoff(e.to_string()))?;
        let plaintext = aead_decrypt(&shared, &record.nonce, encrypted)
            .map_err(|e| SealError::Handoff(format!("decrypt: {e}")))?;
        let plaintext = zeroize::Zeroizing::new(plaintext);

        let oracle_key = Secp256k1KeyPair::from_slice(&plaintext)
            .map_err(|e| SealError::Handoff(format!("oracle key material: {e}")))?;
        if oracle_key.public_key() != *oracle_pub {
            return Err(SealError::Handoff(
                "decrypted key does not match the on-chain oracle public key".into(),
            ));
        }

        self.store.store_new_key(KeySlot::OracleKey, &oracle_key)?;
        info!(
            unique_id = %record.unique_id,
            "[oc-01] Imported oracle key from approved record"
        );
        Ok(oracle_key)
    }
}
