//! # Encryption Ledger
//!
//! Runtime guard for the protocol nonce invariant: under one symmetric key a
//! nonce may only ever protect one plaintext. Encrypting the *same* plaintext
//! again (a retried vote) is allowed and yields identical ciphertext.
//!
//! Entries are kept in a bounded LRU, so the guard covers recent activity
//! rather than the full process history.

use crate::aead::{aead_encrypt, SymmetricKey, NONCE_LEN};
use crate::hashing::sha256;
use crate::CryptoError;
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;

/// Default number of (key, nonce) uses remembered.
pub const DEFAULT_LEDGER_CAPACITY: usize = 4096;

type LedgerKey = ([u8; 32], [u8; NONCE_LEN]);

/// Tracks (key fingerprint, nonce) -> plaintext hash.
pub struct EncryptionLedger {
    entries: Mutex<LruCache<LedgerKey, [u8; 32]>>,
}

impl EncryptionLedger {
    /// Create a ledger remembering up to `capacity` uses.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Encrypt, refusing a nonce already used under this key for a
    /// different plaintext.
    ///
    /// # Errors
    ///
    /// `CryptoError::NonceReuse` on a conflicting reuse, or any error from
    /// [`aead_encrypt`].
    pub fn encrypt(
        &self,
        key: &SymmetricKey,
        nonce: &[u8],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let nonce_array: [u8; NONCE_LEN] =
            nonce
                .try_into()
                .map_err(|_| CryptoError::InvalidNonceLength {
                    expected: NONCE_LEN,
                    actual: nonce.len(),
                })?;
        let entry = (sha256(key.as_bytes()), nonce_array);
        let digest = sha256(plaintext);

        {
            let mut entries = self.entries.lock();
            match entries.get(&entry) {
                Some(previous) if *previous != digest => {
                    return Err(CryptoError::NonceReuse {
                        key_fingerprint: key.fingerprint(),
                    });
                }
                Some(_) => {}
                None => {
                    entries.put(entry, digest);
                }
            }
        }

        aead_encrypt(key, nonce, plaintext)
    }

    /// Number of uses currently remembered.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for EncryptionLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEDGER_CAPACITY)
    }
}
