//! # Authenticated Encryption (AES-256-GCM)
//!
//! Nonces are 12 bytes and are supplied by the caller. The protocol fixes
//! them per deal or per oracle record, so nothing here generates one except
//! [`random_nonce`], which is reserved for local sealing.
//!
//! Decryption either returns the full plaintext or [`CryptoError::AuthError`].
//! There is no partial output.

use crate::CryptoError;
use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// Symmetric key (256-bit), zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_LEN]);

impl SymmetricKey {
    /// Create from bytes.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let array: [u8; KEY_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(array))
    }

    /// Generate random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Short public fingerprint, safe to log.
    pub fn fingerprint(&self) -> String {
        hex::encode(&crate::hashing::sha256(&self.0)[..8])
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(self.0.as_slice().into())
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey(fp={})", self.fingerprint())
    }
}

/// Generate a random 12-byte nonce.
pub fn random_nonce() -> [u8; NONCE_LEN] {
    let mut bytes = [0u8; NONCE_LEN];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut bytes);
    bytes
}

fn check_nonce(nonce: &[u8]) -> Result<&Nonce<aes_gcm::aead::consts::U12>, CryptoError> {
    if nonce.len() != NONCE_LEN {
        return Err(CryptoError::InvalidNonceLength {
            expected: NONCE_LEN,
            actual: nonce.len(),
        });
    }
    Ok(Nonce::from_slice(nonce))
}

/// Encrypt plaintext with AES-256-GCM.
///
/// Output is `ciphertext || tag`.
///
/// # Errors
///
/// Returns `CryptoError::InvalidNonceLength` for a nonce that is not 12 bytes.
pub fn aead_encrypt(
    key: &SymmetricKey,
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    aead_encrypt_with_aad(key, nonce, plaintext, &[])
}

/// Encrypt plaintext with AES-256-GCM, authenticating `aad` alongside it.
pub fn aead_encrypt_with_aad(
    key: &SymmetricKey,
    nonce: &[u8],
    plaintext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = check_nonce(nonce)?;
    key.cipher()
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// Decrypt `ciphertext || tag` with AES-256-GCM.
///
/// # Errors
///
/// Returns `CryptoError::AuthError` on tag mismatch, which covers a wrong
/// key, a wrong nonce and any tampering.
pub fn aead_decrypt(
    key: &SymmetricKey,
    nonce: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    aead_decrypt_with_aad(key, nonce, ciphertext, &[])
}

/// Decrypt with AES-256-GCM, checking `aad` as well.
pub fn aead_decrypt_with_aad(
    key: &SymmetricKey,
    nonce: &[u8],
    ciphertext: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = check_nonce(nonce)?;
    key.cipher()
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::AuthError)
}
