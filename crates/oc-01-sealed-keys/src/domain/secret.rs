//! # Secret Buffers
//!
//! Unsealed material lives in a [`SecretBytes`] for exactly as long as the
//! operation that needs it. Memory is zeroed on drop.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Heap buffer holding unsealed secret bytes.
#[derive(Clone, Zeroize, ZeroizeOnDrop, PartialEq, Eq)]
pub struct SecretBytes {
    inner: Vec<u8>,
}

impl SecretBytes {
    /// Take ownership of secret bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Copy a slice into a new secret buffer.
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            inner: bytes.to_vec(),
        }
    }

    /// Borrow the secret bytes. Do not keep the reference around.
    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for SecretBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretBytes(***)")
    }
}
