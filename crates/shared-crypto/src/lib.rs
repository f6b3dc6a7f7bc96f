//! # Shared Crypto - Hybrid Encryption and Account Keys
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Account / node / oracle keys, vote and tx signing |
//! | `ecies` | ECDH secp256k1 + SHA-256 KDF | Shared-key derivation between parties |
//! | `aead` | AES-256-GCM, 12-byte nonce | Payload and key hand-off encryption |
//! | `ledger` | LRU of (key, nonce) uses | Nonce-reuse guard for protocol nonces |
//! | `hashing` | SHA-256 | Data binding, content hashes, KDF |
//!
//! ## Nonce Invariant
//!
//! Nonces are supplied by the chain protocol (deal- or record-scoped), not
//! generated locally. A nonce must never encrypt two different plaintexts
//! under the same derived key. Re-encrypting the same plaintext under a
//! *different* key pair with the same nonce is allowed, since each ECDH
//! pair yields an independent AES key. [`EncryptionLedger`] enforces the
//! invariant at runtime.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aead;
pub mod ecdsa;
pub mod ecies;
pub mod errors;
pub mod hashing;
pub mod ledger;

// Re-exports
pub use aead::{
    aead_decrypt, aead_decrypt_with_aad, aead_encrypt, aead_encrypt_with_aad, random_nonce,
    SymmetricKey, NONCE_LEN,
};
pub use ecdsa::{
    address_from_pub_key, Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature, PUBLIC_KEY_LEN,
};
pub use ecies::{derive_shared_key, Kdf};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many};
pub use ledger::EncryptionLedger;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    #[test]
    fn test_version() {
        assert!(!super::VERSION.is_empty());
    }
}
