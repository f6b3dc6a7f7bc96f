//! # Shared-Key Derivation (ECDH)
//!
//! Diffie-Hellman over secp256k1, the account-key curve, followed by a KDF.
//! Both sides of an exchange derive the same 32-byte key:
//!
//! ```text
//! derive(a_priv, B_pub) == derive(b_priv, A_pub)
//! ```
//!
//! The derived key feeds [`crate::aead`] together with a protocol nonce.

use crate::aead::SymmetricKey;
use crate::ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey};
use crate::CryptoError;
use k256::ecdh::diffie_hellman;
use sha2::{Digest, Sha256};

/// Key derivation applied to the raw ECDH shared secret.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Kdf {
    /// SHA-256 of the shared point's x-coordinate.
    #[default]
    Sha256,
}

impl Kdf {
    fn derive(self, shared_x: &[u8]) -> [u8; 32] {
        match self {
            Kdf::Sha256 => Sha256::digest(shared_x).into(),
        }
    }
}

/// Derive a 32-byte symmetric key from our private key and a peer public key.
///
/// # Errors
///
/// Returns `CryptoError::InvalidPublicKey` if the peer key is not a valid
/// curve point.
pub fn derive_shared_key(
    private: &Secp256k1KeyPair,
    peer: &Secp256k1PublicKey,
    kdf: Kdf,
) -> Result<SymmetricKey, CryptoError> {
    let peer = peer.to_public_key()?;
    let shared = diffie_hellman(private.secret_scalar(), peer.as_affine());
    Ok(SymmetricKey::from_bytes(
        kdf.derive(shared.raw_secret_bytes().as_slice()),
    ))
}
