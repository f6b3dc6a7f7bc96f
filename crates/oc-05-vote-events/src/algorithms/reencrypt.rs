//! # Submission Re-encryption
//!
//! ```text
//! seller ──ECDH(seller, oracle)──▶ ciphertext ──open──▶ plaintext
//! plaintext ──ECDH(oracle, buyer)──▶ buyer ciphertext
//! ```
//!
//! The seller leg uses the deal nonce. The buyer key is the same for every
//! sale of a deal, so the buyer leg uses [`delivery_nonce`], which is unique
//! per (seller, data hash). Plaintext only lives in a zeroizing buffer.

use crate::domain::Rejection;
use shared_crypto::{
    aead_decrypt, derive_shared_key, sha256, sha256_many, EncryptionLedger, Kdf,
    Secp256k1KeyPair, Secp256k1PublicKey, NONCE_LEN,
};
use shared_types::{Address, Hash, ProtocolNonce};
use zeroize::Zeroizing;

const DELIVERY_NONCE_DOMAIN: &[u8] = b"oc-delivery-nonce";

/// Nonce of the buyer ciphertext for one sale.
///
/// `SHA-256(domain || deal nonce || seller address || data hash)`, truncated
/// to the AEAD nonce length. The buyer recomputes it from the deal and sale
/// records.
pub fn delivery_nonce(
    deal_nonce: &ProtocolNonce,
    seller_address: &Address,
    data_hash: &Hash,
) -> ProtocolNonce {
    let digest = sha256_many(&[DELIVERY_NONCE_DOMAIN, deal_nonce, seller_address, data_hash]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&digest[..NONCE_LEN]);
    nonce
}

/// Decrypt a seller submission and check it against the claimed hash.
pub fn open_submission(
    oracle_key: &Secp256k1KeyPair,
    seller_pub: &[u8],
    nonce: &[u8],
    ciphertext: &[u8],
    claimed_hash: &Hash,
) -> Result<Zeroizing<Vec<u8>>, Rejection> {
    let seller = Secp256k1PublicKey::from_slice(seller_pub)
        .map_err(|e| Rejection::new("seller_key", e.to_string()))?;
    let shared = derive_shared_key(oracle_key, &seller, Kdf::Sha256)
        .map_err(|e| Rejection::new("seller_key", e.to_string()))?;
    let plaintext = aead_decrypt(&shared, nonce, ciphertext)
        .map(Zeroizing::new)
        .map_err(|e| Rejection::new("decrypt", e.to_string()))?;
    if sha256(&plaintext) != *claimed_hash {
        return Err(Rejection::new(
            "data_hash",
            "plaintext hash differs from the claimed hash",
        ));
    }
    Ok(plaintext)
}

/// Encrypt verified plaintext for the buyer.
pub fn seal_for_buyer(
    ledger: &EncryptionLedger,
    oracle_key: &Secp256k1KeyPair,
    buyer_pub: &[u8],
    nonce: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, Rejection> {
    let buyer = Secp256k1PublicKey::from_slice(buyer_pub)
        .map_err(|e| Rejection::new("buyer_key", e.to_string()))?;
    let shared = derive_shared_key(oracle_key, &buyer, Kdf::Sha256)
        .map_err(|e| Rejection::new("buyer_key", e.to_string()))?;
    ledger
        .encrypt(&shared, nonce, plaintext)
        .map_err(|e| Rejection::new("encrypt", e.to_string()))
}
