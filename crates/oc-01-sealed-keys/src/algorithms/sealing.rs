//! # Sealing Algorithms
//!
//! Sealing key = SHA-256 over a domain tag, the platform secret, the policy
//! byte and the length-prefixed measurement the policy binds:
//!
//! | Policy | Measurement |
//! |--------|-------------|
//! | `MrEnclave` | `unique_id` |
//! | `MrSigner` | `signer_id`, `product_id` |

use crate::domain::{SealError, SealPolicy, SealedBlob, SecretBytes};
use shared_crypto::{
    aead_decrypt_with_aad, aead_encrypt_with_aad, random_nonce, CryptoError, SymmetricKey,
};
use shared_types::EnclaveIdentity;
use zeroize::Zeroize;

const SEALING_DOMAIN: &[u8] = b"oc-sealing-key-v1";

/// `u32-BE len || bytes`, so adjacent fields cannot shift into each other.
fn length_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

/// Derive the sealing key for a policy.
pub fn derive_sealing_key(
    platform_secret: &SecretBytes,
    policy: SealPolicy,
    identity: &EnclaveIdentity,
) -> SymmetricKey {
    let mut material = Vec::with_capacity(128);
    material.extend_from_slice(SEALING_DOMAIN);
    length_prefixed(&mut material, platform_secret.expose());
    material.push(policy.to_byte());
    match policy {
        SealPolicy::MrEnclave => length_prefixed(&mut material, &identity.unique_id),
        SealPolicy::MrSigner => {
            length_prefixed(&mut material, &identity.signer_id);
            length_prefixed(&mut material, &identity.product_id);
        }
    }
    let key = SymmetricKey::from_bytes(shared_crypto::sha256(&material));
    material.zeroize();
    key
}

/// Seal `plaintext` under `key` with a fresh random nonce.
pub fn seal_with_key(
    key: &SymmetricKey,
    policy: SealPolicy,
    plaintext: &[u8],
) -> Result<SealedBlob, SealError> {
    let plaintext_len = u32::try_from(plaintext.len())
        .map_err(|_| SealError::Seal(format!("plaintext too large: {}", plaintext.len())))?;
    let nonce = random_nonce();
    let aad = SealedBlob::header(policy, &nonce, plaintext_len);

    let ciphertext = aead_encrypt_with_aad(key, &nonce, plaintext, &aad)
        .map_err(|e| SealError::Seal(e.to_string()))?;

    Ok(SealedBlob {
        policy,
        nonce,
        plaintext_len,
        ciphertext,
    })
}

/// Unseal a blob. Authentication failure is `Unseal`, never partial output.
pub fn unseal_with_key(key: &SymmetricKey, blob: &SealedBlob) -> Result<SecretBytes, SealError> {
    let aad = blob.header_bytes();
    let plaintext =
        aead_decrypt_with_aad(key, &blob.nonce, &blob.ciphertext, &aad).map_err(|e| match e {
            CryptoError::AuthError => {
                SealError::Unseal("authentication failed (wrong platform or measurement)".into())
            }
            other => SealError::Corrupted(other.to_string()),
        })?;
    let plaintext = SecretBytes::new(plaintext);

    if plaintext.len() != blob.plaintext_len as usize {
        return Err(SealError::Corrupted(format!(
            "plaintext length {} does not match header {}",
            plaintext.len(),
            blob.plaintext_len
        )));
    }
    Ok(plaintext)
}
