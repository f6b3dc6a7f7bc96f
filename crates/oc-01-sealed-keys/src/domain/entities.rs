//! # Domain Entities
//!
//! Sealed blob layout (all integers big-endian):
//!
//! ```text
//! ┌───────┬─────────┬────────┬──────────┬───────────────┬──────────────────┐
//! │ magic │ version │ policy │  nonce   │ plaintext len │ ciphertext + tag │
//! │ 4 B   │ 1 B     │ 1 B    │ 12 B     │ u32           │ len + 16 B       │
//! └───────┴─────────┴────────┴──────────┴───────────────┴──────────────────┘
//! ```
//!
//! The 22-byte header is the AEAD associated data.

use super::errors::SealError;
use serde::{Deserialize, Serialize};
use shared_crypto::NONCE_LEN;
use std::fmt;

/// Blob magic.
pub const SEAL_MAGIC: &[u8; 4] = b"OCSL";

/// Current blob format version.
pub const SEAL_VERSION: u8 = 1;

/// Header length in bytes.
pub const HEADER_LEN: usize = 4 + 1 + 1 + NONCE_LEN + 4;

/// AES-GCM tag length.
pub const TAG_LEN: usize = 16;

/// Which enclave measurement the sealing key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SealPolicy {
    /// Bound to the exact enclave build (`unique_id`). A new build cannot
    /// unseal.
    #[default]
    MrEnclave,
    /// Bound to the signer and product (`signer_id`, `product_id`). Later
    /// builds from the same signer can unseal.
    MrSigner,
}

impl SealPolicy {
    /// Header byte for this policy.
    pub fn to_byte(self) -> u8 {
        match self {
            SealPolicy::MrEnclave => 1,
            SealPolicy::MrSigner => 2,
        }
    }

    /// Parse a header byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(SealPolicy::MrEnclave),
            2 => Some(SealPolicy::MrSigner),
            _ => None,
        }
    }

    /// Parse a configuration value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "mrenclave" | "mr_enclave" | "enclave" => Some(SealPolicy::MrEnclave),
            "mrsigner" | "mr_signer" | "signer" => Some(SealPolicy::MrSigner),
            _ => None,
        }
    }
}

/// A named place a sealed blob is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySlot {
    /// Per-node transport key.
    NodeKey,
    /// Key shared by the whole oracle fleet.
    OracleKey,
    /// Account key used to sign vote transactions.
    AccountKey,
    /// Last trusted block of the light client.
    TrustedBlock,
}

impl KeySlot {
    /// Every slot, in a fixed order.
    pub const ALL: [KeySlot; 4] = [
        KeySlot::NodeKey,
        KeySlot::OracleKey,
        KeySlot::AccountKey,
        KeySlot::TrustedBlock,
    ];

    /// Log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeySlot::NodeKey => "node-key",
            KeySlot::OracleKey => "oracle-key",
            KeySlot::AccountKey => "account-key",
            KeySlot::TrustedBlock => "trusted-block",
        }
    }
}

impl fmt::Display for KeySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An opaque sealed secret plus the plaintext length it carries.
#[derive(Clone, PartialEq, Eq)]
pub struct SealedBlob {
    /// Policy the sealing key was derived under.
    pub policy: SealPolicy,
    /// AEAD nonce, fresh per seal.
    pub nonce: [u8; NONCE_LEN],
    /// Length of the sealed plaintext.
    pub plaintext_len: u32,
    /// Ciphertext followed by the tag.
    pub ciphertext: Vec<u8>,
}

impl SealedBlob {
    /// Serialized header, also used as associated data.
    pub fn header(policy: SealPolicy, nonce: &[u8; NONCE_LEN], plaintext_len: u32) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[..4].copy_from_slice(SEAL_MAGIC);
        header[4] = SEAL_VERSION;
        header[5] = policy.to_byte();
        header[6..6 + NONCE_LEN].copy_from_slice(nonce);
        header[6 + NONCE_LEN..].copy_from_slice(&plaintext_len.to_be_bytes());
        header
    }

    /// Header of this blob.
    pub fn header_bytes(&self) -> [u8; HEADER_LEN] {
        Self::header(self.policy, &self.nonce, self.plaintext_len)
    }

    /// Serialize to the on-disk format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&self.header_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse the on-disk format. Structural problems are `Corrupted`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SealError> {
        if bytes.len() < HEADER_LEN + TAG_LEN {
            return Err(SealError::Corrupted(format!(
                "blob too short: {} bytes",
                bytes.len()
            )));
        }
        if &bytes[..4] != SEAL_MAGIC {
            return Err(SealError::Corrupted("bad magic".into()));
        }
        if bytes[4] != SEAL_VERSION {
            return Err(SealError::Corrupted(format!(
                "unsupported version {}",
                bytes[4]
            )));
        }
        let policy = SealPolicy::from_byte(bytes[5])
            .ok_or_else(|| SealError::Corrupted(format!("unknown policy {}", bytes[5])))?;

        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&bytes[6..6 + NONCE_LEN]);

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&bytes[6 + NONCE_LEN..HEADER_LEN]);
        let plaintext_len = u32::from_be_bytes(len_bytes);

        let ciphertext = bytes[HEADER_LEN..].to_vec();
        if ciphertext.len() != plaintext_len as usize + TAG_LEN {
            return Err(SealError::Corrupted(format!(
                "length mismatch: header says {}, body holds {}",
                plaintext_len,
                ciphertext.len().saturating_sub(TAG_LEN)
            )));
        }

        Ok(Self {
            policy,
            nonce,
            plaintext_len,
            ciphertext,
        })
    }
}

impl fmt::Debug for SealedBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealedBlob")
            .field("policy", &self.policy)
            .field("plaintext_len", &self.plaintext_len)
            .finish_non_exhaustive()
    }
}
