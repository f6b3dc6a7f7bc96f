//! # Shared Types Crate
//!
//! Domain entities used by every oracle subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: records read from the chain are defined once
//!   here and decoded with [`decode_record`].
//! - **Read-only chain records**: registration, upgrade, deal and sale records
//!   are created by the chain; this node only reads and votes on them.
//! - **No secrets**: nothing in this crate holds key material.

pub mod entities;
pub mod errors;
pub mod keys;

pub use entities::*;
pub use errors::*;
pub use keys::*;

/// Decode a bincode-encoded chain record.
pub fn decode_record<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, RecordError> {
    bincode::deserialize(bytes).map_err(|e| RecordError::Decode(e.to_string()))
}

/// Encode a chain record with the canonical bincode encoding.
pub fn encode_record<T: serde::Serialize>(record: &T) -> Result<Vec<u8>, RecordError> {
    bincode::serialize(record).map_err(|e| RecordError::Encode(e.to_string()))
}
