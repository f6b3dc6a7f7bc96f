//! # Application Layer
//!
//! Sealed key store service and the oracle key hand-off.

pub mod handoff;
pub mod service;

pub use handoff::{encrypt_oracle_key, KeyHandoff};
pub use service::SealedKeyStore;
