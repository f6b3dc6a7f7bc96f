//! # OC-01 Sealed Keys
//!
//! Seals secret key material to a hardware-derived key so it can sit on
//! disk and only be reopened by the same platform and enclave measurement.
//!
//! **Subsystem ID:** 1  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Managed Secrets
//!
//! | Slot | Contents | Lifecycle |
//! |------|----------|-----------|
//! | `NodeKey` | per-node transport key | generated on first boot |
//! | `OracleKey` | key shared by the oracle fleet | generated by the first oracle, otherwise imported via hand-off |
//! | `AccountKey` | vote-signing account key | provisioned by the operator |
//! | `TrustedBlock` | light-client root of trust | rewritten whenever trust advances |
//!
//! Each slot has its own file. Unsealed bytes live in a zeroizing
//! [`SecretBytes`] only for the operation that needs them.
//!
//! ## Module Structure
//!
//! ```text
//! oc-01-sealed-keys/
//! ├── domain/          # SealedBlob format, SealPolicy, KeySlot, SecretBytes, errors
//! ├── algorithms/      # Sealing-key derivation, seal / unseal
//! ├── ports/           # SealedKeyStoreApi (inbound), provider + storage (outbound)
//! ├── adapters/        # FileSealedStore, PlatformSealingKeyProvider
//! ├── application/     # SealedKeyStore service, KeyHandoff
//! └── config.rs        # SealedKeyConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{FileSealedStore, PlatformSealingKeyProvider};
pub use algorithms::{derive_sealing_key, seal_with_key, unseal_with_key};
pub use application::{encrypt_oracle_key, KeyHandoff, SealedKeyStore};
pub use config::SealedKeyConfig;
pub use domain::{KeySlot, SealError, SealPolicy, SealedBlob, SecretBytes};
pub use ports::{
    InMemoryBlobStorage, MockSealingKeyProvider, SealedBlobStorage, SealedKeyStoreApi,
    SealingKeyProvider,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
