//! # Ports
//!
//! Inbound API and outbound dependencies of the sealed key store.

pub mod inbound;
pub mod outbound;

pub use inbound::SealedKeyStoreApi;
pub use outbound::{
    InMemoryBlobStorage, MockSealingKeyProvider, SealedBlobStorage, SealingKeyProvider,
};
