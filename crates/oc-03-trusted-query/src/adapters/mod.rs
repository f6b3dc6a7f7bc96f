//! # Adapters
//!
//! Trusted block persistence over sealed storage. The RPC transport lives
//! in the node runtime.

pub mod sealed_store;

pub use sealed_store::SealedTrustedBlockStore;
