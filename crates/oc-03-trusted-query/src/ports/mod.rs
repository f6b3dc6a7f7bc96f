//! # Ports
//!
//! Inbound query API; outbound chain transport and trust persistence.

pub mod inbound;
pub mod outbound;

pub use inbound::TrustedQueryApi;
pub use outbound::{ChainTransport, InMemoryTrustedBlockStore, MockChain, TrustedBlockPersistence};
