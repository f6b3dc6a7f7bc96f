//! # Ports
//!
//! Inbound vote API; outbound broadcaster and account reader.

pub mod inbound;
pub mod outbound;

pub use inbound::VoteTxApi;
pub use outbound::{AccountReader, MockAccountReader, MockBroadcaster, TxBroadcaster};
