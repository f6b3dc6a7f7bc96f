//! # Ports
//!
//! Outbound capabilities used by vote decisions and the reactor.

pub mod outbound;

pub use outbound::{
    ContentStore, MockContentStore, NoopMetrics, OracleCapabilities, OracleKeyring,
    ReactorMetrics, RecordingMetrics,
};
