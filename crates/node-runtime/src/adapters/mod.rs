//! # Adapters
//!
//! Network-facing implementations of the subsystem ports.

pub mod content_store;
pub mod event_bridge;
pub mod metrics;
pub mod rpc;

pub use content_store::HttpContentStore;
pub use event_bridge::{BlockEventSource, EventBridge};
pub use metrics::PrometheusMetrics;
pub use rpc::{HttpBroadcaster, HttpChainTransport, RpcClient, RpcError};
