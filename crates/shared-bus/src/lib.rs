//! # Shared Bus - Chain Event Subscription
//!
//! Chain events are pushed into an in-process bus by the node runtime's
//! event bridge. The bus routes each event to the subscriptions whose
//! filter matches it; each vote event kind drains its own bounded queue in
//! delivery order. A full queue holds the publisher back, so no matching
//! event is ever dropped.
//!
//! ```text
//! ┌──────────────┐   publish()   ┌──────────────┐  filter  ┌───────┐  recv()  ┌──────────────┐
//! │ Event bridge │ ────────────▶ │  Event Bus   │ ───────▶ │ queue │ ───────▶ │ Vote handler │
//! └──────────────┘               └──────────────┘          └───────┘          └──────────────┘
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{ChainEvent, EventFilter};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventSubscriber, Subscription, SubscriptionError};

/// Matching events buffered per subscription before `publish` waits.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        assert_eq!(DEFAULT_CHANNEL_CAPACITY, 1000);
    }
}
