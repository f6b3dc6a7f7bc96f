//! # Event Publisher
//!
//! Defines the publishing side of the event bus.
//!
//! The bus is a router: each subscription owns a bounded queue that only
//! receives events matching its filter. Unrelated traffic never occupies a
//! subscriber's queue, and a full queue makes `publish` wait rather than
//! drop an event.

use crate::events::{ChainEvent, EventFilter};
use crate::subscriber::Subscription;
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Trait for publishing chain events to the bus.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish an event to the bus.
    ///
    /// Returns the number of subscriptions that received the event.
    async fn publish(&self, event: ChainEvent) -> usize;

    /// Get the total number of events published.
    fn events_published(&self) -> u64;
}

struct Route {
    filter: EventFilter,
    sender: mpsc::Sender<ChainEvent>,
}

/// In-memory implementation of the event bus.
pub struct InMemoryEventBus {
    routes: Mutex<Vec<Route>>,
    events_published: AtomicU64,
    capacity: usize,
}

impl InMemoryEventBus {
    /// Create a new in-memory event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory event bus whose subscriptions buffer up to
    /// `capacity` matching events each.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            routes: Mutex::new(Vec::new()),
            events_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Subscribe to events matching a filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(query = %filter.to_query(), "New subscription created");
        let (sender, receiver) = mpsc::channel(self.capacity);
        self.routes.lock().push(Route {
            filter: filter.clone(),
            sender,
        });
        Subscription::new(receiver, filter)
    }

    /// Get the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        let mut routes = self.routes.lock();
        routes.retain(|route| !route.sender.is_closed());
        routes.len()
    }

    /// Matching events buffered per subscription.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn matching_senders(&self, event: &ChainEvent) -> Vec<mpsc::Sender<ChainEvent>> {
        let mut routes = self.routes.lock();
        routes.retain(|route| !route.sender.is_closed());
        routes
            .iter()
            .filter(|route| route.filter.matches(event))
            .map(|route| route.sender.clone())
            .collect()
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: ChainEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        let senders = self.matching_senders(&event);
        if senders.is_empty() {
            trace!(event_type = %event.event_type, height = event.height, "No subscriber for event");
            return 0;
        }

        let mut delivered = 0;
        for sender in senders {
            // Waits while the subscriber's queue is full.
            if sender.send(event.clone()).await.is_ok() {
                delivered += 1;
            }
        }
        debug!(
            event_type = %event.event_type,
            height = event.height,
            receivers = delivered,
            "Event published"
        );
        delivered
    }

    fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    fn event() -> ChainEvent {
        ChainEvent::new("register_oracle", 1).with_attribute("unique_id", "u1")
    }

    #[tokio::test]
    async fn test_publish_no_subscribers() {
        let bus = InMemoryEventBus::new();

        let receivers = bus.publish(event()).await;
        assert_eq!(receivers, 0);
        assert_eq!(bus.events_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_with_subscriber() {
        let bus = InMemoryEventBus::new();
        let _sub = bus.subscribe(EventFilter::with_key("register_oracle", "unique_id"));

        let receivers = bus.publish(event()).await;

        assert_eq!(receivers, 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_only_matching_subscribers_receive() {
        let bus = InMemoryEventBus::new();
        let _a = bus.subscribe(EventFilter::with_key("register_oracle", "unique_id"));
        let _b = bus.subscribe(EventFilter::with_key("upgrade_oracle", "unique_id"));

        assert_eq!(bus.publish(event()).await, 1);
    }

    #[tokio::test]
    async fn test_unrelated_traffic_does_not_displace_matching_events() {
        let bus = InMemoryEventBus::with_capacity(4);
        let mut sub = bus.subscribe(EventFilter::with_key("data_verification", "deal_id"));

        bus.publish(ChainEvent::new("data_verification", 1).with_attribute("deal_id", "1"))
            .await;
        for height in 0..5_000 {
            bus.publish(ChainEvent::new("transfer", height).with_attribute("amount", "1"))
                .await;
        }
        bus.publish(ChainEvent::new("data_verification", 2).with_attribute("deal_id", "2"))
            .await;

        assert_eq!(sub.recv().await.map(|e| e.height), Some(1));
        assert_eq!(sub.recv().await.map(|e| e.height), Some(2));
    }

    #[tokio::test]
    async fn test_full_queue_applies_backpressure() {
        let bus = std::sync::Arc::new(InMemoryEventBus::with_capacity(1));
        let mut sub = bus.subscribe(EventFilter::with_key("register_oracle", "unique_id"));

        assert_eq!(bus.publish(event()).await, 1);
        let publisher = {
            let bus = bus.clone();
            tokio::spawn(async move { bus.publish(event()).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!publisher.is_finished());

        assert!(sub.recv().await.is_some());
        let delivered = timeout(Duration::from_secs(1), publisher)
            .await
            .expect("publish completes once space frees up")
            .unwrap();
        assert_eq!(delivered, 1);
        assert!(sub.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_dropped_subscription_does_not_block_publish() {
        let bus = InMemoryEventBus::with_capacity(1);
        let sub = bus.subscribe(EventFilter::with_key("register_oracle", "unique_id"));
        drop(sub);

        for _ in 0..3 {
            assert_eq!(bus.publish(event()).await, 0);
        }
    }
}
