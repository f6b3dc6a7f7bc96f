//! # Event Subscriber
//!
//! Defines the subscription side of the event bus.

use crate::events::{ChainEvent, EventFilter};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The event bus was closed.
    #[error("Event bus closed")]
    Closed,
}

/// Trait for anything that hands out filtered subscriptions.
pub trait EventSubscriber: Send + Sync {
    /// Subscribe to events matching a filter.
    fn subscribe(&self, filter: EventFilter) -> Subscription;
}

impl EventSubscriber for crate::publisher::InMemoryEventBus {
    fn subscribe(&self, filter: EventFilter) -> Subscription {
        crate::publisher::InMemoryEventBus::subscribe(self, filter)
    }
}

/// A subscription handle for receiving matching events in delivery order.
///
/// The bus only enqueues events that match the filter, and never drops one.
pub struct Subscription {
    receiver: mpsc::Receiver<ChainEvent>,
    filter: EventFilter,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<ChainEvent>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next matching event.
    ///
    /// Returns `None` once the bus is dropped and the queue is drained.
    pub async fn recv(&mut self) -> Option<ChainEvent> {
        self.receiver.recv().await
    }

    /// Try to receive the next event without blocking.
    ///
    /// - `Ok(Some(event))` - An event was available
    /// - `Ok(None)` - No event available
    /// - `Err(SubscriptionError::Closed)` - The bus was dropped
    pub fn try_recv(&mut self) -> Result<Option<ChainEvent>, SubscriptionError> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(SubscriptionError::Closed),
        }
    }

    /// Get the filter for this subscription.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
