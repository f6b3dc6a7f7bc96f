//! # Event Bridge
//!
//! Polls the chain for block events and publishes them into the in-process
//! bus. Each block's events are published once, in height order; a failed
//! poll retries from the first unpublished height.
//!
//! The bus only queues events some vote handler subscribed to, and holds the
//! bridge back while a handler's queue is full. A shutdown signal interrupts
//! a held-back poll.

use crate::adapters::rpc::RpcError;
use async_trait::async_trait;
use shared_bus::{ChainEvent, EventPublisher};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Source of per-block events.
#[async_trait]
pub trait BlockEventSource: Send + Sync {
    /// Latest committed height.
    async fn latest_height(&self) -> Result<i64, RpcError>;

    /// Events emitted by the block at `height`.
    async fn block_events(&self, height: i64) -> Result<Vec<ChainEvent>, RpcError>;
}

/// Forwards chain events into the bus.
pub struct EventBridge<S: BlockEventSource, P: EventPublisher> {
    source: S,
    bus: Arc<P>,
    next_height: i64,
    poll_interval: Duration,
}

impl<S: BlockEventSource, P: EventPublisher> EventBridge<S, P> {
    /// Bridge publishing blocks from `start_height` on.
    pub fn new(source: S, bus: Arc<P>, start_height: i64, poll_interval: Duration) -> Self {
        Self {
            source,
            bus,
            next_height: start_height,
            poll_interval,
        }
    }

    /// First height not yet published.
    pub fn next_height(&self) -> i64 {
        self.next_height
    }

    /// Publish every block up to the latest height. Returns the number of
    /// events published.
    pub async fn poll_once(&mut self) -> Result<usize, RpcError> {
        let latest = self.source.latest_height().await?;
        let mut published = 0;
        while self.next_height <= latest {
            let events = self.source.block_events(self.next_height).await?;
            for event in events {
                self.bus.publish(event).await;
                published += 1;
            }
            self.next_height += 1;
        }
        if published > 0 {
            debug!(published, next_height = self.next_height, "Bridged chain events");
        }
        Ok(published)
    }

    /// Poll until shutdown is signalled.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(from = self.next_height, "Event bridge started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Event bridge shutdown signal received");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {
                    let result = tokio::select! {
                        _ = shutdown.changed() => {
                            info!(height = self.next_height, "Event bridge stopped mid-poll");
                            break;
                        }
                        result = self.poll_once() => result,
                    };
                    if let Err(e) = result {
                        warn!(height = self.next_height, "Event poll failed, retrying: {}", e);
                    }
                }
            }
        }
    }
}
