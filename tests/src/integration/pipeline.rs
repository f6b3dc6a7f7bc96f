//! # Event Pipeline
//!
//! Chain block events flow through the node's event bridge into the bus and
//! reach only the handlers whose filters match.

#[cfg(test)]
mod tests {
    use crate::fixture::{data_hash, wait_until, DataDeal, Network};
    use async_trait::async_trait;
    use node_runtime::adapters::{BlockEventSource, EventBridge, RpcError};
    use oc_05_vote_events::VoteEventKind;
    use parking_lot::Mutex;
    use shared_bus::ChainEvent;
    use shared_types::{SaleStatus, VoteOption};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;

    /// Block results served from memory.
    #[derive(Clone, Default)]
    struct BlockResults {
        blocks: Arc<Mutex<BTreeMap<i64, Vec<ChainEvent>>>>,
    }

    impl BlockResults {
        fn commit(&self, height: i64, events: Vec<ChainEvent>) {
            self.blocks.lock().insert(height, events);
        }
    }

    #[async_trait]
    impl BlockEventSource for BlockResults {
        async fn latest_height(&self) -> Result<i64, RpcError> {
            Ok(self.blocks.lock().keys().next_back().copied().unwrap_or(0))
        }

        async fn block_events(&self, height: i64) -> Result<Vec<ChainEvent>, RpcError> {
            Ok(self.blocks.lock().get(&height).cloned().unwrap_or_default())
        }
    }

    #[tokio::test]
    async fn test_block_events_reach_matching_handlers() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(31);
        let record = br#"{"name":"dave","age":30}"#;
        let sale = deal.publish_sale(
            &network,
            record,
            data_hash(record),
            SaleStatus::VerificationVotingPeriod,
        );

        let results = BlockResults::default();
        results.commit(
            1,
            vec![
                ChainEvent::new("transfer", 1).with_attribute("amount", "5"),
                // Another enclave version's registration.
                ChainEvent::new("register_oracle", 1)
                    .with_attribute("unique_id", "ee".repeat(32))
                    .with_attribute("node_address", hex::encode([1u8; 20])),
            ],
        );
        results.commit(2, vec![deal.event("data_verification", &sale)]);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let bridge = EventBridge::new(
            results.clone(),
            Arc::clone(&oracle.bus),
            1,
            Duration::from_millis(10),
        );
        let task = tokio::spawn(bridge.run(shutdown_rx));

        let votes = oracle.wait_for_votes(1).await;
        assert_eq!(votes.len(), 1);
        assert_eq!(
            oracle.metrics.votes(),
            vec![(VoteEventKind::DataVerification, VoteOption::Yes)]
        );
        assert!(oracle.metrics.dropped().is_empty());

        // Later blocks keep flowing.
        let sale = deal.set_status(&network, &sale, SaleStatus::DeliveryVotingPeriod);
        results.commit(3, vec![deal.event("data_delivery", &sale)]);
        assert!(wait_until(|| oracle.metrics.votes().len() == 2).await);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap();
        assert_eq!(oracle.handle.shutdown().await, 0);
    }
}
