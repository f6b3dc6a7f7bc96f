//! # Enclave Upgrade
//!
//! Nodes of the pending version obtain the oracle key through upgrade
//! votes; once the upgrade vote ends only the new active version votes.

#[cfg(test)]
mod tests {
    use crate::fixture::{data_hash, enclave, identity, wait_until, DataDeal, Network};
    use node_runtime::wiring::{ensure_key, obtain_oracle_key, registration_request};
    use oc_01_sealed_keys::KeySlot;
    use oc_04_vote_tx::VoteMessage;
    use oc_05_vote_events::{VoteEventKind, UPGRADE_VOTE_ENDED};
    use shared_bus::{ChainEvent, EventPublisher};
    use shared_types::{upgrade_key, OracleRecord, RecordStatus, SaleStatus, VoteOption, ORACLE_STORE};

    fn upgrade_event(record: &OracleRecord) -> ChainEvent {
        ChainEvent::new("upgrade_oracle", 12)
            .with_attribute("unique_id", record.unique_id.clone())
            .with_attribute("node_address", hex::encode(record.node_address))
    }

    fn vote_ended(active: &str) -> ChainEvent {
        ChainEvent::new(UPGRADE_VOTE_ENDED, 20).with_attribute("unique_id", active)
    }

    fn publish(network: &Network, record: &OracleRecord) {
        network.chain.set_record(
            ORACLE_STORE,
            upgrade_key(&record.unique_id, &record.node_address),
            record,
        );
        network.chain.produce_blocks(2);
    }

    #[tokio::test]
    async fn test_pending_upgrade_request_gets_oracle_key() {
        let network = Network::new();
        let own = network.identity.unique_id_hex();
        network.publish_params(&own, Some(own.clone()));
        let oracle = network.start_oracle().await;

        let attest = enclave(&network.identity);
        let query = network.light_client().await;
        let keys = network.node_keys(&network.identity);
        let node_key = ensure_key(&keys, KeySlot::NodeKey).unwrap();
        let mut record = registration_request(&*query, &attest, &node_key).await.unwrap();
        publish(&network, &record);

        oracle.bus.publish(upgrade_event(&record)).await;
        let votes = oracle.wait_for_votes(1).await;
        let encrypted = match &votes[0] {
            VoteMessage::OracleUpgrade(vote) => {
                assert_eq!(vote.vote_option, VoteOption::Yes);
                vote.encrypted_oracle_priv_key.clone().unwrap()
            }
            other => panic!("unexpected vote {other:?}"),
        };

        record.encrypted_oracle_priv_key = Some(encrypted);
        record.status = RecordStatus::Passed;
        publish(&network, &record);
        let oracle_key = obtain_oracle_key(&keys, &*query, &attest, &node_key, false)
            .await
            .unwrap();
        assert_eq!(oracle_key.public_key(), network.oracle_key.public_key());

        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_upgrade_without_pending_version_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;

        let attest = enclave(&network.identity);
        let query = network.light_client().await;
        let node_key = shared_crypto::Secp256k1KeyPair::generate();
        let record = registration_request(&*query, &attest, &node_key).await.unwrap();
        publish(&network, &record);

        oracle.bus.publish(upgrade_event(&record)).await;
        let votes = oracle.wait_for_votes(1).await;
        assert_eq!(votes[0].vote_option(), VoteOption::No);
        assert_eq!(oracle.metrics.failures(), vec!["upgrade".to_string()]);

        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_vote_end_hands_voting_to_new_version() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let gate = oracle.reactor.gate();
        let successor = identity(4).unique_id_hex();

        network.publish_params(&successor, None);
        oracle.bus.publish(vote_ended(&successor)).await;
        assert!(wait_until(|| !gate.is_enabled(VoteEventKind::DataVerification)).await);
        assert!(VoteEventKind::ALL.iter().all(|kind| !gate.is_enabled(*kind)));

        // A retired version drops work instead of voting.
        let deal = DataDeal::new(21);
        let record = br#"{"name":"carol","age":7}"#;
        let sale = deal.publish_sale(
            &network,
            record,
            data_hash(record),
            SaleStatus::VerificationVotingPeriod,
        );
        oracle.bus.publish(deal.event("data_verification", &sale)).await;
        assert!(wait_until(|| !oracle.metrics.dropped().is_empty()).await);
        assert!(oracle.broadcaster.sent().is_empty());

        // Rolled back to this version.
        let own = network.identity.unique_id_hex();
        network.publish_params(&own, None);
        oracle.bus.publish(vote_ended(&own)).await;
        assert!(wait_until(|| gate.is_enabled(VoteEventKind::DataVerification)).await);

        oracle.handle.shutdown().await;
    }
}
