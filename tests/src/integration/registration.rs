//! # Registration and Oracle Key Hand-off
//!
//! A new node publishes an attested registration request, a running oracle
//! votes on it, and the node imports the oracle key from the approved
//! record.

#[cfg(test)]
mod tests {
    use crate::fixture::{enclave, identity, Network};
    use node_runtime::wiring::{ensure_key, obtain_oracle_key, registration_request};
    use node_runtime::StartupError;
    use oc_01_sealed_keys::{KeySlot, SealedKeyStoreApi};
    use oc_04_vote_tx::VoteMessage;
    use shared_bus::{ChainEvent, EventPublisher};
    use shared_types::{registration_key, OracleRecord, RecordStatus, VoteOption, ORACLE_STORE};

    fn register_event(record: &OracleRecord) -> ChainEvent {
        ChainEvent::new("register_oracle", 9)
            .with_attribute("unique_id", record.unique_id.clone())
            .with_attribute("node_address", hex::encode(record.node_address))
    }

    fn publish(network: &Network, record: &OracleRecord) {
        network.chain.set_record(
            ORACLE_STORE,
            registration_key(&record.unique_id, &record.node_address),
            record,
        );
        network.chain.produce_blocks(2);
    }

    #[tokio::test]
    async fn test_new_node_joins_through_vote_and_handoff() {
        let network = Network::new();
        let oracle = network.start_oracle().await;

        // The joining node runs the active enclave version.
        let attest = enclave(&network.identity);
        let query = network.light_client().await;
        let keys = network.node_keys(&network.identity);
        let node_key = ensure_key(&keys, KeySlot::NodeKey).unwrap();

        let first = obtain_oracle_key(&keys, &*query, &attest, &node_key, false).await;
        assert!(matches!(first, Err(StartupError::NotRegistered { .. })));

        let mut record = registration_request(&*query, &attest, &node_key).await.unwrap();
        publish(&network, &record);
        oracle.bus.publish(register_event(&record)).await;

        let votes = oracle.wait_for_votes(1).await;
        let encrypted = match &votes[0] {
            VoteMessage::OracleRegistration(vote) => {
                assert_eq!(vote.vote_option, VoteOption::Yes);
                assert_eq!(vote.voting_target_address, node_key.address());
                vote.encrypted_oracle_priv_key.clone().unwrap()
            }
            other => panic!("unexpected vote {other:?}"),
        };

        // The chain tallies the votes and stores the key in the record.
        record.encrypted_oracle_priv_key = Some(encrypted);
        record.status = RecordStatus::Passed;
        publish(&network, &record);

        let oracle_key = obtain_oracle_key(&keys, &*query, &attest, &node_key, false)
            .await
            .unwrap();
        assert_eq!(oracle_key.public_key(), network.oracle_key.public_key());
        assert!(keys.contains(KeySlot::OracleKey).unwrap());

        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_report_from_other_enclave_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;

        // Attested by an enclave of another build, but claiming ours.
        let impostor = enclave(&identity(9));
        let query = network.light_client().await;
        let node_key = shared_crypto::Secp256k1KeyPair::generate();
        let mut record = registration_request(&*query, &impostor, &node_key).await.unwrap();
        record.unique_id = network.identity.unique_id_hex();
        publish(&network, &record);

        oracle.bus.publish(register_event(&record)).await;
        let votes = oracle.wait_for_votes(1).await;
        match &votes[0] {
            VoteMessage::OracleRegistration(vote) => {
                assert_eq!(vote.vote_option, VoteOption::No);
                assert!(vote.encrypted_oracle_priv_key.is_none());
            }
            other => panic!("unexpected vote {other:?}"),
        }
        assert_eq!(oracle.metrics.failures(), vec!["attestation".to_string()]);

        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_key_bound_to_other_node_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;

        let attest = enclave(&network.identity);
        let query = network.light_client().await;
        let node_key = shared_crypto::Secp256k1KeyPair::generate();
        let mut record = registration_request(&*query, &attest, &node_key).await.unwrap();
        // Swap in a key the report does not vouch for.
        record.node_pub_key = shared_crypto::Secp256k1KeyPair::generate()
            .public_key()
            .as_bytes()
            .to_vec();
        publish(&network, &record);

        oracle.bus.publish(register_event(&record)).await;
        let votes = oracle.wait_for_votes(1).await;
        assert_eq!(votes[0].vote_option(), VoteOption::No);

        oracle.handle.shutdown().await;
    }
}
