//! # Data Deal
//!
//! A seller's submission is verified against the deal schema, then
//! re-encrypted for the buyer on delivery. Plaintext only exists inside
//! the oracle.

#[cfg(test)]
mod tests {
    use crate::fixture::{data_hash, DataDeal, Network};
    use oc_04_vote_tx::VoteMessage;
    use oc_05_vote_events::{ContentStore, VoteEventKind};
    use shared_bus::EventPublisher;
    use shared_types::{SaleStatus, VoteOption};

    const RECORD: &[u8] = br#"{"name":"alice","age":42}"#;

    #[tokio::test]
    async fn test_sale_verified_then_delivered_to_buyer() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(7);

        let sale = deal.publish_sale(
            &network,
            RECORD,
            data_hash(RECORD),
            SaleStatus::VerificationVotingPeriod,
        );
        oracle.bus.publish(deal.event("data_verification", &sale)).await;
        let votes = oracle.wait_for_votes(1).await;
        assert!(matches!(
            &votes[0],
            VoteMessage::DataVerification(v) if v.vote_option == VoteOption::Yes && v.deal_id == 7
        ));

        let sale = deal.set_status(&network, &sale, SaleStatus::DeliveryVotingPeriod);
        oracle.bus.publish(deal.event("data_delivery", &sale)).await;
        let votes = oracle.wait_for_votes(2).await;
        let cid = match &votes[1] {
            VoteMessage::DataDelivery(v) => {
                assert_eq!(v.vote_option, VoteOption::Yes);
                v.delivered_cid.clone()
            }
            other => panic!("unexpected vote {other:?}"),
        };

        let delivered = network.content.get(&cid).await.unwrap();
        assert_ne!(delivered, RECORD);
        assert_eq!(deal.buyer_open(&network, &sale, &delivered), RECORD);
        assert_eq!(
            oracle.metrics.votes(),
            vec![
                (VoteEventKind::DataVerification, VoteOption::Yes),
                (VoteEventKind::DataDelivery, VoteOption::Yes),
            ]
        );

        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_two_sellers_delivered_to_one_buyer() {
        const OTHER_RECORD: &[u8] = br#"{"name":"bob","age":17}"#;
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let first = DataDeal::new(11);
        let second = first.other_seller();

        let sales = [
            first.publish_sale(&network, RECORD, data_hash(RECORD), SaleStatus::DeliveryVotingPeriod),
            second.publish_sale(
                &network,
                OTHER_RECORD,
                data_hash(OTHER_RECORD),
                SaleStatus::DeliveryVotingPeriod,
            ),
        ];
        oracle.bus.publish(first.event("data_delivery", &sales[0])).await;
        oracle.wait_for_votes(1).await;
        oracle.bus.publish(second.event("data_delivery", &sales[1])).await;
        let votes = oracle.wait_for_votes(2).await;

        for ((vote, sale), (party, record)) in votes
            .iter()
            .zip(&sales)
            .zip([(&first, RECORD), (&second, OTHER_RECORD)])
        {
            let VoteMessage::DataDelivery(v) = vote else {
                panic!("unexpected vote {vote:?}");
            };
            assert_eq!(v.vote_option, VoteOption::Yes);
            let delivered = network.content.get(&v.delivered_cid).await.unwrap();
            assert_eq!(party.buyer_open(&network, sale, &delivered), record);
        }
        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_hash_mismatch_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(8);

        let sale = deal.publish_sale(
            &network,
            RECORD,
            data_hash(b"something else"),
            SaleStatus::VerificationVotingPeriod,
        );
        oracle.bus.publish(deal.event("data_verification", &sale)).await;

        let votes = oracle.wait_for_votes(1).await;
        assert_eq!(votes[0].vote_option(), VoteOption::No);
        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_schema_violation_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(9);

        let record = br#"{"name":"bob","age":"unknown"}"#;
        let sale = deal.publish_sale(
            &network,
            record,
            data_hash(record),
            SaleStatus::VerificationVotingPeriod,
        );
        oracle.bus.publish(deal.event("data_verification", &sale)).await;

        let votes = oracle.wait_for_votes(1).await;
        assert_eq!(votes[0].vote_option(), VoteOption::No);
        assert_eq!(oracle.metrics.failures(), vec!["schema".to_string()]);
        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_delivery_before_verification_voted_no() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(10);

        let sale = deal.publish_sale(
            &network,
            RECORD,
            data_hash(RECORD),
            SaleStatus::VerificationVotingPeriod,
        );
        oracle.bus.publish(deal.event("data_delivery", &sale)).await;

        let votes = oracle.wait_for_votes(1).await;
        match &votes[0] {
            VoteMessage::DataDelivery(v) => {
                assert_eq!(v.vote_option, VoteOption::No);
                assert!(v.delivered_cid.is_empty());
            }
            other => panic!("unexpected vote {other:?}"),
        }
        oracle.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_content_store_outage_casts_nothing() {
        let network = Network::new();
        let oracle = network.start_oracle().await;
        let deal = DataDeal::new(11);

        let sale = deal.publish_sale(
            &network,
            RECORD,
            data_hash(RECORD),
            SaleStatus::VerificationVotingPeriod,
        );
        network.content.set_offline(true);
        oracle.bus.publish(deal.event("data_verification", &sale)).await;

        assert!(
            crate::fixture::wait_until(|| !oracle.metrics.dropped().is_empty()).await
        );
        assert!(oracle.broadcaster.sent().is_empty());
        oracle.handle.shutdown().await;
    }
}
