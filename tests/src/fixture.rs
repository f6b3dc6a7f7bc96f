//! # Test Network
//!
//! One mock chain shared by every party of a scenario: voting oracle nodes,
//! a node asking to join, and the seller and buyer of a deal.

use oc_01_sealed_keys::{InMemoryBlobStorage, MockSealingKeyProvider, SealedKeyConfig, SealedKeyStore};
use oc_02_attestation::{AttestationConfig, AttestationService, SimulatedEnclave};
use oc_03_trusted_query::{InMemoryTrustedBlockStore, LightClientConfig, MockChain, TrustedQueryClient};
use oc_04_vote_tx::{MockAccountReader, MockBroadcaster, SignedVote, Tx, VoteMessage, VoteTxBuilder, VoteTxConfig};
use oc_05_vote_events::{
    delivery_nonce, EventReactor, MockContentStore, OracleContext, OracleKeyring, ReactorConfig,
    ReactorHandle, RecordingMetrics,
};
use shared_bus::{ChainEvent, InMemoryEventBus};
use shared_crypto::{aead_decrypt, aead_encrypt, derive_shared_key, sha256, Kdf, Secp256k1KeyPair};
use shared_types::{
    deal_key, oracle_params_key, sale_key, Account, Deal, EnclaveIdentity, FieldKind, OracleParams,
    Sale, SaleStatus, SchemaField, DATADEAL_STORE, ORACLE_STORE,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Light client over the mock chain.
pub type Query = TrustedQueryClient<MockChain, InMemoryTrustedBlockStore>;

/// Capability set of a voting oracle.
pub type Context = OracleContext<
    Query,
    AttestationService<SimulatedEnclave>,
    VoteTxBuilder<MockBroadcaster, MockAccountReader>,
    MockContentStore,
>;

/// Sealed key store of a joining node.
pub type NodeKeys = SealedKeyStore<MockSealingKeyProvider, InMemoryBlobStorage>;

/// Nonce of every deal in these scenarios.
pub const DEAL_NONCE: [u8; 12] = [5; 12];

/// Enclave identity with the given measurement byte.
pub fn identity(unique_id: u8) -> EnclaveIdentity {
    EnclaveIdentity {
        product_id: vec![1],
        signer_id: vec![2; 32],
        unique_id: vec![unique_id; 32],
    }
}

/// Attestation service of a simulated enclave running `identity`.
pub fn enclave(identity: &EnclaveIdentity) -> AttestationService<SimulatedEnclave> {
    AttestationService::bootstrap(
        AttestationConfig::for_testing(),
        SimulatedEnclave::new(SimulatedEnclave::dev_vendor_key(), identity.clone(), 1),
    )
    .unwrap()
}

/// Poll `cond` for up to two seconds.
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// The shared chain and fleet-wide secrets.
pub struct Network {
    /// Mock chain.
    pub chain: MockChain,
    /// Measurement of the active enclave version.
    pub identity: EnclaveIdentity,
    /// Fleet oracle key.
    pub oracle_key: Secp256k1KeyPair,
    /// Content store shared by every party.
    pub content: MockContentStore,
}

impl Network {
    /// A chain with four validators and the oracle params published.
    pub fn new() -> Self {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(2);
        let network = Self {
            chain,
            identity: identity(3),
            oracle_key: Secp256k1KeyPair::generate(),
            content: MockContentStore::new(),
        };
        network.publish_params(&network.identity.unique_id_hex(), None);
        network
    }

    /// Light client anchored at block 1.
    pub async fn light_client(&self) -> Arc<Query> {
        let client = TrustedQueryClient::bootstrap(
            LightClientConfig::for_testing(MockChain::CHAIN_ID),
            self.chain.clone(),
            InMemoryTrustedBlockStore::new(),
            self.chain.block(1).unwrap().trusted_block(),
        )
        .await
        .unwrap();
        Arc::new(client)
    }

    /// Empty sealed key store for a node running `identity`.
    pub fn node_keys(&self, identity: &EnclaveIdentity) -> NodeKeys {
        SealedKeyStore::new(
            MockSealingKeyProvider::new(11, identity.clone()),
            InMemoryBlobStorage::new(),
            SealedKeyConfig::for_testing(Path::new("/tmp/oc-tests")),
        )
        .unwrap()
    }

    /// Publish the oracle params.
    pub fn publish_params(&self, active_unique_id: &str, pending: Option<String>) {
        self.chain.set_record(
            ORACLE_STORE,
            oracle_params_key(),
            &OracleParams {
                unique_id: active_unique_id.to_string(),
                oracle_public_key: self.oracle_key.public_key().as_bytes().to_vec(),
                upgrade_unique_id: pending,
            },
        );
        self.chain.produce_blocks(2);
    }

    /// A voting oracle of the active version, with its reactor running.
    pub async fn start_oracle(&self) -> Oracle {
        let broadcaster = MockBroadcaster::new();
        let account_key = Secp256k1KeyPair::generate();
        let accounts = MockAccountReader::new(Account {
            address: account_key.address(),
            pub_key: None,
            account_number: 1,
            sequence: 0,
        });
        let builder = VoteTxBuilder::new(
            VoteTxConfig::for_testing(MockChain::CHAIN_ID),
            account_key,
            broadcaster.clone(),
            accounts,
        );
        let ctx = Arc::new(OracleContext::new(
            self.light_client().await,
            Arc::new(enclave(&self.identity)),
            Arc::new(builder),
            Arc::new(self.content.clone()),
            OracleKeyring::new(self.oracle_key.clone()),
        ));

        let metrics = Arc::new(RecordingMetrics::new());
        let reactor = EventReactor::new(ctx, ReactorConfig::for_testing(), metrics.clone()).unwrap();
        let bus = Arc::new(InMemoryEventBus::new());
        let handle = reactor.start(&*bus).await;
        Oracle {
            reactor,
            handle,
            bus,
            broadcaster,
            metrics,
        }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

/// A running voting oracle.
pub struct Oracle {
    /// Reactor, for its upgrade gate.
    pub reactor: EventReactor<Context>,
    /// Running handlers.
    pub handle: ReactorHandle,
    /// Bus the reactor consumes.
    pub bus: Arc<InMemoryEventBus>,
    /// Transactions this oracle broadcast.
    pub broadcaster: MockBroadcaster,
    /// Decisions this oracle counted.
    pub metrics: Arc<RecordingMetrics>,
}

impl Oracle {
    /// Votes broadcast so far, in order.
    pub fn votes(&self) -> Vec<VoteMessage> {
        self.broadcaster
            .sent()
            .into_iter()
            .flat_map(|tx: Tx| tx.body.messages)
            .map(|signed: SignedVote| signed.vote)
            .collect()
    }

    /// Wait for the `n`th broadcast vote.
    pub async fn wait_for_votes(&self, n: usize) -> Vec<VoteMessage> {
        assert!(
            wait_until(|| self.broadcaster.sent().len() >= n).await,
            "expected {n} votes, got {}",
            self.broadcaster.sent().len()
        );
        self.votes()
    }
}

/// Seller and buyer of one deal.
pub struct DataDeal {
    /// Deal identifier.
    pub deal_id: u64,
    /// Seller key.
    pub seller: Secp256k1KeyPair,
    /// Buyer key.
    pub buyer: Secp256k1KeyPair,
}

impl DataDeal {
    /// Fresh parties for deal `deal_id`.
    pub fn new(deal_id: u64) -> Self {
        Self {
            deal_id,
            seller: Secp256k1KeyPair::generate(),
            buyer: Secp256k1KeyPair::generate(),
        }
    }

    /// Another seller in the same deal, selling to the same buyer.
    pub fn other_seller(&self) -> Self {
        Self {
            deal_id: self.deal_id,
            seller: Secp256k1KeyPair::generate(),
            buyer: self.buyer.clone(),
        }
    }

    /// Records must carry a string `name` and a number `age`.
    pub fn schema() -> Vec<SchemaField> {
        vec![
            SchemaField::new("name", FieldKind::String),
            SchemaField::new("age", FieldKind::Number),
        ]
    }

    /// Upload `plaintext` encrypted for the oracle and publish the deal and
    /// a sale claiming `claimed_hash`.
    pub fn publish_sale(
        &self,
        network: &Network,
        plaintext: &[u8],
        claimed_hash: [u8; 32],
        status: SaleStatus,
    ) -> Sale {
        let shared = derive_shared_key(&self.seller, &network.oracle_key.public_key(), Kdf::Sha256)
            .unwrap();
        let ciphertext = aead_encrypt(&shared, &DEAL_NONCE, plaintext).unwrap();
        let verifiable_cid = network.content.insert(ciphertext);

        let deal = Deal {
            deal_id: self.deal_id,
            data_schema: Self::schema(),
            buyer_address: self.buyer.address(),
            buyer_pub_key: self.buyer.public_key().as_bytes().to_vec(),
            nonce: DEAL_NONCE,
            ..Default::default()
        };
        let sale = Sale {
            deal_id: self.deal_id,
            seller_address: self.seller.address(),
            seller_pub_key: self.seller.public_key().as_bytes().to_vec(),
            data_hash: claimed_hash,
            verifiable_cid,
            delivered_cid: None,
            status,
        };
        self.publish(network, &deal, &sale);
        sale
    }

    /// Move an existing sale to `status`.
    pub fn set_status(&self, network: &Network, sale: &Sale, status: SaleStatus) -> Sale {
        let sale = Sale {
            status,
            ..sale.clone()
        };
        network.chain.set_record(
            DATADEAL_STORE,
            sale_key(self.deal_id, &sale.seller_address),
            &sale,
        );
        network.chain.produce_blocks(2);
        sale
    }

    fn publish(&self, network: &Network, deal: &Deal, sale: &Sale) {
        network
            .chain
            .set_record(DATADEAL_STORE, deal_key(self.deal_id), deal);
        network.chain.set_record(
            DATADEAL_STORE,
            sale_key(self.deal_id, &sale.seller_address),
            sale,
        );
        network.chain.produce_blocks(2);
    }

    /// `data_verification` or `data_delivery` event for `sale`.
    pub fn event(&self, event_type: &str, sale: &Sale) -> ChainEvent {
        ChainEvent::new(event_type, 5)
            .with_attribute("deal_id", self.deal_id.to_string())
            .with_attribute("seller_address", hex::encode(sale.seller_address))
            .with_attribute("data_hash", hex::encode(sale.data_hash))
    }

    /// Decrypt the delivery of `sale` as the buyer.
    pub fn buyer_open(&self, network: &Network, sale: &Sale, ciphertext: &[u8]) -> Vec<u8> {
        let shared = derive_shared_key(&self.buyer, &network.oracle_key.public_key(), Kdf::Sha256)
            .unwrap();
        let nonce = delivery_nonce(&DEAL_NONCE, &sale.seller_address, &sale.data_hash);
        aead_decrypt(&shared, &nonce, ciphertext).unwrap()
    }
}

/// SHA-256 of `plaintext`, the hash a seller claims.
pub fn data_hash(plaintext: &[u8]) -> [u8; 32] {
    sha256(plaintext)
}
