//! Test fixture: a mock chain, simulated enclaves, mock broadcaster and
//! content store wired into one capability set.

use crate::adapters::OracleContext;
use crate::algorithms::delivery_nonce;
use crate::ports::{ContentStore, MockContentStore, OracleKeyring};
use oc_01_sealed_keys::{
    InMemoryBlobStorage, MockSealingKeyProvider, SealedKeyConfig, SealedKeyStore,
};
use oc_02_attestation::{AttestationApi, AttestationConfig, AttestationService, SimulatedEnclave};
use oc_03_trusted_query::{
    InMemoryTrustedBlockStore, LightClientConfig, MockChain, TrustedQueryClient,
};
use oc_04_vote_tx::{MockAccountReader, MockBroadcaster, VoteTxBuilder, VoteTxConfig};
use shared_crypto::{
    aead_decrypt, aead_encrypt, derive_shared_key, sha256, Kdf, Secp256k1KeyPair,
};
use shared_types::{
    deal_key, oracle_params_key, registration_key, sale_key, upgrade_key, Account, Deal,
    EnclaveIdentity, FieldKind, OracleParams, OracleRecord, Sale, SaleStatus, SchemaField,
    DATADEAL_STORE, ORACLE_STORE,
};
use std::path::Path;
use std::sync::Arc;

pub(crate) type TestQuery = TrustedQueryClient<MockChain, InMemoryTrustedBlockStore>;
pub(crate) type TestAttestation = AttestationService<SimulatedEnclave>;
pub(crate) type TestBuilder = VoteTxBuilder<MockBroadcaster, MockAccountReader>;
pub(crate) type TestContext = OracleContext<TestQuery, TestAttestation, TestBuilder, MockContentStore>;

pub(crate) const DEAL_ID: u64 = 7;
pub(crate) const DEAL_NONCE: [u8; 12] = [5; 12];

pub(crate) struct Fixture {
    pub chain: MockChain,
    pub identity: EnclaveIdentity,
    pub ctx: Arc<TestContext>,
    pub query: Arc<TestQuery>,
    pub attestation: Arc<TestAttestation>,
    pub builder: Arc<TestBuilder>,
    pub broadcaster: MockBroadcaster,
    pub content: MockContentStore,
    pub oracle_key: Secp256k1KeyPair,
    pub seller: Secp256k1KeyPair,
    pub buyer: Secp256k1KeyPair,
}

impl Fixture {
    pub async fn new() -> Self {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(2);

        let identity = EnclaveIdentity {
            product_id: vec![1],
            signer_id: vec![2; 32],
            unique_id: vec![3; 32],
        };
        let attestation = AttestationService::bootstrap(
            AttestationConfig::for_testing(),
            SimulatedEnclave::new(SimulatedEnclave::dev_vendor_key(), identity.clone(), 1),
        )
        .unwrap();

        let query = TrustedQueryClient::bootstrap(
            LightClientConfig::for_testing(MockChain::CHAIN_ID),
            chain.clone(),
            InMemoryTrustedBlockStore::new(),
            chain.block(1).unwrap().trusted_block(),
        )
        .await
        .unwrap();

        let account_key = Secp256k1KeyPair::generate();
        let accounts = MockAccountReader::new(Account {
            address: account_key.address(),
            pub_key: None,
            account_number: 1,
            sequence: 0,
        });
        let broadcaster = MockBroadcaster::new();
        let builder = VoteTxBuilder::new(
            VoteTxConfig::for_testing(MockChain::CHAIN_ID),
            account_key,
            broadcaster.clone(),
            accounts,
        );

        let content = MockContentStore::new();
        let oracle_key = Secp256k1KeyPair::generate();
        let query = Arc::new(query);
        let attestation = Arc::new(attestation);
        let builder = Arc::new(builder);
        let ctx = Arc::new(OracleContext::new(
            query.clone(),
            attestation.clone(),
            builder.clone(),
            Arc::new(content.clone()),
            OracleKeyring::new(oracle_key.clone()),
        ));

        Self {
            chain,
            identity,
            ctx,
            query,
            attestation,
            builder,
            broadcaster,
            content,
            oracle_key,
            seller: Secp256k1KeyPair::generate(),
            buyer: Secp256k1KeyPair::generate(),
        }
    }

    /// The same services over a different content store.
    pub fn context_with<S: ContentStore>(
        &self,
        store: S,
    ) -> Arc<OracleContext<TestQuery, TestAttestation, TestBuilder, S>> {
        Arc::new(OracleContext::new(
            self.query.clone(),
            self.attestation.clone(),
            self.builder.clone(),
            Arc::new(store),
            OracleKeyring::new(self.oracle_key.clone()),
        ))
    }

    pub fn schema() -> Vec<SchemaField> {
        vec![
            SchemaField::new("name", FieldKind::String),
            SchemaField::new("age", FieldKind::Number),
        ]
    }

    pub fn key_store() -> SealedKeyStore<MockSealingKeyProvider, InMemoryBlobStorage> {
        SealedKeyStore::new(
            MockSealingKeyProvider::new(9, EnclaveIdentity::default()),
            InMemoryBlobStorage::new(),
            SealedKeyConfig::for_testing(Path::new("/tmp/oc-05-fixture")),
        )
        .unwrap()
    }

    /// A node key and its request record, attested by an enclave running
    /// `enclave_identity`. With `bind_own_key` false the report vouches
    /// for an unrelated key.
    pub fn registrant(
        &self,
        enclave_identity: &EnclaveIdentity,
        bind_own_key: bool,
    ) -> (Secp256k1KeyPair, OracleRecord) {
        let node = Secp256k1KeyPair::generate();
        let peer = AttestationService::bootstrap(
            AttestationConfig::for_testing(),
            SimulatedEnclave::new(
                SimulatedEnclave::dev_vendor_key(),
                enclave_identity.clone(),
                1,
            ),
        )
        .unwrap();
        let attested = if bind_own_key {
            node.public_key()
        } else {
            Secp256k1KeyPair::generate().public_key()
        };
        let report = peer.attest_key(attested.as_bytes()).unwrap();

        let trusted = self.chain.block(2).unwrap().trusted_block();
        let record = OracleRecord {
            unique_id: enclave_identity.unique_id_hex(),
            node_address: node.address(),
            node_pub_key: node.public_key().as_bytes().to_vec(),
            node_pub_key_remote_report: report,
            trusted_block_height: trusted.height,
            trusted_block_hash: trusted.hash,
            nonce: [6; 12],
            ..Default::default()
        };
        (node, record)
    }

    pub fn publish_registration(&self, record: &OracleRecord) {
        self.chain.set_record(
            ORACLE_STORE,
            registration_key(&record.unique_id, &record.node_address),
            record,
        );
        self.chain.produce_blocks(2);
    }

    pub fn publish_upgrade(&self, record: &OracleRecord, pending: Option<String>) {
        self.chain.set_record(
            ORACLE_STORE,
            upgrade_key(&record.unique_id, &record.node_address),
            record,
        );
        self.publish_params(&self.identity.unique_id_hex(), pending);
    }

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

    /// Publish deal `DEAL_ID` and a sale of `plaintext` encrypted for the
    /// oracle.
    pub fn publish_sale(&self, plaintext: &[u8], status: SaleStatus) -> Sale {
        self.publish_sale_from(&self.seller, plaintext, status)
    }

    /// As [`Fixture::publish_sale`], sold by `seller`.
    pub fn publish_sale_from(
        &self,
        seller: &Secp256k1KeyPair,
        plaintext: &[u8],
        status: SaleStatus,
    ) -> Sale {
        let shared =
            derive_shared_key(seller, &self.oracle_key.public_key(), Kdf::Sha256).unwrap();
        let ciphertext = aead_encrypt(&shared, &DEAL_NONCE, plaintext).unwrap();
        let verifiable_cid = self.content.insert(ciphertext);

        let deal = Deal {
            deal_id: DEAL_ID,
            data_schema: Self::schema(),
            buyer_address: self.buyer.address(),
            buyer_pub_key: self.buyer.public_key().as_bytes().to_vec(),
            nonce: DEAL_NONCE,
            ..Default::default()
        };
        let sale = Sale {
            deal_id: DEAL_ID,
            seller_address: seller.address(),
            seller_pub_key: seller.public_key().as_bytes().to_vec(),
            data_hash: sha256(plaintext),
            verifiable_cid,
            delivered_cid: None,
            status,
        };
        self.chain.set_record(DATADEAL_STORE, deal_key(DEAL_ID), &deal);
        self.chain.set_record(
            DATADEAL_STORE,
            sale_key(DEAL_ID, &sale.seller_address),
            &sale,
        );
        self.chain.produce_blocks(2);
        sale
    }

    /// Decrypt the delivery of `sale` as the buyer.
    pub fn buyer_open(&self, sale: &Sale, ciphertext: &[u8]) -> Vec<u8> {
        let shared =
            derive_shared_key(&self.buyer, &self.oracle_key.public_key(), Kdf::Sha256).unwrap();
        let nonce = delivery_nonce(&DEAL_NONCE, &sale.seller_address, &sale.data_hash);
        aead_decrypt(&shared, &nonce, ciphertext).unwrap()
    }
}
