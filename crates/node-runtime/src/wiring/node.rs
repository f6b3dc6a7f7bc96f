//! # Oracle Node
//!
//! Owns every long-lived service of a running node and the tasks that
//! drive them.

use crate::adapters::{
    BlockEventSource, EventBridge, HttpBroadcaster, HttpChainTransport, HttpContentStore,
    PrometheusMetrics, RpcClient,
};
use crate::container::NodeConfig;
use crate::wiring::{ensure_key, obtain_oracle_key, StartupError};
use oc_01_sealed_keys::{FileSealedStore, KeySlot, PlatformSealingKeyProvider, SealedKeyStore};
use oc_02_attestation::{AttestationApi, AttestationService, SimulatedEnclave};
use oc_03_trusted_query::{SealedTrustedBlockStore, TrustedQueryClient};
use oc_04_vote_tx::{TrustedAccountReader, VoteTxBuilder};
use oc_05_vote_events::{EventReactor, OracleContext, OracleKeyring, ReactorHandle};
use shared_bus::InMemoryEventBus;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Sealed key store on the local filesystem.
pub type NodeKeyStore = SealedKeyStore<PlatformSealingKeyProvider, FileSealedStore>;

/// Trusted queries over JSON-RPC, anchored in the sealed trusted block.
pub type NodeQuery = TrustedQueryClient<HttpChainTransport, SealedTrustedBlockStore<NodeKeyStore>>;

/// Vote builder reading its account through trusted queries.
pub type NodeVoteBuilder = VoteTxBuilder<HttpBroadcaster, TrustedAccountReader<NodeQuery>>;

/// Capability set handed to the reactor.
pub type NodeContext =
    OracleContext<NodeQuery, AttestationService<SimulatedEnclave>, NodeVoteBuilder, HttpContentStore>;

/// A bootstrapped oracle node.
pub struct OracleNode {
    reactor: EventReactor<NodeContext>,
    transport: HttpChainTransport,
    bus: Arc<InMemoryEventBus>,
    poll_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    reactor_handle: Option<ReactorHandle>,
    bridge_task: Option<JoinHandle<()>>,
}

impl OracleNode {
    /// Bring up every service in dependency order.
    ///
    /// Fails without side effects on the chain; keys created before the
    /// failure stay sealed on disk.
    pub async fn build(config: NodeConfig) -> Result<Self, StartupError> {
        config.validate()?;

        let enclave = SimulatedEnclave::new(
            SimulatedEnclave::dev_vendor_key(),
            config.enclave.identity()?,
            config.enclave.security_version,
        );
        let attestation = Arc::new(AttestationService::bootstrap(
            config.attestation.clone(),
            enclave,
        )?);
        let identity = attestation.self_identity().clone();

        let provider = PlatformSealingKeyProvider::load_or_create(
            &config.enclave.platform_secret_path,
            identity.clone(),
        )?;
        let keys: Arc<NodeKeyStore> = Arc::new(SealedKeyStore::new(
            provider,
            FileSealedStore::new(config.keys.clone())?,
            config.keys.clone(),
        )?);
        let account_key = ensure_key(&*keys, KeySlot::AccountKey)?;
        let node_key = ensure_key(&*keys, KeySlot::NodeKey)?;
        info!(
            account = %hex::encode(account_key.address()),
            node = %hex::encode(node_key.address()),
            unique_id = %identity.unique_id_hex(),
            "Keys unsealed"
        );

        let rpc = RpcClient::new(&config.chain.rpc_url, config.chain.request_timeout())?;
        let transport = HttpChainTransport::new(rpc.clone());
        let query = Arc::new(
            TrustedQueryClient::bootstrap(
                config.light_client.clone(),
                transport.clone(),
                SealedTrustedBlockStore::new(Arc::clone(&keys)),
                config.chain.trust_anchor()?,
            )
            .await?,
        );

        let oracle_key = obtain_oracle_key(
            &*keys,
            &*query,
            &*attestation,
            &node_key,
            config.init_oracle_key,
        )
        .await?;

        let builder = Arc::new(VoteTxBuilder::new(
            config.tx.clone(),
            account_key,
            HttpBroadcaster::new(rpc),
            TrustedAccountReader::new(Arc::clone(&query)),
        ));
        let store = Arc::new(HttpContentStore::new(
            &config.content_store.url,
            config.content_store.request_timeout(),
        )?);
        let ctx = Arc::new(OracleContext::new(
            query,
            attestation,
            builder,
            store,
            OracleKeyring::new(oracle_key),
        ));
        let reactor = EventReactor::new(ctx, config.reactor.clone(), Arc::new(PrometheusMetrics))?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            reactor,
            transport,
            bus: Arc::new(InMemoryEventBus::new()),
            poll_interval: config.chain.event_poll_interval(),
            shutdown_tx,
            shutdown_rx,
            reactor_handle: None,
            bridge_task: None,
        })
    }

    /// Start the reactor, then feed it chain events from the next block on.
    ///
    /// Events of blocks committed before startup are not replayed.
    pub async fn start(&mut self) -> Result<(), StartupError> {
        // Subscribe before the first event can be published.
        self.reactor_handle = Some(self.reactor.start(&*self.bus).await);

        let latest = BlockEventSource::latest_height(&self.transport).await?;
        let bridge = EventBridge::new(
            self.transport.clone(),
            Arc::clone(&self.bus),
            latest + 1,
            self.poll_interval,
        );
        self.bridge_task = Some(tokio::spawn(bridge.run(self.shutdown_rx.clone())));

        info!(from_height = latest + 1, "Oracle node running");
        Ok(())
    }

    /// Whether the reactor handlers are alive.
    pub fn is_running(&self) -> bool {
        self.reactor_handle
            .as_ref()
            .map(ReactorHandle::is_running)
            .unwrap_or(false)
    }

    /// Stop the bridge, then the reactor.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }
        if let Some(task) = self.bridge_task.take() {
            if let Err(e) = task.await {
                warn!("Event bridge ended abnormally: {}", e);
            }
        }
        if let Some(handle) = self.reactor_handle.take() {
            let aborted = handle.shutdown().await;
            if aborted > 0 {
                warn!(aborted, "Handlers aborted after the grace period");
            }
        }

        info!("Shutdown complete");
    }
}
