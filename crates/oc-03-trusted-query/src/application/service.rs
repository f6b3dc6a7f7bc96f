//! # Trusted Query Client
//!
//! Holds the single root of trust and answers proof-checked reads.
//!
//! ```text
//! verify_and_read(store, key, H)
//!   1. wait until the chain reports height ≥ H+1
//!   2. verify header H+1 (skipping verification, bisecting on low trust)
//!   3. query (store, key) at H with proofs
//!   4. verify module op + store op against app_hash(H+1)
//! ```
//!
//! Advancing trust takes the light store's write lock; reads of already
//! verified heights only take the read lock.

use crate::algorithms::{validate_light_block, verify_block, verify_query};
use crate::config::LightClientConfig;
use crate::domain::{LightBlock, LightStore, TrustedQueryError, Verdict};
use crate::ports::{ChainTransport, TrustedBlockPersistence, TrustedQueryApi};
use async_trait::async_trait;
use shared_types::TrustedBlockInfo;
use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info, warn};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Trusted query client over an untrusted chain transport.
pub struct TrustedQueryClient<T: ChainTransport, P: TrustedBlockPersistence> {
    config: LightClientConfig,
    transport: T,
    persistence: P,
    store: RwLock<LightStore>,
}

impl<T: ChainTransport, P: TrustedBlockPersistence> TrustedQueryClient<T, P> {
    /// Establish the root of trust.
    ///
    /// The persisted block is preferred when it is higher than `seed`. The
    /// anchor's header is fetched, checked on its own and must hash to the
    /// anchor hash; otherwise bootstrap fails.
    pub async fn bootstrap(
        config: LightClientConfig,
        transport: T,
        persistence: P,
        seed: TrustedBlockInfo,
    ) -> Result<Self, TrustedQueryError> {
        config
            .validate()
            .map_err(|reason| TrustedQueryError::header(seed.height, reason))?;

        let persisted = match persistence.load() {
            Ok(block) => block,
            Err(e) => {
                warn!("[oc-03] Ignoring unreadable persisted trusted block: {}", e);
                None
            }
        };
        let anchor = match persisted {
            Some(p) if p.height > seed.height => {
                info!(persisted = %p, seed = %seed, "[oc-03] Resuming from persisted trusted block");
                p
            }
            _ => seed,
        };

        let client = Self {
            config,
            transport,
            persistence,
            store: RwLock::new(LightStore::default()),
        };

        let block = client.fetch(anchor.height).await?;
        validate_light_block(&block, &client.config.chain_id)
            .map_err(|reason| TrustedQueryError::header(anchor.height, reason))?;
        if block.hash() != anchor.hash {
            return Err(TrustedQueryError::header(
                anchor.height,
                "anchor hash does not match the chain header",
            ));
        }
        if block.header().time + client.config.trusting_period_secs <= unix_now() {
            return Err(TrustedQueryError::header(
                anchor.height,
                "anchor is outside the trusting period",
            ));
        }

        *client.store.write().await = LightStore::with_anchor(block);
        if persisted != Some(anchor) {
            client.persist(&anchor);
        }
        info!(anchor = %anchor, "[oc-03] Root of trust established");
        Ok(client)
    }

    /// Configuration in use.
    pub fn config(&self) -> &LightClientConfig {
        &self.config
    }

    /// Transport in use.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn timed<F, R>(&self, height: i64, call: F) -> Result<R, TrustedQueryError>
    where
        F: Future<Output = Result<R, TrustedQueryError>> + Send,
    {
        timeout(self.config.request_timeout(), call)
            .await
            .map_err(|_| TrustedQueryError::Timeout { height })?
    }

    async fn fetch(&self, height: i64) -> Result<LightBlock, TrustedQueryError> {
        let block = self
            .timed(height, self.transport.light_block(height))
            .await?;
        if block.height() != height {
            return Err(TrustedQueryError::header(
                height,
                format!("transport returned height {}", block.height()),
            ));
        }
        Ok(block)
    }

    fn persist(&self, block: &TrustedBlockInfo) {
        if let Err(e) = self.persistence.save(block) {
            warn!(block = %block, "[oc-03] Failed to persist trusted block: {}", e);
        }
    }

    /// Poll the latest height until it reaches `height`.
    pub async fn wait_for_height(&self, height: i64) -> Result<(), TrustedQueryError> {
        let deadline = Instant::now() + self.config.wait_timeout();
        loop {
            let latest = self
                .timed(height, self.transport.latest_height())
                .await?;
            if latest >= height {
                return Ok(());
            }
            if Instant::now() + self.config.poll_interval() > deadline {
                warn!(height, latest, "[oc-03] Gave up waiting for height");
                return Err(TrustedQueryError::Timeout { height });
            }
            sleep(self.config.poll_interval()).await;
        }
    }

    /// Verify the header at `target` from the highest trusted block below
    /// it, bisecting when too little of the trusted set signed.
    pub async fn verify_to_height(&self, target: i64) -> Result<LightBlock, TrustedQueryError> {
        if let Some(block) = self.store.read().await.get(target) {
            return Ok(block.clone());
        }

        let mut store = self.store.write().await;
        if let Some(block) = store.get(target) {
            return Ok(block.clone());
        }
        let now = unix_now();
        store.prune(
            self.config.max_stored_blocks,
            now,
            self.config.trusting_period_secs,
        );
        let lowest = store.lowest().map(LightBlock::height).unwrap_or(i64::MAX);
        if target < lowest {
            return Err(TrustedQueryError::header(
                target,
                format!("below lowest trusted height {lowest}; backward verification refused"),
            ));
        }
        let previous_highest = store.highest().map(LightBlock::height).unwrap_or_default();

        let options = self.config.verify_options();
        let mut pending = vec![self.fetch(target).await?];
        let mut steps = 0usize;

        while let Some(candidate) = pending.last() {
            steps += 1;
            if steps > self.config.max_bisection_steps {
                return Err(TrustedQueryError::header(target, "bisection step limit reached"));
            }
            let candidate_height = candidate.height();
            let (trusted_height, verdict) = {
                let trusted = store.highest_at_or_below(candidate_height - 1).ok_or_else(|| {
                    TrustedQueryError::header(candidate_height, "no trusted block below target")
                })?;
                (trusted.height(), verify_block(trusted, candidate, &options, now))
            };

            match verdict {
                Verdict::Success => {
                    debug!(
                        from = trusted_height,
                        to = candidate_height,
                        "[oc-03] Header verified"
                    );
                    if let Some(block) = pending.pop() {
                        store.insert(block);
                    }
                }
                Verdict::NotEnoughTrust { tallied, total } => {
                    let pivot = trusted_height + (candidate_height - trusted_height) / 2;
                    if pivot <= trusted_height || pivot >= candidate_height {
                        return Err(TrustedQueryError::header(
                            candidate_height,
                            "not enough trust and nothing left to bisect",
                        ));
                    }
                    debug!(
                        from = trusted_height,
                        to = candidate_height,
                        pivot,
                        tallied,
                        total,
                        "[oc-03] Not enough trust, bisecting"
                    );
                    pending.push(self.fetch(pivot).await?);
                }
                Verdict::Invalid(reason) => {
                    warn!(
                        from = trusted_height,
                        to = candidate_height,
                        "[oc-03] Header rejected: {}",
                        reason
                    );
                    return Err(TrustedQueryError::header(candidate_height, reason));
                }
            }
        }

        let block = store
            .get(target)
            .cloned()
            .ok_or_else(|| TrustedQueryError::header(target, "target not stored after verification"))?;

        if let Some(highest) = store.highest().filter(|b| b.height() > previous_highest) {
            let info = highest.trusted_block();
            self.persist(&info);
            info!(trusted = %info, "[oc-03] Trust advanced");
        }
        store.prune(
            self.config.max_stored_blocks,
            now,
            self.config.trusting_period_secs,
        );
        Ok(block)
    }
}

#[async_trait]
impl<T, P> TrustedQueryApi for TrustedQueryClient<T, P>
where
    T: ChainTransport + 'static,
    P: TrustedBlockPersistence + 'static,
{
    async fn verify_and_read(
        &self,
        store_key: &str,
        key: &[u8],
        height: i64,
    ) -> Result<Vec<u8>, TrustedQueryError> {
        if height < 1 {
            return Err(TrustedQueryError::header(height, "height must be positive"));
        }
        self.wait_for_height(height + 1).await?;
        let block = self.verify_to_height(height + 1).await?;

        let response = self
            .timed(height, self.transport.query(store_key, key, height))
            .await?;
        let verified = verify_query(&response, store_key, key, height, &block.header().app_hash)
            .map_err(|e| {
                warn!(
                    store = store_key,
                    key = %String::from_utf8_lossy(key),
                    height,
                    "[oc-03] {}",
                    e
                );
                e
            })?;

        verified.ok_or_else(|| TrustedQueryError::NotFound {
            store: store_key.to_string(),
            key: String::from_utf8_lossy(key).into_owned(),
        })
    }

    async fn read_latest(&self, store_key: &str, key: &[u8]) -> Result<Vec<u8>, TrustedQueryError> {
        let latest = self.timed(0, self.transport.latest_height()).await?;
        self.verify_and_read(store_key, key, latest - 1).await
    }

    async fn verify_trusted_block(&self, block: &TrustedBlockInfo) -> Result<(), TrustedQueryError> {
        let verified = self.verify_to_height(block.height).await?;
        if verified.hash() != block.hash {
            return Err(TrustedQueryError::header(
                block.height,
                "claimed hash differs from the verified header",
            ));
        }
        Ok(())
    }

    async fn trusted_block(&self) -> TrustedBlockInfo {
        self.store
            .read()
            .await
            .highest()
            .map(LightBlock::trusted_block)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{InMemoryTrustedBlockStore, MockChain};
    use std::time::Duration;

    type Client = TrustedQueryClient<MockChain, InMemoryTrustedBlockStore>;

    async fn client_at(chain: &MockChain, anchor: i64) -> Client {
        let seed = chain.block(anchor).unwrap().trusted_block();
        TrustedQueryClient::bootstrap(
            LightClientConfig::for_testing(MockChain::CHAIN_ID),
            chain.clone(),
            InMemoryTrustedBlockStore::new(),
            seed,
        )
        .await
        .unwrap()
    }

    fn chain_with_params() -> MockChain {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(2);
        chain.set_state("oracle", b"params".to_vec(), b"active".to_vec());
        chain.produce_blocks(10);
        chain
    }

    #[tokio::test]
    async fn test_verify_and_read_returns_value() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;

        let value = client.verify_and_read("oracle", b"params", 5).await.unwrap();
        assert_eq!(value, b"active".to_vec());
        assert_eq!(client.trusted_block().await.height, 6);
    }

    #[tokio::test]
    async fn test_absent_key_is_not_found() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;

        let result = client.verify_and_read("oracle", b"registration/x", 5).await;
        assert!(matches!(result, Err(TrustedQueryError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_tampered_value_is_proof_error() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;
        chain.set_tamper_values(true);

        let result = client.verify_and_read("oracle", b"params", 5).await;
        assert!(matches!(result, Err(TrustedQueryError::Proof(_))));
    }

    #[tokio::test]
    async fn test_bisection_across_validator_rotation() {
        let chain = MockChain::with_validators(4, 10);
        chain.produce_blocks(5);
        chain.rotate_validators(4, 10);
        chain.produce_blocks(10);
        let client = client_at(&chain, 1).await;

        let block = client.verify_to_height(15).await.unwrap();
        assert_eq!(block.height(), 15);
        assert_eq!(client.trusted_block().await, chain.block(15).unwrap().trusted_block());
    }

    #[tokio::test]
    async fn test_forged_header_rejected() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;
        let mut forged = chain.block(6).unwrap();
        forged.signed_header.header.app_hash = [0xEE; 32];
        chain.replace_block(forged);

        let result = client.verify_and_read("oracle", b"params", 5).await;
        assert!(matches!(result, Err(TrustedQueryError::Header { .. })));
        assert_eq!(client.trusted_block().await.height, 1);
    }

    #[tokio::test]
    async fn test_backward_verification_refused() {
        let chain = chain_with_params();
        let client = client_at(&chain, 5).await;

        let result = client.verify_to_height(3).await;
        assert!(matches!(result, Err(TrustedQueryError::Header { .. })));
    }

    #[tokio::test]
    async fn test_expired_anchor_is_not_used_after_trust_advances() {
        let chain = chain_with_params();
        // Block 1 leaves the trusting period about two seconds from now.
        let config = LightClientConfig {
            trusting_period_secs: 3_600 - MockChain::BLOCK_INTERVAL_SECS + 2,
            ..LightClientConfig::for_testing(MockChain::CHAIN_ID)
        };
        let client = TrustedQueryClient::bootstrap(
            config,
            chain.clone(),
            InMemoryTrustedBlockStore::new(),
            chain.block(1).unwrap().trusted_block(),
        )
        .await
        .unwrap();
        client.verify_to_height(10).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        let block = client.verify_to_height(12).await.unwrap();
        assert_eq!(block.height(), 12);
        assert_eq!(client.store.read().await.lowest().map(LightBlock::height), Some(10));

        let err = client.verify_to_height(5).await.unwrap_err();
        assert!(err.to_string().contains("below lowest trusted height 10"));
    }

    #[tokio::test]
    async fn test_verify_trusted_block_hash() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;

        let good = chain.block(4).unwrap().trusted_block();
        assert!(client.verify_trusted_block(&good).await.is_ok());

        let bad = TrustedBlockInfo::new(4, [9; 32]);
        assert!(matches!(
            client.verify_trusted_block(&bad).await,
            Err(TrustedQueryError::Header { .. })
        ));
    }

    #[tokio::test]
    async fn test_wait_for_height_times_out() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;

        let result = client.verify_and_read("oracle", b"params", 50).await;
        assert_eq!(result, Err(TrustedQueryError::Timeout { height: 51 }));
    }

    #[tokio::test]
    async fn test_wait_for_height_sees_new_block() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;
        let target = chain.height();

        let producer = chain.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            producer.produce_blocks(1);
        });

        let value = client.verify_and_read("oracle", b"params", target).await.unwrap();
        assert_eq!(value, b"active".to_vec());
    }

    #[tokio::test]
    async fn test_bootstrap_rejects_wrong_seed_hash() {
        let chain = chain_with_params();
        let result = TrustedQueryClient::bootstrap(
            LightClientConfig::for_testing(MockChain::CHAIN_ID),
            chain.clone(),
            InMemoryTrustedBlockStore::new(),
            TrustedBlockInfo::new(1, [0; 32]),
        )
        .await;
        assert!(matches!(result, Err(TrustedQueryError::Header { .. })));
    }

    #[tokio::test]
    async fn test_restart_resumes_from_persisted_block() {
        let chain = chain_with_params();
        let persistence = InMemoryTrustedBlockStore::new();
        let seed = chain.block(1).unwrap().trusted_block();
        let config = LightClientConfig::for_testing(MockChain::CHAIN_ID);

        let first = TrustedQueryClient::bootstrap(config.clone(), chain.clone(), persistence.clone(), seed)
            .await
            .unwrap();
        first.verify_to_height(8).await.unwrap();
        assert_eq!(persistence.load().unwrap().map(|b| b.height), Some(8));

        let second = TrustedQueryClient::bootstrap(config, chain.clone(), persistence, seed)
            .await
            .unwrap();
        assert_eq!(second.trusted_block().await.height, 8);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let chain = chain_with_params();
        let client = client_at(&chain, 1).await;
        chain.set_offline(true);

        let result = client.verify_and_read("oracle", b"params", 5).await;
        assert!(matches!(result, Err(TrustedQueryError::Transport(_))));
    }
}
