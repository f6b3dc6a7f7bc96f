//! # Chain JSON-RPC Adapters
//!
//! One JSON-RPC client shared by the chain transport (light blocks,
//! proof-carrying queries, block events) and the transaction broadcaster.
//! Nothing read here is trusted; the light client verifies it.

use crate::adapters::event_bridge::BlockEventSource;
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use oc_03_trusted_query::{ChainTransport, LightBlock, QueryResponse, TrustedQueryError};
use oc_04_vote_tx::{BroadcastResult, TxBroadcaster, VoteTxError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared_bus::ChainEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// JSON-RPC failures.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The request did not complete.
    #[error("HTTP error: {0}")]
    Http(String),

    /// The server answered with an error object.
    #[error("RPC error {code}: {message}")]
    Server {
        /// Error code
        code: i64,
        /// Error message
        message: String,
    },

    /// The response did not decode.
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<RpcError> for TrustedQueryError {
    fn from(e: RpcError) -> Self {
        match e {
            RpcError::Decode(reason) => TrustedQueryError::Decode(reason),
            other => TrustedQueryError::Transport(other.to_string()),
        }
    }
}

#[derive(Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC 2.0 client.
#[derive(Clone)]
pub struct RpcClient {
    url: String,
    http: reqwest::Client,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// Client for `url` with a per-request timeout.
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RpcError::Http(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Call `method` and decode its result.
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!(method, id = request.id, "RPC call");

        let body = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Http(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| RpcError::Http(e.to_string()))?;
        decode_response(&body)
    }
}

/// Decode a JSON-RPC response body.
pub fn decode_response<R: DeserializeOwned>(body: &[u8]) -> Result<R, RpcError> {
    let response: RpcResponse<R> =
        serde_json::from_slice(body).map_err(|e| RpcError::Decode(e.to_string()))?;
    if let Some(error) = response.error {
        return Err(RpcError::Server {
            code: error.code,
            message: error.message,
        });
    }
    response
        .result
        .ok_or_else(|| RpcError::Decode("response has neither result nor error".into()))
}

#[derive(Deserialize)]
struct HeightResult {
    height: i64,
}

/// Chain transport over JSON-RPC.
#[derive(Clone)]
pub struct HttpChainTransport {
    rpc: RpcClient,
}

impl HttpChainTransport {
    /// Transport over `rpc`.
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl ChainTransport for HttpChainTransport {
    async fn light_block(&self, height: i64) -> Result<LightBlock, TrustedQueryError> {
        Ok(self.rpc.call("light_block", json!({ "height": height })).await?)
    }

    async fn latest_height(&self) -> Result<i64, TrustedQueryError> {
        let result: HeightResult = self.rpc.call("latest_height", json!({})).await?;
        Ok(result.height)
    }

    async fn query(
        &self,
        store_key: &str,
        key: &[u8],
        height: i64,
    ) -> Result<QueryResponse, TrustedQueryError> {
        let params = json!({
            "store": store_key,
            "key": hex::encode(key),
            "height": height,
            "prove": true,
        });
        Ok(self.rpc.call("abci_query", params).await?)
    }
}

#[async_trait]
impl BlockEventSource for HttpChainTransport {
    async fn latest_height(&self) -> Result<i64, RpcError> {
        let result: HeightResult = self.rpc.call("latest_height", json!({})).await?;
        Ok(result.height)
    }

    async fn block_events(&self, height: i64) -> Result<Vec<ChainEvent>, RpcError> {
        self.rpc
            .call("block_events", json!({ "height": height }))
            .await
    }
}

/// Transaction broadcaster over JSON-RPC (`broadcast_tx_sync`).
pub struct HttpBroadcaster {
    rpc: RpcClient,
}

impl HttpBroadcaster {
    /// Broadcaster over `rpc`.
    pub fn new(rpc: RpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl TxBroadcaster for HttpBroadcaster {
    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<BroadcastResult, VoteTxError> {
        let params = json!({ "tx": general_purpose::STANDARD.encode(&tx_bytes) });
        self.rpc
            .call("broadcast_tx_sync", params)
            .await
            .map_err(|e| VoteTxError::Transport(e.to_string()))
    }
}
