//! # HTTP Content Store
//!
//! Content-addressed blob store over an IPFS-style HTTP API
//! (`/api/v0/add`, `/api/v0/cat`). Ids are opaque; payload integrity is
//! checked by the vote decisions, not here.

use async_trait::async_trait;
use oc_05_vote_events::{ContentStore, ContentStoreError};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
}

/// Content store client.
pub struct HttpContentStore {
    base_url: String,
    http: reqwest::Client,
}

impl HttpContentStore {
    /// Client for the API at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ContentStoreError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ContentStoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v0/{}", self.base_url, path)
    }
}

fn unavailable(e: reqwest::Error) -> ContentStoreError {
    ContentStoreError::Unavailable(e.to_string())
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn add(&self, bytes: Vec<u8>) -> Result<String, ContentStoreError> {
        let response = self
            .http
            .post(self.endpoint("add"))
            .header("content-type", "application/octet-stream")
            .body(bytes)
            .send()
            .await
            .map_err(unavailable)?
            .error_for_status()
            .map_err(unavailable)?;
        let added: AddResponse = response.json().await.map_err(unavailable)?;
        Ok(added.hash)
    }

    async fn get(&self, id: &str) -> Result<Vec<u8>, ContentStoreError> {
        let response = self
            .http
            .post(self.endpoint("cat"))
            .query(&[("arg", id)])
            .send()
            .await
            .map_err(unavailable)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ContentStoreError::NotFound(id.to_string()));
        }
        let response = response.error_for_status().map_err(unavailable)?;
        Ok(response.bytes().await.map_err(unavailable)?.to_vec())
    }
}
