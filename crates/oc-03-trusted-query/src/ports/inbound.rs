//! # Inbound Ports
//!
//! Authenticated chain reads.

use crate::domain::TrustedQueryError;
use async_trait::async_trait;
use shared_types::TrustedBlockInfo;

/// Trusted query API.
#[async_trait]
pub trait TrustedQueryApi: Send + Sync {
    /// Read `key` from module store `store_key` at state height `height`.
    ///
    /// Header `height + 1` is verified first and the proof is checked
    /// against its app hash. A proven absence is `NotFound`; any proof
    /// failure is `Proof`.
    async fn verify_and_read(
        &self,
        store_key: &str,
        key: &[u8],
        height: i64,
    ) -> Result<Vec<u8>, TrustedQueryError>;

    /// Read at the latest state height whose next header exists.
    async fn read_latest(&self, store_key: &str, key: &[u8]) -> Result<Vec<u8>, TrustedQueryError>;

    /// Verify that `block` is the header hash at its height.
    async fn verify_trusted_block(&self, block: &TrustedBlockInfo) -> Result<(), TrustedQueryError>;

    /// Highest verified block.
    async fn trusted_block(&self) -> TrustedBlockInfo;
}
