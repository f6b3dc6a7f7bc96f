//! # Trusted Account Reader
//!
//! Reads the signer account through the trusted query path, so a lying
//! RPC cannot feed a wrong account number or sequence.

use crate::domain::VoteTxError;
use crate::ports::AccountReader;
use async_trait::async_trait;
use oc_03_trusted_query::TrustedQueryApi;
use shared_types::{account_key, decode_record, Account, Address, AUTH_STORE};
use std::sync::Arc;

/// Account reader over a trusted query client.
pub struct TrustedAccountReader<Q: TrustedQueryApi> {
    query: Arc<Q>,
}

impl<Q: TrustedQueryApi> TrustedAccountReader<Q> {
    /// Wrap a query client.
    pub fn new(query: Arc<Q>) -> Self {
        Self { query }
    }
}

#[async_trait]
impl<Q: TrustedQueryApi + 'static> AccountReader for TrustedAccountReader<Q> {
    async fn account(&self, address: &Address) -> Result<Account, VoteTxError> {
        let bytes = self
            .query
            .read_latest(AUTH_STORE, &account_key(address))
            .await
            .map_err(|e| VoteTxError::Account(e.to_string()))?;
        let account: Account =
            decode_record(&bytes).map_err(|e| VoteTxError::Account(e.to_string()))?;
        if &account.address != address {
            return Err(VoteTxError::Account("record is for another address".into()));
        }
        Ok(account)
    }
}
