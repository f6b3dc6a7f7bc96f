//! # Oracle Context
//!
//! Concrete capability set, built once at startup from the subsystem
//! services.

use crate::ports::{ContentStore, OracleCapabilities, OracleKeyring};
use oc_02_attestation::AttestationApi;
use oc_03_trusted_query::TrustedQueryApi;
use oc_04_vote_tx::VoteTxApi;
use std::sync::Arc;

/// Capabilities backed by shared service handles.
pub struct OracleContext<Q, A, V, S> {
    query: Arc<Q>,
    attest: Arc<A>,
    sign: Arc<V>,
    store: Arc<S>,
    keys: OracleKeyring,
}

impl<Q, A, V, S> OracleContext<Q, A, V, S>
where
    Q: TrustedQueryApi,
    A: AttestationApi,
    V: VoteTxApi,
    S: ContentStore,
{
    /// Assemble a context.
    pub fn new(query: Arc<Q>, attest: Arc<A>, sign: Arc<V>, store: Arc<S>, keys: OracleKeyring) -> Self {
        Self {
            query,
            attest,
            sign,
            store,
            keys,
        }
    }
}

impl<Q, A, V, S> OracleCapabilities for OracleContext<Q, A, V, S>
where
    Q: TrustedQueryApi,
    A: AttestationApi,
    V: VoteTxApi,
    S: ContentStore,
{
    fn query(&self) -> &dyn TrustedQueryApi {
        self.query.as_ref()
    }

    fn attest(&self) -> &dyn AttestationApi {
        self.attest.as_ref()
    }

    fn sign(&self) -> &dyn VoteTxApi {
        self.sign.as_ref()
    }

    fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    fn keys(&self) -> &OracleKeyring {
        &self.keys
    }
}
