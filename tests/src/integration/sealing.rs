//! # Sealed State Across Restarts
//!
//! Keys and the trusted block survive a restart on the same enclave build
//! and stay unreadable to any other build.

#[cfg(test)]
mod tests {
    use crate::fixture::{identity, Network};
    use node_runtime::wiring::ensure_key;
    use oc_01_sealed_keys::{
        FileSealedStore, KeySlot, PlatformSealingKeyProvider, SealError, SealPolicy,
        SealedKeyConfig, SealedKeyStore, SealedKeyStoreApi,
    };
    use oc_03_trusted_query::{
        LightClientConfig, MockChain, SealedTrustedBlockStore, TrustedQueryApi, TrustedQueryClient,
    };
    use shared_types::{oracle_params_key, EnclaveIdentity, ORACLE_STORE};
    use std::path::Path;
    use std::sync::Arc;

    type FileKeys = SealedKeyStore<PlatformSealingKeyProvider, FileSealedStore>;

    fn open(dir: &Path, identity: &EnclaveIdentity, policy: SealPolicy) -> FileKeys {
        let mut config = SealedKeyConfig::in_dir(dir);
        config.policy = policy;
        let provider =
            PlatformSealingKeyProvider::load_or_create(&dir.join("platform.secret"), identity.clone())
                .unwrap();
        SealedKeyStore::new(provider, FileSealedStore::new(config.clone()).unwrap(), config).unwrap()
    }

    #[test]
    fn test_keys_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let first = {
            let keys = open(dir.path(), &identity(3), SealPolicy::MrEnclave);
            ensure_key(&keys, KeySlot::NodeKey).unwrap()
        };

        let keys = open(dir.path(), &identity(3), SealPolicy::MrEnclave);
        let again = ensure_key(&keys, KeySlot::NodeKey).unwrap();
        assert_eq!(first.public_key(), again.public_key());
    }

    #[test]
    fn test_new_build_cannot_unseal_and_does_not_regenerate() {
        let dir = tempfile::tempdir().unwrap();
        {
            let keys = open(dir.path(), &identity(3), SealPolicy::MrEnclave);
            ensure_key(&keys, KeySlot::NodeKey).unwrap();
        }

        let keys = open(dir.path(), &identity(4), SealPolicy::MrEnclave);
        assert!(matches!(
            ensure_key(&keys, KeySlot::NodeKey),
            Err(SealError::Unseal(_))
        ));
    }

    #[test]
    fn test_signer_policy_carries_keys_across_builds() {
        let dir = tempfile::tempdir().unwrap();
        let first = {
            let keys = open(dir.path(), &identity(3), SealPolicy::MrSigner);
            ensure_key(&keys, KeySlot::AccountKey).unwrap()
        };

        let keys = open(dir.path(), &identity(4), SealPolicy::MrSigner);
        let again = ensure_key(&keys, KeySlot::AccountKey).unwrap();
        assert_eq!(first.address(), again.address());
    }

    #[tokio::test]
    async fn test_trust_resumes_from_sealed_block() {
        let dir = tempfile::tempdir().unwrap();
        let network = Network::new();
        let seed = network.chain.block(1).unwrap().trusted_block();

        let advanced = {
            let keys = Arc::new(open(dir.path(), &network.identity, SealPolicy::MrEnclave));
            let client = TrustedQueryClient::bootstrap(
                LightClientConfig::for_testing(MockChain::CHAIN_ID),
                network.chain.clone(),
                SealedTrustedBlockStore::new(keys),
                seed,
            )
            .await
            .unwrap();
            client
                .read_latest(ORACLE_STORE, &oracle_params_key())
                .await
                .unwrap();
            client.trusted_block().await
        };
        assert!(advanced.height > seed.height);

        let keys = Arc::new(open(dir.path(), &network.identity, SealPolicy::MrEnclave));
        assert_eq!(keys.load_trusted_block().unwrap(), Some(advanced));
        let client = TrustedQueryClient::bootstrap(
            LightClientConfig::for_testing(MockChain::CHAIN_ID),
            network.chain.clone(),
            SealedTrustedBlockStore::new(keys),
            seed,
        )
        .await
        .unwrap();
        assert_eq!(client.trusted_block().await, advanced);
    }
}
