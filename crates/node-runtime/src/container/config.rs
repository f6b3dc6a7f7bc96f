//! # Node Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! ## Environment Overrides
//!
//! | Variable | Field |
//! |----------|-------|
//! | `OC_CHAIN_ID` | chain id for light client and transactions |
//! | `OC_RPC_URL` | chain JSON-RPC endpoint |
//! | `OC_TRUSTED_HEIGHT` / `OC_TRUSTED_HASH` | operator trust anchor |
//! | `OC_TRUST_LEVEL` | skipping trust level, `n/d` |
//! | `OC_DATA_DIR` | directory of the sealed files |
//! | `OC_PLATFORM_SECRET_PATH` | platform secret of the sealing key |
//! | `OC_VENDOR_ROOT_KEY` | pinned attestation vendor root (hex) |
//! | `OC_MIN_SECURITY_VERSION` | minimum accepted enclave security version |
//! | `OC_UNIQUE_ID` / `OC_SIGNER_ID` / `OC_PRODUCT_ID` | enclave measurements (hex) |
//! | `OC_CONTENT_STORE_URL` | content store API |
//! | `OC_HANDLER_TIMEOUT_MS` / `OC_SHUTDOWN_GRACE_MS` | reactor timing |
//! | `OC_GAS_LIMIT` / `OC_FEE_AMOUNT` | vote transaction fee |
//! | `OC_INIT_ORACLE_KEY` | `true` on the first node only: generate the oracle key |

use oc_01_sealed_keys::SealedKeyConfig;
use oc_02_attestation::AttestationConfig;
use oc_03_trusted_query::{LightClientConfig, TrustThreshold};
use oc_04_vote_tx::VoteTxConfig;
use oc_05_vote_events::ReactorConfig;
use shared_types::{EnclaveIdentity, TrustedBlockInfo};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete node configuration.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// Chain endpoint and trust anchor.
    pub chain: ChainConfig,
    /// Light client parameters.
    pub light_client: LightClientConfig,
    /// Local enclave.
    pub enclave: EnclaveConfig,
    /// Peer report verification.
    pub attestation: AttestationConfig,
    /// Sealed file paths and sealing policy.
    pub keys: SealedKeyConfig,
    /// Event reactor timing.
    pub reactor: ReactorConfig,
    /// Content store endpoint.
    pub content_store: ContentStoreConfig,
    /// Vote transaction parameters.
    pub tx: VoteTxConfig,
    /// Generate the oracle key when none is sealed instead of waiting for
    /// a hand-off.
    pub init_oracle_key: bool,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable does not parse.
    #[error("{name}={value:?} is not valid: {reason}")]
    InvalidVariable {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// Parse failure
        reason: String,
    },

    /// The assembled configuration is unusable.
    #[error("invalid {section} configuration: {reason}")]
    Invalid {
        /// Offending section
        section: &'static str,
        /// What is wrong
        reason: String,
    },
}

impl ConfigError {
    fn invalid(section: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            section,
            reason: reason.to_string(),
        }
    }
}

/// Chain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Chain id.
    pub chain_id: String,
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// Operator-supplied trust anchor height.
    pub trusted_height: i64,
    /// Operator-supplied trust anchor hash (hex).
    pub trusted_hash: String,
    /// Block events poll interval in milliseconds.
    pub event_poll_interval_ms: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            chain_id: "oracle-1".to_string(),
            rpc_url: "http://127.0.0.1:26657".to_string(),
            request_timeout_ms: 10_000,
            trusted_height: 0,
            trusted_hash: String::new(),
            event_poll_interval_ms: 1_000,
        }
    }
}

impl ChainConfig {
    /// Parsed trust anchor.
    pub fn trust_anchor(&self) -> Result<TrustedBlockInfo, ConfigError> {
        TrustedBlockInfo::from_hex(self.trusted_height, &self.trusted_hash)
            .map_err(|e| ConfigError::invalid("chain", format!("trust anchor: {e}")))
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Event poll interval.
    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_millis(self.event_poll_interval_ms)
    }
}

/// Local enclave configuration.
#[derive(Debug, Clone)]
pub struct EnclaveConfig {
    /// Platform secret the sealing key is derived from.
    pub platform_secret_path: PathBuf,
    /// Product id (hex).
    pub product_id: String,
    /// Signer measurement (hex).
    pub signer_id: String,
    /// Enclave measurement (hex).
    pub unique_id: String,
    /// Security version reported by this enclave.
    pub security_version: u16,
}

impl Default for EnclaveConfig {
    fn default() -> Self {
        Self {
            platform_secret_path: PathBuf::from("data/platform.secret"),
            product_id: "01".to_string(),
            signer_id: "00".repeat(32),
            unique_id: "00".repeat(32),
            security_version: 1,
        }
    }
}

impl EnclaveConfig {
    /// Measurements this enclave reports.
    pub fn identity(&self) -> Result<EnclaveIdentity, ConfigError> {
        let decode = |name: &str, value: &str| {
            hex::decode(value.trim_start_matches("0x"))
                .map_err(|e| ConfigError::invalid("enclave", format!("{name}: {e}")))
        };
        Ok(EnclaveIdentity {
            product_id: decode("product_id", &self.product_id)?,
            signer_id: decode("signer_id", &self.signer_id)?,
            unique_id: decode("unique_id", &self.unique_id)?,
        })
    }
}

/// Content store configuration.
#[derive(Debug, Clone)]
pub struct ContentStoreConfig {
    /// API base URL.
    pub url: String,
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ContentStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5001".to_string(),
            request_timeout_ms: 30_000,
        }
    }
}

impl ContentStoreConfig {
    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl NodeConfig {
    /// Defaults overridden by `OC_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `OC_*`
    /// variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = NodeConfig::default();

        if let Some(dir) = lookup("OC_DATA_DIR") {
            let policy = config.keys.policy;
            config.keys = SealedKeyConfig::in_dir(Path::new(&dir));
            config.keys.policy = policy;
            config.enclave.platform_secret_path = Path::new(&dir).join("platform.secret");
        }
        if let Some(path) = lookup("OC_PLATFORM_SECRET_PATH") {
            config.enclave.platform_secret_path = PathBuf::from(path);
        }

        if let Some(chain_id) = lookup("OC_CHAIN_ID") {
            config.chain.chain_id = chain_id;
        }
        config.light_client.chain_id = config.chain.chain_id.clone();
        config.tx.chain_id = config.chain.chain_id.clone();

        if let Some(url) = lookup("OC_RPC_URL") {
            config.chain.rpc_url = url;
        }
        if let Some(height) = parse_var(&lookup, "OC_TRUSTED_HEIGHT")? {
            config.chain.trusted_height = height;
        }
        if let Some(hash) = lookup("OC_TRUSTED_HASH") {
            config.chain.trusted_hash = hash;
        }
        if let Some(level) = lookup("OC_TRUST_LEVEL") {
            config.light_client.trust_threshold = parse_trust_level(&level).ok_or_else(|| {
                ConfigError::InvalidVariable {
                    name: "OC_TRUST_LEVEL",
                    value: level.clone(),
                    reason: "expected n/d within [1/3, 1]".into(),
                }
            })?;
        }

        if let Some(key) = lookup("OC_VENDOR_ROOT_KEY") {
            config.attestation.vendor_root_key = Some(key);
        }
        if let Some(version) = parse_var(&lookup, "OC_MIN_SECURITY_VERSION")? {
            config.attestation.min_security_version = version;
        }
        if let Some(version) = parse_var(&lookup, "OC_SECURITY_VERSION")? {
            config.enclave.security_version = version;
        }
        if let Some(unique_id) = lookup("OC_UNIQUE_ID") {
            config.enclave.unique_id = unique_id;
        }
        if let Some(signer_id) = lookup("OC_SIGNER_ID") {
            config.enclave.signer_id = signer_id;
        }
        if let Some(product_id) = lookup("OC_PRODUCT_ID") {
            config.enclave.product_id = product_id;
        }

        if let Some(url) = lookup("OC_CONTENT_STORE_URL") {
            config.content_store.url = url;
        }

        if let Some(ms) = parse_var(&lookup, "OC_HANDLER_TIMEOUT_MS")? {
            config.reactor.handler_timeout_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "OC_SHUTDOWN_GRACE_MS")? {
            config.reactor.shutdown_grace_ms = ms;
        }

        if let Some(gas) = parse_var(&lookup, "OC_GAS_LIMIT")? {
            config.tx.gas_limit = gas;
        }
        if let Some(fee) = parse_var(&lookup, "OC_FEE_AMOUNT")? {
            config.tx.fee_amount = fee;
        }
        if let Some(init) = parse_var(&lookup, "OC_INIT_ORACLE_KEY")? {
            config.init_oracle_key = init;
        }

        Ok(config)
    }

    /// Reject configurations the node cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain.chain_id.is_empty() {
            return Err(ConfigError::invalid("chain", "chain id must not be empty"));
        }
        if self.light_client.chain_id != self.chain.chain_id
            || self.tx.chain_id != self.chain.chain_id
        {
            return Err(ConfigError::invalid(
                "chain",
                "light client and transactions must use the chain's id",
            ));
        }
        if self.chain.rpc_url.is_empty() {
            return Err(ConfigError::invalid("chain", "rpc url must not be empty"));
        }
        self.chain.trust_anchor()?;
        self.light_client
            .validate()
            .map_err(|e| ConfigError::invalid("light_client", e))?;
        self.keys
            .validate()
            .map_err(|e| ConfigError::invalid("keys", e))?;
        self.attestation
            .validate()
            .map_err(|e| ConfigError::invalid("attestation", e))?;
        self.enclave.identity()?;
        self.reactor
            .validate()
            .map_err(|e| ConfigError::invalid("reactor", e))?;
        if self.content_store.url.is_empty() {
            return Err(ConfigError::invalid("content_store", "url must not be empty"));
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: ToString,
{
    match lookup(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVariable {
                name,
                value,
                reason: e.to_string(),
            }),
    }
}

fn parse_trust_level(value: &str) -> Option<TrustThreshold> {
    let (numerator, denominator) = value.split_once('/')?;
    TrustThreshold::new(
        numerator.trim().parse().ok()?,
        denominator.trim().parse().ok()?,
    )
}
