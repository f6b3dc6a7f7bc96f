//! # Platform Sealing-Key Provider
//!
//! Software stand-in for the hardware key-derivation instruction: a 32-byte
//! platform secret kept in a root-only file plays the role of the fused
//! device key, and the enclave measurement comes from self attestation.

use crate::algorithms::derive_sealing_key;
use crate::domain::{SealError, SealPolicy, SecretBytes};
use crate::ports::SealingKeyProvider;
use rand::RngCore;
use shared_crypto::SymmetricKey;
use shared_types::EnclaveIdentity;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{info, warn};

/// Platform secret length in bytes.
pub const PLATFORM_SECRET_LEN: usize = 32;

/// Sealing keys derived from the platform secret and this enclave's identity.
pub struct PlatformSealingKeyProvider {
    platform_secret: SecretBytes,
    identity: EnclaveIdentity,
}

impl PlatformSealingKeyProvider {
    /// Create from an already loaded platform secret.
    pub fn new(platform_secret: SecretBytes, identity: EnclaveIdentity) -> Result<Self, SealError> {
        if platform_secret.len() != PLATFORM_SECRET_LEN {
            return Err(SealError::Corrupted(format!(
                "platform secret must be {} bytes, got {}",
                PLATFORM_SECRET_LEN,
                platform_secret.len()
            )));
        }
        Ok(Self {
            platform_secret,
            identity,
        })
    }

    /// Load the platform secret from `path`, creating it on first boot.
    pub fn load_or_create(path: &Path, identity: EnclaveIdentity) -> Result<Self, SealError> {
        let secret = match fs::read(path) {
            Ok(bytes) => SecretBytes::new(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %path.display(), "[oc-01] No platform secret, provisioning a new one");
                let mut bytes = vec![0u8; PLATFORM_SECRET_LEN];
                rand::thread_rng().fill_bytes(&mut bytes);
                let secret = SecretBytes::new(bytes);
                write_private(path, secret.expose()).map_err(|e| SealError::io(path, e))?;
                secret
            }
            Err(e) => return Err(SealError::io(path, e)),
        };
        info!(unique_id = %identity.unique_id_hex(), "[oc-01] Platform sealing key ready");
        Self::new(secret, identity)
    }

    /// Identity the sealing keys are bound to.
    pub fn identity(&self) -> &EnclaveIdentity {
        &self.identity
    }
}

impl SealingKeyProvider for PlatformSealingKeyProvider {
    fn sealing_key(&self, policy: SealPolicy) -> Result<SymmetricKey, SealError> {
        Ok(derive_sealing_key(&self.platform_secret, policy, &self.identity))
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.create_new(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
