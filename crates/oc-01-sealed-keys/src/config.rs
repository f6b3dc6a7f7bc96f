//! # Sealed Key Store Configuration

use crate::domain::{KeySlot, SealError, SealPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Sealed key store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SealedKeyConfig {
    /// Measurement the sealing key is bound to.
    pub policy: SealPolicy,

    /// Sealed per-node transport key.
    pub node_key_path: PathBuf,

    /// Sealed oracle fleet key.
    pub oracle_key_path: PathBuf,

    /// Sealed account key.
    pub account_key_path: PathBuf,

    /// Sealed trusted block of the light client.
    pub trusted_block_path: PathBuf,
}

impl Default for SealedKeyConfig {
    fn default() -> Self {
        Self::in_dir(Path::new("data"))
    }
}

impl SealedKeyConfig {
    /// Standard file names under one directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            policy: SealPolicy::MrEnclave,
            node_key_path: dir.join("node_key.sealed"),
            oracle_key_path: dir.join("oracle_key.sealed"),
            account_key_path: dir.join("account_key.sealed"),
            trusted_block_path: dir.join("trusted_block.sealed"),
        }
    }

    /// Create a config for testing rooted at `dir`.
    pub fn for_testing(dir: &Path) -> Self {
        Self::in_dir(dir)
    }

    /// Path of the file backing `slot`.
    pub fn path_for(&self, slot: KeySlot) -> &Path {
        match slot {
            KeySlot::NodeKey => &self.node_key_path,
            KeySlot::OracleKey => &self.oracle_key_path,
            KeySlot::AccountKey => &self.account_key_path,
            KeySlot::TrustedBlock => &self.trusted_block_path,
        }
    }

    /// Every slot must have its own file.
    pub fn validate(&self) -> Result<(), SealError> {
        let mut seen = HashSet::new();
        for slot in KeySlot::ALL {
            let path = self.path_for(slot);
            if !seen.insert(path.to_path_buf()) {
                return Err(SealError::Io {
                    path: path.display().to_string(),
                    message: format!("{slot} shares its path with another slot"),
                });
            }
        }
        Ok(())
    }
}
