//! # File-Backed Sealed Store
//!
//! One file per slot at the configured path. Writes go to a temporary file
//! in the same directory that is fsynced and renamed over the target, so a
//! crash never leaves a half-written key file. Writers hold an exclusive
//! `fs2` lock on a sibling `.lock` file.

use crate::config::SealedKeyConfig;
use crate::domain::{KeySlot, SealError};
use crate::ports::SealedBlobStorage;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Sealed blob storage on the local filesystem.
pub struct FileSealedStore {
    config: SealedKeyConfig,
}

impl FileSealedStore {
    /// Create a store over the configured paths.
    pub fn new(config: SealedKeyConfig) -> Result<Self, SealError> {
        config.validate()?;
        Ok(Self { config })
    }

    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(suffix);
        path.with_file_name(name)
    }

    fn open_private(path: &Path) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true).write(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        options.open(path)
    }
}

impl SealedBlobStorage for FileSealedStore {
    fn read(&self, slot: KeySlot) -> Result<Option<Vec<u8>>, SealError> {
        let path = self.config.path_for(slot);
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SealError::io(path, e)),
        }
    }

    fn write(&self, slot: KeySlot, bytes: &[u8]) -> Result<(), SealError> {
        let path = self.config.path_for(slot);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SealError::io(parent, e))?;
        }

        let lock_path = Self::sibling(path, ".lock");
        let lock = Self::open_private(&lock_path).map_err(|e| SealError::io(&lock_path, e))?;
        lock.lock_exclusive()
            .map_err(|e| SealError::io(&lock_path, e))?;

        let tmp_path = Self::sibling(path, ".tmp");
        let result = (|| {
            let mut tmp = Self::open_private(&tmp_path)?;
            tmp.write_all(bytes)?;
            tmp.sync_all()?;
            fs::rename(&tmp_path, path)
        })();

        let _ = lock.unlock();
        result.map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            SealError::io(path, e)
        })?;

        debug!(slot = %slot, path = %path.display(), "[oc-01] Sealed blob written");
        Ok(())
    }

    fn exists(&self, slot: KeySlot) -> Result<bool, SealError> {
        Ok(self.config.path_for(slot).exists())
    }
}
