//! Managed keystore file directory
//!
//! One file per wallet, named `<canonical-address>.json`, holding the
//! untouched bytes of the original or newly produced keystore document.
//! Writes use exclusive create-or-fail semantics so an existing wallet's
//! backing file is never silently overwritten.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::errors::WalletError;

pub struct KeyFileStore {
    dir: PathBuf,
}

impl KeyFileStore {
    /// Open (creating if needed) the managed key file directory.
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, WalletError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .map_err(|e| WalletError::StorageError(format!("Create key dir failed: {}", e)))?;
        Ok(Self { dir })
    }

    /// Path a given canonical address maps to.
    pub fn path_for(&self, address: &str) -> PathBuf {
        self.dir.join(format!("{}.json", address.to_ascii_lowercase()))
    }

    /// Write a new key file. Fails if a file for the address already
    /// exists, which would mean clobbering another wallet's backing file.
    pub fn save_new(&self, address: &str, bytes: &[u8]) -> Result<PathBuf, WalletError> {
        let path = self.path_for(address);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::AlreadyExists => WalletError::StorageError(format!(
                    "Key file already exists: {}",
                    path.display()
                )),
                _ => WalletError::StorageError(format!("Create key file failed: {}", e)),
            })?;
        file.write_all(bytes)
            .map_err(|e| WalletError::StorageError(format!("Write key file failed: {}", e)))?;

        debug!(path = %path.display(), "Saved key file");
        Ok(path)
    }

    pub fn read(&self, address: &str) -> Result<Vec<u8>, WalletError> {
        let path = self.path_for(address);
        fs::read(&path)
            .map_err(|e| WalletError::StorageError(format!("Read key file failed: {}", e)))
    }

    /// Delete the backing file, tolerating one that is already gone.
    pub fn remove(&self, address: &str) -> Result<(), WalletError> {
        let path = self.path_for(address);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Key file already missing on delete");
                Ok(())
            }
            Err(e) => Err(WalletError::StorageError(format!("Remove key file failed: {}", e))),
        }
    }

    pub fn exists(&self, address: &str) -> bool {
        self.path_for(address).exists()
    }
}
