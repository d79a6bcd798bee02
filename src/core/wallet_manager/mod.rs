//! Wallet manager: end-to-end create/import/load/delete flows
//!
//! Composes key derivation, the secret cipher, the keystore validator and
//! the storage boundary. Each operation is a single pass through a fixed
//! pipeline; on failure after the managed key file copy has been written
//! but before the record is persisted, the copy is deleted so no orphaned
//! secret material stays behind.

mod create;
mod import;
mod lifecycle;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::core::domain::{Wallet, WalletDetails};
use crate::core::errors::WalletError;
use crate::crypto::cipher::SecretCipher;
use crate::crypto::hd::KeyPair;
use crate::storage::{KeyFileStore, WalletRepository};

/// Pipeline stages of one import/create attempt, logged at each transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportStage {
    Start,
    FileRead,
    StructureValidated,
    PasswordVerified,
    AddressConfirmed,
    MnemonicReady,
    SecretEncrypted,
    Persisted,
}

pub struct WalletManager {
    repository: Arc<dyn WalletRepository>,
    key_files: KeyFileStore,
}

impl WalletManager {
    pub fn new(
        repository: Arc<dyn WalletRepository>,
        key_dir: impl AsRef<Path>,
    ) -> Result<Self, WalletError> {
        let key_files = KeyFileStore::new(key_dir)?;
        Ok(Self { repository, key_files })
    }

    pub fn repository(&self) -> &Arc<dyn WalletRepository> {
        &self.repository
    }

    pub fn key_files(&self) -> &KeyFileStore {
        &self.key_files
    }

    /// Address-uniqueness pre-check. Storage is not asked to enforce this.
    pub(crate) async fn ensure_address_free(&self, address: &str) -> Result<(), WalletError> {
        if self.repository.get_by_address(address).await?.is_some() {
            return Err(WalletError::AlreadyExists(format!(
                "Wallet for address {} already exists",
                address
            )));
        }
        Ok(())
    }

    /// Shared tail of every create/import pipeline: encrypt the mnemonic,
    /// write the managed key file, persist the record. Rolls the file copy
    /// back if persistence fails.
    pub(crate) async fn finalize(
        &self,
        name: &str,
        mnemonic: String,
        key_pair: KeyPair,
        password: &str,
        keystore_bytes: &[u8],
    ) -> Result<WalletDetails, WalletError> {
        let address = key_pair.address();

        let encrypted_mnemonic = SecretCipher::encrypt(&mnemonic, password)?;
        debug!(stage = ?ImportStage::SecretEncrypted, %address, "Mnemonic encrypted");

        let keyfile_path = self.key_files.save_new(&address, keystore_bytes)?;

        let wallet =
            Wallet::new(name, &address, &keyfile_path.to_string_lossy(), &encrypted_mnemonic);
        if let Err(e) = self.repository.create(&wallet).await {
            // Remove the file we just created; persistence was the last step
            let _ = self.key_files.remove(&address);
            return Err(e);
        }

        info!(stage = ?ImportStage::Persisted, %address, name, "Wallet persisted");
        Ok(WalletDetails { wallet, mnemonic, key_pair })
    }

    pub(crate) fn validate_name(name: &str) -> Result<(), WalletError> {
        if name.trim().is_empty() {
            return Err(WalletError::ValidationError("Wallet name must not be empty".to_string()));
        }
        Ok(())
    }
}
