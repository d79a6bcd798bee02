//! Wallet unlock and deletion

use tracing::{debug, info, warn};

use super::WalletManager;
use crate::core::domain::{Wallet, WalletDetails};
use crate::core::errors::WalletError;
use crate::crypto::cipher::SecretCipher;
use crate::crypto::hd::KeyPair;
use crate::keystore::{self, KeystoreV3};

impl WalletManager {
    /// Unlock a wallet: decrypt the stored mnemonic blob and recover the
    /// key pair from the backing keystore file. Both are protected under
    /// the same password, so a single wrong password fails both ways.
    pub async fn load_wallet(
        &self,
        wallet: &Wallet,
        password: &str,
    ) -> Result<WalletDetails, WalletError> {
        debug!(address = %wallet.address, "Loading wallet");

        let mnemonic = SecretCipher::decrypt(&wallet.encrypted_mnemonic, password)?;

        let bytes = self.key_files.read(&wallet.address)?;
        let document = KeystoreV3::parse(&bytes)?;
        let kdf_params = document.validate_structure()?;
        let private_key = keystore::decrypt_key(&document, &kdf_params, password)?;
        let key_pair = KeyPair::from_private_bytes(&private_key)?;

        if !key_pair.address().eq_ignore_ascii_case(&wallet.address) {
            return Err(WalletError::CryptoError(
                "Backing key file does not match wallet address".to_string(),
            ));
        }

        Ok(WalletDetails { wallet: wallet.clone(), mnemonic, key_pair })
    }

    /// Remove the wallet record and its backing key file. A missing file
    /// is tolerated; the record removal is what matters.
    pub async fn delete_wallet(&self, wallet: &Wallet) -> Result<(), WalletError> {
        self.repository.delete(&wallet.id).await?;
        if let Err(e) = self.key_files.remove(&wallet.address) {
            warn!(address = %wallet.address, error = %e, "Key file removal failed after record delete");
            return Err(e);
        }
        info!(address = %wallet.address, "Wallet deleted");
        Ok(())
    }

    /// List all stored wallets.
    pub async fn list_wallets(&self) -> Result<Vec<Wallet>, WalletError> {
        self.repository.list().await
    }

    /// Rename a wallet. Metadata-only mutation.
    pub async fn rename_wallet(&self, wallet: &Wallet, name: &str) -> Result<Wallet, WalletError> {
        Self::validate_name(name)?;
        let mut updated = wallet.clone();
        updated.name = name.to_string();
        self.repository.update(&updated).await?;
        Ok(updated)
    }
}
