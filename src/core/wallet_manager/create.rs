//! Wallet creation paths: fresh mnemonic, imported mnemonic, raw key

use tracing::{debug, info};
use zeroize::Zeroizing;

use super::{ImportStage, WalletManager};
use crate::core::domain::WalletDetails;
use crate::core::errors::WalletError;
use crate::crypto::hd::{derive_private_key, KeyPair};
use crate::crypto::mnemonic::{generate_mnemonic, validate_mnemonic};
use crate::crypto::synth::synthesize_mnemonic_checked;
use crate::keystore;

impl WalletManager {
    /// Create a wallet from a freshly generated recovery phrase.
    pub async fn create_new(
        &self,
        name: &str,
        password: &str,
    ) -> Result<WalletDetails, WalletError> {
        info!(name, "Creating new wallet");
        let mnemonic = generate_mnemonic()?;
        self.import_from_mnemonic(name, &mnemonic, password).await
    }

    /// Import a wallet from an existing recovery phrase. The original
    /// phrase, not a synthesized one, is what gets protected at rest.
    pub async fn import_from_mnemonic(
        &self,
        name: &str,
        mnemonic: &str,
        password: &str,
    ) -> Result<WalletDetails, WalletError> {
        Self::validate_name(name)?;
        debug!(stage = ?ImportStage::Start, name, "Importing wallet from mnemonic");

        if !validate_mnemonic(mnemonic) {
            return Err(WalletError::ValidationError("Invalid mnemonic".to_string()));
        }

        let key_pair = derive_private_key(mnemonic)?;
        let address = key_pair.address();
        debug!(stage = ?ImportStage::MnemonicReady, %address, "Key pair derived");

        self.ensure_address_free(&address).await?;

        let keystore_bytes = self.produce_keystore(&key_pair, password)?;
        self.finalize(name, mnemonic.to_string(), key_pair, password, &keystore_bytes).await
    }

    /// Import a wallet from a raw hex-encoded private key. No original
    /// phrase exists, so a deterministic one is synthesized for backup UX.
    pub async fn import_from_private_key(
        &self,
        name: &str,
        private_key_hex: &str,
        password: &str,
    ) -> Result<WalletDetails, WalletError> {
        Self::validate_name(name)?;
        debug!(stage = ?ImportStage::Start, name, "Importing wallet from private key");

        let body = private_key_hex.trim().trim_start_matches("0x");
        let raw = Zeroizing::new(
            hex::decode(body)
                .map_err(|e| WalletError::ValidationError(format!("Invalid private key hex: {}", e)))?,
        );
        let key_pair = KeyPair::from_private_bytes(&raw)?;
        let address = key_pair.address();

        self.ensure_address_free(&address).await?;

        let mnemonic = synthesize_mnemonic_checked(&raw)?;
        debug!(stage = ?ImportStage::MnemonicReady, %address, "Mnemonic synthesized");

        let keystore_bytes = self.produce_keystore(&key_pair, password)?;
        self.finalize(name, mnemonic, key_pair, password, &keystore_bytes).await
    }

    /// Build the backing keystore v3 document for a key pair.
    fn produce_keystore(&self, key_pair: &KeyPair, password: &str) -> Result<Vec<u8>, WalletError> {
        let private = key_pair.private_key_bytes();
        let document = keystore::encrypt_key(private.as_ref(), password)?;
        serde_json::to_vec_pretty(&document)
            .map_err(|e| WalletError::InternalError(format!("Keystore serialization failed: {}", e)))
    }
}
