//! Keystore v3 file import
//!
//! Pipeline: read file, structural validation, key decryption, address
//! confirmation, mnemonic synthesis, encrypted persistence. The managed
//! copy keeps the original file bytes untouched.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{ImportStage, WalletManager};
use crate::core::domain::WalletDetails;
use crate::core::errors::WalletError;
use crate::crypto::hd::KeyPair;
use crate::crypto::synth::synthesize_mnemonic_checked;
use crate::keystore::{self, KeystoreError, KeystoreV3};

impl WalletManager {
    /// Import a wallet from an external keystore v3 file.
    pub async fn import_from_file(
        &self,
        name: &str,
        path: impl AsRef<Path>,
        password: &str,
    ) -> Result<WalletDetails, WalletError> {
        Self::validate_name(name)?;
        let path = path.as_ref();
        debug!(stage = ?ImportStage::Start, name, path = %path.display(), "Importing keystore file");

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                WalletError::from(KeystoreError::FileNotFound(path.display().to_string()))
            }
            _ => WalletError::from(KeystoreError::Io(e)),
        })?;
        debug!(stage = ?ImportStage::FileRead, len = bytes.len(), "Keystore file read");

        let document = KeystoreV3::parse(&bytes)?;
        let kdf_params = document.validate_structure()?;
        debug!(stage = ?ImportStage::StructureValidated, "Keystore structure validated");

        let private_key = keystore::decrypt_key(&document, &kdf_params, password)?;
        debug!(stage = ?ImportStage::PasswordVerified, "Keystore key material decrypted");

        let key_pair = KeyPair::from_private_bytes(&private_key)?;
        let derived = key_pair.address();
        let declared = document
            .canonical_address()
            .ok_or_else(|| WalletError::from(KeystoreError::MissingField("address".to_string())))?;
        if !derived.eq_ignore_ascii_case(&declared) {
            return Err(KeystoreError::AddressMismatch { declared, derived }.into());
        }
        debug!(stage = ?ImportStage::AddressConfirmed, address = %derived, "Declared address confirmed");

        self.ensure_address_free(&derived).await?;

        let mnemonic = synthesize_mnemonic_checked(&private_key)
            .map_err(|e| WalletError::from(KeystoreError::CorruptedFile(e.to_string())))?;
        debug!(stage = ?ImportStage::MnemonicReady, "Backup mnemonic synthesized");

        let details = self.finalize(name, mnemonic, key_pair, password, &bytes).await?;
        info!(address = %details.wallet.address, "Keystore file imported");
        Ok(details)
    }
}
