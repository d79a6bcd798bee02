//! End-to-end wallet lifecycle tests: create, import, load, delete.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;

use keyforge_wallet::core::wallet_manager::WalletManager;
use keyforge_wallet::crypto::cipher::SecretCipher;
use keyforge_wallet::crypto::mnemonic::validate_mnemonic;
use keyforge_wallet::keystore;
use keyforge_wallet::storage::MemoryWalletRepository;
use keyforge_wallet::WalletError;

const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const PASSWORD: &str = "testpassword123";

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_env_filter("keyforge_wallet=debug").try_init();
}

fn manager(tmp: &TempDir) -> WalletManager {
    WalletManager::new(Arc::new(MemoryWalletRepository::new()), tmp.path().join("keys")).unwrap()
}

#[tokio::test]
async fn create_load_delete_cycle() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);

    let created = m.create_new("primary", PASSWORD).await.unwrap();
    assert!(validate_mnemonic(&created.mnemonic));

    let loaded = m.load_wallet(&created.wallet, PASSWORD).await.unwrap();
    assert_eq!(loaded.mnemonic, created.mnemonic);
    assert_eq!(loaded.key_pair.address(), created.wallet.address);

    m.delete_wallet(&created.wallet).await.unwrap();
    assert!(m.repository().get_by_address(&created.wallet.address).await.unwrap().is_none());
}

#[tokio::test]
async fn mnemonic_import_is_deterministic_across_managers() {
    init_tracing();
    let tmp_a = TempDir::new().unwrap();
    let tmp_b = TempDir::new().unwrap();

    let a = manager(&tmp_a).import_from_mnemonic("a", PHRASE, PASSWORD).await.unwrap();
    let b = manager(&tmp_b).import_from_mnemonic("b", PHRASE, PASSWORD).await.unwrap();

    assert_eq!(a.wallet.address, b.wallet.address);
    assert_eq!(
        a.key_pair.private_key_bytes().as_ref(),
        b.key_pair.private_key_bytes().as_ref()
    );
    // Encrypted blobs differ even for identical inputs (fresh salt)
    assert_ne!(a.wallet.encrypted_mnemonic, b.wallet.encrypted_mnemonic);
}

#[tokio::test]
async fn encrypted_blob_scenario() {
    // Two encryptions of the same phrase: different blobs, both decrypt
    // with the right password, both refuse the wrong one.
    let blob1 = SecretCipher::encrypt(PHRASE, PASSWORD).unwrap();
    let blob2 = SecretCipher::encrypt(PHRASE, PASSWORD).unwrap();
    assert_ne!(blob1, blob2);

    assert_eq!(SecretCipher::decrypt(&blob1, PASSWORD).unwrap(), PHRASE);
    assert_eq!(SecretCipher::decrypt(&blob2, PASSWORD).unwrap(), PHRASE);
    assert!(SecretCipher::decrypt(&blob1, "wrongpassword").is_err());
    assert!(SecretCipher::decrypt(&blob2, "wrongpassword").is_err());
}

#[tokio::test]
async fn keystore_file_import_end_to_end() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);

    // Produce an external keystore file, then import it
    let document = keystore::encrypt_key(&[0x2Au8; 32], PASSWORD).unwrap();
    let external = tmp.path().join("external.json");
    fs::write(&external, serde_json::to_vec_pretty(&document).unwrap()).unwrap();

    let details = m.import_from_file("imported", &external, PASSWORD).await.unwrap();

    // Address recoverable from the decrypted key matches the wallet record
    assert_eq!(details.wallet.address, details.key_pair.address());
    // Stored mnemonic field is encrypted, not the plaintext
    assert_ne!(details.wallet.encrypted_mnemonic, details.mnemonic);
    // Synthesized phrase passes standalone validation
    assert!(validate_mnemonic(&details.mnemonic));

    // Same file imported twice (after removing the first wallet) yields an
    // identical synthesized mnemonic
    m.delete_wallet(&details.wallet).await.unwrap();
    let again = m.import_from_file("imported-again", &external, PASSWORD).await.unwrap();
    assert_eq!(again.mnemonic, details.mnemonic);
}

#[tokio::test]
async fn duplicate_address_fails_before_touching_key_files() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let m = manager(&tmp);

    let details = m.import_from_mnemonic("one", PHRASE, PASSWORD).await.unwrap();
    let err = m.import_from_mnemonic("two", PHRASE, PASSWORD).await.unwrap_err();
    assert!(matches!(err, WalletError::AlreadyExists(_)));
    assert!(m.key_files().exists(&details.wallet.address));
    assert_eq!(m.list_wallets().await.unwrap().len(), 1);
}

/// Repository that rejects every create, to exercise key-file rollback.
struct RejectingRepository;

#[async_trait::async_trait]
impl keyforge_wallet::storage::WalletRepository for RejectingRepository {
    async fn create(&self, _w: &keyforge_wallet::Wallet) -> Result<(), WalletError> {
        Err(WalletError::StorageError("disk full".to_string()))
    }
    async fn get_by_id(&self, _id: &str) -> Result<Option<keyforge_wallet::Wallet>, WalletError> {
        Ok(None)
    }
    async fn get_by_address(
        &self,
        _address: &str,
    ) -> Result<Option<keyforge_wallet::Wallet>, WalletError> {
        Ok(None)
    }
    async fn list(&self) -> Result<Vec<keyforge_wallet::Wallet>, WalletError> {
        Ok(vec![])
    }
    async fn update(&self, _w: &keyforge_wallet::Wallet) -> Result<(), WalletError> {
        Ok(())
    }
    async fn delete(&self, _id: &str) -> Result<(), WalletError> {
        Ok(())
    }
    async fn close(&self) -> Result<(), WalletError> {
        Ok(())
    }
}

#[tokio::test]
async fn key_file_copy_rolled_back_when_persistence_fails() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let m = WalletManager::new(Arc::new(RejectingRepository), tmp.path().join("keys")).unwrap();

    let err = m.import_from_mnemonic("one", PHRASE, PASSWORD).await.unwrap_err();
    assert!(matches!(err, WalletError::StorageError(_)));

    // No orphaned key file may remain after the failed persistence step
    let entries: Vec<_> = fs::read_dir(tmp.path().join("keys")).unwrap().collect();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn keystore_validation_errors_carry_field_paths() {
    let mut doc = serde_json::to_value(keystore::encrypt_key(&[1u8; 32], PASSWORD).unwrap()).unwrap();
    doc.as_object_mut().unwrap().remove("address");
    let parsed = keystore::KeystoreV3::parse(doc.to_string().as_bytes()).unwrap();
    let err = parsed.validate_structure().unwrap_err();
    assert_eq!(err.code(), "missing_required_field");
    assert_eq!(err.field_path(), Some("address"));

    let mut doc = serde_json::to_value(keystore::encrypt_key(&[1u8; 32], PASSWORD).unwrap()).unwrap();
    doc["version"] = serde_json::json!(2);
    let parsed = keystore::KeystoreV3::parse(doc.to_string().as_bytes()).unwrap();
    assert_eq!(parsed.validate_structure().unwrap_err().code(), "invalid_version");
}
