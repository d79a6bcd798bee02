//! Persistence boundary for wallet records
//!
//! The core only sees the [`WalletRepository`] trait; address uniqueness
//! is enforced by the manager issuing a pre-check, not by a storage-level
//! constraint. An in-memory implementation backs tests and embedders that
//! bring no database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::core::domain::Wallet;
use crate::core::errors::WalletError;

pub mod keyfiles;
pub use keyfiles::KeyFileStore;

#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn create(&self, wallet: &Wallet) -> Result<(), WalletError>;
    async fn get_by_id(&self, id: &str) -> Result<Option<Wallet>, WalletError>;
    async fn get_by_address(&self, address: &str) -> Result<Option<Wallet>, WalletError>;
    async fn list(&self) -> Result<Vec<Wallet>, WalletError>;
    async fn update(&self, wallet: &Wallet) -> Result<(), WalletError>;
    async fn delete(&self, id: &str) -> Result<(), WalletError>;
    async fn close(&self) -> Result<(), WalletError>;
}

/// HashMap-backed repository keyed by wallet id.
#[derive(Default)]
pub struct MemoryWalletRepository {
    wallets: Arc<RwLock<HashMap<String, Wallet>>>,
}

impl MemoryWalletRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletRepository for MemoryWalletRepository {
    async fn create(&self, wallet: &Wallet) -> Result<(), WalletError> {
        let mut wallets = self.wallets.write().await;
        if wallets.contains_key(&wallet.id) {
            return Err(WalletError::StorageError(format!(
                "Wallet id {} already stored",
                wallet.id
            )));
        }
        debug!(address = %wallet.address, "Storing wallet record");
        wallets.insert(wallet.id.clone(), wallet.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Wallet>, WalletError> {
        Ok(self.wallets.read().await.get(id).cloned())
    }

    async fn get_by_address(&self, address: &str) -> Result<Option<Wallet>, WalletError> {
        let needle = address.to_ascii_lowercase();
        Ok(self
            .wallets
            .read()
            .await
            .values()
            .find(|w| w.address.to_ascii_lowercase() == needle)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Wallet>, WalletError> {
        let mut wallets: Vec<Wallet> = self.wallets.read().await.values().cloned().collect();
        wallets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(wallets)
    }

    async fn update(&self, wallet: &Wallet) -> Result<(), WalletError> {
        let mut wallets = self.wallets.write().await;
        match wallets.get_mut(&wallet.id) {
            Some(existing) => {
                *existing = wallet.clone();
                existing.updated_at = Utc::now();
                Ok(())
            }
            None => Err(WalletError::NotFoundError(format!("Wallet id {}", wallet.id))),
        }
    }

    async fn delete(&self, id: &str) -> Result<(), WalletError> {
        match self.wallets.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(WalletError::NotFoundError(format!("Wallet id {}", id))),
        }
    }

    async fn close(&self) -> Result<(), WalletError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(name: &str, address: &str) -> Wallet {
        Wallet::new(name, address, "/tmp/key.json", "encrypted")
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let repo = MemoryWalletRepository::new();
        let wallet = sample("main", "0xaa");
        repo.create(&wallet).await.unwrap();

        let by_id = repo.get_by_id(&wallet.id).await.unwrap().unwrap();
        assert_eq!(by_id, wallet);
        let by_addr = repo.get_by_address("0xAA").await.unwrap().unwrap();
        assert_eq!(by_addr.id, wallet.id);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let repo = MemoryWalletRepository::new();
        let wallet = sample("main", "0xaa");
        repo.create(&wallet).await.unwrap();
        assert!(repo.create(&wallet).await.is_err());
    }

    #[tokio::test]
    async fn test_list_ordered_by_creation() {
        let repo = MemoryWalletRepository::new();
        let a = sample("a", "0x1");
        let b = sample("b", "0x2");
        repo.create(&a).await.unwrap();
        repo.create(&b).await.unwrap();
        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|w| w.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_update_missing_wallet() {
        let repo = MemoryWalletRepository::new();
        let err = repo.update(&sample("x", "0x9")).await.unwrap_err();
        assert!(matches!(err, WalletError::NotFoundError(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = MemoryWalletRepository::new();
        let wallet = sample("main", "0xaa");
        repo.create(&wallet).await.unwrap();
        repo.delete(&wallet.id).await.unwrap();
        assert!(repo.get_by_id(&wallet.id).await.unwrap().is_none());
        assert!(repo.delete(&wallet.id).await.is_err());
    }
}
