//! Core wallet domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use crate::crypto::hd::KeyPair;

/// Persisted wallet record. The mnemonic is stored only as an encrypted
/// blob; the address is unique across the repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wallet {
    pub id: String,
    pub name: String,
    /// Canonical address: lowercase hex, 0x prefix.
    pub address: String,
    /// Path of the backing keystore v3 file in the managed directory.
    pub keyfile_path: String,
    /// Base64 blob produced by the secret cipher.
    pub encrypted_mnemonic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(
        name: &str,
        address: &str,
        keyfile_path: &str,
        encrypted_mnemonic: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            address: address.to_string(),
            keyfile_path: keyfile_path.to_string(),
            encrypted_mnemonic: encrypted_mnemonic.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Result of a create/import operation: the persisted record plus the
/// plaintext mnemonic (for one-time display) and the live key pair.
#[derive(Debug)]
pub struct WalletDetails {
    pub wallet: Wallet,
    pub mnemonic: String,
    pub key_pair: KeyPair,
}
