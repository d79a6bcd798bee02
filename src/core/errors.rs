use std::fmt;

use crate::crypto::cipher::CipherError;
use crate::keystore::KeystoreError;

/// Custom error type for wallet operations.
#[derive(Debug)]
pub enum WalletError {
    /// Input validation errors (bad mnemonic, malformed address, empty name).
    ValidationError(String),
    /// Resource not found errors.
    NotFoundError(String),
    /// A wallet already exists for the given address.
    AlreadyExists(String),
    /// Wrong password or failed integrity check.
    AuthenticationError(String),
    /// Network errors.
    NetworkError(String),
    /// Encryption/decryption/derivation errors.
    CryptoError(String),
    /// Storage and filesystem errors.
    StorageError(String),
    /// Internal errors.
    InternalError(String),
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            WalletError::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            WalletError::AlreadyExists(msg) => write!(f, "Already exists: {}", msg),
            WalletError::AuthenticationError(msg) => write!(f, "Authentication error: {}", msg),
            WalletError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            WalletError::CryptoError(msg) => write!(f, "Crypto error: {}", msg),
            WalletError::StorageError(msg) => write!(f, "Storage error: {}", msg),
            WalletError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}

impl WalletError {
    /// Stable machine-readable category code, for callers that localize messages.
    pub fn code(&self) -> &'static str {
        match self {
            WalletError::ValidationError(_) => "validation",
            WalletError::NotFoundError(_) => "not_found",
            WalletError::AlreadyExists(_) => "already_exists",
            WalletError::AuthenticationError(_) => "authentication",
            WalletError::NetworkError(_) => "network",
            WalletError::CryptoError(_) => "crypto",
            WalletError::StorageError(_) => "storage",
            WalletError::InternalError(_) => "internal",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, WalletError::CryptoError(_) | WalletError::InternalError(_))
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, WalletError::NetworkError(_))
    }
}

impl From<std::io::Error> for WalletError {
    fn from(err: std::io::Error) -> Self {
        WalletError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        WalletError::ValidationError(err.to_string())
    }
}

impl From<CipherError> for WalletError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::InvalidPassword => {
                WalletError::AuthenticationError("invalid password".to_string())
            }
            CipherError::EmptyPassword | CipherError::EmptyInput => {
                WalletError::ValidationError(err.to_string())
            }
            other => WalletError::CryptoError(other.to_string()),
        }
    }
}

impl From<KeystoreError> for WalletError {
    fn from(err: KeystoreError) -> Self {
        match &err {
            KeystoreError::FileNotFound(_) => WalletError::NotFoundError(err.to_string()),
            KeystoreError::IncorrectPassword => WalletError::AuthenticationError(err.to_string()),
            KeystoreError::Io(_) => WalletError::StorageError(err.to_string()),
            _ => WalletError::ValidationError(err.to_string()),
        }
    }
}
