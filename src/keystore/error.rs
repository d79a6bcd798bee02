//! Keystore import error taxonomy
//!
//! Every variant carries a stable machine-readable code, and structural
//! failures carry the offending field path, so the presentation layer can
//! localize messages without string-matching.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeystoreError {
    #[error("Keystore file not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid keystore JSON: {0}")]
    InvalidJson(String),

    #[error("Unsupported keystore version: {0}")]
    InvalidVersion(u64),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid address field: {0}")]
    InvalidAddress(String),

    #[error("Unsupported KDF: {0}")]
    UnsupportedKdf(String),

    #[error("Invalid keystore structure: {0}")]
    InvalidStructure(String),

    #[error("Incorrect password")]
    IncorrectPassword,

    #[error("Corrupted keystore file: {0}")]
    CorruptedFile(String),

    #[error("Declared address {declared} does not match derived address {derived}")]
    AddressMismatch { declared: String, derived: String },
}

impl KeystoreError {
    /// Stable category code for callers that localize messages.
    pub fn code(&self) -> &'static str {
        match self {
            KeystoreError::FileNotFound(_) => "file_not_found",
            KeystoreError::Io(_) => "io",
            KeystoreError::InvalidJson(_) => "invalid_json",
            KeystoreError::InvalidVersion(_) => "invalid_version",
            KeystoreError::MissingField(_) => "missing_required_field",
            KeystoreError::InvalidAddress(_) => "invalid_address",
            KeystoreError::UnsupportedKdf(_) => "unsupported_kdf",
            KeystoreError::InvalidStructure(_) => "invalid_structure",
            KeystoreError::IncorrectPassword => "incorrect_password",
            KeystoreError::CorruptedFile(_) => "corrupted_file",
            KeystoreError::AddressMismatch { .. } => "address_mismatch",
        }
    }

    /// Dotted path of the offending field, when the failure is structural.
    pub fn field_path(&self) -> Option<&str> {
        match self {
            KeystoreError::MissingField(path) => Some(path),
            KeystoreError::InvalidAddress(_) => Some("address"),
            _ => None,
        }
    }
}

pub type KeystoreResult<T> = Result<T, KeystoreError>;
