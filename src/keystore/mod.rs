//! Keystore v3 file format: parsing, structural validation, key
//! encryption/decryption.

pub mod crypt;
pub mod error;
pub mod record;

pub use crypt::{decrypt_key, encrypt_key, CIPHER_AES_128_CTR};
pub use error::{KeystoreError, KeystoreResult};
pub use record::{CipherParams, CryptoSection, KdfParams, KeystoreV3, SUPPORTED_VERSION};
