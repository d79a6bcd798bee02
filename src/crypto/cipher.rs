//! Password-based protection for recovery phrases
//!
//! Not a general-purpose AEAD: an Argon2id-derived keystream combined with
//! the secret position-wise, authenticated by a SHA-256 hash over
//! (secret || password). The verification hash, not the keystream, is what
//! detects a wrong password; comparison is constant time.
//!
//! Blob layout: base64( salt(16) || verify_hash(32) || ciphertext ).

use argon2::{Algorithm, Argon2, Params, Version};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::debug;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;
/// SHA-256 verification hash length.
pub const VERIFY_HASH_LENGTH: usize = 32;
/// Keystream key length; repeated over longer secrets.
pub const KEY_LENGTH: usize = 32;

/// Argon2id cost parameters. Fixed: changing them breaks decryption of
/// previously stored blobs.
pub const ARGON2_MEMORY_KIB: u32 = 19_456;
pub const ARGON2_ITERATIONS: u32 = 2;
pub const ARGON2_PARALLELISM: u32 = 1;

#[derive(Debug, Error, PartialEq)]
pub enum CipherError {
    #[error("Password must not be empty")]
    EmptyPassword,
    #[error("Encrypted input must not be empty")]
    EmptyInput,
    #[error("Encrypted blob too short")]
    TooShort,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid base64 encoding: {0}")]
    InvalidEncoding(String),
    #[error("Key derivation failed: {0}")]
    KdfFailed(String),
    #[error("Decrypted secret is not valid UTF-8")]
    InvalidUtf8,
}

/// Password-based cipher for mnemonic strings.
pub struct SecretCipher;

impl SecretCipher {
    /// Encrypt a secret under a password. Fresh salt per call, so two
    /// encryptions of identical inputs produce different blobs.
    pub fn encrypt(secret: &str, password: &str) -> Result<String, CipherError> {
        if password.is_empty() {
            return Err(CipherError::EmptyPassword);
        }

        let mut salt = [0u8; SALT_LENGTH];
        rand::rngs::OsRng.fill_bytes(&mut salt);

        let key = Self::derive_keystream_key(password, &salt)?;

        // Computed even for an empty secret, so empty-secret blobs stay
        // distinguishable per password.
        let verify_hash = Self::verification_hash(secret.as_bytes(), password);

        let ciphertext = Self::apply_keystream(secret.as_bytes(), &key);

        let mut blob = Vec::with_capacity(SALT_LENGTH + VERIFY_HASH_LENGTH + ciphertext.len());
        blob.extend_from_slice(&salt);
        blob.extend_from_slice(&verify_hash);
        blob.extend_from_slice(&ciphertext);

        debug!(len = blob.len(), "Encrypted secret blob");
        Ok(BASE64.encode(blob))
    }

    /// Decrypt a blob produced by [`SecretCipher::encrypt`]. Any password or
    /// ciphertext mismatch surfaces as `InvalidPassword`.
    pub fn decrypt(encoded: &str, password: &str) -> Result<String, CipherError> {
        if encoded.is_empty() || password.is_empty() {
            return Err(CipherError::EmptyInput);
        }

        let blob =
            BASE64.decode(encoded).map_err(|e| CipherError::InvalidEncoding(e.to_string()))?;
        if blob.len() < SALT_LENGTH + VERIFY_HASH_LENGTH {
            return Err(CipherError::TooShort);
        }

        let salt = &blob[..SALT_LENGTH];
        let embedded_hash = &blob[SALT_LENGTH..SALT_LENGTH + VERIFY_HASH_LENGTH];
        let ciphertext = &blob[SALT_LENGTH + VERIFY_HASH_LENGTH..];

        let key = Self::derive_keystream_key(password, salt)?;
        let candidate = Zeroizing::new(Self::apply_keystream(ciphertext, &key));

        let computed_hash = Self::verification_hash(&candidate, password);
        if !Self::secure_compare(&computed_hash, embedded_hash) {
            return Err(CipherError::InvalidPassword);
        }

        String::from_utf8(candidate.to_vec()).map_err(|_| CipherError::InvalidUtf8)
    }

    /// Does decryption succeed with this password.
    pub fn verify_password(encoded: &str, password: &str) -> bool {
        Self::decrypt(encoded, password).is_ok()
    }

    /// Constant-time byte equality for secret-derived values.
    pub fn secure_compare(a: &[u8], b: &[u8]) -> bool {
        a.ct_eq(b).into()
    }

    fn derive_keystream_key(
        password: &str,
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; KEY_LENGTH]>, CipherError> {
        let params =
            Params::new(ARGON2_MEMORY_KIB, ARGON2_ITERATIONS, ARGON2_PARALLELISM, Some(KEY_LENGTH))
                .map_err(|e| CipherError::KdfFailed(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
        argon2
            .hash_password_into(password.as_bytes(), salt, key.as_mut())
            .map_err(|e| CipherError::KdfFailed(e.to_string()))?;
        Ok(key)
    }

    fn verification_hash(secret: &[u8], password: &str) -> [u8; VERIFY_HASH_LENGTH] {
        let mut hasher = Sha256::new();
        hasher.update(secret);
        hasher.update(password.as_bytes());
        hasher.finalize().into()
    }

    fn apply_keystream(data: &[u8], key: &[u8; KEY_LENGTH]) -> Vec<u8> {
        data.iter().enumerate().map(|(i, b)| b ^ key[i % KEY_LENGTH]).collect()
    }
}
