//! Deterministic mnemonic synthesis for imported keys
//!
//! Wallets imported from a raw private key or a keystore file have no
//! original recovery phrase, so one is synthesized from a hash of the key.
//! The synthesized phrase is a derived backup artifact: it does NOT
//! re-derive to the original private key through the BIP44 path, and
//! callers must not assume round-trip equivalence.

use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;
use crate::crypto::mnemonic::{mnemonic_from_entropy, validate_mnemonic, MNEMONIC_ENTROPY_BYTES};

/// Build a 12-word mnemonic from a private key.
///
/// Entropy is the first 16 bytes of SHA-256 over the raw key bytes, so the
/// same key always yields the same phrase, across processes and restarts.
pub fn synthesize_mnemonic(private_key: &[u8]) -> Result<String, WalletError> {
    if private_key.is_empty() {
        return Err(WalletError::ValidationError("Private key is nil".to_string()));
    }

    let digest = Sha256::digest(private_key);
    let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_BYTES]);
    entropy.copy_from_slice(&digest[..MNEMONIC_ENTROPY_BYTES]);
    let phrase = mnemonic_from_entropy(entropy.as_ref())?;

    debug!("Synthesized deterministic mnemonic from private key hash");
    Ok(phrase)
}

/// Synthesize and self-check: validates the checksum of the result and
/// asserts a second synthesis yields the identical phrase, guarding
/// against a nondeterministic entropy source.
pub fn synthesize_mnemonic_checked(private_key: &[u8]) -> Result<String, WalletError> {
    let phrase = synthesize_mnemonic(private_key)?;

    if !validate_mnemonic(&phrase) {
        return Err(WalletError::CryptoError(
            "Synthesized mnemonic failed checksum validation".to_string(),
        ));
    }

    let again = synthesize_mnemonic(private_key)?;
    if phrase != again {
        return Err(WalletError::CryptoError(
            "Inconsistent mnemonic generation across runs".to_string(),
        ));
    }

    Ok(phrase)
}
