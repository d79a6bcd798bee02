//! BIP39 mnemonic generation and validation
//!
//! Recovery phrases carry 128 bits of entropy (12 words). Validation is a
//! pure function of wordlist membership and the embedded checksum.

use bip39::{Language, Mnemonic};
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;

/// Entropy size backing a 12-word phrase.
pub const MNEMONIC_ENTROPY_BYTES: usize = 16;

/// Generate a fresh 12-word mnemonic from OS randomness.
pub fn generate_mnemonic() -> Result<String, WalletError> {
    let mut entropy = Zeroizing::new([0u8; MNEMONIC_ENTROPY_BYTES]);
    rand::rngs::OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
        .map_err(|e| WalletError::CryptoError(format!("Mnemonic generation failed: {}", e)))?;

    debug!("Generated new {}-word mnemonic", mnemonic.word_count());
    Ok(mnemonic.to_string())
}

/// Encode raw entropy as a mnemonic phrase.
///
/// Used by deterministic synthesis; entropy length must be one of the
/// BIP39-supported sizes (16, 20, 24, 28 or 32 bytes).
pub fn mnemonic_from_entropy(entropy: &[u8]) -> Result<String, WalletError> {
    let mnemonic = Mnemonic::from_entropy(entropy)
        .map_err(|e| WalletError::CryptoError(format!("Invalid entropy: {}", e)))?;
    Ok(mnemonic.to_string())
}

/// Check wordlist membership and checksum. Pure, no side effects.
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derive the 512-bit BIP39 seed (empty passphrase, fixed by design).
pub fn mnemonic_to_seed(phrase: &str) -> Result<Zeroizing<[u8; 64]>, WalletError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::ValidationError(format!("Invalid mnemonic: {}", e)))?;
    Ok(Zeroizing::new(mnemonic.to_seed("")))
}
