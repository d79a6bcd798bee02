//! Keystore v3 key material encryption and decryption
//!
//! The derived key splits in two: the first 16 bytes drive AES-128-CTR
//! over the key material, the second 16 bytes feed the Keccak-256 MAC
//! (MAC = keccak256(dk[16..32] || ciphertext)). A wrong password shows up
//! as a MAC mismatch before any plaintext is interpreted.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;
use sha3::{Digest, Keccak256};
use subtle::ConstantTimeEq;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::error::{KeystoreError, KeystoreResult};
use super::record::{CipherParams, CryptoSection, KdfParams, KeystoreV3, SUPPORTED_VERSION};
use crate::crypto::hd::KeyPair;

type Aes128Ctr = Ctr128BE<Aes128>;

/// Cipher name this implementation produces and accepts.
pub const CIPHER_AES_128_CTR: &str = "aes-128-ctr";

/// PRF name for the pbkdf2 family.
const PRF_HMAC_SHA256: &str = "hmac-sha256";

// scrypt parameters for files we produce.
const SCRYPT_N: u32 = 8192;
const SCRYPT_R: u32 = 8;
const SCRYPT_P: u32 = 1;
const DKLEN: u32 = 32;
const SALT_LENGTH: usize = 32;
const IV_LENGTH: usize = 16;

/// Decrypt the private key held in a validated keystore document.
///
/// `params` must come from [`KeystoreV3::validate_structure`]; hex fields
/// are therefore present but not yet decoded.
pub fn decrypt_key(
    keystore: &KeystoreV3,
    params: &KdfParams,
    password: &str,
) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    let crypto = keystore
        .crypto
        .as_ref()
        .ok_or_else(|| KeystoreError::MissingField("crypto".to_string()))?;

    let cipher_name = crypto.cipher.as_deref().unwrap_or_default();
    if cipher_name != CIPHER_AES_128_CTR {
        return Err(KeystoreError::InvalidStructure(format!(
            "unsupported cipher: {}",
            cipher_name
        )));
    }

    let ciphertext = decode_hex_field(crypto.ciphertext.as_deref(), "crypto.ciphertext")?;
    let iv = decode_hex_field(
        crypto.cipherparams.as_ref().and_then(|p| p.iv.as_deref()),
        "crypto.cipherparams.iv",
    )?;
    let mac = decode_hex_field(crypto.mac.as_deref(), "crypto.mac")?;

    if iv.len() != IV_LENGTH {
        return Err(KeystoreError::InvalidStructure(format!(
            "crypto.cipherparams.iv must be {} bytes, got {}",
            IV_LENGTH,
            iv.len()
        )));
    }

    let dk = derive_key(params, password)?;
    if dk.len() < 32 {
        return Err(KeystoreError::InvalidStructure(
            "derived key shorter than 32 bytes".to_string(),
        ));
    }

    let computed_mac = compute_mac(&dk[16..32], &ciphertext);
    if !bool::from(computed_mac.ct_eq(&mac)) {
        return Err(KeystoreError::IncorrectPassword);
    }

    let mut plaintext = Zeroizing::new(ciphertext);
    apply_ctr(&dk[..16], &iv, &mut plaintext)?;

    debug!("Keystore key material decrypted, MAC verified");
    Ok(plaintext)
}

/// Produce a keystore v3 document protecting `private_key` (scrypt family,
/// fresh salt/iv/id). Round-trips through [`decrypt_key`].
pub fn encrypt_key(private_key: &[u8], password: &str) -> KeystoreResult<KeystoreV3> {
    let pair = KeyPair::from_private_bytes(private_key)
        .map_err(|e| KeystoreError::InvalidStructure(e.to_string()))?;

    let mut salt = vec![0u8; SALT_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let mut iv = vec![0u8; IV_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let params =
        KdfParams::Scrypt { dklen: DKLEN, n: SCRYPT_N, p: SCRYPT_P, r: SCRYPT_R, salt: salt.clone() };
    let dk = derive_key(&params, password)?;

    let mut ciphertext = private_key.to_vec();
    apply_ctr(&dk[..16], &iv, &mut ciphertext)?;
    let mac = compute_mac(&dk[16..32], &ciphertext);

    // Address body without prefix, as produced by the reference format
    let address = pair.address().trim_start_matches("0x").to_string();

    Ok(KeystoreV3 {
        version: SUPPORTED_VERSION,
        id: Some(Uuid::new_v4().to_string()),
        address: Some(address),
        crypto: Some(CryptoSection {
            cipher: Some(CIPHER_AES_128_CTR.to_string()),
            ciphertext: Some(hex::encode(&ciphertext)),
            cipherparams: Some(CipherParams { iv: Some(hex::encode(&iv)) }),
            kdf: Some("scrypt".to_string()),
            kdfparams: Some(serde_json::json!({
                "dklen": DKLEN,
                "n": SCRYPT_N,
                "p": SCRYPT_P,
                "r": SCRYPT_R,
                "salt": hex::encode(&salt),
            })),
            mac: Some(hex::encode(mac)),
        }),
    })
}

/// Run the KDF family named by the document. Exhaustive over the tagged
/// union; no dynamic field lookups remain at this point.
fn derive_key(params: &KdfParams, password: &str) -> KeystoreResult<Zeroizing<Vec<u8>>> {
    match params {
        KdfParams::Scrypt { dklen, n, p, r, salt } => {
            if !n.is_power_of_two() || *n < 2 {
                return Err(KeystoreError::InvalidStructure(format!(
                    "crypto.kdfparams.n must be a power of two, got {}",
                    n
                )));
            }
            let log_n = n.trailing_zeros() as u8;
            let scrypt_params = scrypt::Params::new(log_n, *r, *p, *dklen as usize)
                .map_err(|e| KeystoreError::InvalidStructure(format!("scrypt params: {}", e)))?;

            let mut dk = Zeroizing::new(vec![0u8; *dklen as usize]);
            scrypt::scrypt(password.as_bytes(), salt, &scrypt_params, &mut dk)
                .map_err(|e| KeystoreError::InvalidStructure(format!("scrypt failed: {}", e)))?;
            Ok(dk)
        }
        KdfParams::Pbkdf2 { dklen, c, prf, salt } => {
            if prf != PRF_HMAC_SHA256 {
                return Err(KeystoreError::UnsupportedKdf(format!("pbkdf2 prf {}", prf)));
            }
            if *c == 0 {
                return Err(KeystoreError::InvalidStructure(
                    "crypto.kdfparams.c must be positive".to_string(),
                ));
            }
            let mut dk = Zeroizing::new(vec![0u8; *dklen as usize]);
            pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, *c, &mut dk);
            Ok(dk)
        }
    }
}

fn compute_mac(mac_key: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let mut hasher = Keccak256::new();
    hasher.update(mac_key);
    hasher.update(ciphertext);
    hasher.finalize().to_vec()
}

fn apply_ctr(key: &[u8], iv: &[u8], buf: &mut [u8]) -> KeystoreResult<()> {
    let key: [u8; 16] = key
        .try_into()
        .map_err(|_| KeystoreError::InvalidStructure("cipher key must be 16 bytes".to_string()))?;
    let iv: [u8; 16] = iv
        .try_into()
        .map_err(|_| KeystoreError::InvalidStructure("cipher IV must be 16 bytes".to_string()))?;

    let mut cipher = Aes128Ctr::new(&key.into(), &iv.into());
    cipher.apply_keystream(buf);
    Ok(())
}

fn decode_hex_field(field: Option<&str>, path: &str) -> KeystoreResult<Vec<u8>> {
    let raw = field.ok_or_else(|| KeystoreError::MissingField(path.to_string()))?;
    hex::decode(raw)
        .map_err(|e| KeystoreError::InvalidStructure(format!("{}: invalid hex: {}", path, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_fixture() -> (KeystoreV3, KdfParams) {
        let keystore = encrypt_key(&[7u8; 32], "hunter2").unwrap();
        let params = keystore.validate_structure().unwrap();
        (keystore, params)
    }

    #[test]
    fn test_encrypt_produces_valid_structure() {
        let (keystore, params) = roundtrip_fixture();
        assert_eq!(keystore.version, SUPPORTED_VERSION);
        assert!(matches!(params, KdfParams::Scrypt { .. }));
        assert!(keystore.id.is_some());
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let (keystore, params) = roundtrip_fixture();
        let key = decrypt_key(&keystore, &params, "hunter2").unwrap();
        assert_eq!(key.as_slice(), &[7u8; 32]);
    }

    #[test]
    fn test_wrong_password_is_mac_mismatch() {
        let (keystore, params) = roundtrip_fixture();
        let err = decrypt_key(&keystore, &params, "nope").unwrap_err();
        assert!(matches!(err, KeystoreError::IncorrectPassword));
    }

    #[test]
    fn test_tampered_ciphertext_detected() {
        let (mut keystore, params) = roundtrip_fixture();
        let crypto = keystore.crypto.as_mut().unwrap();
        let mut raw = hex::decode(crypto.ciphertext.as_deref().unwrap()).unwrap();
        raw[0] ^= 0xFF;
        crypto.ciphertext = Some(hex::encode(raw));
        let err = decrypt_key(&keystore, &params, "hunter2").unwrap_err();
        assert!(matches!(err, KeystoreError::IncorrectPassword));
    }

    #[test]
    fn test_declared_address_matches_key() {
        let (keystore, params) = roundtrip_fixture();
        let key = decrypt_key(&keystore, &params, "hunter2").unwrap();
        let pair = KeyPair::from_private_bytes(&key).unwrap();
        assert_eq!(keystore.canonical_address().unwrap(), pair.address());
    }

    #[test]
    fn test_pbkdf2_family_decrypts() {
        // Re-key the fixture under pbkdf2 by hand
        let dk_salt = vec![9u8; 32];
        let params = KdfParams::Pbkdf2 {
            dklen: 32,
            c: 4096,
            prf: PRF_HMAC_SHA256.to_string(),
            salt: dk_salt.clone(),
        };
        let dk = derive_key(&params, "pw").unwrap();

        let iv = vec![3u8; 16];
        let mut ciphertext = vec![0xAAu8; 32];
        apply_ctr(&dk[..16], &iv, &mut ciphertext).unwrap();
        let mac = compute_mac(&dk[16..32], &ciphertext);

        let keystore = KeystoreV3 {
            version: SUPPORTED_VERSION,
            id: Some("test".to_string()),
            address: Some("008aeeda4d805471df9b2a5b0f38a0c3bcba786b".to_string()),
            crypto: Some(CryptoSection {
                cipher: Some(CIPHER_AES_128_CTR.to_string()),
                ciphertext: Some(hex::encode(&ciphertext)),
                cipherparams: Some(CipherParams { iv: Some(hex::encode(&iv)) }),
                kdf: Some("pbkdf2".to_string()),
                kdfparams: Some(serde_json::json!({
                    "dklen": 32, "c": 4096, "prf": PRF_HMAC_SHA256,
                    "salt": hex::encode(&dk_salt),
                })),
                mac: Some(hex::encode(&mac)),
            }),
        };

        let parsed = keystore.validate_structure().unwrap();
        let key = decrypt_key(&keystore, &parsed, "pw").unwrap();
        assert_eq!(key.as_slice(), &[0xAAu8; 32]);
    }

    #[test]
    fn test_unsupported_prf() {
        let params = KdfParams::Pbkdf2 {
            dklen: 32,
            c: 4096,
            prf: "hmac-sha512".to_string(),
            salt: vec![0u8; 32],
        };
        let err = derive_key(&params, "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::UnsupportedKdf(_)));
    }

    #[test]
    fn test_scrypt_n_must_be_power_of_two() {
        let params =
            KdfParams::Scrypt { dklen: 32, n: 1000, p: 1, r: 8, salt: vec![0u8; 32] };
        let err = derive_key(&params, "pw").unwrap_err();
        assert!(matches!(err, KeystoreError::InvalidStructure(_)));
    }

    #[test]
    fn test_serialized_document_reimports() {
        let (keystore, _) = roundtrip_fixture();
        let bytes = serde_json::to_vec(&keystore).unwrap();
        let reparsed = KeystoreV3::parse(&bytes).unwrap();
        let params = reparsed.validate_structure().unwrap();
        let key = decrypt_key(&reparsed, &params, "hunter2").unwrap();
        assert_eq!(key.as_slice(), &[7u8; 32]);
    }
}
