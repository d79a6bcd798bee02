//! Keystore v3 document parsing and structural validation
//!
//! Pure validator: no decryption happens here. Checks run in a fixed
//! order and short-circuit on the first failure so error reporting is
//! deterministic. KDF parameters resolve into a tagged union with one
//! variant per supported family, matched exhaustively downstream.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{KeystoreError, KeystoreResult};

/// The single supported keystore document version.
pub const SUPPORTED_VERSION: u64 = 3;

/// Address body length after stripping the optional 0x prefix.
const ADDRESS_HEX_LENGTH: usize = 40;

/// Parsed keystore v3 document. All fields optional at the parse stage;
/// [`KeystoreV3::validate_structure`] enforces presence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystoreV3 {
    #[serde(default)]
    pub version: u64,
    pub id: Option<String>,
    pub address: Option<String>,
    pub crypto: Option<CryptoSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CryptoSection {
    pub cipher: Option<String>,
    pub ciphertext: Option<String>,
    pub cipherparams: Option<CipherParams>,
    pub kdf: Option<String>,
    pub kdfparams: Option<Value>,
    pub mac: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CipherParams {
    pub iv: Option<String>,
}

/// KDF parameter families the import path supports.
#[derive(Debug, Clone, PartialEq)]
pub enum KdfParams {
    Scrypt { dklen: u32, n: u32, p: u32, r: u32, salt: Vec<u8> },
    Pbkdf2 { dklen: u32, c: u32, prf: String, salt: Vec<u8> },
}

impl KeystoreV3 {
    /// Parse raw file bytes. Fails with `InvalidJson` on malformed input.
    pub fn parse(bytes: &[u8]) -> KeystoreResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| KeystoreError::InvalidJson(e.to_string()))
    }

    /// Structural validation, short-circuiting in document order:
    /// version, address, crypto fields, KDF parameter family.
    /// Returns the resolved KDF parameters on success.
    pub fn validate_structure(&self) -> KeystoreResult<KdfParams> {
        if self.version != SUPPORTED_VERSION {
            return Err(KeystoreError::InvalidVersion(self.version));
        }

        let address = self
            .address
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or_else(|| KeystoreError::MissingField("address".to_string()))?;
        let body = address.strip_prefix("0x").unwrap_or(address);
        if body.len() != ADDRESS_HEX_LENGTH || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(KeystoreError::InvalidAddress(address.to_string()));
        }

        let crypto = self
            .crypto
            .as_ref()
            .ok_or_else(|| KeystoreError::MissingField("crypto".to_string()))?;

        require_str(&crypto.cipher, "crypto.cipher")?;
        require_str(&crypto.ciphertext, "crypto.ciphertext")?;
        let iv_present = crypto.cipherparams.as_ref().and_then(|p| p.iv.as_deref());
        if iv_present.map_or(true, str::is_empty) {
            return Err(KeystoreError::MissingField("crypto.cipherparams.iv".to_string()));
        }
        let kdf = require_str(&crypto.kdf, "crypto.kdf")?;
        let kdfparams = crypto
            .kdfparams
            .as_ref()
            .filter(|v| !v.is_null())
            .ok_or_else(|| KeystoreError::MissingField("crypto.kdfparams".to_string()))?;
        require_str(&crypto.mac, "crypto.mac")?;

        match kdf {
            "scrypt" => Ok(KdfParams::Scrypt {
                dklen: param_u32(kdfparams, "dklen")?,
                n: param_u32(kdfparams, "n")?,
                p: param_u32(kdfparams, "p")?,
                r: param_u32(kdfparams, "r")?,
                salt: param_hex(kdfparams, "salt")?,
            }),
            "pbkdf2" => Ok(KdfParams::Pbkdf2 {
                dklen: param_u32(kdfparams, "dklen")?,
                c: param_u32(kdfparams, "c")?,
                prf: param_str(kdfparams, "prf")?,
                salt: param_hex(kdfparams, "salt")?,
            }),
            other => Err(KeystoreError::UnsupportedKdf(other.to_string())),
        }
    }

    /// Declared address in canonical form: lowercase hex, 0x prefix.
    pub fn canonical_address(&self) -> Option<String> {
        let address = self.address.as_deref()?;
        let body = address.strip_prefix("0x").unwrap_or(address);
        Some(format!("0x{}", body.to_ascii_lowercase()))
    }
}

fn require_str<'a>(field: &'a Option<String>, path: &str) -> KeystoreResult<&'a str> {
    field
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| KeystoreError::MissingField(path.to_string()))
}

fn param_u32(params: &Value, name: &str) -> KeystoreResult<u32> {
    let value = params
        .get(name)
        .ok_or_else(|| KeystoreError::MissingField(format!("crypto.kdfparams.{}", name)))?;
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| {
            KeystoreError::InvalidStructure(format!("crypto.kdfparams.{} is not an integer", name))
        })
}

fn param_str(params: &Value, name: &str) -> KeystoreResult<String> {
    params
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| KeystoreError::MissingField(format!("crypto.kdfparams.{}", name)))
}

fn param_hex(params: &Value, name: &str) -> KeystoreResult<Vec<u8>> {
    let raw = param_str(params, name)?;
    hex::decode(&raw).map_err(|e| {
        KeystoreError::InvalidStructure(format!("crypto.kdfparams.{}: invalid hex: {}", name, e))
    })
}
