//! Hierarchical deterministic key derivation
//!
//! Walks the fixed BIP44-style path m/44'/60'/0'/0/0 from a BIP39 seed.
//! Hardened nodes for purpose/coin type/account, non-hardened for
//! change/index; the address index is always 0 in this design.

use hmac::{Hmac, Mac};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{PublicKey, SecretKey};
use sha2::Sha512;
use sha3::{Digest, Keccak256};
use tracing::debug;
use zeroize::Zeroizing;

use crate::core::errors::WalletError;
use crate::crypto::mnemonic::{mnemonic_to_seed, validate_mnemonic};

type HmacSha512 = Hmac<Sha512>;

const HARDENED_OFFSET: u32 = 0x8000_0000;

/// BIP44 derivation path. All indices are fixed constants here except the
/// address index, which this wallet pins to 0.
#[derive(Debug, Clone)]
pub struct Bip44Path {
    pub coin_type: u32,
    pub account: u32,
    pub change: u32,
    pub address_index: u32,
}

impl Bip44Path {
    /// Default Ethereum path: m/44'/60'/0'/0/0
    pub fn ethereum_default() -> Self {
        Self { coin_type: 60, account: 0, change: 0, address_index: 0 }
    }

    /// Full index sequence, hardened bits applied.
    pub fn to_derivation_path(&self) -> Vec<u32> {
        vec![
            HARDENED_OFFSET | 44,
            HARDENED_OFFSET | self.coin_type,
            HARDENED_OFFSET | self.account,
            self.change,
            self.address_index,
        ]
    }
}

/// A node in the derivation tree: 256-bit key plus 256-bit chain code.
/// Immutable value type; child derivation produces a new node.
pub struct ExtendedKey {
    chain_code: [u8; 32],
    key: Zeroizing<[u8; 32]>,
}

impl ExtendedKey {
    /// Create the master node from a BIP39 seed via HMAC-SHA512("Bitcoin seed").
    pub fn from_seed(seed: &[u8]) -> Result<Self, WalletError> {
        if seed.len() < 16 {
            return Err(WalletError::ValidationError(
                "Seed length must be at least 16 bytes".to_string(),
            ));
        }

        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
            .map_err(|e| WalletError::CryptoError(format!("HMAC initialization failed: {}", e)))?;
        mac.update(seed);
        let result = mac.finalize().into_bytes();

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&result[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&result[32..]);

        Ok(Self { chain_code, key })
    }

    /// Derive one child node. Hardened indices commit to the parent private
    /// key, non-hardened indices to the parent public key.
    pub fn derive_child(&self, index: u32) -> Result<Self, WalletError> {
        let hardened = index >= HARDENED_OFFSET;

        let mut data = Zeroizing::new(Vec::with_capacity(37));
        if hardened {
            data.push(0x00);
            data.extend_from_slice(self.key.as_ref());
        } else {
            let secret = SecretKey::from_slice(self.key.as_ref())
                .map_err(|e| WalletError::CryptoError(format!("Invalid parent key: {}", e)))?;
            let point = secret.public_key().to_encoded_point(true);
            data.extend_from_slice(point.as_bytes());
        }
        data.extend_from_slice(&index.to_be_bytes());

        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|e| WalletError::CryptoError(format!("HMAC initialization failed: {}", e)))?;
        mac.update(&data);
        let result = mac.finalize().into_bytes();

        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&result[..32]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&result[32..]);

        Ok(Self { chain_code, key })
    }

    /// Walk a complete BIP44 path from this node.
    pub fn derive_path(&self, path: &Bip44Path) -> Result<Self, WalletError> {
        let mut current = Self { chain_code: self.chain_code, key: self.key.clone() };
        for index in path.to_derivation_path() {
            current = current.derive_child(index)?;
        }
        Ok(current)
    }

    pub fn private_key(&self) -> &[u8; 32] {
        &self.key
    }
}

/// A secp256k1 private scalar and its public point.
#[derive(Debug)]
pub struct KeyPair {
    secret: SecretKey,
}

impl KeyPair {
    pub fn from_private_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| WalletError::CryptoError(format!("Invalid private key: {}", e)))?;
        Ok(Self { secret })
    }

    /// Raw 32-byte private scalar. The buffer zeroizes on drop.
    pub fn private_key_bytes(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Wallet address for this key pair, lowercase hex with 0x prefix.
    pub fn address(&self) -> String {
        address_from_public_key(&self.public_key())
    }
}

/// Deterministic one-way mapping from public key to address:
/// Keccak-256 of the uncompressed point body, last 20 bytes.
pub fn address_from_public_key(public_key: &PublicKey) -> String {
    let point = public_key.to_encoded_point(false);
    // Skip the 0x04 SEC1 prefix byte
    let hash = Keccak256::digest(&point.as_bytes()[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Derive the wallet key pair for a mnemonic along m/44'/60'/0'/0/0.
///
/// Identical mnemonics always yield identical key pairs.
pub fn derive_private_key(phrase: &str) -> Result<KeyPair, WalletError> {
    if !validate_mnemonic(phrase) {
        return Err(WalletError::ValidationError("Invalid mnemonic".to_string()));
    }

    let seed = mnemonic_to_seed(phrase)?;
    let master = ExtendedKey::from_seed(seed.as_ref())?;
    let node = master.derive_path(&Bip44Path::ethereum_default())?;
    let pair = KeyPair::from_private_bytes(node.private_key())?;

    debug!(address = %pair.address(), "Derived key pair from mnemonic");
    Ok(pair)
}
