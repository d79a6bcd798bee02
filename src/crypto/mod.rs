pub mod cipher;
pub mod hd;
pub mod mnemonic;
pub mod synth;

pub use self::cipher::SecretCipher;
pub use self::hd::{address_from_public_key, derive_private_key, Bip44Path, ExtendedKey, KeyPair};
pub use self::mnemonic::{generate_mnemonic, validate_mnemonic};
pub use self::synth::{synthesize_mnemonic, synthesize_mnemonic_checked};
