pub mod domain;
pub mod errors;
pub mod wallet_manager;

pub use domain::{KeyPair, Wallet, WalletDetails};
pub use wallet_manager::WalletManager;
