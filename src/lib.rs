#![allow(clippy::len_zero)]
// src/lib.rs

pub mod core;
pub mod crypto;
pub mod keystore;
pub mod storage;

pub use crate::core::errors::WalletError;
pub use crate::core::wallet_manager::WalletManager;
pub use crate::core::{Wallet, WalletDetails};
