//! Fungible asset accounting.
//!
//! - [`TokenLedger`]: one token: balances, allowances, supply, mint/burn.
//! - [`AssetBook`]: every token known to a deployment, keyed by asset id.
//!
//! The vault's share unit is itself a `TokenLedger` whose mint and burn are
//! reachable only through the vault.

pub mod book;
pub mod token;

pub use book::AssetBook;
pub use token::TokenLedger;
