//! The fungible asset seam.

use crate::address::Address;
use crate::error::AssetError;

/// Any balance-transferable token with a decimals probe.
///
/// Implemented by the in-memory token ledger and by the share ledger itself,
/// so the reward engine can pull shares the same way it pulls any token.
pub trait FungibleAsset {
    /// Native decimal precision. Callers read this on every use.
    fn decimals(&self) -> u8;

    fn balance_of(&self, holder: &Address) -> u128;

    fn allowance(&self, owner: &Address, spender: &Address) -> u128;

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError>;

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError>;

    /// Move `amount` from `from` to `to`, spending `spender`'s allowance.
    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError>;
}
