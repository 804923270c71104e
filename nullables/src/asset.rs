//! Nullable fungible asset: a programmable token double.

use sova_types::{Address, AssetError, FungibleAsset};
use std::collections::HashMap;

/// An in-memory token whose transfers can be switched off.
///
/// Allowances are tracked but never enforced, and a rejected transfer leaves
/// every balance untouched.
#[derive(Clone, Debug, Default)]
pub struct NullAsset {
    decimals: u8,
    balances: HashMap<Address, u128>,
    allowances: HashMap<(Address, Address), u128>,
    reject_transfers: bool,
    transfers: usize,
}

impl NullAsset {
    pub fn new(decimals: u8) -> Self {
        Self {
            decimals,
            ..Self::default()
        }
    }

    /// Set a holder's balance directly.
    pub fn set_balance(&mut self, holder: Address, amount: u128) {
        self.balances.insert(holder, amount);
    }

    /// Make every subsequent transfer fail (or succeed again).
    pub fn reject_transfers(&mut self, reject: bool) {
        self.reject_transfers = reject;
    }

    /// Number of transfers that completed.
    pub fn transfer_count(&self) -> usize {
        self.transfers
    }

    fn move_balance(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        if self.reject_transfers {
            return Err(AssetError::Rejected("null asset configured to reject".into()));
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(*from, available - amount);
        *self.balances.entry(*to).or_default() += amount;
        self.transfers += 1;
        Ok(())
    }
}

impl FungibleAsset for NullAsset {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances.get(&(*owner, *spender)).copied().unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        self.allowances.insert((*owner, *spender), amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.move_balance(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        _spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.move_balance(from, to, amount)
    }
}
