//! A single fungible token ledger.

use serde::{Deserialize, Serialize};
use sova_types::{Address, AssetError, FungibleAsset};
use std::collections::HashMap;

/// Balances, allowances and supply of one token.
///
/// Invariant: the sum of all balances equals `total_supply`. Only
/// [`mint`](Self::mint) and [`burn`](Self::burn) change the supply; transfers
/// move value between holders.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenLedger {
    symbol: String,
    decimals: u8,
    total_supply: u128,
    balances: HashMap<Address, u128>,
    /// owner → spender → remaining allowance.
    allowances: HashMap<Address, HashMap<Address, u128>>,
}

impl TokenLedger {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            total_supply: 0,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Number of holders with a nonzero balance.
    pub fn holder_count(&self) -> usize {
        self.balances.len()
    }

    /// Sum of every balance, computed from scratch.
    ///
    /// Useful for consistency checks. Verifies the supply counter matches
    /// reality.
    pub fn holders_total(&self) -> u128 {
        self.balances.values().sum()
    }

    /// Create `amount` new units for `to`.
    pub fn mint(&mut self, to: &Address, amount: u128) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::NullRecipient);
        }
        let supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        let balance = self
            .balance_of(to)
            .checked_add(amount)
            .ok_or(AssetError::Overflow)?;
        self.total_supply = supply;
        self.set_balance(to, balance);
        Ok(())
    }

    /// Destroy `amount` units held by `from`.
    pub fn burn(&mut self, from: &Address, amount: u128) -> Result<(), AssetError> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.set_balance(from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Reduce `spender`'s allowance over `owner`'s balance.
    ///
    /// An owner moving its own balance needs no allowance.
    pub fn spend_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        if owner == spender {
            return Ok(());
        }
        let available = self.allowance(owner, spender);
        if available < amount {
            return Err(AssetError::InsufficientAllowance {
                needed: amount,
                available,
            });
        }
        self.set_allowance(owner, spender, available - amount);
        Ok(())
    }

    fn set_balance(&mut self, holder: &Address, amount: u128) {
        if amount == 0 {
            self.balances.remove(holder);
        } else {
            self.balances.insert(*holder, amount);
        }
    }

    fn set_allowance(&mut self, owner: &Address, spender: &Address, amount: u128) {
        if amount == 0 {
            if let Some(spenders) = self.allowances.get_mut(owner) {
                spenders.remove(spender);
                if spenders.is_empty() {
                    self.allowances.remove(owner);
                }
            }
        } else {
            self.allowances.entry(*owner).or_default().insert(*spender, amount);
        }
    }

    fn check_transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        if to.is_zero() {
            return Err(AssetError::NullRecipient);
        }
        let available = self.balance_of(from);
        if available < amount {
            return Err(AssetError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from != to {
            self.balance_of(to)
                .checked_add(amount)
                .ok_or(AssetError::Overflow)?;
        }
        Ok(())
    }
}

impl FungibleAsset for TokenLedger {
    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn balance_of(&self, holder: &Address) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(owner)
            .and_then(|spenders| spenders.get(spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        if spender.is_zero() {
            return Err(AssetError::NullRecipient);
        }
        self.set_allowance(owner, spender, amount);
        Ok(())
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.check_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }
        let from_balance = self.balance_of(from) - amount;
        let to_balance = self.balance_of(to) + amount;
        self.set_balance(from, from_balance);
        self.set_balance(to, to_balance);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.check_transfer(from, to, amount)?;
        self.spend_allowance(from, spender, amount)?;
        self.transfer(from, to, amount)
    }
}
