//! The multi-asset book: every token of a deployment, by asset id.

use crate::token::TokenLedger;
use serde::{Deserialize, Serialize};
use sova_types::{Address, AssetError, AssetId, FungibleAsset};
use std::collections::BTreeMap;

/// Registry of token ledgers.
///
/// Components hold no token balances themselves; they act on the book with
/// their own address as the holder.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssetBook {
    tokens: BTreeMap<AssetId, TokenLedger>,
}

impl AssetBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: AssetId, token: TokenLedger) -> Result<(), AssetError> {
        if id.is_zero() {
            return Err(AssetError::UnknownAsset(id));
        }
        if self.tokens.contains_key(&id) {
            return Err(AssetError::AlreadyRegistered(id));
        }
        tracing::debug!(asset = %id, symbol = token.symbol(), decimals = token.decimals(), "asset registered");
        self.tokens.insert(id, token);
        Ok(())
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.tokens.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &AssetId> {
        self.tokens.keys()
    }

    pub fn token(&self, id: &AssetId) -> Result<&TokenLedger, AssetError> {
        self.tokens.get(id).ok_or(AssetError::UnknownAsset(*id))
    }

    pub fn token_mut(&mut self, id: &AssetId) -> Result<&mut TokenLedger, AssetError> {
        self.tokens.get_mut(id).ok_or(AssetError::UnknownAsset(*id))
    }

    pub fn decimals(&self, id: &AssetId) -> Result<u8, AssetError> {
        Ok(self.token(id)?.decimals())
    }

    pub fn balance_of(&self, id: &AssetId, holder: &Address) -> Result<u128, AssetError> {
        Ok(self.token(id)?.balance_of(holder))
    }

    pub fn approve(&mut self, id: &AssetId, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        self.token_mut(id)?.approve(owner, spender, amount)
    }

    pub fn transfer(&mut self, id: &AssetId, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.token_mut(id)?.transfer(from, to, amount)
    }

    pub fn transfer_from(
        &mut self,
        id: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.token_mut(id)?.transfer_from(spender, from, to, amount)
    }

    /// Credit newly arrived units, e.g. reward asset delivered by the
    /// cross-network transport or genesis balances.
    pub fn mint(&mut self, id: &AssetId, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.token_mut(id)?.mint(to, amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_asset_is_an_error() {
        let book = AssetBook::new();
        let id = Address::from_label("nope");
        assert_eq!(book.decimals(&id), Err(AssetError::UnknownAsset(id)));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut book = AssetBook::new();
        let id = Address::from_label("wbtc");
        book.register(id, TokenLedger::new("WBTC", 8)).unwrap();
        assert_eq!(
            book.register(id, TokenLedger::new("WBTC", 8)),
            Err(AssetError::AlreadyRegistered(id))
        );
    }

    #[test]
    fn operations_route_to_the_right_token() {
        let mut book = AssetBook::new();
        let wbtc = Address::from_label("wbtc");
        let usdc = Address::from_label("usdc");
        let alice = Address::from_label("alice");
        let bob = Address::from_label("bob");
        book.register(wbtc, TokenLedger::new("WBTC", 8)).unwrap();
        book.register(usdc, TokenLedger::new("USDC", 6)).unwrap();
        book.mint(&wbtc, &alice, 1_000).unwrap();
        book.transfer(&wbtc, &alice, &bob, 250).unwrap();
        assert_eq!(book.balance_of(&wbtc, &bob), Ok(250));
        assert_eq!(book.balance_of(&usdc, &bob), Ok(0));
        assert_eq!(book.decimals(&usdc), Ok(6));
        assert_eq!(book.ids().count(), 2);
    }
}
