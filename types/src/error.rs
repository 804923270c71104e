//! Errors shared by every component: access control and asset movement.

use crate::address::Address;
use thiserror::Error;

/// Authorization and pause failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("{0} is not the admin")]
    NotAdmin(Address),

    #[error("{0} is not an authorized processor")]
    NotProcessor(Address),

    #[error("{caller} is neither the owner ({owner}) nor the admin")]
    NotOwnerOrAdmin { caller: Address, owner: Address },

    #[error("admin cannot be the null address")]
    NullAdmin,

    #[error("contract is paused")]
    Paused,

    #[error("contract is not paused")]
    NotPaused,
}

/// Failures raised by a [`FungibleAsset`](crate::asset::FungibleAsset).
///
/// Transfers either complete fully or fail with one of these; there are no
/// partial transfers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetError {
    #[error("unknown asset {0}")]
    UnknownAsset(Address),

    #[error("asset {0} is already registered")]
    AlreadyRegistered(Address),

    #[error("insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: u128, available: u128 },

    #[error("insufficient allowance: need {needed}, have {available}")]
    InsufficientAllowance { needed: u128, available: u128 },

    #[error("transfer to the null address")]
    NullRecipient,

    #[error("arithmetic overflow in asset accounting")]
    Overflow,

    #[error("transfer rejected: {0}")]
    Rejected(String),
}
