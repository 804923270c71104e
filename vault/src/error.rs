//! Vault-specific errors.

use sova_queue::QueueError;
use sova_types::{AccessError, AssetError, AssetId, RequestId};
use sova_utils::Reentered;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Reentrancy(#[from] Reentered),

    #[error("asset {0} is not accepted for deposit")]
    UnsupportedAsset(AssetId),

    #[error("asset {0} is already supported")]
    AlreadySupported(AssetId),

    #[error("the primary asset cannot be removed")]
    PrimaryAssetRemoval,

    #[error("the reward asset cannot be a deposit asset")]
    RewardAssetNotDepositable,

    #[error("asset {asset} has {decimals} decimals, above the supported maximum")]
    UnsupportedDecimals { asset: AssetId, decimals: u8 },

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("deposit too small to mint a share")]
    ZeroShares,

    #[error("redemption too small to pay out")]
    ZeroAssets,

    #[error("redemption too small to earn any reward")]
    ZeroReward,

    #[error("receiver cannot be the null address")]
    NullReceiver,

    #[error("shares cannot be held by the vault outside custody")]
    SharesToVault,

    #[error("insufficient shares: need {needed}, have {available}")]
    InsufficientShares { needed: u128, available: u128 },

    #[error("insufficient share allowance: need {needed}, have {available}")]
    InsufficientShareAllowance { needed: u128, available: u128 },

    #[error("insufficient reward liquidity: need {needed}, have {available}")]
    InsufficientRewardLiquidity { needed: u128, available: u128 },

    #[error("insufficient primary asset liquidity: need {needed}, have {available}")]
    InsufficientLiquidity { needed: u128, available: u128 },

    #[error("shares are outstanding but the vault holds no value")]
    NoValueBacking,

    #[error("no shares in custody for request {0}")]
    UnknownCustody(RequestId),

    #[error("arithmetic overflow in vault accounting")]
    Overflow,
}
