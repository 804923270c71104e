//! Staking-specific errors.

use sova_queue::QueueError;
use sova_types::{AccessError, Address, AssetError, RequestId, StakeTier, Timestamp};
use sova_utils::Reentered;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StakingError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Queue(#[from] QueueError),

    #[error(transparent)]
    Reentrancy(#[from] Reentered),

    #[error("amount must be non-zero")]
    ZeroAmount,

    #[error("no lock period of {0} seconds")]
    UnknownLockPeriod(u64),

    #[error("lock period {0} is defined twice")]
    DuplicateLockPeriod(u64),

    #[error("lock multiplier {0} bps is below 10000")]
    InvalidMultiplier(u128),

    #[error("{field} of {value} bps exceeds 10000")]
    InvalidBps { field: &'static str, value: u128 },

    #[error("governance staking requires a share stake")]
    Tier1Required,

    #[error("{0} has no stake")]
    NoStake(Address),

    #[error("insufficient {tier:?} stake: need {needed}, have {available}")]
    InsufficientStake {
        tier: StakeTier,
        needed: u128,
        available: u128,
    },

    #[error("stake is locked until {until}")]
    Locked { until: Timestamp },

    #[error("no rewards to claim")]
    NothingToClaim,

    #[error("no governance rewards to compound")]
    NothingToCompound,

    #[error("nothing staked")]
    NothingStaked,

    #[error("insufficient {asset} reward liquidity: need {needed}, have {available}")]
    InsufficientRewardLiquidity {
        asset: &'static str,
        needed: u128,
        available: u128,
    },

    #[error("insufficient pending yield: need {needed}, have {available}")]
    InsufficientPendingRewards { needed: u128, available: u128 },

    #[error("receiver cannot be the null address")]
    NullReceiver,

    #[error("no reward reservation for request {0}")]
    UnknownReservation(RequestId),

    #[error("arithmetic overflow in reward accounting")]
    Overflow,
}
