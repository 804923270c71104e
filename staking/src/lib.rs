//! Reward engine: dual-tier staking with lazy accrual.
//!
//! - [`RewardEngine`]: stakes, locks, claims, compounding, emergency exits and
//!   queued reward redemption.
//! - [`accrual`]: the pure accrual function, `(stake, params, now) → rewards`.
//! - [`LockTable`] / [`RewardParams`]: configuration.

pub mod accrual;
pub mod engine;
pub mod error;
pub mod params;
pub mod stake;

pub use accrual::Rewards;
pub use engine::{PenaltyPool, RewardEngine, RewardReservation};
pub use error::StakingError;
pub use params::{LockPeriod, LockTable, RewardParams};
pub use stake::UserStake;
