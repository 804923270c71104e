//! Reward rates and the lock-period table.

use crate::error::StakingError;
use serde::{Deserialize, Serialize};
use sova_types::amount::BPS_DENOMINATOR;
use std::collections::BTreeMap;

const DAY: u64 = 86_400;

/// Accrual rates and fee parameters.
///
/// `rate_a` and `rate_b` are annual reward rates in basis points of the staked
/// amount, for tier 1 and tier 2 respectively: 10000 pays one reward unit per
/// staked unit per year, 500 pays 5%.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardParams {
    #[serde(default = "default_rate")]
    pub rate_a: u128,

    #[serde(default = "default_rate")]
    pub rate_b: u128,

    /// Boost applied to both rewards while both tiers are staked.
    #[serde(default = "default_dual_bonus_bps")]
    pub dual_bonus_bps: u128,

    /// Share of each stake forfeited by an emergency exit.
    #[serde(default = "default_emergency_penalty_bps")]
    pub emergency_penalty_bps: u128,
}

fn default_rate() -> u128 {
    10_000
}

fn default_dual_bonus_bps() -> u128 {
    2_500
}

fn default_emergency_penalty_bps() -> u128 {
    1_000
}

impl RewardParams {
    pub fn validate(&self) -> Result<(), StakingError> {
        if self.dual_bonus_bps > BPS_DENOMINATOR {
            return Err(StakingError::InvalidBps {
                field: "dual_bonus_bps",
                value: self.dual_bonus_bps,
            });
        }
        if self.emergency_penalty_bps > BPS_DENOMINATOR {
            return Err(StakingError::InvalidBps {
                field: "emergency_penalty_bps",
                value: self.emergency_penalty_bps,
            });
        }
        Ok(())
    }
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            rate_a: default_rate(),
            rate_b: default_rate(),
            dual_bonus_bps: default_dual_bonus_bps(),
            emergency_penalty_bps: default_emergency_penalty_bps(),
        }
    }
}

/// One selectable lock duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPeriod {
    pub duration_secs: u64,
    pub multiplier_bps: u128,
}

/// Discrete lock durations and their accrual multipliers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTable {
    periods: BTreeMap<u64, u128>,
}

impl LockTable {
    /// Build a table, rejecting duplicate durations and multipliers below
    /// 10000 bps.
    pub fn from_periods(periods: &[LockPeriod]) -> Result<Self, StakingError> {
        let mut table = BTreeMap::new();
        for period in periods {
            if period.multiplier_bps < BPS_DENOMINATOR {
                return Err(StakingError::InvalidMultiplier(period.multiplier_bps));
            }
            if table
                .insert(period.duration_secs, period.multiplier_bps)
                .is_some()
            {
                return Err(StakingError::DuplicateLockPeriod(period.duration_secs));
            }
        }
        Ok(Self { periods: table })
    }

    /// The standard table: no lock, 30, 90, 180 and 365 days.
    pub fn standard_periods() -> Vec<LockPeriod> {
        [
            (0, 10_000),
            (30 * DAY, 11_000),
            (90 * DAY, 12_500),
            (180 * DAY, 15_000),
            (365 * DAY, 20_000),
        ]
        .into_iter()
        .map(|(duration_secs, multiplier_bps)| LockPeriod {
            duration_secs,
            multiplier_bps,
        })
        .collect()
    }

    pub fn multiplier(&self, duration_secs: u64) -> Option<u128> {
        self.periods.get(&duration_secs).copied()
    }

    /// Insert or replace one period.
    pub fn set(&mut self, duration_secs: u64, multiplier_bps: u128) -> Result<(), StakingError> {
        if multiplier_bps < BPS_DENOMINATOR {
            return Err(StakingError::InvalidMultiplier(multiplier_bps));
        }
        self.periods.insert(duration_secs, multiplier_bps);
        Ok(())
    }

    pub fn periods(&self) -> Vec<LockPeriod> {
        self.periods
            .iter()
            .map(|(&duration_secs, &multiplier_bps)| LockPeriod {
                duration_secs,
                multiplier_bps,
            })
            .collect()
    }
}

impl Default for LockTable {
    fn default() -> Self {
        let periods = Self::standard_periods()
            .into_iter()
            .map(|p| (p.duration_secs, p.multiplier_bps))
            .collect();
        Self { periods }
    }
}
