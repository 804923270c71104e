//! Lazy reward accrual as a pure function of a stake snapshot and a time.
//!
//! For `elapsed = now - last_accrual`, split into the part before `lock_end`
//! (boosted by the lock multiplier) and the part after:
//!
//! ```text
//! weighted   = boosted_secs * multiplier_bps + plain_secs * 10000
//! governance = tier1 * rate_a * weighted / (SECONDS_PER_YEAR * 10000 * 10000)
//! yield      = tier2 * rate_b * weighted / (SECONDS_PER_YEAR * 10000 * 10000)   (only if tier1 > 0)
//! ```
//!
//! Rates are annual basis points. When both tiers are staked, both amounts are
//! scaled by `(10000 + dual_bonus_bps) / 10000`. With no lock the multiplier is
//! 10000 and the formulas reduce to
//! `amount * rate * elapsed / (SECONDS_PER_YEAR * 10000)`.

use crate::params::RewardParams;
use crate::stake::UserStake;
use serde::{Deserialize, Serialize};
use sova_types::amount::{BPS_DENOMINATOR, SECONDS_PER_YEAR};
use sova_types::Timestamp;

/// Reward amounts, by reward kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rewards {
    pub governance: u128,
    pub yield_reward: u128,
}

impl Rewards {
    pub fn is_zero(&self) -> bool {
        self.governance == 0 && self.yield_reward == 0
    }
}

/// Rewards earned between `stake.last_accrual` and `now`.
///
/// `None` on arithmetic overflow. A `now` before the last accrual earns
/// nothing.
pub fn accrued(stake: &UserStake, params: &RewardParams, now: Timestamp) -> Option<Rewards> {
    let elapsed = u128::from(stake.last_accrual.elapsed_since(now));
    if elapsed == 0 {
        return Some(Rewards::default());
    }
    let boosted = u128::from(stake.last_accrual.elapsed_since(stake.lock_end)).min(elapsed);
    let plain = elapsed - boosted;
    let weighted = boosted
        .checked_mul(stake.lock_multiplier_bps)?
        .checked_add(plain.checked_mul(BPS_DENOMINATOR)?)?;
    let denominator = SECONDS_PER_YEAR * BPS_DENOMINATOR * BPS_DENOMINATOR;

    let mut governance = scaled(stake.tier1, params.rate_a, weighted, denominator)?;
    let mut yield_reward = if stake.tier1 > 0 {
        scaled(stake.tier2, params.rate_b, weighted, denominator)?
    } else {
        0
    };
    if stake.is_dual() {
        let factor = BPS_DENOMINATOR.checked_add(params.dual_bonus_bps)?;
        governance = governance.checked_mul(factor)? / BPS_DENOMINATOR;
        yield_reward = yield_reward.checked_mul(factor)? / BPS_DENOMINATOR;
    }
    Some(Rewards {
        governance,
        yield_reward,
    })
}

/// The stake with everything earned up to `now` moved into its pending
/// balances and `last_accrual` advanced to `now`.
pub fn settle(stake: &UserStake, params: &RewardParams, now: Timestamp) -> Option<UserStake> {
    let earned = accrued(stake, params, now)?;
    let mut settled = stake.clone();
    settled.pending_governance = settled.pending_governance.checked_add(earned.governance)?;
    settled.pending_yield = settled.pending_yield.checked_add(earned.yield_reward)?;
    settled.last_accrual = settled.last_accrual.max(now);
    Some(settled)
}

/// Pending plus not-yet-settled rewards at `now`.
pub fn pending(stake: &UserStake, params: &RewardParams, now: Timestamp) -> Option<Rewards> {
    let settled = settle(stake, params, now)?;
    Some(Rewards {
        governance: settled.pending_governance,
        yield_reward: settled.pending_yield,
    })
}

/// `amount * rate * weighted / denominator`, rounded down.
///
/// The amount is split around the denominator so large stakes do not overflow
/// the intermediate product.
fn scaled(amount: u128, rate: u128, weighted: u128, denominator: u128) -> Option<u128> {
    if amount == 0 || rate == 0 {
        return Some(0);
    }
    let factor = rate.checked_mul(weighted)?;
    let whole = (amount / denominator).checked_mul(factor)?;
    let part = (amount % denominator).checked_mul(factor)? / denominator;
    whole.checked_add(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    const YEAR: u64 = 365 * 86_400;

    fn stake(tier1: u128, tier2: u128) -> UserStake {
        UserStake {
            tier1,
            tier2,
            ..UserStake::new(Timestamp::new(0))
        }
    }

    fn params(rate_a: u128, rate_b: u128) -> RewardParams {
        RewardParams {
            rate_a,
            rate_b,
            ..RewardParams::default()
        }
    }

    #[test]
    fn single_tier_one_year() {
        let s = stake(1_000_000, 0);
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        assert_eq!(r.governance, 1_000_000);
        assert_eq!(r.yield_reward, 0);
    }

    #[test]
    fn half_year_is_half() {
        let s = stake(1_000_000, 0);
        let r = accrued(&s, &params(20_000, 10_000), Timestamp::new(YEAR / 2)).unwrap();
        assert_eq!(r.governance, 1_000_000);
    }

    #[test]
    fn dual_stakers_get_the_bonus() {
        let s = stake(1_000_000, 400_000);
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        // base × (10000 + 2500) / 10000
        assert_eq!(r.governance, 1_250_000);
        assert_eq!(r.yield_reward, 500_000);
    }

    #[test]
    fn yield_needs_a_share_stake() {
        let s = stake(0, 1_000_000);
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        assert!(r.is_zero());
    }

    #[test]
    fn lock_multiplier_boosts_only_the_locked_part() {
        let mut s = stake(1_000_000, 0);
        s.lock_end = Timestamp::new(YEAR / 2);
        s.lock_multiplier_bps = 20_000;
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        // half a year at 2x plus half a year at 1x
        assert_eq!(r.governance, 1_500_000);
    }

    #[test]
    fn settle_moves_rewards_to_pending() {
        let s = stake(1_000_000, 0);
        let settled = settle(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        assert_eq!(settled.pending_governance, 1_000_000);
        assert_eq!(settled.last_accrual, Timestamp::new(YEAR));
        // settling again at the same time earns nothing more
        let again = settle(&settled, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        assert_eq!(again, settled);
    }

    #[test]
    fn time_going_backwards_earns_nothing() {
        let mut s = stake(1_000_000, 0);
        s.last_accrual = Timestamp::new(100);
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(50)).unwrap();
        assert!(r.is_zero());
        assert_eq!(settle(&s, &params(10_000, 10_000), Timestamp::new(50)).unwrap().last_accrual, Timestamp::new(100));
    }

    #[test]
    fn fractional_rates() {
        let s = stake(1_000_000, 0);
        let r = accrued(&s, &params(500, 10_000), Timestamp::new(YEAR)).unwrap();
        assert_eq!(r.governance, 50_000);
    }

    #[test]
    fn large_stakes_do_not_overflow() {
        // a billion 18-decimal tokens for a year at 2x
        let s = UserStake {
            lock_end: Timestamp::new(YEAR),
            lock_multiplier_bps: 20_000,
            ..stake(1_000_000_000 * 10u128.pow(18), 0)
        };
        let r = accrued(&s, &params(10_000, 10_000), Timestamp::new(YEAR)).unwrap();
        assert_eq!(r.governance, 2_000_000_000 * 10u128.pow(18));
    }

    #[test]
    fn overflow_is_reported() {
        let s = stake(u128::MAX, 0);
        assert!(accrued(&s, &params(20_000, 10_000), Timestamp::new(YEAR)).is_none());
    }
}
