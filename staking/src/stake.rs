//! Per-user stake records.

use serde::{Deserialize, Serialize};
use sova_types::amount::BPS_DENOMINATOR;
use sova_types::Timestamp;

/// One user's position in both tiers.
///
/// Created on first stake. Rewards are accrued lazily: `pending_*` holds
/// everything earned up to `last_accrual`, and nothing is stored for the time
/// since.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStake {
    /// Vault shares staked.
    pub tier1: u128,
    /// Governance tokens staked.
    pub tier2: u128,
    pub lock_end: Timestamp,
    /// Multiplier applied to accrual until `lock_end`.
    pub lock_multiplier_bps: u128,
    pub last_accrual: Timestamp,
    pub pending_governance: u128,
    pub pending_yield: u128,
}

impl UserStake {
    pub fn new(now: Timestamp) -> Self {
        Self {
            tier1: 0,
            tier2: 0,
            lock_end: now,
            lock_multiplier_bps: BPS_DENOMINATOR,
            last_accrual: now,
            pending_governance: 0,
            pending_yield: 0,
        }
    }

    pub fn is_locked(&self, now: Timestamp) -> bool {
        now < self.lock_end
    }

    pub fn is_dual(&self) -> bool {
        self.tier1 > 0 && self.tier2 > 0
    }

    pub fn has_stake(&self) -> bool {
        self.tier1 > 0 || self.tier2 > 0
    }

    /// Extend the lock to at least `now + period`.
    ///
    /// The multiplier follows whichever period sets the resulting end: a
    /// shorter lock taken while a longer one is running keeps the running
    /// multiplier, and a lock that pushes the end further out replaces it.
    pub fn extend_lock(&mut self, now: Timestamp, period_secs: u64, multiplier_bps: u128) -> Option<()> {
        let end = now.checked_add_secs(period_secs)?;
        if !self.is_locked(now) || end > self.lock_end {
            self.lock_multiplier_bps = multiplier_bps;
            self.lock_end = end;
        }
        Some(())
    }

    /// Drop the lock entirely.
    pub fn clear_lock(&mut self, now: Timestamp) {
        self.lock_end = now;
        self.lock_multiplier_bps = BPS_DENOMINATOR;
    }
}
