//! The reward engine.

use crate::accrual::{self, Rewards};
use crate::error::StakingError;
use crate::params::{LockTable, RewardParams};
use crate::stake::UserStake;
use serde::{Deserialize, Serialize};
use sova_assets::AssetBook;
use sova_queue::{QueueError, RedemptionQueue};
use sova_types::amount::apply_bps;
use sova_types::{
    AccessControl, Address, AssetId, EventLog, EventRecord, FungibleAsset, PauseSwitch,
    ProtocolEvent, RedemptionKind, RedemptionStatus, RequestId, StakeTier, Timestamp,
};
use sova_utils::ReentrancyGuard;
use std::collections::{BTreeMap, HashMap};

/// Forfeited principal from emergency exits, held until swept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyPool {
    pub shares: u128,
    pub governance: u128,
}

/// Yield reward deducted from a user's pending balance for a queued
/// redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardReservation {
    pub owner: Address,
    pub amount: u128,
    pub reserved_at: Timestamp,
}

/// Dual-tier staking.
///
/// Tier 1 stakes vault shares and earns the governance reward (paid in the
/// governance token). Tier 2 stakes the governance token, is only accepted on
/// top of a tier-1 stake, and earns the yield reward (paid in the reward
/// asset). Rewards accrue lazily: every mutating call for a user settles that
/// user's stake up to `now` before changing it.
///
/// The engine holds, at its own address: the staked shares plus share
/// penalties; the staked governance tokens plus governance penalties plus the
/// governance reward float; and the reward-asset float.
///
/// Rate changes are not checkpointed. A new rate applies to every user's
/// unsettled period, including time before the change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RewardEngine {
    address: Address,
    access: AccessControl,
    pause: PauseSwitch,
    governance_asset: AssetId,
    reward_asset: AssetId,
    params: RewardParams,
    locks: LockTable,
    stakes: HashMap<Address, UserStake>,
    total_tier1: u128,
    total_tier2: u128,
    penalties: PenaltyPool,
    reservations: BTreeMap<RequestId, RewardReservation>,
    #[serde(default)]
    guard: ReentrancyGuard,
    events: EventLog,
}

impl RewardEngine {
    pub fn new(
        address: Address,
        admin: Address,
        governance_asset: AssetId,
        reward_asset: AssetId,
        params: RewardParams,
        locks: LockTable,
    ) -> Result<Self, StakingError> {
        params.validate()?;
        Ok(Self {
            address,
            access: AccessControl::new(admin)?,
            pause: PauseSwitch::default(),
            governance_asset,
            reward_asset,
            params,
            locks,
            stakes: HashMap::new(),
            total_tier1: 0,
            total_tier2: 0,
            penalties: PenaltyPool::default(),
            reservations: BTreeMap::new(),
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        })
    }

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, StakingError>) -> Result<T, StakingError> {
        self.guard.enter()?;
        let result = f(self);
        self.guard.exit();
        result
    }

    /// The user's stake settled up to `now`, or a fresh record.
    fn settled(&self, user: &Address, now: Timestamp) -> Result<UserStake, StakingError> {
        match self.stakes.get(user) {
            Some(stake) => accrual::settle(stake, &self.params, now).ok_or(StakingError::Overflow),
            None => Ok(UserStake::new(now)),
        }
    }

    fn existing_settled(&self, user: &Address, now: Timestamp) -> Result<UserStake, StakingError> {
        let stake = self.stakes.get(user).ok_or(StakingError::NoStake(*user))?;
        accrual::settle(stake, &self.params, now).ok_or(StakingError::Overflow)
    }

    fn lock_multiplier(&self, period_secs: u64) -> Result<u128, StakingError> {
        self.locks
            .multiplier(period_secs)
            .ok_or(StakingError::UnknownLockPeriod(period_secs))
    }

    // ── Staking ───────────────────────────────────────────────────────────

    /// Stake vault shares, locking the whole position for at least
    /// `lock_period_secs`. The engine pulls the shares with `transfer_from`.
    pub fn stake_tier1(
        &mut self,
        caller: &Address,
        amount: u128,
        lock_period_secs: u64,
        shares: &mut impl FungibleAsset,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            if amount == 0 {
                return Err(StakingError::ZeroAmount);
            }
            let multiplier = e.lock_multiplier(lock_period_secs)?;
            let mut stake = e.settled(caller, now)?;
            stake.tier1 = stake.tier1.checked_add(amount).ok_or(StakingError::Overflow)?;
            stake
                .extend_lock(now, lock_period_secs, multiplier)
                .ok_or(StakingError::Overflow)?;
            let total = e.total_tier1.checked_add(amount).ok_or(StakingError::Overflow)?;

            let engine = e.address;
            shares.transfer_from(&engine, caller, &engine, amount)?;
            e.total_tier1 = total;
            let lock_end = stake.lock_end;
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::Staked {
                    user: *caller,
                    tier: StakeTier::Shares,
                    amount,
                    lock_end,
                },
            );
            tracing::info!(user = %caller, amount, lock_end = lock_end.as_secs(), "shares staked");
            Ok(lock_end)
        })
    }

    /// Stake governance tokens on top of an existing share stake.
    pub fn stake_tier2(
        &mut self,
        caller: &Address,
        amount: u128,
        lock_period_secs: u64,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<Timestamp, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            if amount == 0 {
                return Err(StakingError::ZeroAmount);
            }
            let multiplier = e.lock_multiplier(lock_period_secs)?;
            let mut stake = e.settled(caller, now)?;
            if stake.tier1 == 0 {
                return Err(StakingError::Tier1Required);
            }
            stake.tier2 = stake.tier2.checked_add(amount).ok_or(StakingError::Overflow)?;
            stake
                .extend_lock(now, lock_period_secs, multiplier)
                .ok_or(StakingError::Overflow)?;
            let total = e.total_tier2.checked_add(amount).ok_or(StakingError::Overflow)?;

            let engine = e.address;
            book.transfer_from(&e.governance_asset, &engine, caller, &engine, amount)?;
            e.total_tier2 = total;
            let lock_end = stake.lock_end;
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::Staked {
                    user: *caller,
                    tier: StakeTier::Governance,
                    amount,
                    lock_end,
                },
            );
            tracing::info!(user = %caller, amount, lock_end = lock_end.as_secs(), "governance tokens staked");
            Ok(lock_end)
        })
    }

    pub fn unstake_tier1(
        &mut self,
        caller: &Address,
        amount: u128,
        shares: &mut impl FungibleAsset,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let mut stake = e.unlocked_stake(caller, StakeTier::Shares, amount, now)?;
            stake.tier1 -= amount;

            let engine = e.address;
            shares.transfer(&engine, caller, amount)?;
            e.total_tier1 -= amount;
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::Unstaked {
                    user: *caller,
                    tier: StakeTier::Shares,
                    amount,
                },
            );
            tracing::info!(user = %caller, amount, "shares unstaked");
            Ok(())
        })
    }

    pub fn unstake_tier2(
        &mut self,
        caller: &Address,
        amount: u128,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let mut stake = e.unlocked_stake(caller, StakeTier::Governance, amount, now)?;
            stake.tier2 -= amount;

            let engine = e.address;
            book.transfer(&e.governance_asset, &engine, caller, amount)?;
            e.total_tier2 -= amount;
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::Unstaked {
                    user: *caller,
                    tier: StakeTier::Governance,
                    amount,
                },
            );
            tracing::info!(user = %caller, amount, "governance tokens unstaked");
            Ok(())
        })
    }

    /// Settled stake of `user`, checked to allow withdrawing `amount` from
    /// `tier` now.
    fn unlocked_stake(
        &self,
        user: &Address,
        tier: StakeTier,
        amount: u128,
        now: Timestamp,
    ) -> Result<UserStake, StakingError> {
        if amount == 0 {
            return Err(StakingError::ZeroAmount);
        }
        let stake = self.existing_settled(user, now)?;
        let available = match tier {
            StakeTier::Shares => stake.tier1,
            StakeTier::Governance => stake.tier2,
        };
        if available < amount {
            return Err(StakingError::InsufficientStake {
                tier,
                needed: amount,
                available,
            });
        }
        if stake.is_locked(now) {
            return Err(StakingError::Locked { until: stake.lock_end });
        }
        Ok(stake)
    }

    // ── Rewards ───────────────────────────────────────────────────────────

    /// Pay out both pending rewards.
    pub fn claim_rewards(
        &mut self,
        caller: &Address,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<Rewards, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let mut stake = e.existing_settled(caller, now)?;
            let claim = Rewards {
                governance: stake.pending_governance,
                yield_reward: stake.pending_yield,
            };
            if claim.is_zero() {
                return Err(StakingError::NothingToClaim);
            }
            let governance_available = e.governance_liquidity(book)?;
            if governance_available < claim.governance {
                return Err(StakingError::InsufficientRewardLiquidity {
                    asset: "governance",
                    needed: claim.governance,
                    available: governance_available,
                });
            }
            let engine = e.address;
            let yield_available = book.balance_of(&e.reward_asset, &engine)?;
            if yield_available < claim.yield_reward {
                return Err(StakingError::InsufficientRewardLiquidity {
                    asset: "yield",
                    needed: claim.yield_reward,
                    available: yield_available,
                });
            }

            book.transfer(&e.governance_asset, &engine, caller, claim.governance)?;
            book.transfer(&e.reward_asset, &engine, caller, claim.yield_reward)?;
            stake.pending_governance = 0;
            stake.pending_yield = 0;
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::RewardsClaimed {
                    user: *caller,
                    governance: claim.governance,
                    yield_reward: claim.yield_reward,
                },
            );
            tracing::info!(
                user = %caller,
                governance = claim.governance,
                yield_reward = claim.yield_reward,
                "rewards claimed"
            );
            Ok(claim)
        })
    }

    /// Restake the pending governance reward as tier-2 principal.
    pub fn compound_sova_rewards(
        &mut self,
        caller: &Address,
        book: &AssetBook,
        now: Timestamp,
    ) -> Result<u128, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let mut stake = e.existing_settled(caller, now)?;
            if stake.tier1 == 0 {
                return Err(StakingError::Tier1Required);
            }
            let amount = stake.pending_governance;
            if amount == 0 {
                return Err(StakingError::NothingToCompound);
            }
            let available = e.governance_liquidity(book)?;
            if available < amount {
                return Err(StakingError::InsufficientRewardLiquidity {
                    asset: "governance",
                    needed: amount,
                    available,
                });
            }
            stake.tier2 = stake.tier2.checked_add(amount).ok_or(StakingError::Overflow)?;
            let total = e.total_tier2.checked_add(amount).ok_or(StakingError::Overflow)?;
            stake.pending_governance = 0;
            e.total_tier2 = total;
            e.stakes.insert(*caller, stake);

            e.events.emit(now, ProtocolEvent::RewardsCompounded { user: *caller, amount });
            tracing::info!(user = %caller, amount, "governance rewards compounded");
            Ok(amount)
        })
    }

    /// Leave both tiers immediately, ignoring the lock, for a penalty on the
    /// principal. Pending rewards stay claimable.
    pub fn emergency_unstake(
        &mut self,
        caller: &Address,
        shares: &mut impl FungibleAsset,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<(u128, u128), StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let mut stake = e.existing_settled(caller, now)?;
            if !stake.has_stake() {
                return Err(StakingError::NothingStaked);
            }
            let bps = e.params.emergency_penalty_bps;
            let shares_penalty = apply_bps(stake.tier1, bps).ok_or(StakingError::Overflow)?;
            let governance_penalty = apply_bps(stake.tier2, bps).ok_or(StakingError::Overflow)?;
            let shares_returned = stake.tier1 - shares_penalty;
            let governance_returned = stake.tier2 - governance_penalty;
            let pool = PenaltyPool {
                shares: e
                    .penalties
                    .shares
                    .checked_add(shares_penalty)
                    .ok_or(StakingError::Overflow)?,
                governance: e
                    .penalties
                    .governance
                    .checked_add(governance_penalty)
                    .ok_or(StakingError::Overflow)?,
            };

            let engine = e.address;
            shares.transfer(&engine, caller, shares_returned)?;
            book.transfer(&e.governance_asset, &engine, caller, governance_returned)?;
            e.total_tier1 -= stake.tier1;
            e.total_tier2 -= stake.tier2;
            e.penalties = pool;
            stake.tier1 = 0;
            stake.tier2 = 0;
            stake.clear_lock(now);
            e.stakes.insert(*caller, stake);

            e.events.emit(
                now,
                ProtocolEvent::EmergencyUnstaked {
                    user: *caller,
                    shares_returned,
                    governance_returned,
                    shares_penalty,
                    governance_penalty,
                },
            );
            tracing::warn!(
                user = %caller,
                shares_returned,
                governance_returned,
                shares_penalty,
                governance_penalty,
                "emergency unstake"
            );
            Ok((shares_returned, governance_returned))
        })
    }

    // ── Queued reward redemption (reserve → commit or release) ────────────

    /// Deduct `amount` from the pending yield reward and open a pending queue
    /// request for it.
    pub fn request_reward_redemption(
        &mut self,
        caller: &Address,
        amount: u128,
        queue: &mut RedemptionQueue,
        now: Timestamp,
    ) -> Result<RequestId, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            if amount == 0 {
                return Err(StakingError::ZeroAmount);
            }
            let mut stake = e.existing_settled(caller, now)?;
            if stake.pending_yield < amount {
                return Err(StakingError::InsufficientPendingRewards {
                    needed: amount,
                    available: stake.pending_yield,
                });
            }

            let engine = e.address;
            let id = queue.request_redemption(
                &engine,
                caller,
                RedemptionKind::Rewards,
                amount,
                e.reward_asset,
                amount,
                now,
            )?;
            stake.pending_yield -= amount;
            e.stakes.insert(*caller, stake);
            e.reservations.insert(
                id,
                RewardReservation {
                    owner: *caller,
                    amount,
                    reserved_at: now,
                },
            );
            tracing::info!(%id, user = %caller, amount, "reward redemption reserved");
            Ok(id)
        })
    }

    /// Pay a matured reward redemption.
    ///
    /// Pays `min(reserved, reward balance)`; any shortfall is forfeited and
    /// the request records the amount actually paid.
    pub fn fulfill_reward_redemption(
        &mut self,
        caller: &Address,
        id: &RequestId,
        queue: &mut RedemptionQueue,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let reservation = e
                .reservations
                .get(id)
                .cloned()
                .ok_or(StakingError::UnknownReservation(*id))?;
            e.access.ensure_owner_or_admin(caller, &reservation.owner)?;
            let engine = e.address;
            queue.check_fulfillable(&engine, id, now)?;

            let available = book.balance_of(&e.reward_asset, &engine)?;
            let paid = reservation.amount.min(available);
            if paid < reservation.amount {
                tracing::warn!(
                    %id,
                    requested = reservation.amount,
                    paid,
                    "reward redemption partially filled"
                );
            }

            queue.fulfill_redemption(&engine, id, paid, now)?;
            book.transfer(&e.reward_asset, &engine, &reservation.owner, paid)?;
            e.reservations.remove(id);
            tracing::info!(%id, user = %reservation.owner, paid, "reward redemption fulfilled");
            Ok(paid)
        })
    }

    /// Return a reservation's amount to the owner's pending yield.
    ///
    /// Also restores reservations whose request was already cancelled
    /// directly at the queue.
    pub fn cancel_reward_redemption(
        &mut self,
        caller: &Address,
        id: &RequestId,
        queue: &mut RedemptionQueue,
        now: Timestamp,
    ) -> Result<u128, StakingError> {
        self.guarded(|e| {
            e.pause.ensure_not_paused()?;
            let reservation = e
                .reservations
                .get(id)
                .cloned()
                .ok_or(StakingError::UnknownReservation(*id))?;
            e.access.ensure_owner_or_admin(caller, &reservation.owner)?;
            let mut stake = e
                .stakes
                .get(&reservation.owner)
                .cloned()
                .ok_or(StakingError::NoStake(reservation.owner))?;
            stake.pending_yield = stake
                .pending_yield
                .checked_add(reservation.amount)
                .ok_or(StakingError::Overflow)?;

            let status = queue
                .request(id)
                .map(|r| r.status)
                .ok_or(QueueError::RequestNotFound(*id))?;
            let engine = e.address;
            match status {
                RedemptionStatus::Pending => {
                    queue.cancel_redemption(&engine, id, now)?;
                }
                RedemptionStatus::Cancelled => {
                    tracing::debug!(%id, "request already cancelled at the queue, restoring reservation");
                }
                RedemptionStatus::Fulfilled => {
                    return Err(QueueError::NotPending { id: *id, status }.into());
                }
            }

            e.stakes.insert(reservation.owner, stake);
            e.reservations.remove(id);
            tracing::info!(%id, user = %reservation.owner, amount = reservation.amount, "reward reservation released");
            Ok(reservation.amount)
        })
    }

    // ── Administration ────────────────────────────────────────────────────

    /// Send collected emergency-exit penalties to `to`.
    pub fn sweep_penalties(
        &mut self,
        caller: &Address,
        to: &Address,
        shares: &mut impl FungibleAsset,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<PenaltyPool, StakingError> {
        self.guarded(|e| {
            e.access.ensure_admin(caller)?;
            if to.is_zero() {
                return Err(StakingError::NullReceiver);
            }
            let pool = e.penalties;
            let engine = e.address;
            let governance_held = book.balance_of(&e.governance_asset, &engine)?;
            if governance_held < pool.governance {
                return Err(StakingError::InsufficientRewardLiquidity {
                    asset: "governance",
                    needed: pool.governance,
                    available: governance_held,
                });
            }
            shares.transfer(&engine, to, pool.shares)?;
            book.transfer(&e.governance_asset, &engine, to, pool.governance)?;
            e.penalties = PenaltyPool::default();
            tracing::info!(
                to = %to,
                shares = pool.shares,
                governance = pool.governance,
                at = now.as_secs(),
                "penalties swept"
            );
            Ok(pool)
        })
    }

    /// Replace the reward parameters. Applies to all unsettled time.
    pub fn set_reward_params(&mut self, caller: &Address, params: RewardParams) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.access.ensure_admin(caller)?;
            params.validate()?;
            tracing::info!(
                rate_a = params.rate_a,
                rate_b = params.rate_b,
                dual_bonus_bps = params.dual_bonus_bps,
                emergency_penalty_bps = params.emergency_penalty_bps,
                "reward params updated"
            );
            e.params = params;
            Ok(())
        })
    }

    pub fn set_lock_multiplier(
        &mut self,
        caller: &Address,
        period_secs: u64,
        multiplier_bps: u128,
    ) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.access.ensure_admin(caller)?;
            e.locks.set(period_secs, multiplier_bps)?;
            tracing::info!(period_secs, multiplier_bps, "lock multiplier set");
            Ok(())
        })
    }

    pub fn pause(&mut self, caller: &Address, now: Timestamp) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.access.ensure_admin(caller)?;
            e.pause.pause()?;
            e.events.emit(now, ProtocolEvent::Paused { by: *caller });
            tracing::warn!(by = %caller, "staking paused");
            Ok(())
        })
    }

    pub fn unpause(&mut self, caller: &Address, now: Timestamp) -> Result<(), StakingError> {
        self.guarded(|e| {
            e.access.ensure_admin(caller)?;
            e.pause.unpause()?;
            e.events.emit(now, ProtocolEvent::Unpaused { by: *caller });
            tracing::info!(by = %caller, "staking unpaused");
            Ok(())
        })
    }

    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), StakingError> {
        self.guarded(|e| Ok(e.access.transfer_admin(caller, new_admin)?))
    }

    // ── Views ─────────────────────────────────────────────────────────────

    pub fn stake_of(&self, user: &Address) -> Option<&UserStake> {
        self.stakes.get(user)
    }

    /// Everything `user` could claim at `now`.
    pub fn pending_rewards(&self, user: &Address, now: Timestamp) -> Result<Rewards, StakingError> {
        match self.stakes.get(user) {
            Some(stake) => accrual::pending(stake, &self.params, now).ok_or(StakingError::Overflow),
            None => Ok(Rewards::default()),
        }
    }

    /// Governance tokens available for rewards: the engine's balance minus
    /// staked principal and uncollected penalties.
    pub fn governance_liquidity(&self, book: &AssetBook) -> Result<u128, StakingError> {
        let held = book.balance_of(&self.governance_asset, &self.address)?;
        Ok(held
            .saturating_sub(self.total_tier2)
            .saturating_sub(self.penalties.governance))
    }

    pub fn reservation(&self, id: &RequestId) -> Option<&RewardReservation> {
        self.reservations.get(id)
    }

    pub fn total_staked_tier1(&self) -> u128 {
        self.total_tier1
    }

    pub fn total_staked_tier2(&self) -> u128 {
        self.total_tier2
    }

    pub fn penalties(&self) -> PenaltyPool {
        self.penalties
    }

    pub fn params(&self) -> &RewardParams {
        &self.params
    }

    pub fn lock_table(&self) -> &LockTable {
        &self.locks
    }

    pub fn staker_count(&self) -> usize {
        self.stakes.values().filter(|s| s.has_stake()).count()
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn admin(&self) -> &Address {
        self.access.admin()
    }

    pub fn governance_asset(&self) -> &AssetId {
        &self.governance_asset
    }

    pub fn reward_asset(&self) -> &AssetId {
        &self.reward_asset
    }

    pub fn is_paused(&self) -> bool {
        self.pause.is_paused()
    }

    pub fn events(&self) -> &EventLog {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.events.drain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sova_assets::TokenLedger;
    use sova_nullables::NullAsset;
    use sova_queue::QueueConfig;
    use sova_types::AccessError;

    const YEAR: u64 = 365 * 86_400;
    const DAY: u64 = 86_400;
    const WINDOW: u64 = DAY;
    const ONE: u128 = 100_000_000;

    fn addr(label: &str) -> Address {
        Address::from_label(label)
    }

    fn sova() -> AssetId {
        addr("sova")
    }

    fn ybtc() -> AssetId {
        addr("ybtc")
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::new(secs)
    }

    struct World {
        book: AssetBook,
        shares: NullAsset,
        engine: RewardEngine,
        queue: RedemptionQueue,
    }

    fn world() -> World {
        let engine_addr = addr("staking");
        let mut book = AssetBook::new();
        book.register(sova(), TokenLedger::new("SOVA", 8)).unwrap();
        book.register(ybtc(), TokenLedger::new("YBTC", 8)).unwrap();
        for user in ["alice", "bob"] {
            book.mint(&sova(), &addr(user), 1_000 * ONE).unwrap();
            book.approve(&sova(), &addr(user), &engine_addr, u128::MAX).unwrap();
        }
        // reward floats
        book.mint(&sova(), &engine_addr, 1_000 * ONE).unwrap();
        book.mint(&ybtc(), &engine_addr, 1_000 * ONE).unwrap();

        let mut shares = NullAsset::new(8);
        shares.set_balance(addr("alice"), 1_000 * ONE);
        shares.set_balance(addr("bob"), 1_000 * ONE);

        let engine = RewardEngine::new(
            engine_addr,
            addr("admin"),
            sova(),
            ybtc(),
            RewardParams::default(),
            LockTable::default(),
        )
        .unwrap();
        let mut queue =
            RedemptionQueue::new(addr("queue"), addr("admin"), QueueConfig::new(WINDOW, true)).unwrap();
        queue.add_processor(&addr("admin"), engine_addr).unwrap();
        World {
            book,
            shares,
            engine,
            queue,
        }
    }

    #[test]
    fn tier1_accrues_governance_reward() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        assert_eq!(w.shares.balance_of(&addr("staking")), 100 * ONE);
        let pending = w.engine.pending_rewards(&addr("alice"), t(YEAR)).unwrap();
        assert_eq!(pending.governance, 100 * ONE);
        assert_eq!(pending.yield_reward, 0);
    }

    #[test]
    fn tier2_requires_tier1() {
        let mut w = world();
        assert_eq!(
            w.engine.stake_tier2(&addr("alice"), ONE, 0, &mut w.book, t(0)),
            Err(StakingError::Tier1Required)
        );
    }

    #[test]
    fn dual_stake_earns_bonus_on_both() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier2(&addr("alice"), 40 * ONE, 0, &mut w.book, t(0))
            .unwrap();
        let pending = w.engine.pending_rewards(&addr("alice"), t(YEAR)).unwrap();
        assert_eq!(pending.governance, 125 * ONE);
        assert_eq!(pending.yield_reward, 50 * ONE);
    }

    #[test]
    fn unknown_lock_period_is_rejected() {
        let mut w = world();
        assert_eq!(
            w.engine
                .stake_tier1(&addr("alice"), ONE, 7 * DAY, &mut w.shares, t(0)),
            Err(StakingError::UnknownLockPeriod(7 * DAY))
        );
        assert!(w.engine.stake_of(&addr("alice")).is_none());
    }

    #[test]
    fn locked_stake_cannot_be_withdrawn() {
        let mut w = world();
        let lock_end = w
            .engine
            .stake_tier1(&addr("alice"), ONE, 30 * DAY, &mut w.shares, t(0))
            .unwrap();
        assert_eq!(lock_end, t(30 * DAY));
        assert_eq!(
            w.engine
                .unstake_tier1(&addr("alice"), ONE, &mut w.shares, t(30 * DAY - 1)),
            Err(StakingError::Locked { until: t(30 * DAY) })
        );
        w.engine
            .unstake_tier1(&addr("alice"), ONE, &mut w.shares, t(30 * DAY))
            .unwrap();
        assert_eq!(w.shares.balance_of(&addr("alice")), 1_000 * ONE);
    }

    #[test]
    fn restaking_never_shortens_the_lock() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), ONE, 90 * DAY, &mut w.shares, t(0))
            .unwrap();
        let lock_end = w
            .engine
            .stake_tier1(&addr("alice"), ONE, 30 * DAY, &mut w.shares, t(DAY))
            .unwrap();
        assert_eq!(lock_end, t(90 * DAY));
        assert_eq!(w.engine.stake_of(&addr("alice")).unwrap().lock_multiplier_bps, 12_500);
    }

    #[test]
    fn short_relock_near_expiry_earns_the_short_multiplier() {
        let mut w = world();
        let renewal = t(364 * DAY);
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, YEAR, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier1(&addr("alice"), 1, 30 * DAY, &mut w.shares, renewal)
            .unwrap();
        w.engine
            .stake_tier1(&addr("bob"), 100 * ONE, 30 * DAY, &mut w.shares, renewal)
            .unwrap();

        let alice = w.engine.stake_of(&addr("alice")).unwrap();
        assert_eq!(alice.lock_end, t(394 * DAY));
        assert_eq!(alice.lock_multiplier_bps, 11_000);

        let end = t(394 * DAY);
        let alice_gain = w.engine.pending_rewards(&addr("alice"), end).unwrap().governance
            - w.engine.pending_rewards(&addr("alice"), renewal).unwrap().governance;
        let bob_gain = w.engine.pending_rewards(&addr("bob"), end).unwrap().governance;
        assert_eq!(bob_gain, 904_109_589);
        assert_eq!(alice_gain, bob_gain);
    }

    #[test]
    fn over_unstake_is_rejected() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), ONE, 0, &mut w.shares, t(0))
            .unwrap();
        assert_eq!(
            w.engine
                .unstake_tier1(&addr("alice"), ONE + 1, &mut w.shares, t(1)),
            Err(StakingError::InsufficientStake {
                tier: StakeTier::Shares,
                needed: ONE + 1,
                available: ONE
            })
        );
        assert_eq!(
            w.engine.unstake_tier2(&addr("bob"), 1, &mut w.book, t(1)),
            Err(StakingError::NoStake(addr("bob")))
        );
    }

    #[test]
    fn claim_pays_and_zeroes_pending() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier2(&addr("alice"), 40 * ONE, 0, &mut w.book, t(0))
            .unwrap();
        let sova_before = w.book.balance_of(&sova(), &addr("alice")).unwrap();
        let claim = w.engine.claim_rewards(&addr("alice"), &mut w.book, t(YEAR)).unwrap();
        assert_eq!(claim.governance, 125 * ONE);
        assert_eq!(claim.yield_reward, 50 * ONE);
        assert_eq!(
            w.book.balance_of(&sova(), &addr("alice")),
            Ok(sova_before + 125 * ONE)
        );
        assert_eq!(w.book.balance_of(&ybtc(), &addr("alice")), Ok(50 * ONE));
        assert_eq!(
            w.engine.claim_rewards(&addr("alice"), &mut w.book, t(YEAR)),
            Err(StakingError::NothingToClaim)
        );
    }

    #[test]
    fn claims_never_pay_out_staked_principal() {
        let mut w = world();
        // drain the governance float so only staked principal remains
        let float = w.engine.governance_liquidity(&w.book).unwrap();
        w.book
            .transfer(&sova(), &addr("staking"), &addr("sink"), float)
            .unwrap();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier2(&addr("alice"), 40 * ONE, 0, &mut w.book, t(0))
            .unwrap();
        let result = w.engine.claim_rewards(&addr("alice"), &mut w.book, t(YEAR));
        assert!(matches!(
            result,
            Err(StakingError::InsufficientRewardLiquidity { asset: "governance", available: 0, .. })
        ));
        assert_eq!(w.book.balance_of(&sova(), &addr("staking")), Ok(40 * ONE));
    }

    #[test]
    fn compound_moves_governance_reward_into_tier2() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        let compounded = w
            .engine
            .compound_sova_rewards(&addr("alice"), &w.book, t(YEAR))
            .unwrap();
        assert_eq!(compounded, 100 * ONE);
        let stake = w.engine.stake_of(&addr("alice")).unwrap();
        assert_eq!(stake.tier2, 100 * ONE);
        assert_eq!(stake.pending_governance, 0);
        assert_eq!(w.engine.total_staked_tier2(), 100 * ONE);
        assert_eq!(
            w.engine.compound_sova_rewards(&addr("alice"), &w.book, t(YEAR)),
            Err(StakingError::NothingToCompound)
        );
    }

    #[test]
    fn emergency_exit_applies_penalty_and_keeps_rewards() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 365 * DAY, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier2(&addr("alice"), 50 * ONE, 0, &mut w.book, t(0))
            .unwrap();
        let pending = w.engine.pending_rewards(&addr("alice"), t(DAY)).unwrap();

        let (shares_back, gov_back) = w
            .engine
            .emergency_unstake(&addr("alice"), &mut w.shares, &mut w.book, t(DAY))
            .unwrap();
        assert_eq!(shares_back, 90 * ONE);
        assert_eq!(gov_back, 45 * ONE);
        assert_eq!(
            w.engine.penalties(),
            PenaltyPool {
                shares: 10 * ONE,
                governance: 5 * ONE
            }
        );
        let stake = w.engine.stake_of(&addr("alice")).unwrap();
        assert_eq!((stake.tier1, stake.tier2), (0, 0));
        assert!(!stake.is_locked(t(DAY)));
        assert_eq!(stake.pending_governance, pending.governance);
        assert_eq!(stake.pending_yield, pending.yield_reward);
        assert_eq!(w.engine.total_staked_tier1(), 0);

        // nothing accrues afterwards
        assert_eq!(
            w.engine.pending_rewards(&addr("alice"), t(YEAR)).unwrap(),
            pending
        );
        assert_eq!(
            w.engine
                .emergency_unstake(&addr("alice"), &mut w.shares, &mut w.book, t(DAY + 1)),
            Err(StakingError::NothingStaked)
        );
    }

    #[test]
    fn penalties_are_swept_by_admin_only() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .emergency_unstake(&addr("alice"), &mut w.shares, &mut w.book, t(1))
            .unwrap();
        assert!(matches!(
            w.engine
                .sweep_penalties(&addr("alice"), &addr("alice"), &mut w.shares, &mut w.book, t(2)),
            Err(StakingError::Access(AccessError::NotAdmin(_)))
        ));
        let swept = w
            .engine
            .sweep_penalties(&addr("admin"), &addr("treasury"), &mut w.shares, &mut w.book, t(2))
            .unwrap();
        assert_eq!(swept.shares, 10 * ONE);
        assert_eq!(w.shares.balance_of(&addr("treasury")), 10 * ONE);
        assert_eq!(w.engine.penalties(), PenaltyPool::default());
    }

    fn staked_with_yield(w: &mut World) {
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .stake_tier2(&addr("alice"), 40 * ONE, 0, &mut w.book, t(0))
            .unwrap();
    }

    #[test]
    fn queued_reward_redemption_pays_after_window() {
        let mut w = world();
        staked_with_yield(&mut w);
        let id = w
            .engine
            .request_reward_redemption(&addr("alice"), 20 * ONE, &mut w.queue, t(YEAR))
            .unwrap();
        let stake = w.engine.stake_of(&addr("alice")).unwrap();
        assert_eq!(stake.pending_yield, 30 * ONE);

        assert!(matches!(
            w.engine.fulfill_reward_redemption(
                &addr("alice"),
                &id,
                &mut w.queue,
                &mut w.book,
                t(YEAR + WINDOW - 1)
            ),
            Err(StakingError::Queue(QueueError::TooEarly { .. }))
        ));
        let paid = w
            .engine
            .fulfill_reward_redemption(&addr("alice"), &id, &mut w.queue, &mut w.book, t(YEAR + WINDOW))
            .unwrap();
        assert_eq!(paid, 20 * ONE);
        assert_eq!(w.book.balance_of(&ybtc(), &addr("alice")), Ok(20 * ONE));
        assert_eq!(w.queue.request(&id).unwrap().actual_out, Some(20 * ONE));
        assert!(w.engine.reservation(&id).is_none());
    }

    #[test]
    fn queued_reward_fulfillment_is_capped_by_balance() {
        let mut w = world();
        staked_with_yield(&mut w);
        let id = w
            .engine
            .request_reward_redemption(&addr("alice"), 20 * ONE, &mut w.queue, t(YEAR))
            .unwrap();
        // leave only 5 units of reward float
        let held = w.book.balance_of(&ybtc(), &addr("staking")).unwrap();
        w.book
            .transfer(&ybtc(), &addr("staking"), &addr("sink"), held - 5 * ONE)
            .unwrap();

        let paid = w
            .engine
            .fulfill_reward_redemption(&addr("admin"), &id, &mut w.queue, &mut w.book, t(YEAR + WINDOW))
            .unwrap();
        assert_eq!(paid, 5 * ONE);
        let request = w.queue.request(&id).unwrap();
        assert_eq!(request.status, RedemptionStatus::Fulfilled);
        assert_eq!(request.actual_out, Some(5 * ONE));
    }

    #[test]
    fn cancelled_reward_redemption_restores_pending() {
        let mut w = world();
        staked_with_yield(&mut w);
        let id = w
            .engine
            .request_reward_redemption(&addr("alice"), 20 * ONE, &mut w.queue, t(YEAR))
            .unwrap();
        assert_eq!(
            w.engine
                .cancel_reward_redemption(&addr("alice"), &id, &mut w.queue, t(YEAR)),
            Ok(20 * ONE)
        );
        assert_eq!(w.engine.stake_of(&addr("alice")).unwrap().pending_yield, 50 * ONE);
        assert_eq!(w.queue.request(&id).unwrap().status, RedemptionStatus::Cancelled);
        assert_eq!(
            w.engine
                .cancel_reward_redemption(&addr("alice"), &id, &mut w.queue, t(YEAR)),
            Err(StakingError::UnknownReservation(id))
        );
    }

    #[test]
    fn reward_redemption_cannot_exceed_pending() {
        let mut w = world();
        staked_with_yield(&mut w);
        assert_eq!(
            w.engine
                .request_reward_redemption(&addr("alice"), 51 * ONE, &mut w.queue, t(YEAR)),
            Err(StakingError::InsufficientPendingRewards {
                needed: 51 * ONE,
                available: 50 * ONE
            })
        );
    }

    #[test]
    fn failed_pull_leaves_no_stake() {
        let mut w = world();
        w.shares.reject_transfers(true);
        assert!(w
            .engine
            .stake_tier1(&addr("alice"), ONE, 0, &mut w.shares, t(0))
            .is_err());
        assert!(w.engine.stake_of(&addr("alice")).is_none());
        assert_eq!(w.engine.total_staked_tier1(), 0);
    }

    #[test]
    fn pause_blocks_staking() {
        let mut w = world();
        w.engine.pause(&addr("admin"), t(0)).unwrap();
        assert_eq!(
            w.engine
                .stake_tier1(&addr("alice"), ONE, 0, &mut w.shares, t(0)),
            Err(StakingError::Access(AccessError::Paused))
        );
        w.engine.unpause(&addr("admin"), t(0)).unwrap();
        w.engine
            .stake_tier1(&addr("alice"), ONE, 0, &mut w.shares, t(0))
            .unwrap();
    }

    #[test]
    fn rate_change_applies_to_unsettled_time() {
        let mut w = world();
        w.engine
            .stake_tier1(&addr("alice"), 100 * ONE, 0, &mut w.shares, t(0))
            .unwrap();
        w.engine
            .set_reward_params(
                &addr("admin"),
                RewardParams {
                    rate_a: 20_000,
                    ..RewardParams::default()
                },
            )
            .unwrap();
        let pending = w.engine.pending_rewards(&addr("alice"), t(YEAR)).unwrap();
        assert_eq!(pending.governance, 200 * ONE);
    }
}
