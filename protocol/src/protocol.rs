//! The deployed protocol: every component wired together behind one
//! transactional entry point.

use crate::action::{Action, Outcome};
use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use sova_assets::{AssetBook, TokenLedger};
use sova_queue::{QueueStatus, RedemptionQueue};
use sova_staking::{PenaltyPool, RewardEngine};
use sova_types::amount::pow10;
use sova_types::{AccessControl, AccessError, Address, AssetId, EventRecord, FungibleAsset, Timestamp};
use sova_vault::ValueLedger;

/// Assets, vault, reward engine and queue of one deployment.
///
/// Components never call each other; the host passes each one the others it
/// needs for a given operation. [`Protocol::execute`] runs one [`Action`]
/// atomically: if any step fails, every component is restored to its state
/// before the call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Protocol {
    access: AccessControl,
    assets: AssetBook,
    vault: ValueLedger,
    staking: RewardEngine,
    queue: RedemptionQueue,
    /// Events collected from the components, oldest first.
    journal: Vec<EventRecord>,
}

/// Point-in-time overview of a deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSummary {
    pub total_shares: u128,
    pub total_value: u128,
    pub exchange_rate: u128,
    pub assets_under_management: u128,
    pub shares_in_custody: u128,
    pub supported_assets: Vec<AssetId>,
    pub vault_paused: bool,
    pub staking_paused: bool,
    pub total_staked_shares: u128,
    pub total_staked_governance: u128,
    pub stakers: usize,
    pub governance_liquidity: u128,
    pub penalties: PenaltyPool,
    pub queue: QueueStatus,
    pub tokens: Vec<TokenSummary>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSummary {
    pub id: AssetId,
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: u128,
    pub vault_balance: u128,
    pub staking_balance: u128,
}

impl Protocol {
    /// Deploy a fresh protocol from `config`.
    ///
    /// Registers every configured token and credits its genesis balances,
    /// then creates the vault, reward engine and queue, and authorizes the
    /// vault and the engine as queue processors.
    pub fn from_config(config: &ProtocolConfig, now: Timestamp) -> Result<Self, ProtocolError> {
        config.validate()?;
        let admin = config.admin;

        let mut assets = AssetBook::new();
        for asset in &config.assets {
            assets.register(asset.id, TokenLedger::new(asset.symbol.clone(), asset.decimals))?;
            let unit = pow10(u32::from(asset.decimals)).ok_or(ProtocolError::Overflow)?;
            for balance in &asset.genesis {
                let amount = u128::from(balance.whole_units)
                    .checked_mul(unit)
                    .ok_or(ProtocolError::Overflow)?;
                assets.mint(&asset.id, &balance.holder, amount)?;
            }
        }

        let mut vault = ValueLedger::new(
            config.vault_address,
            admin,
            config.primary_asset,
            config.reward_asset,
            &assets,
        )?;
        for id in &config.supported_assets {
            if !vault.is_supported(id) {
                vault.add_supported_asset(&admin, *id, &assets, now)?;
            }
        }

        let staking = RewardEngine::new(
            config.staking_address,
            admin,
            config.governance_asset,
            config.reward_asset,
            config.reward_params(),
            config.lock_table()?,
        )?;

        let mut queue = RedemptionQueue::new(config.queue_address, admin, config.queue.clone())?;
        queue.add_processor(&admin, config.vault_address)?;
        queue.add_processor(&admin, config.staking_address)?;

        let mut protocol = Self {
            access: AccessControl::new(admin)?,
            assets,
            vault,
            staking,
            queue,
            journal: Vec::new(),
        };
        protocol.collect_events();
        tracing::info!(
            admin = %admin,
            vault = %config.vault_address,
            staking = %config.staking_address,
            queue = %config.queue_address,
            tokens = config.assets.len(),
            "protocol deployed"
        );
        Ok(protocol)
    }

    /// Run `f` against the protocol, rolling every component back if it
    /// fails.
    ///
    /// Events already in the journal are committed and stay out of the
    /// checkpoint; only events recorded by `f` are discarded on failure.
    pub fn transact<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ProtocolError>,
    ) -> Result<T, ProtocolError> {
        let committed = std::mem::take(&mut self.journal);
        let checkpoint = self.clone();
        let result = f(self);
        if result.is_err() {
            *self = checkpoint;
        }
        let recorded = std::mem::replace(&mut self.journal, committed);
        self.journal.extend(recorded);
        result
    }

    /// Execute one action as `caller` at time `now`, atomically.
    pub fn execute(
        &mut self,
        caller: &Address,
        now: Timestamp,
        action: Action,
    ) -> Result<Outcome, ProtocolError> {
        let name = action.name();
        let result = self.transact(|p| p.apply(caller, now, action));
        match &result {
            Ok(outcome) => {
                tracing::debug!(caller = %caller, at = now.as_secs(), action = name, ?outcome, "action executed");
            }
            Err(e) => {
                tracing::warn!(caller = %caller, at = now.as_secs(), action = name, error = %e, "action rolled back");
            }
        }
        self.collect_events();
        result
    }

    fn apply(&mut self, caller: &Address, now: Timestamp, action: Action) -> Result<Outcome, ProtocolError> {
        let Protocol {
            access,
            assets,
            vault,
            staking,
            queue,
            ..
        } = self;

        let outcome = match action {
            Action::Approve {
                asset,
                spender,
                amount,
            } => {
                if asset == *vault.address() {
                    vault.approve_shares(caller, &spender, amount)?;
                } else {
                    assets.approve(&asset, caller, &spender, amount)?;
                }
                Outcome::Done
            }
            Action::Transfer { asset, to, amount } => {
                if asset == *vault.address() {
                    vault.transfer_shares(caller, &to, amount)?;
                } else {
                    assets.transfer(&asset, caller, &to, amount)?;
                }
                Outcome::Done
            }
            Action::BridgeCredit { asset, to, amount } => {
                access.ensure_admin(caller)?;
                assets.mint(&asset, &to, amount)?;
                tracing::info!(asset = %asset, to = %to, amount, "bridged units credited");
                Outcome::Done
            }

            Action::Deposit {
                asset,
                amount,
                receiver,
            } => {
                let receiver = receiver.unwrap_or(*caller);
                Outcome::Amount(vault.deposit(caller, asset, amount, &receiver, assets, now)?)
            }
            Action::RedeemForRewards { shares, receiver } => {
                let receiver = receiver.unwrap_or(*caller);
                Outcome::Amount(vault.redeem_for_rewards(caller, shares, &receiver, assets, now)?)
            }
            Action::AddYield { amount } => Outcome::Amount(vault.add_yield(caller, amount, assets, now)?),
            Action::RequestQueuedRedemption { shares } => {
                Outcome::Request(vault.request_queued_redemption(caller, shares, queue, assets, now)?)
            }
            Action::FulfillQueuedRedemption { id } => {
                Outcome::Amount(vault.fulfill_queued_redemption(caller, &id, queue, assets, now)?)
            }
            Action::CancelQueuedRedemption { id } => {
                Outcome::Amount(vault.cancel_queued_redemption(caller, &id, queue, now)?)
            }
            Action::Withdraw {
                assets: amount,
                receiver,
                owner,
            } => {
                let receiver = receiver.unwrap_or(*caller);
                let owner = owner.unwrap_or(*caller);
                Outcome::Amount(vault.withdraw(caller, amount, &receiver, &owner, assets, now)?)
            }
            Action::Redeem {
                shares,
                receiver,
                owner,
            } => {
                let receiver = receiver.unwrap_or(*caller);
                let owner = owner.unwrap_or(*caller);
                Outcome::Amount(vault.redeem(caller, shares, &receiver, &owner, assets, now)?)
            }
            Action::AddSupportedAsset { asset } => {
                vault.add_supported_asset(caller, asset, assets, now)?;
                Outcome::Done
            }
            Action::RemoveSupportedAsset { asset } => {
                vault.remove_supported_asset(caller, &asset, now)?;
                Outcome::Done
            }
            Action::SetAssetsUnderManagement { value } => {
                vault.set_assets_under_management(caller, value, now)?;
                Outcome::Done
            }

            Action::StakeShares {
                amount,
                lock_period_secs,
            } => Outcome::LockEnd(staking.stake_tier1(caller, amount, lock_period_secs, &mut *vault, now)?),
            Action::StakeGovernance {
                amount,
                lock_period_secs,
            } => Outcome::LockEnd(staking.stake_tier2(caller, amount, lock_period_secs, assets, now)?),
            Action::UnstakeShares { amount } => {
                staking.unstake_tier1(caller, amount, &mut *vault, now)?;
                Outcome::Done
            }
            Action::UnstakeGovernance { amount } => {
                staking.unstake_tier2(caller, amount, assets, now)?;
                Outcome::Done
            }
            Action::ClaimRewards => Outcome::Rewards(staking.claim_rewards(caller, assets, now)?),
            Action::CompoundRewards => Outcome::Amount(staking.compound_sova_rewards(caller, assets, now)?),
            Action::EmergencyUnstake => {
                let (shares, governance) = staking.emergency_unstake(caller, &mut *vault, assets, now)?;
                Outcome::Returned { shares, governance }
            }
            Action::RequestRewardRedemption { amount } => {
                Outcome::Request(staking.request_reward_redemption(caller, amount, queue, now)?)
            }
            Action::FulfillRewardRedemption { id } => {
                Outcome::Amount(staking.fulfill_reward_redemption(caller, &id, queue, assets, now)?)
            }
            Action::CancelRewardRedemption { id } => {
                Outcome::Amount(staking.cancel_reward_redemption(caller, &id, queue, now)?)
            }
            Action::SweepPenalties { to } => {
                Outcome::Penalties(staking.sweep_penalties(caller, &to, &mut *vault, assets, now)?)
            }
            Action::SetRewardParams(params) => {
                staking.set_reward_params(caller, params)?;
                Outcome::Done
            }
            Action::SetLockMultiplier {
                period_secs,
                multiplier_bps,
            } => {
                staking.set_lock_multiplier(caller, period_secs, multiplier_bps)?;
                Outcome::Done
            }

            Action::SetQueueConfig(config) => {
                queue.set_config(caller, config)?;
                Outcome::Done
            }
            Action::AddProcessor { processor } => Outcome::Changed(queue.add_processor(caller, processor)?),
            Action::RemoveProcessor { processor } => {
                Outcome::Changed(queue.remove_processor(caller, &processor)?)
            }
            Action::CancelRequest { id } => {
                if vault.is_paused() || staking.is_paused() {
                    return Err(AccessError::Paused.into());
                }
                queue.cancel_redemption(caller, &id, now)?;
                Outcome::Done
            }

            Action::PauseAll => {
                pause_components(access, vault, staking, caller, now)?;
                Outcome::Done
            }
            Action::UnpauseAll => {
                unpause_components(access, vault, staking, caller, now)?;
                Outcome::Done
            }
            Action::TransferAdmin { new_admin } => {
                vault.transfer_admin(caller, new_admin)?;
                staking.transfer_admin(caller, new_admin)?;
                queue.transfer_admin(caller, new_admin)?;
                access.transfer_admin(caller, new_admin)?;
                tracing::info!(admin = %new_admin, "admin transferred");
                Outcome::Done
            }
        };
        Ok(outcome)
    }

    /// Pause the vault and the reward engine. Fails only if both already are.
    pub fn pause_all(&mut self, caller: &Address, now: Timestamp) -> Result<(), ProtocolError> {
        self.transact(|p| pause_components(&p.access, &mut p.vault, &mut p.staking, caller, now))
    }

    /// Unpause the vault and the reward engine. Fails only if neither is
    /// paused.
    pub fn unpause_all(&mut self, caller: &Address, now: Timestamp) -> Result<(), ProtocolError> {
        self.transact(|p| unpause_components(&p.access, &mut p.vault, &mut p.staking, caller, now))
    }

    fn collect_events(&mut self) {
        self.journal.extend(self.vault.drain_events());
        self.journal.extend(self.staking.drain_events());
        self.journal.extend(self.queue.drain_events());
    }

    /// Events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<EventRecord> {
        self.collect_events();
        std::mem::take(&mut self.journal)
    }

    // ── Views ─────────────────────────────────────────────────────────────

    pub fn admin(&self) -> &Address {
        self.access.admin()
    }

    pub fn assets(&self) -> &AssetBook {
        &self.assets
    }

    pub fn vault(&self) -> &ValueLedger {
        &self.vault
    }

    pub fn staking(&self) -> &RewardEngine {
        &self.staking
    }

    pub fn queue(&self) -> &RedemptionQueue {
        &self.queue
    }

    /// Balance of `holder` in `asset`, where the vault address stands for
    /// the share token.
    pub fn balance_of(&self, asset: &AssetId, holder: &Address) -> Result<u128, ProtocolError> {
        if asset == self.vault.address() {
            return Ok(self.vault.share_balance(holder));
        }
        Ok(self.assets.balance_of(asset, holder)?)
    }

    pub fn summary(&self) -> Result<ProtocolSummary, ProtocolError> {
        let vault_address = self.vault.address();
        let staking_address = self.staking.address();
        let mut tokens = Vec::new();
        for id in self.assets.ids() {
            let token = self.assets.token(id)?;
            tokens.push(TokenSummary {
                id: *id,
                symbol: token.symbol().to_string(),
                decimals: token.decimals(),
                total_supply: token.total_supply(),
                vault_balance: token.balance_of(vault_address),
                staking_balance: token.balance_of(staking_address),
            });
        }
        Ok(ProtocolSummary {
            total_shares: self.vault.total_supply(),
            total_value: self.vault.total_value(&self.assets)?,
            exchange_rate: self.vault.exchange_rate(),
            assets_under_management: self.vault.assets_under_management(),
            shares_in_custody: self.vault.shares_in_custody(),
            supported_assets: self.vault.supported_assets().to_vec(),
            vault_paused: self.vault.is_paused(),
            staking_paused: self.staking.is_paused(),
            total_staked_shares: self.staking.total_staked_tier1(),
            total_staked_governance: self.staking.total_staked_tier2(),
            stakers: self.staking.staker_count(),
            governance_liquidity: self.staking.governance_liquidity(&self.assets)?,
            penalties: self.staking.penalties(),
            queue: self.queue.queue_status(),
            tokens,
        })
    }
}

fn pause_components(
    access: &AccessControl,
    vault: &mut ValueLedger,
    staking: &mut RewardEngine,
    caller: &Address,
    now: Timestamp,
) -> Result<(), ProtocolError> {
    access.ensure_admin(caller)?;
    if vault.is_paused() && staking.is_paused() {
        return Err(AccessError::Paused.into());
    }
    if !vault.is_paused() {
        vault.pause(caller, now)?;
    }
    if !staking.is_paused() {
        staking.pause(caller, now)?;
    }
    Ok(())
}

fn unpause_components(
    access: &AccessControl,
    vault: &mut ValueLedger,
    staking: &mut RewardEngine,
    caller: &Address,
    now: Timestamp,
) -> Result<(), ProtocolError> {
    access.ensure_admin(caller)?;
    if !vault.is_paused() && !staking.is_paused() {
        return Err(AccessError::NotPaused.into());
    }
    if vault.is_paused() {
        vault.unpause(caller, now)?;
    }
    if staking.is_paused() {
        staking.unpause(caller, now)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sova_types::ProtocolEvent;

    fn deploy() -> Protocol {
        Protocol::from_config(&ProtocolConfig::default(), Timestamp::new(0)).unwrap()
    }

    fn label(s: &str) -> Address {
        Address::from_label(s)
    }

    #[test]
    fn deployment_credits_genesis_and_authorizes_processors() {
        let protocol = deploy();
        let wbtc = label("wbtc");
        assert_eq!(protocol.assets().balance_of(&wbtc, &label("alice")).unwrap(), 10 * 100_000_000);
        assert!(protocol.queue().is_processor(protocol.vault().address()));
        assert!(protocol.queue().is_processor(protocol.staking().address()));
        assert!(protocol.vault().is_supported(&label("steth")));
        assert_eq!(protocol.admin(), &label("admin"));
    }

    #[test]
    fn failed_action_restores_every_component() {
        let mut p = deploy();
        let alice = label("alice");
        let before = p.summary().unwrap();
        let err = p
            .execute(
                &alice,
                Timestamp::new(1),
                Action::Deposit {
                    asset: label("wbtc"),
                    amount: 1_000 * 100_000_000,
                    receiver: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, ProtocolError::Vault(_)));
        assert_eq!(p.summary().unwrap(), before);
        assert!(p.drain_events().iter().all(|r| r.at == Timestamp::new(0)));
    }

    #[test]
    fn transact_rolls_back_multi_step_closures() {
        let mut p = deploy();
        let admin = label("admin");
        let carol = label("carol");
        let wbtc = label("wbtc");
        let result: Result<(), ProtocolError> = p.transact(|p| {
            p.execute(
                &admin,
                Timestamp::new(1),
                Action::BridgeCredit {
                    asset: wbtc,
                    to: carol,
                    amount: 5,
                },
            )?;
            Err(ProtocolError::Overflow)
        });
        assert_eq!(result, Err(ProtocolError::Overflow));
        assert_eq!(p.balance_of(&wbtc, &carol).unwrap(), 10 * 100_000_000);
    }

    #[test]
    fn bridge_credit_is_admin_only() {
        let mut p = deploy();
        let action = Action::BridgeCredit {
            asset: label("ybtc"),
            to: label("alice"),
            amount: 1,
        };
        assert!(matches!(
            p.execute(&label("alice"), Timestamp::new(1), action.clone()),
            Err(ProtocolError::Access(AccessError::NotAdmin(_)))
        ));
        assert_eq!(p.execute(&label("admin"), Timestamp::new(1), action), Ok(Outcome::Done));
    }

    #[test]
    fn pause_all_covers_both_components() {
        let mut p = deploy();
        let admin = label("admin");
        p.pause_all(&admin, Timestamp::new(1)).unwrap();
        assert!(p.vault().is_paused());
        assert!(p.staking().is_paused());
        assert_eq!(
            p.pause_all(&admin, Timestamp::new(2)),
            Err(ProtocolError::Access(AccessError::Paused))
        );
        p.unpause_all(&admin, Timestamp::new(3)).unwrap();
        assert!(!p.vault().is_paused());
        assert!(!p.staking().is_paused());
    }

    #[test]
    fn rollback_keeps_committed_events_and_drops_the_rest() {
        let mut p = deploy();
        let alice = label("alice");
        let wbtc = label("wbtc");
        let deposit = || Action::Deposit {
            asset: wbtc,
            amount: 100_000_000,
            receiver: None,
        };
        p.drain_events();
        p.execute(
            &alice,
            Timestamp::new(1),
            Action::Approve {
                asset: wbtc,
                spender: label("vault"),
                amount: u128::MAX,
            },
        )
        .unwrap();
        p.execute(&alice, Timestamp::new(1), deposit()).unwrap();

        let result: Result<(), ProtocolError> = p.transact(|p| {
            p.execute(&alice, Timestamp::new(2), deposit())?;
            Err(ProtocolError::Overflow)
        });
        assert_eq!(result, Err(ProtocolError::Overflow));

        let deposits: Vec<_> = p
            .drain_events()
            .into_iter()
            .filter(|r| matches!(r.event, ProtocolEvent::Deposit { .. }))
            .collect();
        assert_eq!(deposits.len(), 1);
        assert_eq!(deposits[0].at, Timestamp::new(1));
        assert!(p.drain_events().is_empty());
    }

    #[test]
    fn admin_moves_everywhere_at_once() {
        let mut p = deploy();
        let next = label("next-admin");
        let transfer = |to| Action::TransferAdmin { new_admin: to };

        assert!(matches!(
            p.execute(&label("admin"), Timestamp::new(1), transfer(Address::ZERO)),
            Err(ProtocolError::Access(AccessError::NullAdmin))
                | Err(ProtocolError::Vault(_))
        ));
        assert_eq!(p.admin(), &label("admin"));

        p.execute(&label("admin"), Timestamp::new(2), transfer(next)).unwrap();
        assert_eq!(p.admin(), &next);
        assert_eq!(p.vault().admin(), &next);
        assert_eq!(p.staking().admin(), &next);
        assert_eq!(p.queue().admin(), &next);
        assert!(p.pause_all(&label("admin"), Timestamp::new(3)).is_err());
        p.pause_all(&next, Timestamp::new(3)).unwrap();
    }

    #[test]
    fn vault_address_routes_to_the_share_token() {
        let mut p = deploy();
        let alice = label("alice");
        let bob = label("bob");
        let vault = *p.vault().address();
        p.execute(
            &alice,
            Timestamp::new(1),
            Action::Approve {
                asset: label("wbtc"),
                spender: vault,
                amount: 100_000_000,
            },
        )
        .unwrap();
        p.execute(
            &alice,
            Timestamp::new(1),
            Action::Deposit {
                asset: label("wbtc"),
                amount: 100_000_000,
                receiver: None,
            },
        )
        .unwrap();
        p.execute(
            &alice,
            Timestamp::new(2),
            Action::Transfer {
                asset: vault,
                to: bob,
                amount: 40_000_000,
            },
        )
        .unwrap();
        assert_eq!(p.balance_of(&vault, &alice).unwrap(), 60_000_000);
        assert_eq!(p.balance_of(&vault, &bob).unwrap(), 40_000_000);
    }
}
