//! The value ledger.

use crate::custody::{CustodyEntry, ShareCustody};
use crate::error::VaultError;
use crate::supported::SupportedAssetSet;
use serde::{Deserialize, Serialize};
use sova_assets::{AssetBook, TokenLedger};
use sova_queue::{QueueError, RedemptionQueue};
use sova_types::amount::{
    denormalize, mul_div, mul_div_up, normalize, normalize_up, MAX_DECIMALS, RATE_PRECISION,
    SHARE_DECIMALS,
};
use sova_types::{
    AccessControl, Address, AssetError, AssetId, EventLog, EventRecord, FungibleAsset,
    PauseSwitch, ProtocolEvent, RedemptionKind, RedemptionStatus, RequestId, Timestamp,
};
use sova_utils::ReentrancyGuard;

/// Symbol of the share token.
pub const SHARE_SYMBOL: &str = "vSOVA";

/// Multi-asset vault accounting.
///
/// Deposits of any supported asset are normalized to 8 decimals and priced
/// against the vault's total value (every supported asset it holds plus the
/// externally reported assets under management). Shares are a token ledger
/// embedded here; only this type mints or burns them.
///
/// Reward-asset redemptions use a separate spot exchange rate recomputed on
/// every [`add_yield`](Self::add_yield). The rate is not recomputed on
/// redemption, so redemption order between two yield deposits affects
/// individual payouts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValueLedger {
    address: Address,
    access: AccessControl,
    pause: PauseSwitch,
    primary_asset: AssetId,
    reward_asset: AssetId,
    supported: SupportedAssetSet,
    shares: TokenLedger,
    /// Reward-asset units per share, scaled by 1e18.
    exchange_rate: u128,
    assets_under_management: u128,
    custody: ShareCustody,
    #[serde(default)]
    guard: ReentrancyGuard,
    events: EventLog,
}

impl ValueLedger {
    /// Deploy a vault at `address`. The primary asset is supported from the
    /// start and can never be removed.
    pub fn new(
        address: Address,
        admin: Address,
        primary_asset: AssetId,
        reward_asset: AssetId,
        book: &AssetBook,
    ) -> Result<Self, VaultError> {
        if primary_asset == reward_asset {
            return Err(VaultError::RewardAssetNotDepositable);
        }
        checked_decimals(book, &primary_asset)?;
        checked_decimals(book, &reward_asset)?;

        let mut supported = SupportedAssetSet::new();
        supported.insert(primary_asset);
        Ok(Self {
            address,
            access: AccessControl::new(admin)?,
            pause: PauseSwitch::default(),
            primary_asset,
            reward_asset,
            supported,
            shares: TokenLedger::new(SHARE_SYMBOL, SHARE_DECIMALS),
            exchange_rate: RATE_PRECISION,
            assets_under_management: 0,
            custody: ShareCustody::new(),
            guard: ReentrancyGuard::new(),
            events: EventLog::new(),
        })
    }

    fn guarded<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, VaultError>) -> Result<T, VaultError> {
        self.guard.enter()?;
        let result = f(self);
        self.guard.exit();
        result
    }

    // ── Deposits and reward redemption ────────────────────────────────────

    /// Deposit `amount` of `asset` from `caller`, minting shares to `receiver`.
    ///
    /// The vault pulls the tokens with `transfer_from`, so `caller` must have
    /// approved the vault address. Shares are priced before the tokens arrive.
    pub fn deposit(
        &mut self,
        caller: &Address,
        asset: AssetId,
        amount: u128,
        receiver: &Address,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            if !v.supported.contains(&asset) {
                return Err(VaultError::UnsupportedAsset(asset));
            }
            if amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::NullReceiver);
            }
            if *receiver == v.address {
                return Err(VaultError::SharesToVault);
            }
            let shares = v.preview_deposit(&asset, amount, book)?;
            if shares == 0 {
                return Err(VaultError::ZeroShares);
            }
            v.shares
                .total_supply()
                .checked_add(shares)
                .ok_or(VaultError::Overflow)?;

            let vault = v.address;
            book.transfer_from(&asset, &vault, caller, &vault, amount)?;
            v.shares.mint(receiver, shares)?;

            v.events.emit(
                now,
                ProtocolEvent::Deposit {
                    asset,
                    depositor: *caller,
                    receiver: *receiver,
                    amount,
                    shares,
                },
            );
            tracing::info!(asset = %asset, depositor = %caller, receiver = %receiver, amount, shares, "deposit");
            Ok(shares)
        })
    }

    /// Burn `shares` of `caller` and pay their reward-asset value at the
    /// current exchange rate.
    ///
    /// Fails outright if the vault holds too little reward asset; deposited
    /// assets are never touched.
    pub fn redeem_for_rewards(
        &mut self,
        caller: &Address,
        shares: u128,
        receiver: &Address,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::NullReceiver);
            }
            v.check_share_spend(caller, caller, shares)?;
            let reward = v.preview_redeem_for_rewards(shares)?;
            if reward == 0 {
                return Err(VaultError::ZeroReward);
            }
            let vault = v.address;
            let available = book.balance_of(&v.reward_asset, &vault)?;
            if available < reward {
                return Err(VaultError::InsufficientRewardLiquidity {
                    needed: reward,
                    available,
                });
            }

            v.shares.burn(caller, shares)?;
            book.transfer(&v.reward_asset, &vault, receiver, reward)?;

            v.events.emit(
                now,
                ProtocolEvent::RewardRedeemed {
                    holder: *caller,
                    receiver: *receiver,
                    shares,
                    reward,
                },
            );
            tracing::info!(holder = %caller, receiver = %receiver, shares, reward, "shares redeemed for rewards");
            Ok(reward)
        })
    }

    /// Pull `amount` of the reward asset from the admin and reprice the
    /// exchange rate as `reward balance * 1e18 / total supply`.
    ///
    /// With no shares outstanding the rate is left unchanged.
    pub fn add_yield(
        &mut self,
        caller: &Address,
        amount: u128,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            v.access.ensure_admin(caller)?;
            if amount == 0 {
                return Err(VaultError::ZeroAmount);
            }
            let vault = v.address;
            let held = book
                .balance_of(&v.reward_asset, &vault)?
                .checked_add(amount)
                .ok_or(VaultError::Overflow)?;
            let supply = v.shares.total_supply();
            let rate = if supply > 0 {
                mul_div(held, RATE_PRECISION, supply).ok_or(VaultError::Overflow)?
            } else {
                v.exchange_rate
            };

            book.transfer_from(&v.reward_asset, &vault, caller, &vault, amount)?;
            v.exchange_rate = rate;

            v.events.emit(
                now,
                ProtocolEvent::YieldAdded {
                    amount,
                    exchange_rate: rate,
                },
            );
            tracing::info!(amount, exchange_rate = rate, supply, "yield added");
            Ok(rate)
        })
    }

    // ── Queued redemption (reserve → commit or release) ───────────────────

    /// Move `shares` into vault custody and open a pending queue request for
    /// their primary-asset value.
    pub fn request_queued_redemption(
        &mut self,
        caller: &Address,
        shares: u128,
        queue: &mut RedemptionQueue,
        book: &AssetBook,
        now: Timestamp,
    ) -> Result<RequestId, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            v.check_share_spend(caller, caller, shares)?;
            v.custody
                .total()
                .checked_add(shares)
                .ok_or(VaultError::Overflow)?;
            let estimated = v.preview_redeem(shares, book)?;

            let vault = v.address;
            let id = queue.request_redemption(
                &vault,
                caller,
                RedemptionKind::Shares,
                shares,
                v.primary_asset,
                estimated,
                now,
            )?;
            v.shares.transfer(caller, &vault, shares)?;
            v.custody
                .reserve(
                    id,
                    CustodyEntry {
                        owner: *caller,
                        shares,
                        reserved_at: now,
                    },
                )
                .ok_or(VaultError::Overflow)?;

            tracing::info!(%id, owner = %caller, shares, estimated, "shares moved into custody");
            Ok(id)
        })
    }

    /// Burn the custodied shares of a matured request and pay the owner their
    /// primary-asset value as of now.
    ///
    /// Callable by the request owner or the admin.
    pub fn fulfill_queued_redemption(
        &mut self,
        caller: &Address,
        id: &RequestId,
        queue: &mut RedemptionQueue,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            let entry = v
                .custody
                .get(id)
                .cloned()
                .ok_or(VaultError::UnknownCustody(*id))?;
            v.access.ensure_owner_or_admin(caller, &entry.owner)?;
            let vault = v.address;
            queue.check_fulfillable(&vault, id, now)?;

            let payout = v.preview_redeem(entry.shares, book)?;
            let available = book.balance_of(&v.primary_asset, &vault)?;
            if available < payout {
                return Err(VaultError::InsufficientLiquidity {
                    needed: payout,
                    available,
                });
            }

            queue.fulfill_redemption(&vault, id, payout, now)?;
            v.shares.burn(&vault, entry.shares)?;
            v.custody.take(id);
            book.transfer(&v.primary_asset, &vault, &entry.owner, payout)?;

            v.events.emit(
                now,
                ProtocolEvent::Withdraw {
                    caller: *caller,
                    receiver: entry.owner,
                    owner: entry.owner,
                    assets: payout,
                    shares: entry.shares,
                },
            );
            tracing::info!(%id, owner = %entry.owner, shares = entry.shares, payout, "queued redemption fulfilled");
            Ok(payout)
        })
    }

    /// Return custodied shares to their owner and cancel the request.
    ///
    /// Also recovers shares whose request was already cancelled directly at
    /// the queue. Callable by the request owner or the admin.
    pub fn cancel_queued_redemption(
        &mut self,
        caller: &Address,
        id: &RequestId,
        queue: &mut RedemptionQueue,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            let entry = v
                .custody
                .get(id)
                .cloned()
                .ok_or(VaultError::UnknownCustody(*id))?;
            v.access.ensure_owner_or_admin(caller, &entry.owner)?;
            let vault = v.address;

            let status = queue
                .request(id)
                .map(|r| r.status)
                .ok_or(QueueError::RequestNotFound(*id))?;
            match status {
                RedemptionStatus::Pending => {
                    queue.cancel_redemption(&vault, id, now)?;
                }
                RedemptionStatus::Cancelled => {
                    tracing::debug!(%id, "request already cancelled at the queue, releasing custody");
                }
                RedemptionStatus::Fulfilled => {
                    return Err(QueueError::NotPending { id: *id, status }.into());
                }
            }

            v.shares.transfer(&vault, &entry.owner, entry.shares)?;
            v.custody.take(id);

            tracing::info!(%id, owner = %entry.owner, shares = entry.shares, "custodied shares released");
            Ok(entry.shares)
        })
    }

    // ── Proportional withdraw / redeem of the primary asset ───────────────

    /// Pay exactly `assets` of the primary asset to `receiver`, burning the
    /// shares it costs from `owner` (rounded up).
    pub fn withdraw(
        &mut self,
        caller: &Address,
        assets: u128,
        receiver: &Address,
        owner: &Address,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            if assets == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::NullReceiver);
            }
            let shares = v.preview_withdraw(assets, book)?;
            v.check_share_spend(caller, owner, shares)?;
            v.pay_out(caller, receiver, owner, assets, shares, book, now)?;
            Ok(shares)
        })
    }

    /// Burn `shares` from `owner` and pay their primary-asset value to
    /// `receiver` (rounded down).
    pub fn redeem(
        &mut self,
        caller: &Address,
        shares: u128,
        receiver: &Address,
        owner: &Address,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<u128, VaultError> {
        self.guarded(|v| {
            v.pause.ensure_not_paused()?;
            if shares == 0 {
                return Err(VaultError::ZeroAmount);
            }
            if receiver.is_zero() {
                return Err(VaultError::NullReceiver);
            }
            v.check_share_spend(caller, owner, shares)?;
            let assets = v.preview_redeem(shares, book)?;
            if assets == 0 {
                return Err(VaultError::ZeroAssets);
            }
            v.pay_out(caller, receiver, owner, assets, shares, book, now)?;
            Ok(assets)
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn pay_out(
        &mut self,
        caller: &Address,
        receiver: &Address,
        owner: &Address,
        assets: u128,
        shares: u128,
        book: &mut AssetBook,
        now: Timestamp,
    ) -> Result<(), VaultError> {
        let vault = self.address;
        let available = book.balance_of(&self.primary_asset, &vault)?;
        if available < assets {
            return Err(VaultError::InsufficientLiquidity {
                needed: assets,
                available,
            });
        }
        self.shares.spend_allowance(owner, caller, shares)?;
        self.shares.burn(owner, shares)?;
        book.transfer(&self.primary_asset, &vault, receiver, assets)?;

        self.events.emit(
            now,
            ProtocolEvent::Withdraw {
                caller: *caller,
                receiver: *receiver,
                owner: *owner,
                assets,
                shares,
            },
        );
        tracing::info!(caller = %caller, owner = %owner, receiver = %receiver, assets, shares, "withdraw");
        Ok(())
    }

    fn check_share_spend(&self, caller: &Address, owner: &Address, shares: u128) -> Result<(), VaultError> {
        let available = self.shares.balance_of(owner);
        if available < shares {
            return Err(VaultError::InsufficientShares {
                needed: shares,
                available,
            });
        }
        if caller != owner {
            let allowance = self.shares.allowance(owner, caller);
            if allowance < shares {
                return Err(VaultError::InsufficientShareAllowance {
                    needed: shares,
                    available: allowance,
                });
            }
        }
        Ok(())
    }

    // ── Share token surface ───────────────────────────────────────────────

    /// Move shares between holders. The vault's own address only holds
    /// custodied shares, so it cannot receive them this way.
    pub fn transfer_shares(&mut self, caller: &Address, to: &Address, shares: u128) -> Result<(), VaultError> {
        self.guarded(|v| {
            if *to == v.address {
                return Err(VaultError::SharesToVault);
            }
            Ok(v.shares.transfer(caller, to, shares)?)
        })
    }

    pub fn approve_shares(&mut self, caller: &Address, spender: &Address, shares: u128) -> Result<(), VaultError> {
        self.guarded(|v| Ok(v.shares.approve(caller, spender, shares)?))
    }

    // ── Administration ────────────────────────────────────────────────────

    /// Accept deposits of `asset`. Its decimals are re-read on every use.
    pub fn add_supported_asset(
        &mut self,
        caller: &Address,
        asset: AssetId,
        book: &AssetBook,
        now: Timestamp,
    ) -> Result<(), VaultError> {
        self.guarded(|v| {
            v.access.ensure_admin(caller)?;
            if asset == v.reward_asset {
                return Err(VaultError::RewardAssetNotDepositable);
            }
            checked_decimals(book, &asset)?;
            if !v.supported.insert(asset) {
                return Err(VaultError::AlreadySupported(asset));
            }
            v.events.emit(now, ProtocolEvent::SupportedAssetAdded { asset });
            tracing::info!(asset = %asset, "supported asset added");
            Ok(())
        })
    }

    pub fn remove_supported_asset(&mut self, caller: &Address, asset: &AssetId, now: Timestamp) -> Result<(), VaultError> {
        self.guarded(|v| {
            v.access.ensure_admin(caller)?;
            if *asset == v.primary_asset {
                return Err(VaultError::PrimaryAssetRemoval);
            }
            if !v.supported.remove(asset) {
                return Err(VaultError::UnsupportedAsset(*asset));
            }
            v.events.emit(now, ProtocolEvent::SupportedAssetRemoved { asset: *asset });
            tracing::info!(asset = %asset, "supported asset removed");
            Ok(())
        })
    }

    /// Replace the externally reported value held outside the vault
    /// (8-decimal units).
    pub fn set_assets_under_management(&mut self, caller: &Address, value: u128, now: Timestamp) -> Result<(), VaultError> {
        self.guarded(|v| {
            v.access.ensure_admin(caller)?;
            let previous = v.assets_under_management;
            v.assets_under_management = value;
            v.events.emit(
                now,
                ProtocolEvent::AssetsUnderManagementUpdated {
                    previous,
                    current: value,
                },
            );
            tracing::info!(previous, current = value, "assets under management updated");
            Ok(())
        })
    }

    pub fn pause(&mut self, caller: &Address, now: Timestamp) -> Result<(), VaultError> {
        self.guarded(|v| {
            v.access.ensure_admin(caller)?;
            v.pause.pause()?;
            v.events.emit(now, ProtocolEvent::Paused { by: *caller });
            tracing::warn!(by = %caller, "vault paused");
            Ok(())
        })
    }

    pub fn unpause(&mut self, caller: &Address, now: Timestamp) -> Result<(), VaultError> {
        self.guarded(|v| {
            v.access.ensure_admin(caller)?;
            v.pause.unpause()?;
            v.events.emit(now, ProtocolEvent::Unpaused { by: *caller });
            tracing::info!(by = %caller, "vault unpaused");
            Ok(())
        })
    }

    pub fn transfer_admin(&mut self, caller: &Address, new_admin: Address) -> Result<(), VaultError> {
        self.guarded(|v| Ok(v.access.transfer_admin(caller, new_admin)?))
    }

    // ── Views ─────────────────────────────────────────────────────────────

    /// Sum of every supported asset held, normalized to 8 decimals, plus
    /// assets under management.
    pub fn total_value(&self, book: &AssetBook) -> Result<u128, VaultError> {
        let mut total = self.assets_under_management;
        for asset in self.supported.iter() {
            let decimals = checked_decimals(book, asset)?;
            let held = book.balance_of(asset, &self.address)?;
            let normalized = normalize(held, decimals).ok_or(VaultError::Overflow)?;
            total = total.checked_add(normalized).ok_or(VaultError::Overflow)?;
        }
        tracing::debug!(total, supply = self.shares.total_supply(), "total value computed");
        Ok(total)
    }

    /// Shares worth `value` (8-decimal units), rounded down.
    pub fn convert_to_shares(&self, value: u128, book: &AssetBook) -> Result<u128, VaultError> {
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(value);
        }
        let total = self.total_value(book)?;
        if total == 0 {
            return Err(VaultError::NoValueBacking);
        }
        mul_div(value, supply, total).ok_or(VaultError::Overflow)
    }

    /// Value of `shares` in 8-decimal units, rounded down.
    pub fn convert_to_assets(&self, shares: u128, book: &AssetBook) -> Result<u128, VaultError> {
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(shares);
        }
        let total = self.total_value(book)?;
        mul_div(shares, total, supply).ok_or(VaultError::Overflow)
    }

    /// Shares a deposit of `amount` native units of `asset` would mint now.
    pub fn preview_deposit(&self, asset: &AssetId, amount: u128, book: &AssetBook) -> Result<u128, VaultError> {
        if !self.supported.contains(asset) {
            return Err(VaultError::UnsupportedAsset(*asset));
        }
        let decimals = checked_decimals(book, asset)?;
        let normalized = normalize(amount, decimals).ok_or(VaultError::Overflow)?;
        self.convert_to_shares(normalized, book)
    }

    /// Primary-asset units `shares` redeem for now.
    pub fn preview_redeem(&self, shares: u128, book: &AssetBook) -> Result<u128, VaultError> {
        let decimals = checked_decimals(book, &self.primary_asset)?;
        let value = self.convert_to_assets(shares, book)?;
        denormalize(value, decimals).ok_or(VaultError::Overflow)
    }

    /// Shares burned to withdraw exactly `assets` primary-asset units.
    pub fn preview_withdraw(&self, assets: u128, book: &AssetBook) -> Result<u128, VaultError> {
        let decimals = checked_decimals(book, &self.primary_asset)?;
        let value = normalize_up(assets, decimals).ok_or(VaultError::Overflow)?;
        let supply = self.shares.total_supply();
        if supply == 0 {
            return Ok(value);
        }
        let total = self.total_value(book)?;
        if total == 0 {
            return Err(VaultError::NoValueBacking);
        }
        mul_div_up(value, supply, total).ok_or(VaultError::Overflow)
    }

    /// Reward-asset units `shares` redeem for at the current rate.
    pub fn preview_redeem_for_rewards(&self, shares: u128) -> Result<u128, VaultError> {
        mul_div(shares, self.exchange_rate, RATE_PRECISION).ok_or(VaultError::Overflow)
    }

    pub fn exchange_rate(&self) -> u128 {
        self.exchange_rate
    }

    pub fn assets_under_management(&self) -> u128 {
        self.assets_under_management
    }

    pub fn supported_assets(&self) -> &[AssetId] {
        self.supported.as_slice()
    }

    pub fn is_supported(&self, asset: &AssetId) -> bool {
        self.supported.contains(asset)
    }

    pub fn custody(&self, id: &RequestId) -> Option<&CustodyEntry> {
        self.custody.get(id)
    }

    /// Shares currently held for pending redemptions.
    pub fn shares_in_custody(&self) -> u128 {
        self.custody.total()
    }

    pub fn total_supply(&self) -> u128 {
        self.shares.total_supply()
    }

    pub fn share_balance(&self, holder: &Address) -> u128 {
        self.shares.balance_of(holder)
    }

    /// The share token, read-only.
    pub fn share_token(&self) -> &TokenLedger {
        &self.shares
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn admin(&self) -> &Address {
        self.access.admin()
    }

    pub fn primary_asset(&self) -> &AssetId {
        &self.primary_asset
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

/// The vault's shares, for components that pull them like any token.
impl FungibleAsset for ValueLedger {
    fn decimals(&self) -> u8 {
        SHARE_DECIMALS
    }

    fn balance_of(&self, holder: &Address) -> u128 {
        self.shares.balance_of(holder)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> u128 {
        self.shares.allowance(owner, spender)
    }

    fn approve(&mut self, owner: &Address, spender: &Address, amount: u128) -> Result<(), AssetError> {
        self.shares.approve(owner, spender, amount)
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: u128) -> Result<(), AssetError> {
        self.ensure_outside_custody(to)?;
        self.shares.transfer(from, to, amount)
    }

    fn transfer_from(
        &mut self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), AssetError> {
        self.ensure_outside_custody(to)?;
        self.shares.transfer_from(spender, from, to, amount)
    }
}

impl ValueLedger {
    fn ensure_outside_custody(&self, to: &Address) -> Result<(), AssetError> {
        if *to == self.address {
            return Err(AssetError::Rejected(format!("shares cannot be sent to the vault {to}")));
        }
        Ok(())
    }
}

fn checked_decimals(book: &AssetBook, asset: &AssetId) -> Result<u8, VaultError> {
    let decimals = book.decimals(asset)?;
    if decimals > MAX_DECIMALS {
        return Err(VaultError::UnsupportedDecimals {
            asset: *asset,
            decimals,
        });
    }
    Ok(decimals)
}
