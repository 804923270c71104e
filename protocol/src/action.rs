//! Transactions accepted by the host and their results.
//!
//! An [`Action`] names one public operation of a component (or a token
//! movement). The caller and the time are supplied separately to
//! [`Protocol::execute`](crate::Protocol::execute). Actions serialize as
//! externally tagged snake_case objects so scripts stay readable:
//!
//! ```json
//! { "deposit": { "asset": "wbtc", "amount": 100000000 } }
//! "claim_rewards"
//! ```

use serde::{Deserialize, Serialize};
use sova_queue::QueueConfig;
use sova_staking::{PenaltyPool, RewardParams, Rewards};
use sova_types::{Address, AssetId, RequestId, Timestamp};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // ── Tokens ────────────────────────────────────────────────────────────
    /// Approve `spender`. Using the vault address as `asset` targets shares.
    Approve {
        asset: AssetId,
        spender: Address,
        amount: u128,
    },
    /// Transfer from the caller. Using the vault address as `asset` moves
    /// shares.
    Transfer {
        asset: AssetId,
        to: Address,
        amount: u128,
    },
    /// Credit units that arrived from another network. Admin only.
    BridgeCredit {
        asset: AssetId,
        to: Address,
        amount: u128,
    },

    // ── Vault ─────────────────────────────────────────────────────────────
    Deposit {
        asset: AssetId,
        amount: u128,
        #[serde(default)]
        receiver: Option<Address>,
    },
    RedeemForRewards {
        shares: u128,
        #[serde(default)]
        receiver: Option<Address>,
    },
    AddYield {
        amount: u128,
    },
    RequestQueuedRedemption {
        shares: u128,
    },
    FulfillQueuedRedemption {
        id: RequestId,
    },
    CancelQueuedRedemption {
        id: RequestId,
    },
    Withdraw {
        assets: u128,
        #[serde(default)]
        receiver: Option<Address>,
        #[serde(default)]
        owner: Option<Address>,
    },
    Redeem {
        shares: u128,
        #[serde(default)]
        receiver: Option<Address>,
        #[serde(default)]
        owner: Option<Address>,
    },
    AddSupportedAsset {
        asset: AssetId,
    },
    RemoveSupportedAsset {
        asset: AssetId,
    },
    SetAssetsUnderManagement {
        value: u128,
    },

    // ── Staking ───────────────────────────────────────────────────────────
    StakeShares {
        amount: u128,
        #[serde(default)]
        lock_period_secs: u64,
    },
    StakeGovernance {
        amount: u128,
        #[serde(default)]
        lock_period_secs: u64,
    },
    UnstakeShares {
        amount: u128,
    },
    UnstakeGovernance {
        amount: u128,
    },
    ClaimRewards,
    CompoundRewards,
    EmergencyUnstake,
    RequestRewardRedemption {
        amount: u128,
    },
    FulfillRewardRedemption {
        id: RequestId,
    },
    CancelRewardRedemption {
        id: RequestId,
    },
    SweepPenalties {
        to: Address,
    },
    SetRewardParams(RewardParams),
    SetLockMultiplier {
        period_secs: u64,
        multiplier_bps: u128,
    },

    // ── Queue ─────────────────────────────────────────────────────────────
    SetQueueConfig(QueueConfig),
    AddProcessor {
        processor: Address,
    },
    RemoveProcessor {
        processor: Address,
    },
    /// Cancel a request at the queue directly, bypassing the processor that
    /// holds its funds. The processor's release path still recovers them.
    CancelRequest {
        id: RequestId,
    },

    // ── Whole protocol ────────────────────────────────────────────────────
    PauseAll,
    UnpauseAll,
    /// Hand the admin role of the host and all three components to one
    /// new address.
    TransferAdmin {
        new_admin: Address,
    },
}

impl Action {
    /// Stable snake_case name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Action::Approve { .. } => "approve",
            Action::Transfer { .. } => "transfer",
            Action::BridgeCredit { .. } => "bridge_credit",
            Action::Deposit { .. } => "deposit",
            Action::RedeemForRewards { .. } => "redeem_for_rewards",
            Action::AddYield { .. } => "add_yield",
            Action::RequestQueuedRedemption { .. } => "request_queued_redemption",
            Action::FulfillQueuedRedemption { .. } => "fulfill_queued_redemption",
            Action::CancelQueuedRedemption { .. } => "cancel_queued_redemption",
            Action::Withdraw { .. } => "withdraw",
            Action::Redeem { .. } => "redeem",
            Action::AddSupportedAsset { .. } => "add_supported_asset",
            Action::RemoveSupportedAsset { .. } => "remove_supported_asset",
            Action::SetAssetsUnderManagement { .. } => "set_assets_under_management",
            Action::StakeShares { .. } => "stake_shares",
            Action::StakeGovernance { .. } => "stake_governance",
            Action::UnstakeShares { .. } => "unstake_shares",
            Action::UnstakeGovernance { .. } => "unstake_governance",
            Action::ClaimRewards => "claim_rewards",
            Action::CompoundRewards => "compound_rewards",
            Action::EmergencyUnstake => "emergency_unstake",
            Action::RequestRewardRedemption { .. } => "request_reward_redemption",
            Action::FulfillRewardRedemption { .. } => "fulfill_reward_redemption",
            Action::CancelRewardRedemption { .. } => "cancel_reward_redemption",
            Action::SweepPenalties { .. } => "sweep_penalties",
            Action::SetRewardParams(_) => "set_reward_params",
            Action::SetLockMultiplier { .. } => "set_lock_multiplier",
            Action::SetQueueConfig(_) => "set_queue_config",
            Action::AddProcessor { .. } => "add_processor",
            Action::RemoveProcessor { .. } => "remove_processor",
            Action::CancelRequest { .. } => "cancel_request",
            Action::PauseAll => "pause_all",
            Action::UnpauseAll => "unpause_all",
            Action::TransferAdmin { .. } => "transfer_admin",
        }
    }
}

/// What a successful [`Action`] produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Done,
    /// Shares minted, assets paid, reward paid or amount released,
    /// depending on the action.
    Amount(u128),
    Request(RequestId),
    Rewards(Rewards),
    LockEnd(Timestamp),
    Returned { shares: u128, governance: u128 },
    Penalties(PenaltyPool),
    /// Whether a set-membership change took effect.
    Changed(bool),
}
