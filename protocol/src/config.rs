//! Deployment configuration with TOML file support.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use sova_queue::QueueConfig;
use sova_staking::{LockPeriod, LockTable, RewardParams};
use sova_types::amount::{BPS_DENOMINATOR, MAX_DECIMALS};
use sova_types::{Address, AssetId};
use sova_utils::LogFormat;
use std::collections::BTreeSet;
use std::path::Path;

/// Everything needed to deploy a protocol instance.
///
/// Addresses accept either a `0x` hex address or a plain label such as
/// `"alice"`, which is hashed into an address. Can be loaded from a TOML file
/// via [`ProtocolConfig::from_toml_file`] or built programmatically.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Admin of all three components.
    #[serde(default = "default_admin")]
    pub admin: Address,

    #[serde(default = "default_vault_address")]
    pub vault_address: Address,

    #[serde(default = "default_staking_address")]
    pub staking_address: Address,

    #[serde(default = "default_queue_address")]
    pub queue_address: Address,

    /// Asset paid out by queued share redemptions, always depositable.
    #[serde(default = "default_primary_asset")]
    pub primary_asset: AssetId,

    /// Yield-bearing reward asset.
    #[serde(default = "default_reward_asset")]
    pub reward_asset: AssetId,

    /// Governance token staked in tier 2 and paid as the tier-1 reward.
    #[serde(default = "default_governance_asset")]
    pub governance_asset: AssetId,

    /// Additional deposit assets besides the primary one.
    #[serde(default = "default_supported_assets")]
    pub supported_assets: Vec<AssetId>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub queue: QueueConfig,

    #[serde(default)]
    pub rewards: RewardsConfig,

    #[serde(default = "default_assets")]
    pub assets: Vec<AssetConfig>,

    #[serde(default = "default_lock_periods")]
    pub lock_periods: Vec<LockPeriodConfig>,
}

/// `[rewards]` section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardsConfig {
    /// Annual tier-1 reward rate in basis points of the staked amount.
    #[serde(default = "default_rate")]
    pub rate_a: u64,

    #[serde(default = "default_rate")]
    pub rate_b: u64,

    #[serde(default = "default_dual_bonus_bps")]
    pub dual_bonus_bps: u64,

    #[serde(default = "default_emergency_penalty_bps")]
    pub emergency_penalty_bps: u64,
}

/// One `[[lock_periods]]` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockPeriodConfig {
    pub duration_secs: u64,
    pub multiplier_bps: u64,
}

/// One `[[assets]]` entry: a token created at deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    pub id: AssetId,
    pub symbol: String,
    pub decimals: u8,
    #[serde(default)]
    pub genesis: Vec<GenesisBalance>,
}

/// Initial balance credited at deployment, in whole tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisBalance {
    pub holder: Address,
    pub whole_units: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn label(s: &str) -> Address {
    Address::from_label(s)
}

fn default_admin() -> Address {
    label("admin")
}

fn default_vault_address() -> Address {
    label("vault")
}

fn default_staking_address() -> Address {
    label("staking")
}

fn default_queue_address() -> Address {
    label("queue")
}

fn default_primary_asset() -> AssetId {
    label("wbtc")
}

fn default_reward_asset() -> AssetId {
    label("ybtc")
}

fn default_governance_asset() -> AssetId {
    label("sova")
}

fn default_supported_assets() -> Vec<AssetId> {
    vec![label("steth"), label("usdc")]
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rate() -> u64 {
    10_000
}

fn default_dual_bonus_bps() -> u64 {
    2_500
}

fn default_emergency_penalty_bps() -> u64 {
    1_000
}

fn genesis(holders: &[(&str, u64)]) -> Vec<GenesisBalance> {
    holders
        .iter()
        .map(|&(holder, whole_units)| GenesisBalance {
            holder: label(holder),
            whole_units,
        })
        .collect()
}

fn default_assets() -> Vec<AssetConfig> {
    vec![
        AssetConfig {
            id: label("wbtc"),
            symbol: "WBTC".into(),
            decimals: 8,
            genesis: genesis(&[("alice", 10), ("bob", 10), ("carol", 10)]),
        },
        AssetConfig {
            id: label("steth"),
            symbol: "STETH".into(),
            decimals: 18,
            genesis: genesis(&[("alice", 10), ("bob", 10)]),
        },
        AssetConfig {
            id: label("usdc"),
            symbol: "USDC".into(),
            decimals: 6,
            genesis: genesis(&[("alice", 100_000), ("carol", 100_000)]),
        },
        AssetConfig {
            id: label("ybtc"),
            symbol: "YBTC".into(),
            decimals: 8,
            genesis: genesis(&[("admin", 100), ("staking", 100)]),
        },
        AssetConfig {
            id: label("sova"),
            symbol: "SOVA".into(),
            decimals: 18,
            genesis: genesis(&[("alice", 1_000), ("bob", 1_000), ("staking", 1_000_000)]),
        },
    ]
}

fn default_lock_periods() -> Vec<LockPeriodConfig> {
    LockTable::standard_periods()
        .into_iter()
        .map(|p| LockPeriodConfig {
            duration_secs: p.duration_secs,
            multiplier_bps: p.multiplier_bps as u64,
        })
        .collect()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ProtocolConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ProtocolError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ProtocolError> {
        toml::from_str(s).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ProtocolError> {
        toml::to_string_pretty(self).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    pub fn asset(&self, id: &AssetId) -> Option<&AssetConfig> {
        self.assets.iter().find(|a| a.id == *id)
    }

    pub fn reward_params(&self) -> RewardParams {
        RewardParams {
            rate_a: u128::from(self.rewards.rate_a),
            rate_b: u128::from(self.rewards.rate_b),
            dual_bonus_bps: u128::from(self.rewards.dual_bonus_bps),
            emergency_penalty_bps: u128::from(self.rewards.emergency_penalty_bps),
        }
    }

    pub fn lock_table(&self) -> Result<LockTable, ProtocolError> {
        let periods: Vec<LockPeriod> = self
            .lock_periods
            .iter()
            .map(|p| LockPeriod {
                duration_secs: p.duration_secs,
                multiplier_bps: u128::from(p.multiplier_bps),
            })
            .collect();
        LockTable::from_periods(&periods).map_err(|e| ProtocolError::Config(e.to_string()))
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        let fail = |msg: String| Err(ProtocolError::Config(msg));

        let components = [
            ("admin", self.admin),
            ("vault_address", self.vault_address),
            ("staking_address", self.staking_address),
            ("queue_address", self.queue_address),
        ];
        for (name, address) in components {
            if address.is_zero() {
                return fail(format!("{name} cannot be the null address"));
            }
        }
        let distinct: BTreeSet<_> = components[1..].iter().map(|(_, a)| *a).collect();
        if distinct.len() != 3 {
            return fail("component addresses must be distinct".into());
        }

        if self.queue.window_duration_secs == 0 {
            return fail("queue.window_duration_secs must be greater than zero".into());
        }
        for (name, value) in [
            ("rewards.dual_bonus_bps", self.rewards.dual_bonus_bps),
            ("rewards.emergency_penalty_bps", self.rewards.emergency_penalty_bps),
        ] {
            if u128::from(value) > BPS_DENOMINATOR {
                return fail(format!("{name} of {value} exceeds 10000"));
            }
        }
        self.lock_table()?;
        if !self.lock_periods.iter().any(|p| p.duration_secs == 0) {
            return fail("lock_periods must include a zero-duration entry".into());
        }

        let mut ids = BTreeSet::new();
        for asset in &self.assets {
            if asset.id.is_zero() {
                return fail(format!("asset {} has the null id", asset.symbol));
            }
            if !ids.insert(asset.id) {
                return fail(format!("asset {} is defined twice", asset.symbol));
            }
            if asset.decimals > MAX_DECIMALS {
                return fail(format!(
                    "asset {} has {} decimals (max {MAX_DECIMALS})",
                    asset.symbol, asset.decimals
                ));
            }
        }
        for (name, id) in [
            ("primary_asset", &self.primary_asset),
            ("reward_asset", &self.reward_asset),
            ("governance_asset", &self.governance_asset),
        ] {
            if !ids.contains(id) {
                return fail(format!("{name} {id} is not defined in [[assets]]"));
            }
        }
        if self.primary_asset == self.reward_asset {
            return fail("primary_asset and reward_asset must differ".into());
        }
        for id in &self.supported_assets {
            if !ids.contains(id) {
                return fail(format!("supported asset {id} is not defined in [[assets]]"));
            }
            if *id == self.reward_asset {
                return fail("reward_asset cannot be a deposit asset".into());
            }
        }
        Ok(())
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            admin: default_admin(),
            vault_address: default_vault_address(),
            staking_address: default_staking_address(),
            queue_address: default_queue_address(),
            primary_asset: default_primary_asset(),
            reward_asset: default_reward_asset(),
            governance_asset: default_governance_asset(),
            supported_assets: default_supported_assets(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            queue: QueueConfig::default(),
            rewards: RewardsConfig::default(),
            assets: default_assets(),
            lock_periods: default_lock_periods(),
        }
    }
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            rate_a: default_rate(),
            rate_b: default_rate(),
            dual_bonus_bps: default_dual_bonus_bps(),
            emergency_penalty_bps: default_emergency_penalty_bps(),
        }
    }
}
