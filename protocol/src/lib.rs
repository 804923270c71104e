//! Protocol host for the Sova vault engine.
//!
//! Deploys the three components from a [`ProtocolConfig`], wires them
//! together and runs every operation as one atomic [`Action`]:
//!
//! - [`Protocol::execute`]: validate, dispatch, roll back on failure.
//! - [`Protocol::drain_events`]: the audit trail of committed actions.
//! - [`Protocol::to_snapshot_bytes`] / [`Protocol::from_snapshot_bytes`]:
//!   checksummed state snapshots.

pub mod action;
pub mod config;
pub mod error;
pub mod protocol;
pub mod snapshot;

pub use action::{Action, Outcome};
pub use config::{AssetConfig, GenesisBalance, LockPeriodConfig, ProtocolConfig, RewardsConfig};
pub use error::ProtocolError;
pub use protocol::{Protocol, ProtocolSummary, TokenSummary};
pub use snapshot::SNAPSHOT_VERSION;
