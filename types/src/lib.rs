//! Fundamental types for the Sova vault engine.
//!
//! This crate defines the vocabulary shared by every other crate in the
//! workspace: addresses, timestamps, fixed-point helpers, request ids,
//! redemption states, events, access control and the fungible-asset seam.

pub mod access;
pub mod address;
pub mod amount;
pub mod asset;
pub mod error;
pub mod event;
pub mod hash;
pub mod redemption;
pub mod time;

pub use access::{AccessControl, PauseSwitch};
pub use address::{Address, AddressParseError, AssetId};
pub use asset::FungibleAsset;
pub use error::{AccessError, AssetError};
pub use event::{EventLog, EventRecord, ProtocolEvent, StakeTier};
pub use hash::{blake2b_256_multi, RequestId};
pub use redemption::{RedemptionKind, RedemptionStatus};
pub use time::{Clock, SystemClock, Timestamp};
