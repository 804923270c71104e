//! Redemption request kinds and lifecycle states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What a queued redemption converts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionKind {
    /// Custodied vault shares redeemed for the primary asset.
    Shares,
    /// Accrued yield rewards paid in the reward asset.
    Rewards,
}

impl RedemptionKind {
    /// Stable tag byte used when deriving request ids.
    pub fn tag(&self) -> u8 {
        match self {
            Self::Shares => 0,
            Self::Rewards => 1,
        }
    }
}

/// Lifecycle of a redemption request.
///
/// `Pending` is the only non-terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedemptionStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RedemptionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RedemptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}
