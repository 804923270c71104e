//! Redemption request records.

use serde::{Deserialize, Serialize};
use sova_types::{Address, AssetId, RedemptionKind, RedemptionStatus, RequestId, Timestamp};

/// One deferred redemption.
///
/// Created `Pending`; changed exactly once, to `Fulfilled` or `Cancelled`;
/// never deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    pub id: RequestId,
    pub user: Address,
    pub kind: RedemptionKind,
    /// Shares (for `Shares`) or reward units (for `Rewards`) reserved.
    pub amount: u128,
    pub requested_at: Timestamp,
    /// Earliest time at which the request may be fulfilled.
    pub fulfillable_at: Timestamp,
    pub status: RedemptionStatus,
    pub target_asset: AssetId,
    /// Output the processor expected when the request was opened.
    pub estimated_out: u128,
    /// Output actually paid, recorded on fulfillment.
    pub actual_out: Option<u128>,
    /// When the request left `Pending`.
    pub closed_at: Option<Timestamp>,
    /// The component that reserved the funds and must move them.
    pub processor: Address,
    /// Queue-wide creation counter.
    pub nonce: u64,
}

impl RedemptionRequest {
    pub fn is_pending(&self) -> bool {
        self.status == RedemptionStatus::Pending
    }

    pub fn is_fulfillable(&self, now: Timestamp) -> bool {
        self.is_pending() && now >= self.fulfillable_at
    }
}
