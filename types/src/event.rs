//! Observable protocol events.
//!
//! Events are the audit record of the engine: each one is appended by the
//! component whose state transition it describes, in the same call, and is
//! never modified afterwards.

use crate::address::{Address, AssetId};
use crate::hash::RequestId;
use crate::redemption::RedemptionKind;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};

/// Staking tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StakeTier {
    /// Vault shares; earns the governance reward.
    Shares,
    /// Governance token; earns the yield reward while tier 1 is staked.
    Governance,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    Deposit {
        asset: AssetId,
        depositor: Address,
        receiver: Address,
        amount: u128,
        shares: u128,
    },
    Withdraw {
        caller: Address,
        receiver: Address,
        owner: Address,
        assets: u128,
        shares: u128,
    },
    RewardRedeemed {
        holder: Address,
        receiver: Address,
        shares: u128,
        reward: u128,
    },
    YieldAdded {
        amount: u128,
        exchange_rate: u128,
    },
    AssetsUnderManagementUpdated {
        previous: u128,
        current: u128,
    },
    SupportedAssetAdded {
        asset: AssetId,
    },
    SupportedAssetRemoved {
        asset: AssetId,
    },
    RedemptionRequested {
        id: RequestId,
        user: Address,
        kind: RedemptionKind,
        amount: u128,
        fulfillable_at: Timestamp,
    },
    RedemptionFulfilled {
        id: RequestId,
        user: Address,
        kind: RedemptionKind,
        amount: u128,
        amount_out: u128,
    },
    RedemptionCancelled {
        id: RequestId,
        user: Address,
        kind: RedemptionKind,
        amount: u128,
    },
    Staked {
        user: Address,
        tier: StakeTier,
        amount: u128,
        lock_end: Timestamp,
    },
    Unstaked {
        user: Address,
        tier: StakeTier,
        amount: u128,
    },
    RewardsClaimed {
        user: Address,
        governance: u128,
        yield_reward: u128,
    },
    RewardsCompounded {
        user: Address,
        amount: u128,
    },
    EmergencyUnstaked {
        user: Address,
        shares_returned: u128,
        governance_returned: u128,
        shares_penalty: u128,
        governance_penalty: u128,
    },
    Paused {
        by: Address,
    },
    Unpaused {
        by: Address,
    },
}

/// An event stamped with the time of the call that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub at: Timestamp,
    pub event: ProtocolEvent,
}

/// Append-only event journal owned by a component.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, at: Timestamp, event: ProtocolEvent) {
        self.records.push(EventRecord { at, event });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand all records to the caller, leaving the log empty.
    pub fn drain(&mut self) -> Vec<EventRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn last(&self) -> Option<&ProtocolEvent> {
        self.records.last().map(|r| &r.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_log() {
        let mut log = EventLog::new();
        log.emit(
            Timestamp::new(7),
            ProtocolEvent::YieldAdded {
                amount: 1,
                exchange_rate: 2,
            },
        );
        assert_eq!(log.len(), 1);
        let drained = log.drain();
        assert_eq!(drained[0].at, Timestamp::new(7));
        assert!(log.is_empty());
    }
}
