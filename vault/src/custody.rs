//! Shares held by the vault on behalf of pending queued redemptions.

use serde::{Deserialize, Serialize};
use sova_types::{Address, RequestId, Timestamp};
use std::collections::BTreeMap;

/// Shares reserved for one queued redemption.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustodyEntry {
    pub owner: Address,
    pub shares: u128,
    pub reserved_at: Timestamp,
}

/// Custody table keyed by request id.
///
/// An entry exists from reservation until the shares are either burned
/// (commit) or handed back (release). `total` always equals the sum of the
/// entries, which in turn equals the vault's own share balance.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShareCustody {
    entries: BTreeMap<RequestId, CustodyEntry>,
    total: u128,
}

impl ShareCustody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reservation. `None` if the id is taken or the total overflows.
    pub fn reserve(&mut self, id: RequestId, entry: CustodyEntry) -> Option<()> {
        if self.entries.contains_key(&id) {
            return None;
        }
        self.total = self.total.checked_add(entry.shares)?;
        self.entries.insert(id, entry);
        Some(())
    }

    pub fn get(&self, id: &RequestId) -> Option<&CustodyEntry> {
        self.entries.get(id)
    }

    /// Remove an entry once its shares have been burned or returned.
    pub fn take(&mut self, id: &RequestId) -> Option<CustodyEntry> {
        let entry = self.entries.remove(id)?;
        self.total -= entry.shares;
        Some(entry)
    }

    pub fn total(&self) -> u128 {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &CustodyEntry)> {
        self.entries.iter()
    }
}
