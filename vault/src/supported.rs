//! The set of assets accepted for deposit.

use serde::{Deserialize, Serialize};
use sova_types::AssetId;
use std::collections::HashMap;

/// Membership map plus an enumerable list.
///
/// Removal swaps the last element into the vacated slot, so both insert and
/// remove are O(1) and enumeration order is insertion order until the first
/// removal.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(from = "Vec<AssetId>", into = "Vec<AssetId>")]
pub struct SupportedAssetSet {
    index: HashMap<AssetId, usize>,
    list: Vec<AssetId>,
}

impl SupportedAssetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the asset was already present.
    pub fn insert(&mut self, asset: AssetId) -> bool {
        if self.index.contains_key(&asset) {
            return false;
        }
        self.index.insert(asset, self.list.len());
        self.list.push(asset);
        true
    }

    /// Returns `false` if the asset was not present.
    pub fn remove(&mut self, asset: &AssetId) -> bool {
        let Some(slot) = self.index.remove(asset) else {
            return false;
        };
        self.list.swap_remove(slot);
        if let Some(moved) = self.list.get(slot) {
            self.index.insert(*moved, slot);
        }
        true
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.index.contains_key(asset)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetId> {
        self.list.iter()
    }

    pub fn as_slice(&self) -> &[AssetId] {
        &self.list
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl From<Vec<AssetId>> for SupportedAssetSet {
    fn from(list: Vec<AssetId>) -> Self {
        let mut set = Self::new();
        for asset in list {
            set.insert(asset);
        }
        set
    }
}

impl From<SupportedAssetSet> for Vec<AssetId> {
    fn from(set: SupportedAssetSet) -> Self {
        set.list
    }
}
