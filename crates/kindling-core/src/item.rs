use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier of an item in the upstream catalog.
///
/// Upstream assigns these; we never interpret them beyond equality, display,
/// and cache-key construction. A ranked id list may contain duplicates, in
/// which case each occurrence is an independent fetch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    /// Creates an `ItemId` from its raw numeric form.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw numeric form.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
