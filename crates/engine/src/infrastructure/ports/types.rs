//! Data carried across port boundaries.

use serde::{Deserialize, Serialize};

use castline_domain::{CatchRecord, PlayerId, RealmDiscoveryLog, RealmId};

/// Result of applying durability loss to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolWear {
    pub broken: bool,
    /// Durability left after the loss (zero when broken)
    pub remaining: u32,
}

/// One player's catch inventory within a realm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCatches {
    pub player_id: PlayerId,
    pub realm_id: RealmId,
    pub catches: Vec<CatchRecord>,
}

/// Everything flushed to durable storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FishingSnapshot {
    pub inventories: Vec<PlayerCatches>,
    pub discoveries: Vec<RealmDiscoveryLog>,
}

impl FishingSnapshot {
    pub fn catch_count(&self) -> usize {
        self.inventories.iter().map(|p| p.catches.len()).sum()
    }
}
