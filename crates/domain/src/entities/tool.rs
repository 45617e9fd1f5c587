//! Equipped tool snapshot.

use serde::{Deserialize, Serialize};

/// Snapshot of the equipped fishing rod, taken when a session begins.
///
/// The engine mutates its local copy as loss accrues; the ledger is only
/// updated at resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSnapshot {
    /// Ledger instance id used when degrading or breaking the tool
    pub item_id: String,
    /// Catalog id shown to players, e.g. `fishing_rod_tier1`
    pub display_id: String,
    pub tier: u8,
    pub power: u32,
    /// Remaining durability
    pub durability: u32,
}

impl ToolSnapshot {
    pub fn is_usable(&self) -> bool {
        self.durability > 0
    }

    /// Whether `loss` is enough to destroy the tool.
    pub fn breaks_under(&self, loss: u32) -> bool {
        loss >= self.durability
    }
}
