//! Player inventory as reported by the ledger.

use serde::{Deserialize, Serialize};

use super::{CatchRecord, ToolSnapshot};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerInventory {
    pub tool: Option<ToolSnapshot>,
    /// Units of the consumable (bait)
    pub consumables: u32,
    pub catches: Vec<CatchRecord>,
}
