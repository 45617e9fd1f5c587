//! Fishing use cases.
//!
//! The stage controller runs live sessions; queries read catch inventories
//! and the catalog.

mod controller;
mod error;
mod queries;
mod settlement;
mod types;

#[cfg(test)]
mod controller_tests;

use std::sync::Arc;

pub use controller::StageController;
pub use error::FishingError;
pub use queries::{FishIndex, FishInventory, FishingQueries, TodayFish, TodayFishEntry};
pub use settlement::ResourceSettlement;
pub use types::{ActionOutcome, FishingPorts, SettlementReceipt, StaleAction};

/// Container for fishing use cases.
pub struct FishingUseCases {
    pub controller: Arc<StageController>,
    pub queries: Arc<FishingQueries>,
}

impl FishingUseCases {
    pub fn new(controller: Arc<StageController>, queries: Arc<FishingQueries>) -> Self {
        Self {
            controller,
            queries,
        }
    }
}
