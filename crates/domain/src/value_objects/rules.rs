//! Tunable fishing rules
//!
//! Durations are stored in milliseconds so the rules can be written in the
//! catalog JSON; accessors hand out `std::time::Duration`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Rarity;
use crate::error::DomainError;

/// Rarity-indexed number of choices shown during the biting game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DifficultyTable([u32; Rarity::COUNT]);

impl DifficultyTable {
    pub fn new(targets: [u32; Rarity::COUNT]) -> Self {
        Self(targets)
    }

    pub fn target_count(&self, rarity: Rarity) -> u32 {
        self.0[rarity.index()].max(1)
    }
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self([2, 3, 4, 5, 5, 6, 6, 7])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishingRules {
    pub min_wait_ms: u64,
    pub max_wait_ms: u64,
    pub shake_decrement_ms: u64,
    pub shake_cooldown_ms: u64,
    pub game_duration_ms: u64,
    pub relocation_interval_ms: u64,
    pub base_catch_chance: f64,
    /// Extra durability loss applied when the biting game times out
    pub fail_penalty: u32,
    pub mutation_chance: f64,
    pub mutation_bonus: f64,
    pub inventory_capacity: usize,
    /// Required progress is the candidate's power requirement times this
    pub progress_per_power: u32,
    /// Ledger resource id of the consumable spent per attempt
    pub bait_id: String,
    pub difficulty: DifficultyTable,
}

impl Default for FishingRules {
    fn default() -> Self {
        Self {
            min_wait_ms: 5_000,
            max_wait_ms: 15_000,
            shake_decrement_ms: 2_000,
            shake_cooldown_ms: 3_000,
            game_duration_ms: 15_000,
            relocation_interval_ms: 1_500,
            base_catch_chance: 0.75,
            fail_penalty: 1,
            mutation_chance: 0.05,
            mutation_bonus: 1.5,
            inventory_capacity: 100,
            progress_per_power: 3,
            bait_id: "worm".to_string(),
            difficulty: DifficultyTable::default(),
        }
    }
}

impl FishingRules {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.min_wait_ms > self.max_wait_ms {
            return Err(DomainError::validation(format!(
                "min_wait_ms ({}) exceeds max_wait_ms ({})",
                self.min_wait_ms, self.max_wait_ms
            )));
        }
        if !(0.0..=1.0).contains(&self.base_catch_chance) {
            return Err(DomainError::validation(
                "base_catch_chance must be within [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_chance) {
            return Err(DomainError::validation(
                "mutation_chance must be within [0, 1]",
            ));
        }
        if !self.mutation_bonus.is_finite() || self.mutation_bonus <= 0.0 {
            return Err(DomainError::validation("mutation_bonus must be positive"));
        }
        if self.game_duration_ms == 0 || self.relocation_interval_ms == 0 {
            return Err(DomainError::validation(
                "game_duration_ms and relocation_interval_ms must be non-zero",
            ));
        }
        if self.inventory_capacity == 0 {
            return Err(DomainError::validation(
                "inventory_capacity must be non-zero",
            ));
        }
        if self.bait_id.trim().is_empty() {
            return Err(DomainError::validation("bait_id cannot be empty"));
        }
        Ok(())
    }

    /// Wait duration for a uniform roll in `[0, 1)`.
    pub fn wait_for_roll(&self, roll: f64) -> Duration {
        let span = self.max_wait_ms.saturating_sub(self.min_wait_ms) as f64;
        let offset = (roll.clamp(0.0, 1.0) * span).round() as u64;
        Duration::from_millis(self.min_wait_ms + offset.min(span as u64))
    }

    pub fn shake_decrement(&self) -> Duration {
        Duration::from_millis(self.shake_decrement_ms)
    }

    pub fn shake_cooldown(&self) -> Duration {
        Duration::from_millis(self.shake_cooldown_ms)
    }

    pub fn game_duration(&self) -> Duration {
        Duration::from_millis(self.game_duration_ms)
    }

    pub fn relocation_interval(&self) -> Duration {
        Duration::from_millis(self.relocation_interval_ms)
    }

    pub fn required_progress(&self, power_requirement: u32) -> u32 {
        power_requirement
            .saturating_mul(self.progress_per_power)
            .max(1)
    }
}
