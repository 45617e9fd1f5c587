//! Catch candidates and the records granted to players.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Rarity;
use crate::CatchId;

/// Modifier applied to a catch during special weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mutation {
    Blossom,
}

/// The species outcome resolved for the current attempt. Derived, never
/// persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchCandidate {
    pub species_id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Rolled between the species' min and max weight, two decimals
    pub weight: f64,
    pub power_requirement: u32,
    pub durability_loss: u32,
    /// Value before any mutation bonus
    pub base_value: f64,
    /// Value after the mutation bonus, equal to `base_value` without one
    pub value: f64,
    pub mutation: Option<Mutation>,
}

impl CatchCandidate {
    pub fn is_mutated(&self) -> bool {
        self.mutation.is_some()
    }
}

/// A caught fish as stored in the player's catch inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchRecord {
    pub id: CatchId,
    pub species_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub weight: f64,
    pub base_value: f64,
    pub value: f64,
    #[serde(default)]
    pub mutation: Option<Mutation>,
    pub caught_at: DateTime<Utc>,
}

impl CatchRecord {
    pub fn from_candidate(
        id: CatchId,
        candidate: &CatchCandidate,
        caught_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            species_id: candidate.species_id.clone(),
            name: candidate.name.clone(),
            rarity: candidate.rarity,
            weight: candidate.weight,
            base_value: candidate.base_value,
            value: candidate.value,
            mutation: candidate.mutation,
            caught_at,
        }
    }
}
