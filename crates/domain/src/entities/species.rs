//! Species catalog - what can be caught, and how often, per season
//!
//! The catalog is loaded once at startup and shared read-only by every
//! session. Trash items are the non-species outcomes granted when a cast
//! fails the catch-chance roll.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::DomainError;
use crate::value_objects::{FishingRules, Rarity, Season};

/// Per-season selection weight of a species.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonWeights {
    pub spring: f64,
    pub summer: f64,
    pub autumn: f64,
    pub winter: f64,
}

impl SeasonWeights {
    pub fn get(&self, season: Season) -> f64 {
        match season {
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Winter => self.winter,
        }
    }
}

/// A catchable species.
///
/// Data-carrying struct; validated as a whole by [`Catalog::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    /// Stable identifier, also used as prefix of catch ids in listings
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub weights: SeasonWeights,
    pub min_weight: f64,
    pub max_weight: f64,
    /// Durability lost on every wrong choice while this species is biting
    pub durability_loss: u32,
    /// Tool power at or above which the catch succeeds without the mini-game
    pub power_requirement: u32,
    /// Value per unit of weight
    #[serde(default)]
    pub base_value: f64,
    #[serde(default)]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrashItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: Option<String>,
}

/// The full catalog: species, trash, and optional rule overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub species: Vec<Species>,
    #[serde(default)]
    pub trash: Vec<TrashItem>,
    #[serde(default)]
    pub rules: Option<FishingRules>,
}

impl Catalog {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.species.is_empty() {
            return Err(DomainError::catalog("catalog has no species"));
        }

        let mut seen = HashSet::new();
        for species in &self.species {
            if species.id.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "species '{}' has an empty id",
                    species.name
                )));
            }
            if !seen.insert(species.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "duplicate species id '{}'",
                    species.id
                )));
            }
            if !species.min_weight.is_finite()
                || !species.max_weight.is_finite()
                || species.min_weight < 0.0
                || species.min_weight > species.max_weight
            {
                return Err(DomainError::validation(format!(
                    "species '{}' has an invalid weight range [{}, {}]",
                    species.id, species.min_weight, species.max_weight
                )));
            }
            for season in Season::ALL {
                let weight = species.weights.get(season);
                if !weight.is_finite() || weight < 0.0 {
                    return Err(DomainError::validation(format!(
                        "species '{}' has an invalid {season} weight {weight}",
                        species.id
                    )));
                }
            }
        }

        let mut seen_trash = HashSet::new();
        for item in &self.trash {
            if !seen_trash.insert(item.id.as_str()) {
                return Err(DomainError::validation(format!(
                    "duplicate trash id '{}'",
                    item.id
                )));
            }
        }

        if let Some(rules) = &self.rules {
            rules.validate()?;
        }
        Ok(())
    }

    pub fn species(&self, id: &str) -> Option<&Species> {
        self.species.iter().find(|s| s.id == id)
    }

    /// Species paired with their selection weight for `season`.
    pub fn seasonal_table(&self, season: Season) -> Vec<(&Species, f64)> {
        self.species
            .iter()
            .map(|species| (species, species.weights.get(season)))
            .collect()
    }

    /// Species that can appear this season, excluding secret ones.
    pub fn available_in(&self, season: Season) -> Vec<&Species> {
        self.species
            .iter()
            .filter(|s| s.rarity != Rarity::Secret)
            .filter(|s| s.weights.get(season) > 0.0)
            .collect()
    }
}
