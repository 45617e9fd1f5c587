//! Discovery tracking
//!
//! Each realm keeps a log of the species its players have landed, used for
//! completion tracking. The per-player fish index is derived from the
//! player's own catch inventory instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Catalog, CatchRecord};
use crate::value_objects::Rarity;
use crate::{PlayerId, RealmId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    pub species_id: String,
    pub first_player: PlayerId,
    pub first_caught_at: DateTime<Utc>,
    pub count: u64,
    pub heaviest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealmDiscoveryLog {
    pub realm_id: RealmId,
    /// Keyed by species id
    pub entries: BTreeMap<String, DiscoveryEntry>,
}

impl RealmDiscoveryLog {
    pub fn new(realm_id: RealmId) -> Self {
        Self {
            realm_id,
            entries: BTreeMap::new(),
        }
    }

    /// Record a catch. Returns true when this is the realm's first of the species.
    pub fn record(&mut self, player_id: PlayerId, record: &CatchRecord) -> bool {
        match self.entries.get_mut(&record.species_id) {
            Some(entry) => {
                entry.count += 1;
                if record.weight > entry.heaviest {
                    entry.heaviest = record.weight;
                }
                false
            }
            None => {
                self.entries.insert(
                    record.species_id.clone(),
                    DiscoveryEntry {
                        species_id: record.species_id.clone(),
                        first_player: player_id,
                        first_caught_at: record.caught_at,
                        count: 1,
                        heaviest: record.weight,
                    },
                );
                true
            }
        }
    }

    pub fn discovered_count(&self) -> usize {
        self.entries.len()
    }
}

/// One row of a player's fish index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishIndexEntry {
    pub species_id: String,
    pub name: String,
    pub rarity: Rarity,
    pub discovered: bool,
    pub best_weight: Option<f64>,
}

/// Build a player's fish index over the whole catalog.
pub fn fish_index(catalog: &Catalog, catches: &[CatchRecord]) -> Vec<FishIndexEntry> {
    let mut best: BTreeMap<&str, f64> = BTreeMap::new();
    for record in catches {
        let slot = best
            .entry(record.species_id.as_str())
            .or_insert(record.weight);
        if record.weight > *slot {
            *slot = record.weight;
        }
    }

    catalog
        .species
        .iter()
        .map(|species| {
            let best_weight = best.get(species.id.as_str()).copied();
            FishIndexEntry {
                species_id: species.id.clone(),
                name: species.name.clone(),
                rarity: species.rarity,
                discovered: best_weight.is_some(),
                best_weight,
            }
        })
        .collect()
}
