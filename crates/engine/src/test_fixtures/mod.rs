//! Test fixtures and common test helpers.
//!
//! Builders for catalog data and tools, plus hand-written test doubles for
//! ports where a scripted sequence reads better than mock expectations.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{catalog, tool, ScriptedRandom};
//!
//! let random = ScriptedRandom::new(&[0.0, 0.5]);
//! let rod = tool(1, 10);
//! ```

pub mod doubles;

pub use doubles::{RecordingPresenter, ScriptedRandom};

use chrono::Utc;

use castline_domain::{
    Catalog, CatchCandidate, CatchId, CatchRecord, Rarity, SeasonWeights, Species, ToolSnapshot,
    TrashItem,
};

// =============================================================================
// Catalog
// =============================================================================

/// A species available in every season with weight 1.
pub fn species(id: &str, rarity: Rarity, power_requirement: u32, durability_loss: u32) -> Species {
    Species {
        id: id.to_string(),
        name: id.to_uppercase(),
        rarity,
        weights: SeasonWeights {
            spring: 1.0,
            summer: 1.0,
            autumn: 1.0,
            winter: 1.0,
        },
        min_weight: 1.0,
        max_weight: 3.0,
        durability_loss,
        power_requirement,
        base_value: 10.0,
        emoji: None,
    }
}

pub fn trash(id: &str) -> TrashItem {
    TrashItem {
        id: id.to_string(),
        name: id.replace('_', " "),
        emoji: None,
    }
}

pub fn catalog_of(species: Vec<Species>, trash: Vec<TrashItem>) -> Catalog {
    Catalog {
        species,
        trash,
        rules: None,
    }
}

/// Carp (easy), pike (needs the mini-game) and an out-of-season koi.
pub fn catalog() -> Catalog {
    let mut koi = species("koi", Rarity::Secret, 5, 4);
    koi.weights = SeasonWeights {
        spring: 0.5,
        ..SeasonWeights::default()
    };
    catalog_of(
        vec![
            species("carp", Rarity::Common, 1, 1),
            species("pike", Rarity::Rare, 3, 3),
            koi,
        ],
        vec![trash("old_boot")],
    )
}

// =============================================================================
// Equipment and catches
// =============================================================================

pub fn tool(power: u32, durability: u32) -> ToolSnapshot {
    ToolSnapshot {
        item_id: "rod-1".to_string(),
        display_id: "fishing_rod_tier1".to_string(),
        tier: 1,
        power,
        durability,
    }
}

pub fn candidate(species_id: &str, power_requirement: u32) -> CatchCandidate {
    CatchCandidate {
        species_id: species_id.to_string(),
        name: species_id.to_uppercase(),
        rarity: Rarity::Common,
        weight: 2.0,
        power_requirement,
        durability_loss: 1,
        base_value: 20.0,
        value: 20.0,
        mutation: None,
    }
}

pub fn catch_record(species_id: &str, weight: f64) -> CatchRecord {
    CatchRecord {
        id: CatchId::new(),
        species_id: species_id.to_string(),
        name: species_id.to_uppercase(),
        rarity: Rarity::Common,
        weight,
        base_value: 10.0,
        value: 10.0,
        mutation: None,
        caught_at: Utc::now(),
    }
}
