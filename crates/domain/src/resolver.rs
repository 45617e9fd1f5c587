//! Outcome resolution
//!
//! Pure functions deciding what a cast produces. Randomness is injected as a
//! closure yielding uniform values in `[0, 1)`, so every outcome can be
//! reproduced with a seeded or scripted source.

use crate::entities::{Catalog, CatchCandidate, Mutation, Species, TrashItem};
use crate::error::DomainError;
use crate::value_objects::{FishingRules, Season};

/// Probability that a cast hooks a species rather than trash.
///
/// Re-clamped on every evaluation: weather multipliers can push the product
/// above 1.
pub fn catch_chance(base_chance: f64, environmental_multiplier: f64) -> f64 {
    let chance = base_chance * environmental_multiplier;
    if chance.is_nan() {
        return 0.0;
    }
    chance.clamp(0.0, 1.0)
}

/// Result of a weighted draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection<'a, T> {
    /// Drawn proportionally to the table weights
    Weighted(&'a T),
    /// Table had no positive weight; drawn uniformly instead
    Fallback(&'a T),
}

impl<'a, T> Selection<'a, T> {
    pub fn item(self) -> &'a T {
        match self {
            Self::Weighted(item) | Self::Fallback(item) => item,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

fn usable_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

/// Weighted draw over `(item, weight)` pairs.
///
/// Scales one uniform roll to the weight total and walks the table
/// subtracting weights until the remainder is non-positive. Items with no
/// positive weight are never picked unless the whole table is degenerate, in
/// which case the pick is uniform over every entry. Returns `None` only for
/// an empty table.
pub fn select_weighted<'a, T>(
    table: &'a [(T, f64)],
    roll: &mut impl FnMut() -> f64,
) -> Option<Selection<'a, T>> {
    if table.is_empty() {
        return None;
    }

    let total: f64 = table.iter().map(|(_, w)| usable_weight(*w)).sum();
    if total <= 0.0 {
        let index = pick_index(table.len() as u32, roll) as usize;
        return Some(Selection::Fallback(&table[index].0));
    }

    let mut remainder = roll() * total;
    let mut last_positive = None;
    for (item, weight) in table {
        let weight = usable_weight(*weight);
        if weight <= 0.0 {
            continue;
        }
        last_positive = Some(item);
        remainder -= weight;
        if remainder <= 0.0 {
            return Some(Selection::Weighted(item));
        }
    }

    // Floating point residue: the roll landed past the final boundary.
    last_positive.map(Selection::Weighted)
}

/// Uniform index in `[0, count)`. `count` of zero is treated as one.
pub fn pick_index(count: u32, roll: &mut impl FnMut() -> f64) -> u32 {
    let count = count.max(1);
    let index = (roll().clamp(0.0, 1.0) * count as f64) as u32;
    index.min(count - 1)
}

pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Continuous magnitude between `min` and `max`, rounded to two decimals.
pub fn roll_magnitude(min: f64, max: f64, roll: &mut impl FnMut() -> f64) -> f64 {
    round_to_cents(min + roll() * (max - min))
}

/// Independent mutation roll. Consumes no randomness unless `active`.
pub fn roll_mutation(
    active: bool,
    chance: f64,
    roll: &mut impl FnMut() -> f64,
) -> Option<Mutation> {
    if active && roll() < chance {
        Some(Mutation::Blossom)
    } else {
        None
    }
}

/// Roll the derived attributes of a species into a candidate.
pub fn build_candidate(
    species: &Species,
    rules: &FishingRules,
    mutation_active: bool,
    roll: &mut impl FnMut() -> f64,
) -> CatchCandidate {
    let weight = roll_magnitude(species.min_weight, species.max_weight, roll);
    let base_value = round_to_cents(species.base_value * weight);
    let mutation = roll_mutation(mutation_active, rules.mutation_chance, roll);
    let value = match mutation {
        Some(_) => round_to_cents(base_value * rules.mutation_bonus),
        None => base_value,
    };

    CatchCandidate {
        species_id: species.id.clone(),
        name: species.name.clone(),
        rarity: species.rarity,
        weight,
        power_requirement: species.power_requirement,
        durability_loss: species.durability_loss,
        base_value,
        value,
        mutation,
    }
}

/// Environmental inputs read once per cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastConditions {
    pub season: Season,
    pub catch_multiplier: f64,
    pub mutation_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CastOutcome {
    Trash(TrashItem),
    Candidate {
        candidate: CatchCandidate,
        /// The seasonal table was degenerate and a uniform pick was used
        fallback: bool,
    },
}

/// Decide what bites when the wait elapses.
///
/// One roll against the catch chance decides trash; otherwise a species is
/// drawn from the seasonal table and its attributes rolled. A catalog with
/// no trash items always falls through to the species draw.
pub fn resolve_cast(
    catalog: &Catalog,
    rules: &FishingRules,
    conditions: CastConditions,
    roll: &mut impl FnMut() -> f64,
) -> Result<CastOutcome, DomainError> {
    let chance = catch_chance(rules.base_catch_chance, conditions.catch_multiplier);
    if roll() > chance && !catalog.trash.is_empty() {
        let index = pick_index(catalog.trash.len() as u32, roll) as usize;
        return Ok(CastOutcome::Trash(catalog.trash[index].clone()));
    }

    let table = catalog.seasonal_table(conditions.season);
    let selection = select_weighted(&table, roll)
        .ok_or_else(|| DomainError::catalog("no species to draw from"))?;
    let fallback = selection.is_fallback();
    let candidate = build_candidate(selection.item(), rules, conditions.mutation_active, roll);

    Ok(CastOutcome::Candidate {
        candidate,
        fallback,
    })
}
