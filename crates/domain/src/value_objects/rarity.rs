//! Rarity tiers
//!
//! An ordered classification that controls both reward value and the
//! difficulty of the biting mini-game.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Rarity tier of a species, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythical,
    /// Hidden from seasonal listings
    Secret,
    Prismatic,
}

impl Rarity {
    pub const COUNT: usize = 8;

    pub const ALL: [Rarity; Self::COUNT] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythical,
        Rarity::Secret,
        Rarity::Prismatic,
    ];

    /// Position in the tier order, used to index rarity tables.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-letter code used by catalog spreadsheets.
    pub fn code(self) -> char {
        match self {
            Self::Common => 'C',
            Self::Uncommon => 'U',
            Self::Rare => 'R',
            Self::Epic => 'E',
            Self::Legendary => 'L',
            Self::Mythical => 'M',
            Self::Secret => 'S',
            Self::Prismatic => 'P',
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
            Self::Mythical => "Mythical",
            Self::Secret => "Secret",
            Self::Prismatic => "Prismatic",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for Rarity {
    type Err = DomainError;

    /// Accepts either the full tier name (any case) or its letter code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Rarity::ALL
            .into_iter()
            .find(|rarity| {
                rarity.to_string().eq_ignore_ascii_case(trimmed)
                    || (trimmed.len() == 1
                        && trimmed
                            .chars()
                            .next()
                            .is_some_and(|c| c.eq_ignore_ascii_case(&rarity.code())))
            })
            .ok_or_else(|| DomainError::parse(format!("unknown rarity '{s}'")))
    }
}
