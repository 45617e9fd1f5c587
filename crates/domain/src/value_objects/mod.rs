//! Value objects - immutable, validated building blocks.

mod rarity;
mod rules;
mod season;
mod weather;

pub use rarity::Rarity;
pub use rules::{DifficultyTable, FishingRules};
pub use season::{Season, SeasonCalendar};
pub use weather::{combined_multiplier, WeatherEvent};
