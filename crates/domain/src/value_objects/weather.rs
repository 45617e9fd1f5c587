//! Weather events that influence fishing.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherEvent {
    Rain,
    /// Cherry blossom breeze; also enables catch mutations
    Blossom,
}

impl WeatherEvent {
    pub const ALL: [WeatherEvent; 2] = [WeatherEvent::Rain, WeatherEvent::Blossom];

    pub fn catch_multiplier(self) -> f64 {
        match self {
            Self::Rain => 1.25,
            Self::Blossom => 1.10,
        }
    }

    pub fn enables_mutation(self) -> bool {
        matches!(self, Self::Blossom)
    }
}

impl fmt::Display for WeatherEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rain => write!(f, "rain"),
            Self::Blossom => write!(f, "blossom"),
        }
    }
}

impl std::str::FromStr for WeatherEvent {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rain" => Ok(Self::Rain),
            "blossom" => Ok(Self::Blossom),
            other => Err(DomainError::parse(format!(
                "unknown weather event '{other}'"
            ))),
        }
    }
}

/// Combined catch multiplier of every active event.
pub fn combined_multiplier(active: impl IntoIterator<Item = WeatherEvent>) -> f64 {
    active
        .into_iter()
        .map(WeatherEvent::catch_multiplier)
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_compose() {
        assert_eq!(combined_multiplier([]), 1.0);
        let both = combined_multiplier([WeatherEvent::Rain, WeatherEvent::Blossom]);
        assert!((both - 1.375).abs() < 1e-9);
    }
}
