//! Fishing seasons
//!
//! Seasons rotate on a fixed cadence from an anchor instant. The active
//! season selects which weight column of the species catalog is used.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    pub fn next(self) -> Season {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spring => write!(f, "SPRING"),
            Self::Summer => write!(f, "SUMMER"),
            Self::Autumn => write!(f, "AUTUMN"),
            Self::Winter => write!(f, "WINTER"),
        }
    }
}

/// Rotation of seasons from an anchor instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonCalendar {
    anchor: DateTime<Utc>,
    length: Duration,
}

impl SeasonCalendar {
    /// Default season length: one week.
    pub fn weekly(anchor: DateTime<Utc>) -> Self {
        Self {
            anchor,
            length: Duration::days(7),
        }
    }

    /// Number of whole seasons elapsed since the anchor (negative before it).
    fn steps(&self, now: DateTime<Utc>) -> i64 {
        let length_ms = self.length.num_milliseconds().max(1);
        (now - self.anchor).num_milliseconds().div_euclid(length_ms)
    }

    pub fn season_at(&self, now: DateTime<Utc>) -> Season {
        let index = self.steps(now).rem_euclid(Season::ALL.len() as i64);
        Season::ALL[index as usize]
    }

    /// Instant at which the season active at `now` ends.
    pub fn next_change(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let steps = self.steps(now) + 1;
        self.anchor + Duration::milliseconds(self.length.num_milliseconds() * steps)
    }
}
