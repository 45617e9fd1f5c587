//! Weather and season environment.
//!
//! Weather events are global flags with an optional expiry. Expired events
//! are treated as inactive on read and pruned lazily.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use castline_domain::{combined_multiplier, Season, SeasonCalendar, WeatherEvent};

use crate::infrastructure::ports::{ClockPort, EnvironmentPort};

#[derive(Debug, Clone, Serialize)]
pub struct ActiveWeather {
    pub event: WeatherEvent,
    /// `None` until stopped explicitly
    pub until: Option<DateTime<Utc>>,
}

pub struct WeatherEnvironment {
    calendar: SeasonCalendar,
    clock: Arc<dyn ClockPort>,
    events: DashMap<WeatherEvent, Option<DateTime<Utc>>>,
}

impl WeatherEnvironment {
    pub fn new(calendar: SeasonCalendar, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            calendar,
            clock,
            events: DashMap::new(),
        }
    }

    /// Start an event. Returns false if it was already running.
    pub fn start(&self, event: WeatherEvent, duration: Option<chrono::Duration>) -> bool {
        self.prune_expired();
        if self.events.contains_key(&event) {
            return false;
        }
        let until = duration.map(|d| self.clock.now() + d);
        self.events.insert(event, until);
        tracing::info!(event = %event, until = ?until, "Weather event started");
        true
    }

    /// Stop an event. Returns false if it was not running.
    pub fn stop(&self, event: WeatherEvent) -> bool {
        let stopped = self.events.remove(&event).is_some();
        if stopped {
            tracing::info!(event = %event, "Weather event stopped");
        }
        stopped
    }

    pub fn active(&self) -> Vec<ActiveWeather> {
        self.prune_expired();
        let mut active: Vec<ActiveWeather> = self
            .events
            .iter()
            .map(|entry| ActiveWeather {
                event: *entry.key(),
                until: *entry.value(),
            })
            .collect();
        active.sort_by_key(|w| w.event.to_string());
        active
    }

    pub fn next_season_change(&self) -> DateTime<Utc> {
        self.calendar.next_change(self.clock.now())
    }

    fn is_active(&self, event: WeatherEvent, now: DateTime<Utc>) -> bool {
        self.events
            .get(&event)
            .is_some_and(|until| until.map_or(true, |until| now < until))
    }

    fn prune_expired(&self) {
        let now = self.clock.now();
        self.events.retain(|event, until| {
            let keep = until.map_or(true, |until| now < until);
            if !keep {
                tracing::info!(event = %event, "Weather event ended");
            }
            keep
        });
    }
}

impl EnvironmentPort for WeatherEnvironment {
    fn season(&self) -> Season {
        self.calendar.season_at(self.clock.now())
    }

    fn catch_multiplier(&self) -> f64 {
        let now = self.clock.now();
        combined_multiplier(
            WeatherEvent::ALL
                .into_iter()
                .filter(|event| self.is_active(*event, now)),
        )
    }

    fn mutation_active(&self) -> bool {
        let now = self.clock.now();
        WeatherEvent::ALL
            .into_iter()
            .filter(|event| event.enables_mutation())
            .any(|event| self.is_active(event, now))
    }
}
