//! Engine configuration loaded from the environment.
//!
//! Every variable has a default so the engine starts with an empty
//! environment. Malformed values fall back to the default with a warning.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};

const DEFAULT_SNAPSHOT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    /// Directory holding the JSON snapshots
    pub data_dir: PathBuf,
    /// Species/trash catalog JSON
    pub species_path: PathBuf,
    pub snapshot_interval: Duration,
    /// Anchor of the weekly season rotation
    pub season_start: DateTime<Utc>,
    pub rng_seed: Option<u64>,
    pub cors_allowed_origins: Option<String>,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .and_then(|raw| parse_or_warn("SERVER_PORT", &raw))
            .unwrap_or(3000);

        let snapshot_secs = var("CASTLINE_SNAPSHOT_SECS")
            .and_then(|raw| parse_or_warn::<u64>("CASTLINE_SNAPSHOT_SECS", &raw))
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_SNAPSHOT_SECS);

        let season_start = var("CASTLINE_SEASON_START")
            .and_then(|raw| match DateTime::parse_from_rfc3339(&raw) {
                Ok(instant) => Some(instant.with_timezone(&Utc)),
                Err(e) => {
                    tracing::warn!(
                        value = %raw,
                        error = %e,
                        "Invalid CASTLINE_SEASON_START, using startup time"
                    );
                    None
                }
            })
            .unwrap_or_else(Utc::now);

        Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            data_dir: var("CASTLINE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
            species_path: var("CASTLINE_SPECIES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/catalog.json")),
            snapshot_interval: Duration::from_secs(snapshot_secs),
            season_start,
            rng_seed: var("CASTLINE_RNG_SEED")
                .and_then(|raw| parse_or_warn("CASTLINE_RNG_SEED", &raw)),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparseable configuration value");
            None
        }
    }
}
