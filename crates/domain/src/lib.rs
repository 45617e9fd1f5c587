//! Castline domain.
//!
//! Pure types and algorithms for the fishing minigame: identifiers, the
//! species catalog, seasons and weather, the per-player session state
//! machine, and outcome resolution. No async and no I/O; randomness is
//! injected by the caller.

extern crate self as castline_domain;

pub mod entities;
pub mod error;
pub mod ids;
pub mod resolver;
pub mod session;
pub mod value_objects;

pub use entities::{
    fish_index, Catalog, CatchCandidate, CatchRecord, DiscoveryEntry, FishIndexEntry, Mutation,
    PlayerInventory, RealmDiscoveryLog, SeasonWeights, Species, ToolSnapshot, TrashItem,
};

pub use error::{BeginRejection, DomainError, MissingEquipment};

pub use ids::{CatchId, PlayerId, RealmId};

pub use resolver::{
    build_candidate, catch_chance, pick_index, resolve_cast, roll_magnitude, roll_mutation,
    select_weighted, CastConditions, CastOutcome, Selection,
};

pub use session::{
    ChoiceEffect, Outcome, Resolution, SessionKey, SessionState, SessionView, Stage,
};

pub use value_objects::{
    combined_multiplier, DifficultyTable, FishingRules, Rarity, Season, SeasonCalendar,
    WeatherEvent,
};
