//! Castline Engine library.
//!
//! Runtime for the fishing minigame: live sessions with their timers,
//! settlement against the ledger, snapshot persistence, and the action
//! intake surface.
//!
//! ## Structure
//!
//! - `stores/` - Live session registry and realm discovery logs
//! - `use_cases/` - Stage controller, settlement, queries and snapshots
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP and WebSocket entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod stores;
pub mod use_cases;

/// Shared fixtures and test doubles.
#[cfg(test)]
pub mod test_fixtures;

pub use app::App;
