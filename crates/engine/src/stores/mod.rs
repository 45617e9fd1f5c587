//! In-memory state storage modules.
//!
//! Stores manage runtime state that doesn't belong in the ledger:
//! - `SessionRegistry` - Live fishing sessions and their timers
//! - `DiscoveryStore` - Per-realm discovery logs

pub mod discovery;
pub mod session;

// Re-export store types
pub use discovery::DiscoveryStore;
pub use session::{LiveSession, SessionCell, SessionRegistry};
