//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The economy ledger (owned by the host bot)
//! - Presentation (front ends render session views)
//! - Durable snapshot storage
//! - Weather/season environment
//! - Clock/Random (for testing)

mod error;
mod external;
mod testing;
pub mod types;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{EnvironmentPort, LedgerPort, PresentationPort, SnapshotStorePort};

// =============================================================================
// Types crossing port boundaries
// =============================================================================
pub use types::{FishingSnapshot, PlayerCatches, ToolWear};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use external::{
    MockEnvironmentPort, MockLedgerPort, MockPresentationPort, MockSnapshotStorePort,
};

#[cfg(test)]
pub use testing::MockClockPort;

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{LedgerError, PersistenceError, PresentationError};
