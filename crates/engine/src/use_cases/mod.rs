//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod fishing;
pub mod persistence;

// Re-export main types
pub use fishing::FishingUseCases;
pub use persistence::SnapshotService;
