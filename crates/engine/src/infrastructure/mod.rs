//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod catalog;
pub mod clock;
pub mod config;
pub mod environment;
pub mod ledger;
pub mod ports;
pub mod presenter;
pub mod snapshot_store;
pub mod timers;
