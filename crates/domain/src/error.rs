//! Unified error types for the domain layer
//!
//! Provides a common error type for catalog validation, rule validation and
//! ID parsing, plus the begin-time rejections that are surfaced to players.

use serde::Serialize;
use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Invalid ID format
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// The species catalog cannot produce a candidate
    #[error("Catalog error: {0}")]
    Catalog(String),
}

impl DomainError {
    /// Creates a validation error for rule or catalog values out of range.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create an invalid ID error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// Create a parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a catalog error
    pub fn catalog(msg: impl Into<String>) -> Self {
        Self::Catalog(msg.into())
    }
}

/// Equipment that must be present before a session may begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEquipment {
    /// No tool equipped, or the equipped tool has no durability left
    Tool,
    /// No consumable (bait) left
    Consumable,
}

impl std::fmt::Display for MissingEquipment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tool => write!(f, "fishing rod"),
            Self::Consumable => write!(f, "bait"),
        }
    }
}

/// Why a `begin` action was refused. These are the only conditions
/// shown to the player as a rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum BeginRejection {
    #[error("Your fish inventory is full ({current}/{capacity})")]
    InventoryFull { current: usize, capacity: usize },

    #[error("You need a {0} to go fishing")]
    EquipmentMissing(MissingEquipment),
}
