//! Fishing operation errors.

use castline_domain::{BeginRejection, DomainError};

use crate::infrastructure::ports::LedgerError;

/// Errors surfaced by fishing actions.
///
/// Only `Rejected` is meant for the player; the rest are operational.
#[derive(Debug, thiserror::Error)]
pub enum FishingError {
    #[error("{0}")]
    Rejected(#[from] BeginRejection),
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
    #[error("Catalog error: {0}")]
    Catalog(#[from] DomainError),
    /// The surface showing the session could not be rendered to; the
    /// session was abandoned
    #[error("Fishing surface is unreachable")]
    SurfaceUnreachable,
    /// A newer `begin` for the same key replaced this session before it started
    #[error("Session was replaced before it started")]
    Superseded,
}
