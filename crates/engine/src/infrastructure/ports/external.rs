//! External collaborator ports: ledger, presentation, storage, environment.

use async_trait::async_trait;

use castline_domain::{CatchRecord, PlayerId, PlayerInventory, RealmId, Season, SessionView};

use super::error::{LedgerError, PersistenceError, PresentationError};
use super::types::{FishingSnapshot, ToolWear};

// =============================================================================
// Ledger
// =============================================================================

/// Economy ledger owning inventories, tools and consumables.
///
/// Every call is assumed atomic per invocation. The engine relies on
/// single-writer-per-player semantics for the duration of a session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerPort: Send + Sync {
    async fn get_inventory(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
    ) -> Result<PlayerInventory, LedgerError>;

    /// Remove `amount` of a resource. `Ok(false)` when the balance was short.
    async fn consume(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        resource_id: &str,
        amount: u32,
    ) -> Result<bool, LedgerError>;

    /// Decrement durability, removing the tool when it reaches zero.
    async fn degrade_or_break_tool(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        tool_id: &str,
        amount: u32,
    ) -> Result<ToolWear, LedgerError>;

    async fn grant_catch(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        record: CatchRecord,
    ) -> Result<(), LedgerError>;

    async fn grant_item(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        item_id: &str,
        amount: u32,
    ) -> Result<(), LedgerError>;
}

// =============================================================================
// Presentation
// =============================================================================

/// Receives a view model on every stage transition.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresentationPort: Send + Sync {
    async fn render(&self, view: &SessionView) -> Result<(), PresentationError>;
}

// =============================================================================
// Durable storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStorePort: Send + Sync {
    /// Load the last snapshot; an empty snapshot when nothing was saved yet.
    async fn load(&self) -> Result<FishingSnapshot, PersistenceError>;
    async fn save(&self, snapshot: &FishingSnapshot) -> Result<(), PersistenceError>;
}

// =============================================================================
// Environment
// =============================================================================

/// Global environmental state read once per cast.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentPort: Send + Sync {
    fn season(&self) -> Season;
    fn catch_multiplier(&self) -> f64;
    fn mutation_active(&self) -> bool;
}
