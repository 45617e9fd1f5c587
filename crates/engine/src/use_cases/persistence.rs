//! Snapshot persistence use case.
//!
//! Catch inventories and discovery logs live in memory while the engine runs.
//! They are restored once at startup, before any session may begin, and
//! flushed periodically and on shutdown.

use std::sync::Arc;

use crate::infrastructure::ledger::InMemoryLedger;
use crate::infrastructure::ports::{FishingSnapshot, PersistenceError, SnapshotStorePort};
use crate::stores::DiscoveryStore;

pub struct SnapshotService {
    ledger: Arc<InMemoryLedger>,
    discoveries: Arc<DiscoveryStore>,
    store: Arc<dyn SnapshotStorePort>,
}

impl SnapshotService {
    pub fn new(
        ledger: Arc<InMemoryLedger>,
        discoveries: Arc<DiscoveryStore>,
        store: Arc<dyn SnapshotStorePort>,
    ) -> Self {
        Self {
            ledger,
            discoveries,
            store,
        }
    }

    /// Load the last snapshot into memory.
    pub async fn restore(&self) -> Result<FishingSnapshot, PersistenceError> {
        let snapshot = self.store.load().await?;
        tracing::info!(
            players = snapshot.inventories.len(),
            catches = snapshot.catch_count(),
            realms = snapshot.discoveries.len(),
            "Restored fishing snapshot"
        );
        self.ledger.restore_catches(snapshot.inventories.clone());
        self.discoveries.restore(snapshot.discoveries.clone());
        Ok(snapshot)
    }

    /// Write the current in-memory state.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let snapshot = self.capture();
        self.store.save(&snapshot).await?;
        tracing::debug!(
            players = snapshot.inventories.len(),
            catches = snapshot.catch_count(),
            "Flushed fishing snapshot"
        );
        Ok(())
    }

    pub fn capture(&self) -> FishingSnapshot {
        FishingSnapshot {
            inventories: self.ledger.export_catches(),
            discoveries: self.discoveries.export(),
        }
    }
}
