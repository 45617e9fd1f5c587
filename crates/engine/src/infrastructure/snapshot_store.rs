//! JSON file snapshot store.
//!
//! Catch inventories and realm discovery logs are written to separate files
//! under the data directory. Writes go to a temporary file first and are
//! renamed into place so a crash never leaves a half-written snapshot.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use castline_domain::RealmDiscoveryLog;

use crate::infrastructure::ports::{
    FishingSnapshot, PersistenceError, PlayerCatches, SnapshotStorePort,
};

const INVENTORIES_FILE: &str = "fish_inventories.json";
const DISCOVERIES_FILE: &str = "realm_discoveries.json";

pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    async fn read_list<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, PersistenceError> {
        let path = self.dir.join(file);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&path, e)),
        };
        serde_json::from_str(&raw)
            .map_err(PersistenceError::serialization)
    }

    async fn write_list<T: Serialize>(
        &self,
        file: &str,
        items: &[T],
    ) -> Result<(), PersistenceError> {
        let path = self.dir.join(file);
        let json = serde_json::to_string_pretty(items)
            .map_err(PersistenceError::serialization)?;
        write_atomically(&path, json.as_bytes()).await
    }
}

async fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| PersistenceError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| PersistenceError::io(path, e))
}

#[async_trait]
impl SnapshotStorePort for JsonSnapshotStore {
    async fn load(&self) -> Result<FishingSnapshot, PersistenceError> {
        let inventories: Vec<PlayerCatches> = self.read_list(INVENTORIES_FILE).await?;
        let discoveries: Vec<RealmDiscoveryLog> = self.read_list(DISCOVERIES_FILE).await?;
        Ok(FishingSnapshot {
            inventories,
            discoveries,
        })
    }

    async fn save(&self, snapshot: &FishingSnapshot) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PersistenceError::io(&self.dir, e))?;
        self.write_list(INVENTORIES_FILE, &snapshot.inventories)
            .await?;
        self.write_list(DISCOVERIES_FILE, &snapshot.discoveries)
            .await?;
        Ok(())
    }
}
