//! Per-realm discovery logs.

use dashmap::DashMap;

use castline_domain::{CatchRecord, PlayerId, RealmDiscoveryLog, RealmId};

pub struct DiscoveryStore {
    realms: DashMap<RealmId, RealmDiscoveryLog>,
}

impl DiscoveryStore {
    pub fn new() -> Self {
        Self {
            realms: DashMap::new(),
        }
    }

    /// Record a catch. Returns true on the realm's first catch of the species.
    pub fn record(&self, realm_id: RealmId, player_id: PlayerId, record: &CatchRecord) -> bool {
        self.realms
            .entry(realm_id)
            .or_insert_with(|| RealmDiscoveryLog::new(realm_id))
            .record(player_id, record)
    }

    pub fn get(&self, realm_id: RealmId) -> Option<RealmDiscoveryLog> {
        self.realms.get(&realm_id).map(|log| log.clone())
    }

    pub fn export(&self) -> Vec<RealmDiscoveryLog> {
        let mut logs: Vec<RealmDiscoveryLog> = self
            .realms
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by_key(|log| log.realm_id);
        logs
    }

    pub fn restore(&self, logs: Vec<RealmDiscoveryLog>) {
        for log in logs {
            self.realms.insert(log.realm_id, log);
        }
    }
}

impl Default for DiscoveryStore {
    fn default() -> Self {
        Self::new()
    }
}
