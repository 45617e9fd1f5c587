//! Read-only fishing queries.

use std::sync::Arc;

use serde::Serialize;

use castline_domain::{
    fish_index, Catalog, CatchRecord, FishIndexEntry, PlayerId, Rarity, RealmDiscoveryLog,
    RealmId, Season, Species,
};

use crate::infrastructure::ports::{EnvironmentPort, LedgerError, LedgerPort};
use crate::stores::DiscoveryStore;

#[derive(Debug, Clone, Serialize)]
pub struct FishIndex {
    pub discovered: usize,
    pub total: usize,
    pub entries: Vec<FishIndexEntry>,
}

/// One in-season species. Identity stays hidden until discovered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayFishEntry {
    pub discovered: bool,
    pub species_id: Option<String>,
    pub name: Option<String>,
    pub rarity: Option<Rarity>,
    pub emoji: Option<String>,
}

impl TodayFishEntry {
    fn hidden() -> Self {
        Self {
            discovered: false,
            species_id: None,
            name: None,
            rarity: None,
            emoji: None,
        }
    }

    fn revealed(species: &Species) -> Self {
        Self {
            discovered: true,
            species_id: Some(species.id.clone()),
            name: Some(species.name.clone()),
            rarity: Some(species.rarity),
            emoji: species.emoji.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TodayFish {
    pub season: Season,
    pub entries: Vec<TodayFishEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FishInventory {
    pub count: usize,
    pub capacity: usize,
    pub catches: Vec<CatchRecord>,
}

pub struct FishingQueries {
    ledger: Arc<dyn LedgerPort>,
    environment: Arc<dyn EnvironmentPort>,
    discoveries: Arc<DiscoveryStore>,
    catalog: Arc<Catalog>,
    capacity: usize,
}

impl FishingQueries {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        environment: Arc<dyn EnvironmentPort>,
        discoveries: Arc<DiscoveryStore>,
        catalog: Arc<Catalog>,
        capacity: usize,
    ) -> Self {
        Self {
            ledger,
            environment,
            discoveries,
            catalog,
            capacity,
        }
    }

    /// Every catalog species with the player's discovery state and best weight.
    pub async fn fish_index(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
    ) -> Result<FishIndex, LedgerError> {
        let inventory = self.ledger.get_inventory(player_id, realm_id).await?;
        let entries = fish_index(&self.catalog, &inventory.catches);
        Ok(FishIndex {
            discovered: entries.iter().filter(|entry| entry.discovered).count(),
            total: entries.len(),
            entries,
        })
    }

    /// The player's stored catches, newest last.
    pub async fn fish_inventory(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
    ) -> Result<FishInventory, LedgerError> {
        let inventory = self.ledger.get_inventory(player_id, realm_id).await?;
        Ok(FishInventory {
            count: inventory.catches.len(),
            capacity: self.capacity,
            catches: inventory.catches,
        })
    }

    /// In-season species, revealed once anyone in the realm has landed them.
    pub fn today_fish(&self, realm_id: RealmId) -> TodayFish {
        let log = self.discoveries.get(realm_id);
        self.today_fish_where(|species_id| {
            log.as_ref()
                .is_some_and(|log| log.entries.contains_key(species_id))
        })
    }

    /// In-season species, revealed once the player has caught them.
    pub async fn today_fish_for(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
    ) -> Result<TodayFish, LedgerError> {
        let inventory = self.ledger.get_inventory(player_id, realm_id).await?;
        Ok(self.today_fish_where(|species_id| {
            inventory
                .catches
                .iter()
                .any(|record| record.species_id == species_id)
        }))
    }

    /// The realm's discovery log; empty before the first catch.
    pub fn realm_discoveries(&self, realm_id: RealmId) -> RealmDiscoveryLog {
        self.discoveries
            .get(realm_id)
            .unwrap_or_else(|| RealmDiscoveryLog::new(realm_id))
    }

    fn today_fish_where(&self, discovered: impl Fn(&str) -> bool) -> TodayFish {
        let season = self.environment.season();
        let entries = self
            .catalog
            .available_in(season)
            .into_iter()
            .map(|species| {
                if discovered(&species.id) {
                    TodayFishEntry::revealed(species)
                } else {
                    TodayFishEntry::hidden()
                }
            })
            .collect();
        TodayFish { season, entries }
    }
}
