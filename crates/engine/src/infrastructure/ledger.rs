//! In-memory ledger.
//!
//! Stand-in for the host bot's economy service. Accounts are created lazily
//! per (player, realm); catch inventories are exported for snapshots and
//! restored on startup.

use std::collections::HashMap;

use async_trait::async_trait;
use dashmap::DashMap;

use castline_domain::{CatchRecord, PlayerId, PlayerInventory, RealmId, SessionKey, ToolSnapshot};

use crate::infrastructure::ports::{LedgerError, LedgerPort, PlayerCatches, ToolWear};

#[derive(Debug, Clone, Default)]
struct Account {
    tool: Option<ToolSnapshot>,
    items: HashMap<String, u32>,
    catches: Vec<CatchRecord>,
}

pub struct InMemoryLedger {
    accounts: DashMap<SessionKey, Account>,
    bait_id: String,
}

impl InMemoryLedger {
    pub fn new(bait_id: impl Into<String>) -> Self {
        Self {
            accounts: DashMap::new(),
            bait_id: bait_id.into(),
        }
    }

    /// Equip a tool, replacing whatever was equipped.
    pub fn equip(&self, player_id: PlayerId, realm_id: RealmId, tool: ToolSnapshot) {
        let key = SessionKey::new(player_id, realm_id);
        self.accounts.entry(key).or_default().tool = Some(tool);
    }

    /// Add units of a general item (bait included).
    pub fn stock(&self, player_id: PlayerId, realm_id: RealmId, item_id: &str, amount: u32) {
        let key = SessionKey::new(player_id, realm_id);
        let mut account = self.accounts.entry(key).or_default();
        let balance = account.items.entry(item_id.to_string()).or_insert(0);
        *balance = balance.saturating_add(amount);
    }

    pub fn item_count(&self, player_id: PlayerId, realm_id: RealmId, item_id: &str) -> u32 {
        self.accounts
            .get(&SessionKey::new(player_id, realm_id))
            .and_then(|account| account.items.get(item_id).copied())
            .unwrap_or(0)
    }

    /// Catch inventories of every account that has caught something.
    pub fn export_catches(&self) -> Vec<PlayerCatches> {
        let mut inventories: Vec<PlayerCatches> = self
            .accounts
            .iter()
            .filter(|entry| !entry.catches.is_empty())
            .map(|entry| PlayerCatches {
                player_id: entry.key().player_id,
                realm_id: entry.key().realm_id,
                catches: entry.catches.clone(),
            })
            .collect();
        inventories.sort_by_key(|p| (p.realm_id, p.player_id));
        inventories
    }

    /// Replace catch inventories with the given ones. Tools and items are untouched.
    pub fn restore_catches(&self, inventories: Vec<PlayerCatches>) {
        for inventory in inventories {
            let key = SessionKey::new(inventory.player_id, inventory.realm_id);
            self.accounts.entry(key).or_default().catches = inventory.catches;
        }
    }
}

#[async_trait]
impl LedgerPort for InMemoryLedger {
    async fn get_inventory(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
    ) -> Result<PlayerInventory, LedgerError> {
        let inventory = self
            .accounts
            .get(&SessionKey::new(player_id, realm_id))
            .map(|account| PlayerInventory {
                tool: account.tool.clone(),
                consumables: account.items.get(&self.bait_id).copied().unwrap_or(0),
                catches: account.catches.clone(),
            })
            .unwrap_or_default();
        Ok(inventory)
    }

    async fn consume(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        resource_id: &str,
        amount: u32,
    ) -> Result<bool, LedgerError> {
        let key = SessionKey::new(player_id, realm_id);
        let Some(mut account) = self.accounts.get_mut(&key) else {
            return Ok(false);
        };
        match account.items.get_mut(resource_id) {
            Some(balance) if *balance >= amount => {
                *balance -= amount;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn degrade_or_break_tool(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        tool_id: &str,
        amount: u32,
    ) -> Result<ToolWear, LedgerError> {
        let key = SessionKey::new(player_id, realm_id);
        let mut account = self.accounts.get_mut(&key).ok_or_else(|| LedgerError::UnknownAccount {
            player_id: player_id.to_string(),
            realm_id: realm_id.to_string(),
        })?;

        let durability = match account.tool.as_ref() {
            Some(tool) if tool.item_id == tool_id => tool.durability,
            _ => {
                return Err(LedgerError::backend(
                    "degrade_or_break_tool",
                    format!("tool '{tool_id}' is not equipped"),
                ))
            }
        };

        if amount >= durability {
            account.tool = None;
            return Ok(ToolWear {
                broken: true,
                remaining: 0,
            });
        }

        let remaining = durability - amount;
        if let Some(tool) = account.tool.as_mut() {
            tool.durability = remaining;
        }
        Ok(ToolWear {
            broken: false,
            remaining,
        })
    }

    async fn grant_catch(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        record: CatchRecord,
    ) -> Result<(), LedgerError> {
        let key = SessionKey::new(player_id, realm_id);
        self.accounts.entry(key).or_default().catches.push(record);
        Ok(())
    }

    async fn grant_item(
        &self,
        player_id: PlayerId,
        realm_id: RealmId,
        item_id: &str,
        amount: u32,
    ) -> Result<(), LedgerError> {
        self.stock(player_id, realm_id, item_id, amount);
        Ok(())
    }
}
