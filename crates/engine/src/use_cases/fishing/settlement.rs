//! Resource settlement.
//!
//! Turns a terminal resolution into ledger mutations: one bait consumed per
//! attempt, durability loss applied to the tool, and the reward deposited.

use std::sync::Arc;

use castline_domain::{CatchId, CatchRecord, Outcome, Resolution};

use crate::infrastructure::ports::{ClockPort, LedgerError, LedgerPort, RandomPort, ToolWear};
use crate::stores::DiscoveryStore;

use super::types::SettlementReceipt;

pub struct ResourceSettlement {
    ledger: Arc<dyn LedgerPort>,
    discoveries: Arc<DiscoveryStore>,
    clock: Arc<dyn ClockPort>,
    random: Arc<dyn RandomPort>,
    bait_id: String,
}

impl ResourceSettlement {
    pub fn new(
        ledger: Arc<dyn LedgerPort>,
        discoveries: Arc<DiscoveryStore>,
        clock: Arc<dyn ClockPort>,
        random: Arc<dyn RandomPort>,
        bait_id: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            discoveries,
            clock,
            random,
            bait_id: bait_id.into(),
        }
    }

    /// Commit a resolution to the ledger.
    ///
    /// A failed bait or reward step stops settlement; steps already applied
    /// stand. Tool wear failures are logged and never block the reward.
    pub async fn settle(&self, resolution: &Resolution) -> Result<SettlementReceipt, LedgerError> {
        let player_id = resolution.key.player_id;
        let realm_id = resolution.key.realm_id;
        let mut receipt = SettlementReceipt::default();

        receipt.consumed = self
            .ledger
            .consume(player_id, realm_id, &self.bait_id, 1)
            .await?;
        if !receipt.consumed {
            tracing::warn!(
                player_id = %player_id,
                realm_id = %realm_id,
                bait_id = %self.bait_id,
                "Bait balance ran out mid-session"
            );
        }

        if resolution.loss > 0 {
            receipt.wear = self.apply_wear(resolution).await;
        }

        match &resolution.outcome {
            Outcome::Caught { candidate } => {
                let record = CatchRecord::from_candidate(
                    CatchId::from_uuid(self.random.gen_uuid()),
                    candidate,
                    self.clock.now(),
                );
                self.ledger
                    .grant_catch(player_id, realm_id, record.clone())
                    .await?;
                receipt.first_discovery = self.discoveries.record(realm_id, player_id, &record);
                if receipt.first_discovery {
                    tracing::info!(
                        realm_id = %realm_id,
                        player_id = %player_id,
                        species_id = %record.species_id,
                        "New species discovered in realm"
                    );
                }
                receipt.catch = Some(record);
            }
            Outcome::Trash { item } => {
                self.ledger
                    .grant_item(player_id, realm_id, &item.id, 1)
                    .await?;
                receipt.trash_item = Some(item.id.clone());
            }
            Outcome::Escaped => {}
        }

        Ok(receipt)
    }

    async fn apply_wear(&self, resolution: &Resolution) -> Option<ToolWear> {
        let player_id = resolution.key.player_id;
        let realm_id = resolution.key.realm_id;
        let tool_id = &resolution.tool.item_id;
        let wear = match self
            .ledger
            .degrade_or_break_tool(player_id, realm_id, tool_id, resolution.loss)
            .await
        {
            Ok(wear) => wear,
            Err(e) => {
                tracing::error!(
                    player_id = %player_id,
                    realm_id = %realm_id,
                    tool_id = %tool_id,
                    loss = resolution.loss,
                    error = %e,
                    "Tool wear could not be applied"
                );
                return None;
            }
        };
        if wear.broken != resolution.tool_broken {
            tracing::warn!(
                player_id = %player_id,
                realm_id = %realm_id,
                tool_id = %tool_id,
                ledger_broken = wear.broken,
                session_broken = resolution.tool_broken,
                "Ledger tool durability diverged from the session snapshot"
            );
        }
        Some(wear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{MockClockPort, MockLedgerPort};
    use crate::test_fixtures::{candidate, tool, ScriptedRandom};
    use castline_domain::{PlayerId, RealmId, SessionKey, TrashItem};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::*;

    fn key() -> SessionKey {
        SessionKey::new(PlayerId::new(7), RealmId::new(70))
    }

    fn resolution(outcome: Outcome, loss: u32, tool_broken: bool) -> Resolution {
        Resolution {
            key: key(),
            outcome,
            tool: tool(1, 10),
            loss,
            tool_broken,
        }
    }

    fn settlement(ledger: MockLedgerPort, discoveries: Arc<DiscoveryStore>) -> ResourceSettlement {
        let mut clock = MockClockPort::new();
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap();
        clock.expect_now().returning(move || now);
        ResourceSettlement::new(
            Arc::new(ledger),
            discoveries,
            Arc::new(clock),
            Arc::new(ScriptedRandom::new(&[])),
            "worm",
        )
    }

    #[tokio::test]
    async fn catch_consumes_bait_and_records_discovery() {
        let mut ledger = MockLedgerPort::new();
        ledger
            .expect_consume()
            .with(
                eq(PlayerId::new(7)),
                eq(RealmId::new(70)),
                eq("worm"),
                eq(1u32),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(true));
        ledger.expect_degrade_or_break_tool().never();
        ledger
            .expect_grant_catch()
            .withf(|_, _, record| record.species_id == "carp")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let discoveries = Arc::new(DiscoveryStore::new());
        let settlement = settlement(ledger, discoveries.clone());

        let receipt = settlement
            .settle(&resolution(
                Outcome::Caught {
                    candidate: candidate("carp", 1),
                },
                0,
                false,
            ))
            .await
            .unwrap();

        assert!(receipt.consumed);
        assert!(receipt.wear.is_none());
        assert!(receipt.first_discovery);
        assert_eq!(receipt.catch.unwrap().species_id, "carp");
        let log = discoveries.get(RealmId::new(70)).unwrap();
        assert_eq!(log.discovered_count(), 1);
    }

    #[tokio::test]
    async fn loss_is_applied_to_the_snapshotted_tool() {
        let mut ledger = MockLedgerPort::new();
        ledger.expect_consume().returning(|_, _, _, _| Ok(true));
        ledger
            .expect_degrade_or_break_tool()
            .with(always(), always(), eq("rod-1"), eq(10u32))
            .times(1)
            .returning(|_, _, _, _| {
                Ok(ToolWear {
                    broken: true,
                    remaining: 0,
                })
            });
        ledger.expect_grant_catch().never();

        let settlement = settlement(ledger, Arc::new(DiscoveryStore::new()));
        let receipt = settlement
            .settle(&resolution(Outcome::Escaped, 10, true))
            .await
            .unwrap();

        assert_eq!(
            receipt.wear,
            Some(ToolWear {
                broken: true,
                remaining: 0
            })
        );
    }

    #[tokio::test]
    async fn trash_grants_one_item() {
        let mut ledger = MockLedgerPort::new();
        ledger.expect_consume().returning(|_, _, _, _| Ok(true));
        ledger
            .expect_grant_item()
            .with(always(), always(), eq("old_boot"), eq(1u32))
            .times(1)
            .returning(|_, _, _, _| Ok(()));

        let settlement = settlement(ledger, Arc::new(DiscoveryStore::new()));
        let item = TrashItem {
            id: "old_boot".to_string(),
            name: "Old Boot".to_string(),
            emoji: None,
        };
        let receipt = settlement
            .settle(&resolution(Outcome::Trash { item }, 0, false))
            .await
            .unwrap();

        assert_eq!(receipt.trash_item.as_deref(), Some("old_boot"));
        assert!(receipt.catch.is_none());
    }

    #[tokio::test]
    async fn ledger_failure_stops_settlement() {
        let mut ledger = MockLedgerPort::new();
        ledger
            .expect_consume()
            .returning(|_, _, _, _| Err(LedgerError::backend("consume", "offline")));
        ledger.expect_grant_catch().never();

        let settlement = settlement(ledger, Arc::new(DiscoveryStore::new()));
        let result = settlement
            .settle(&resolution(
                Outcome::Caught {
                    candidate: candidate("carp", 1),
                },
                0,
                false,
            ))
            .await;
        assert!(matches!(result, Err(LedgerError::Backend { .. })));
    }

    #[tokio::test]
    async fn wear_failure_still_grants_the_catch() {
        let mut ledger = MockLedgerPort::new();
        ledger.expect_consume().returning(|_, _, _, _| Ok(true));
        ledger
            .expect_degrade_or_break_tool()
            .times(1)
            .returning(|_, _, _, _| {
                Err(LedgerError::backend(
                    "degrade_or_break_tool",
                    "tool 'rod-1' is not equipped",
                ))
            });
        ledger
            .expect_grant_catch()
            .withf(|_, _, record| record.species_id == "pike")
            .times(1)
            .returning(|_, _, _| Ok(()));

        let settlement = settlement(ledger, Arc::new(DiscoveryStore::new()));
        let receipt = settlement
            .settle(&resolution(
                Outcome::Caught {
                    candidate: candidate("pike", 3),
                },
                3,
                false,
            ))
            .await
            .unwrap();

        assert!(receipt.wear.is_none());
        assert_eq!(receipt.catch.unwrap().species_id, "pike");
        assert!(receipt.first_discovery);
    }
}
