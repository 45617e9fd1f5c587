//! Stage controller scenarios on a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use castline_domain::{
    BeginRejection, Catalog, FishingRules, MissingEquipment, Outcome, PlayerId, RealmId, Season,
    SessionKey, SessionState, Stage, ToolSnapshot,
};
use chrono::Utc;

use super::*;
use crate::infrastructure::clock::RuntimeClock;
use crate::infrastructure::ledger::InMemoryLedger;
use crate::infrastructure::ports::{LedgerPort, MockEnvironmentPort};
use crate::stores::{DiscoveryStore, LiveSession, SessionRegistry};
use crate::test_fixtures::{
    catalog_of, species, tool, trash, RecordingPresenter, ScriptedRandom,
};

const PLAYER: PlayerId = PlayerId::new(11);
const REALM: RealmId = RealmId::new(22);

fn key() -> SessionKey {
    SessionKey::new(PLAYER, REALM)
}

struct Harness {
    controller: Arc<StageController>,
    ledger: Arc<InMemoryLedger>,
    presenter: Arc<RecordingPresenter>,
    registry: Arc<SessionRegistry>,
    discoveries: Arc<DiscoveryStore>,
}

fn certain_catch_rules() -> FishingRules {
    FishingRules {
        base_catch_chance: 1.0,
        ..FishingRules::default()
    }
}

fn harness(catalog: Catalog, rules: FishingRules, random: ScriptedRandom) -> Harness {
    let ledger = Arc::new(InMemoryLedger::new(rules.bait_id.clone()));
    let presenter = Arc::new(RecordingPresenter::new());
    let registry = Arc::new(SessionRegistry::new());
    let discoveries = Arc::new(DiscoveryStore::new());

    let mut environment = MockEnvironmentPort::new();
    environment.expect_season().returning(|| Season::Spring);
    environment.expect_catch_multiplier().returning(|| 1.0);
    environment.expect_mutation_active().returning(|| false);

    let ports = FishingPorts {
        ledger: ledger.clone(),
        presenter: presenter.clone(),
        environment: Arc::new(environment),
        clock: Arc::new(RuntimeClock::new()),
        random: Arc::new(random),
    };
    let settlement = ResourceSettlement::new(
        ports.ledger.clone(),
        discoveries.clone(),
        ports.clock.clone(),
        ports.random.clone(),
        rules.bait_id.clone(),
    );
    let controller = Arc::new(StageController::new(
        registry.clone(),
        ports,
        Arc::new(catalog),
        rules,
        settlement,
    ));

    Harness {
        controller,
        ledger,
        presenter,
        registry,
        discoveries,
    }
}

/// Carp lands without the mini-game for a power-1 rod.
fn carp_only() -> Catalog {
    catalog_of(
        vec![species("carp", castline_domain::Rarity::Common, 1, 1)],
        vec![],
    )
}

/// Pike needs power 3 and costs 3 durability per miss; rare means 4 targets.
fn pike_only() -> Catalog {
    catalog_of(
        vec![species("pike", castline_domain::Rarity::Rare, 3, 3)],
        vec![],
    )
}

impl Harness {
    fn equip(&self, power: u32, durability: u32, bait: u32) {
        self.ledger.equip(PLAYER, REALM, tool(power, durability));
        self.ledger.stock(PLAYER, REALM, "worm", bait);
    }

    async fn begin(&self) -> castline_domain::SessionView {
        self.controller.begin(key()).await.unwrap()
    }

    async fn stage(&self) -> Option<Stage> {
        self.controller
            .current_view(key())
            .await
            .map(|view| view.stage)
    }

    fn bait(&self) -> u32 {
        self.ledger.item_count(PLAYER, REALM, "worm")
    }

    async fn inventory(&self) -> castline_domain::PlayerInventory {
        self.ledger.get_inventory(PLAYER, REALM).await.unwrap()
    }
}

async fn advance(millis: u64) {
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

#[tokio::test(start_paused = true)]
async fn power_meeting_requirement_resolves_without_biting() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 3);

    let view = h.begin().await;
    assert_eq!(view.stage, Stage::Waiting);
    assert_eq!(view.consumable_count, 3);

    advance(4_900).await;
    assert_eq!(h.stage().await, Some(Stage::Waiting));
    advance(200).await;

    assert_eq!(h.stage().await, None);
    assert_eq!(h.presenter.stages(), vec![Stage::Waiting, Stage::Resolving]);
    let resolution = h.presenter.last().unwrap().resolution.unwrap();
    assert!(matches!(resolution.outcome, Outcome::Caught { .. }));
    assert_eq!(resolution.loss, 0);

    let inventory = h.inventory().await;
    assert_eq!(inventory.catches.len(), 1);
    assert_eq!(inventory.consumables, 2);
    assert_eq!(inventory.tool.unwrap().durability, 10);
    assert_eq!(h.discoveries.get(REALM).unwrap().discovered_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn fourth_miss_breaks_the_rod() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 3);
    h.begin().await;
    advance(5_100).await;
    assert_eq!(h.stage().await, Some(Stage::Biting));

    for expected_loss in [3, 6, 9] {
        let outcome = h.controller.choice(key(), 1).await;
        let view = outcome.view().unwrap();
        assert_eq!(view.stage, Stage::Biting);
        assert_eq!(view.accumulated_loss, expected_loss);
        assert_eq!(view.target_count, 4);
    }

    let outcome = h.controller.choice(key(), 1).await;
    let view = outcome.view().unwrap();
    assert_eq!(view.stage, Stage::Resolving);
    let resolution = view.resolution.as_ref().unwrap();
    assert_eq!(resolution.outcome, Outcome::Escaped);
    assert!(resolution.tool_broken);
    assert_eq!(resolution.loss, 10);

    assert!(h.registry.is_empty());
    let inventory = h.inventory().await;
    assert!(inventory.tool.is_none());
    assert_eq!(inventory.consumables, 2);
    assert!(inventory.catches.is_empty());
}

#[tokio::test(start_paused = true)]
async fn correct_choices_fill_progress_until_caught() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(2, 10, 1);
    h.begin().await;
    advance(5_100).await;

    let view = h.controller.current_view(key()).await.unwrap();
    assert_eq!(view.required_progress, 9);
    assert_eq!(view.target_index, 0);

    for expected in [2, 4, 6, 8] {
        let outcome = h.controller.choice(key(), 0).await;
        assert_eq!(outcome.view().unwrap().progress, expected);
    }
    let outcome = h.controller.choice(key(), 0).await;
    let view = outcome.view().unwrap();
    assert_eq!(view.stage, Stage::Resolving);
    assert!(matches!(
        view.resolution.as_ref().unwrap().outcome,
        Outcome::Caught { .. }
    ));

    let inventory = h.inventory().await;
    assert_eq!(inventory.catches.len(), 1);
    assert_eq!(inventory.tool.unwrap().durability, 10);
}

#[tokio::test(start_paused = true)]
async fn watchdog_fails_the_attempt_with_penalty() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 1);
    h.begin().await;
    advance(5_100).await;
    assert_eq!(h.stage().await, Some(Stage::Biting));

    advance(14_800).await;
    assert_eq!(h.stage().await, Some(Stage::Biting));
    advance(300).await;

    assert!(h.registry.is_empty());
    let resolution = h.presenter.last().unwrap().resolution.unwrap();
    assert_eq!(resolution.outcome, Outcome::Escaped);
    assert_eq!(resolution.loss, 1);
    assert!(!resolution.tool_broken);
    assert_eq!(h.inventory().await.tool.unwrap().durability, 9);
}

#[tokio::test(start_paused = true)]
async fn hit_restarts_the_relocation_interval() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 1);
    h.begin().await;
    advance(5_000).await;
    advance(1_000).await;

    assert!(h.controller.choice(key(), 0).await.is_applied());
    let published = h.presenter.views().len();

    // The original cadence would have ticked 1.5s after biting began.
    advance(1_000).await;
    assert_eq!(h.presenter.views().len(), published);
    advance(600).await;
    assert_eq!(h.presenter.views().len(), published + 1);
}

#[tokio::test(start_paused = true)]
async fn shake_is_rate_limited_by_cooldown() {
    let random = ScriptedRandom::new(&[1.0]);
    let h = harness(carp_only(), certain_catch_rules(), random);
    h.equip(1, 10, 1);
    h.begin().await;

    assert!(h.controller.shake(key()).await.is_applied());
    assert_eq!(
        h.controller.shake(key()).await,
        ActionOutcome::Ignored(StaleAction::CoolingDown)
    );

    advance(3_100).await;
    assert!(h.controller.shake(key()).await.is_applied());

    // 15s wait, minus 2s, minus 3.1s elapsed, minus 2s: fires at 11.0s.
    advance(7_800).await;
    assert_eq!(h.stage().await, Some(Stage::Waiting));
    advance(200).await;
    assert_eq!(h.stage().await, None);
    assert_eq!(h.inventory().await.catches.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn actions_in_the_wrong_stage_are_ignored() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 1);

    assert_eq!(
        h.controller.choice(key(), 0).await,
        ActionOutcome::Ignored(StaleAction::NoSession)
    );

    h.begin().await;
    assert_eq!(
        h.controller.choice(key(), 0).await,
        ActionOutcome::Ignored(StaleAction::WrongStage {
            stage: Stage::Waiting
        })
    );

    advance(5_100).await;
    assert_eq!(
        h.controller.shake(key()).await,
        ActionOutcome::Ignored(StaleAction::WrongStage {
            stage: Stage::Biting
        })
    );
    assert_eq!(
        h.controller.choice(key(), 4).await,
        ActionOutcome::Ignored(StaleAction::TargetOutOfRange {
            index: 4,
            target_count: 4
        })
    );
    let view = h.controller.current_view(key()).await.unwrap();
    assert_eq!(view.progress, 0);
    assert_eq!(view.accumulated_loss, 0);
}

#[tokio::test]
async fn begin_rejections_create_no_session() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));

    assert!(matches!(
        h.controller.begin(key()).await,
        Err(FishingError::Rejected(BeginRejection::EquipmentMissing(
            MissingEquipment::Tool
        )))
    ));

    h.ledger.equip(PLAYER, REALM, tool(1, 10));
    assert!(matches!(
        h.controller.begin(key()).await,
        Err(FishingError::Rejected(BeginRejection::EquipmentMissing(
            MissingEquipment::Consumable
        )))
    ));
    assert!(h.registry.is_empty());
}

#[tokio::test]
async fn full_inventory_rejects_begin() {
    let rules = FishingRules {
        inventory_capacity: 2,
        ..certain_catch_rules()
    };
    let h = harness(carp_only(), rules, ScriptedRandom::new(&[]));
    h.equip(1, 10, 5);
    h.ledger.restore_catches(vec![crate::infrastructure::ports::PlayerCatches {
        player_id: PLAYER,
        realm_id: REALM,
        catches: vec![
            crate::test_fixtures::catch_record("carp", 1.0),
            crate::test_fixtures::catch_record("carp", 2.0),
        ],
    }]);

    let result = h.controller.begin(key()).await;
    assert!(matches!(
        result,
        Err(FishingError::Rejected(BeginRejection::InventoryFull {
            current: 2,
            capacity: 2
        }))
    ));
    assert!(h.registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn replacing_a_session_never_resolves_the_old_one() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 3);
    h.begin().await;
    advance(3_000).await;
    h.begin().await;

    // The first session's wait would have fired at 5s.
    advance(3_000).await;
    assert_eq!(h.stage().await, Some(Stage::Waiting));
    assert_eq!(h.inventory().await.catches.len(), 0);

    advance(2_100).await;
    assert_eq!(h.stage().await, None);
    let inventory = h.inventory().await;
    assert_eq!(inventory.catches.len(), 1);
    assert_eq!(inventory.consumables, 2);
}

#[tokio::test(start_paused = true)]
async fn failed_catch_roll_grants_trash() {
    let rules = FishingRules {
        base_catch_chance: 0.5,
        ..FishingRules::default()
    };
    let catalog = catalog_of(
        vec![species("carp", castline_domain::Rarity::Common, 1, 1)],
        vec![trash("old_boot"), trash("tin_can")],
    );
    // wait roll, catch roll above the chance, trash pick
    let h = harness(catalog, rules, ScriptedRandom::new(&[0.0, 0.9, 0.0]));
    h.equip(1, 10, 1);
    h.begin().await;
    advance(5_100).await;

    let resolution = h.presenter.last().unwrap().resolution.unwrap();
    let Outcome::Trash { item } = resolution.outcome else {
        panic!("expected trash");
    };
    assert_eq!(item.id, "old_boot");
    assert_eq!(h.ledger.item_count(PLAYER, REALM, "old_boot"), 1);
    assert_eq!(h.bait(), 0);
    assert!(h.inventory().await.catches.is_empty());
}

#[tokio::test(start_paused = true)]
async fn unreachable_surface_purges_without_settlement() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 2);
    h.begin().await;
    advance(5_100).await;
    assert_eq!(h.stage().await, Some(Stage::Biting));

    h.presenter.set_unreachable(true);
    advance(1_500).await;
    assert!(h.registry.is_empty());

    advance(20_000).await;
    assert_eq!(h.bait(), 2);
    assert_eq!(h.inventory().await.tool.unwrap().durability, 10);
}

#[tokio::test(start_paused = true)]
async fn again_waits_for_resolution() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 2);
    h.begin().await;

    assert_eq!(
        h.controller.again(key()).await.unwrap(),
        ActionOutcome::Ignored(StaleAction::SessionActive)
    );

    advance(5_100).await;
    let outcome = h.controller.again(key()).await.unwrap();
    assert_eq!(outcome.view().unwrap().stage, Stage::Waiting);
    assert_eq!(h.bait(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandon_cancels_pending_timers() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 1);
    h.begin().await;

    assert!(h.controller.abandon(key()).await);
    assert!(!h.controller.abandon(key()).await);
    advance(10_000).await;
    assert_eq!(h.bait(), 1);
    assert!(h.inventory().await.catches.is_empty());
}

#[tokio::test(start_paused = true)]
async fn rod_swapped_mid_game_still_lands_the_catch() {
    let h = harness(pike_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(2, 10, 1);
    h.begin().await;
    advance(5_100).await;

    let miss = h.controller.choice(key(), 1).await;
    assert_eq!(miss.view().unwrap().accumulated_loss, 3);

    let spare = ToolSnapshot {
        item_id: "rod-2".to_string(),
        ..tool(2, 10)
    };
    h.ledger.equip(PLAYER, REALM, spare);

    for _ in 0..5 {
        h.controller.choice(key(), 0).await;
    }

    let resolution = h.presenter.last().unwrap().resolution.unwrap();
    assert!(matches!(resolution.outcome, Outcome::Caught { .. }));
    let inventory = h.inventory().await;
    assert_eq!(inventory.catches.len(), 1);
    assert_eq!(inventory.consumables, 0);
    let rod = inventory.tool.unwrap();
    assert_eq!(rod.item_id, "rod-2");
    assert_eq!(rod.durability, 10);
}

#[tokio::test(start_paused = true)]
async fn begin_on_unreachable_surface_reports_no_session() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 1);
    h.presenter.set_unreachable(true);

    let result = h.controller.begin(key()).await;
    assert!(matches!(result, Err(FishingError::SurfaceUnreachable)));
    assert!(h.registry.is_empty());

    advance(20_000).await;
    assert_eq!(h.bait(), 1);
    assert!(h.inventory().await.catches.is_empty());
}

#[tokio::test(start_paused = true)]
async fn session_replaced_before_arming_is_left_idle() {
    let h = harness(carp_only(), certain_catch_rules(), ScriptedRandom::new(&[]));
    h.equip(1, 10, 2);

    let wait = Duration::from_secs(5);
    let now = Utc::now();
    let inventory = h.inventory().await;
    let mut state = SessionState::open(key(), &inventory, 100, now).unwrap();
    state.start_waiting(wait, now);
    let stale = h.registry.begin(LiveSession::new(state)).await;

    let newer = h.begin().await;
    assert_eq!(newer.stage, Stage::Waiting);

    let mut session = stale.lock().await;
    let result = h.controller.arm_wait(&stale, &mut session, wait).await;
    assert!(matches!(result, Err(FishingError::Superseded)));
    assert_eq!(session.timers.active_count(), 0);
    drop(session);
    assert_eq!(h.presenter.stages(), vec![Stage::Waiting]);

    advance(5_100).await;
    assert_eq!(h.inventory().await.catches.len(), 1);
    assert_eq!(h.bait(), 1);
}
