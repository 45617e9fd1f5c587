//! Stage controller - drives a fishing session through its stages.
//!
//! Player actions (`begin`, `shake`, `choice`, `again`) and timer callbacks
//! all go through the session's lock. Every exit from a stage cancels the
//! timers of that stage before anything new is scheduled, and every timer
//! callback re-checks its token and the stage after acquiring the lock, so a
//! callback that lost a race with a transition does nothing.

use std::sync::{Arc, Weak};

use castline_domain::{
    pick_index, resolve_cast, CastConditions, CastOutcome, Catalog, ChoiceEffect, FishingRules,
    Outcome, SessionKey, SessionState, SessionView, Stage,
};

use crate::infrastructure::timers::{TimerSlot, TimerToken};
use crate::stores::{LiveSession, SessionCell, SessionRegistry};

use super::error::FishingError;
use super::settlement::ResourceSettlement;
use super::types::{ActionOutcome, FishingPorts, StaleAction};

pub struct StageController {
    registry: Arc<SessionRegistry>,
    ports: FishingPorts,
    catalog: Arc<Catalog>,
    rules: FishingRules,
    settlement: ResourceSettlement,
}

impl StageController {
    pub fn new(
        registry: Arc<SessionRegistry>,
        ports: FishingPorts,
        catalog: Arc<Catalog>,
        rules: FishingRules,
        settlement: ResourceSettlement,
    ) -> Self {
        Self {
            registry,
            ports,
            catalog,
            rules,
            settlement,
        }
    }

    pub fn rules(&self) -> &FishingRules {
        &self.rules
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Start a session, replacing any live one for the same key.
    pub async fn begin(self: &Arc<Self>, key: SessionKey) -> Result<SessionView, FishingError> {
        let inventory = self
            .ports
            .ledger
            .get_inventory(key.player_id, key.realm_id)
            .await?;
        let now = self.ports.clock.now();
        let mut state = SessionState::open(key, &inventory, self.rules.inventory_capacity, now)
            .map_err(|rejection| {
                tracing::info!(
                    player_id = %key.player_id,
                    realm_id = %key.realm_id,
                    reason = %rejection,
                    "Fishing begin rejected"
                );
                FishingError::Rejected(rejection)
            })?;

        let wait = self.rules.wait_for_roll(self.ports.random.gen_unit());
        let deadline = state.start_waiting(wait, now);

        let cell = self.registry.begin(LiveSession::new(state)).await;
        let mut session = cell.lock().await;
        let view = self.arm_wait(&cell, &mut session, wait).await?;

        tracing::info!(
            player_id = %key.player_id,
            realm_id = %key.realm_id,
            wait_ms = wait.as_millis() as u64,
            deadline = %deadline,
            "Fishing session started"
        );
        Ok(view)
    }

    /// Shorten the wait. Rate limited by the shake cooldown.
    pub async fn shake(self: &Arc<Self>, key: SessionKey) -> ActionOutcome {
        let Some(cell) = self.registry.get(&key) else {
            return ActionOutcome::Ignored(StaleAction::NoSession);
        };
        let mut session = cell.lock().await;

        let stage = session.state.stage();
        if stage != Stage::Waiting {
            return ActionOutcome::Ignored(StaleAction::WrongStage { stage });
        }
        if session.timers.is_active(TimerSlot::ShakeCooldown) {
            return ActionOutcome::Ignored(StaleAction::CoolingDown);
        }

        let now = self.ports.clock.now();
        let decrement = self.rules.shake_decrement();
        let Some(remaining) = session.state.shorten_wait(decrement, now) else {
            return ActionOutcome::Ignored(StaleAction::WrongStage { stage });
        };
        self.schedule_wait(&cell, &mut session, remaining);
        self.schedule_shake_cooldown(&cell, &mut session);

        tracing::debug!(
            player_id = %key.player_id,
            realm_id = %key.realm_id,
            remaining_ms = remaining.as_millis() as u64,
            "Shake shortened the wait"
        );
        self.applied(&cell, &mut session).await
    }

    /// Pick a target while biting.
    pub async fn choice(self: &Arc<Self>, key: SessionKey, index: u32) -> ActionOutcome {
        let Some(cell) = self.registry.get(&key) else {
            return ActionOutcome::Ignored(StaleAction::NoSession);
        };
        let mut session = cell.lock().await;

        let stage = session.state.stage();
        if stage != Stage::Biting {
            return ActionOutcome::Ignored(StaleAction::WrongStage { stage });
        }
        let target_count = session.state.target_count();
        if index >= target_count {
            return ActionOutcome::Ignored(StaleAction::TargetOutOfRange {
                index,
                target_count,
            });
        }

        match session.state.apply_choice(index) {
            None => ActionOutcome::Ignored(StaleAction::WrongStage { stage }),
            Some(ChoiceEffect::Hit {
                completed: true, ..
            }) => match session.state.candidate().cloned() {
                Some(candidate) => {
                    let view = self
                        .finish(&cell, &mut session, Outcome::Caught { candidate })
                        .await;
                    ActionOutcome::Applied(view)
                }
                None => {
                    tracing::error!(session = %key, "Biting session has no candidate, abandoning");
                    self.abandon_locked(&cell, &mut session);
                    ActionOutcome::Ignored(StaleAction::NoSession)
                }
            },
            Some(ChoiceEffect::Hit { progress, .. }) => {
                let next = self.roll_target(target_count);
                session.state.relocate_target(next);
                self.schedule_relocation(&cell, &mut session);
                tracing::debug!(
                    session = %key,
                    progress,
                    required = session.state.required_progress(),
                    "Correct choice"
                );
                self.applied(&cell, &mut session).await
            }
            Some(ChoiceEffect::Miss { loss, broken }) => {
                tracing::debug!(session = %key, loss, broken, "Wrong choice");
                if broken {
                    let view = self.finish(&cell, &mut session, Outcome::Escaped).await;
                    ActionOutcome::Applied(view)
                } else {
                    self.applied(&cell, &mut session).await
                }
            }
        }
    }

    /// Begin again once the previous session has resolved.
    pub async fn again(self: &Arc<Self>, key: SessionKey) -> Result<ActionOutcome, FishingError> {
        if self.registry.contains(&key) {
            return Ok(ActionOutcome::Ignored(StaleAction::SessionActive));
        }
        self.begin(key).await.map(ActionOutcome::Applied)
    }

    /// Purge a session whose surface went away. No settlement.
    pub async fn abandon(&self, key: SessionKey) -> bool {
        let purged = self.registry.terminate(&key).await;
        if purged {
            tracing::info!(session = %key, "Fishing session abandoned");
        }
        purged
    }

    pub async fn current_view(&self, key: SessionKey) -> Option<SessionView> {
        let cell = self.registry.get(&key)?;
        let session = cell.lock().await;
        Some(session.state.view())
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Schedule the first wait of a freshly registered session and show it.
    ///
    /// Fails if the session was replaced before its lock was taken, or if the
    /// surface is gone (the session is abandoned).
    pub(super) async fn arm_wait(
        self: &Arc<Self>,
        cell: &SessionCell,
        session: &mut LiveSession,
        wait: std::time::Duration,
    ) -> Result<SessionView, FishingError> {
        if session.state.stage() != Stage::Waiting {
            tracing::debug!(session = %session.state.key(), "Session replaced before it started");
            return Err(FishingError::Superseded);
        }
        self.schedule_wait(cell, session, wait);
        let view = session.state.view();
        if !self.publish(cell, session).await {
            return Err(FishingError::SurfaceUnreachable);
        }
        Ok(view)
    }

    fn schedule_wait(
        self: &Arc<Self>,
        cell: &SessionCell,
        session: &mut LiveSession,
        delay: std::time::Duration,
    ) {
        let controller = Arc::downgrade(self);
        let cell = cell.clone();
        session
            .timers
            .schedule_once(TimerSlot::Wait, delay, move |token| async move {
                if let Some(controller) = controller.upgrade() {
                    controller.on_wait_elapsed(cell, token).await;
                }
            });
    }

    fn schedule_shake_cooldown(self: &Arc<Self>, cell: &SessionCell, session: &mut LiveSession) {
        let cell = Arc::downgrade(cell);
        session.timers.schedule_once(
            TimerSlot::ShakeCooldown,
            self.rules.shake_cooldown(),
            move |token| async move {
                if let Some(cell) = cell.upgrade() {
                    cell.lock()
                        .await
                        .timers
                        .complete(TimerSlot::ShakeCooldown, token);
                }
            },
        );
    }

    fn schedule_watchdog(self: &Arc<Self>, cell: &SessionCell, session: &mut LiveSession) {
        let controller = Arc::downgrade(self);
        let cell = cell.clone();
        session.timers.schedule_once(
            TimerSlot::Watchdog,
            self.rules.game_duration(),
            move |token| async move {
                if let Some(controller) = controller.upgrade() {
                    controller.on_watchdog(cell, token).await;
                }
            },
        );
    }

    /// (Re)start the relocation interval, measured from now.
    fn schedule_relocation(self: &Arc<Self>, cell: &SessionCell, session: &mut LiveSession) {
        let controller: Weak<Self> = Arc::downgrade(self);
        let cell = cell.clone();
        session.timers.schedule_every(
            TimerSlot::Relocation,
            self.rules.relocation_interval(),
            move |token| {
                let controller = controller.clone();
                let cell = cell.clone();
                async move {
                    match controller.upgrade() {
                        Some(controller) => controller.on_relocation_tick(cell, token).await,
                        None => false,
                    }
                }
            },
        );
    }

    // =========================================================================
    // Timer callbacks
    // =========================================================================

    async fn on_wait_elapsed(self: Arc<Self>, cell: SessionCell, token: TimerToken) {
        let mut session = cell.lock().await;
        if !session.timers.complete(TimerSlot::Wait, token)
            || session.state.stage() != Stage::Waiting
        {
            return;
        }
        session.timers.cancel(TimerSlot::ShakeCooldown);

        if let Err(e) = self.cast(&cell, &mut session).await {
            tracing::error!(
                session = %session.state.key(),
                error = %e,
                "Wait timer failed, abandoning session"
            );
            self.abandon_locked(&cell, &mut session);
        }
    }

    async fn on_watchdog(self: Arc<Self>, cell: SessionCell, token: TimerToken) {
        let mut session = cell.lock().await;
        if !session.timers.complete(TimerSlot::Watchdog, token)
            || session.state.stage() != Stage::Biting
        {
            return;
        }

        let broken = session.state.apply_timeout(self.rules.fail_penalty);
        tracing::debug!(
            session = %session.state.key(),
            progress = session.state.progress(),
            required = session.state.required_progress(),
            broken,
            "Biting deadline elapsed"
        );
        self.finish(&cell, &mut session, Outcome::Escaped).await;
    }

    /// Returns false to stop the interval.
    async fn on_relocation_tick(self: Arc<Self>, cell: SessionCell, token: TimerToken) -> bool {
        let mut session = cell.lock().await;
        if !session.timers.is_current(TimerSlot::Relocation, token)
            || session.state.stage() != Stage::Biting
        {
            return false;
        }
        let next = self.roll_target(session.state.target_count());
        session.state.relocate_target(next);
        tracing::trace!(session = %session.state.key(), target = next, "Target relocated");
        self.publish(&cell, &mut session).await
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Waiting -> Biting, or straight to resolution for trash and auto-success.
    async fn cast(
        self: &Arc<Self>,
        cell: &SessionCell,
        session: &mut LiveSession,
    ) -> Result<(), FishingError> {
        let conditions = CastConditions {
            season: self.ports.environment.season(),
            catch_multiplier: self.ports.environment.catch_multiplier(),
            mutation_active: self.ports.environment.mutation_active(),
        };
        let outcome = {
            let random = &self.ports.random;
            let mut roll = || random.gen_unit();
            resolve_cast(&self.catalog, &self.rules, conditions, &mut roll)?
        };

        let (candidate, fallback) = match outcome {
            CastOutcome::Trash(item) => {
                self.finish(cell, session, Outcome::Trash { item }).await;
                return Ok(());
            }
            CastOutcome::Candidate {
                candidate,
                fallback,
            } => (candidate, fallback),
        };

        if fallback {
            tracing::warn!(
                season = %conditions.season,
                species_id = %candidate.species_id,
                "Malformed candidate table, drew a species uniformly"
            );
        }

        if session.state.tool().power >= candidate.power_requirement {
            session.state.hook(candidate.clone());
            let outcome = Outcome::Caught { candidate };
            self.finish(cell, session, outcome).await;
            return Ok(());
        }

        let target_count = self.rules.difficulty.target_count(candidate.rarity);
        let required = self.rules.required_progress(candidate.power_requirement);
        let target_index = self.roll_target(target_count);
        let deadline = self.ports.clock.now()
            + chrono::Duration::milliseconds(
                self.rules.game_duration_ms.min(i64::MAX as u64) as i64,
            );
        tracing::debug!(
            session = %session.state.key(),
            species_id = %candidate.species_id,
            rarity = %candidate.rarity,
            target_count,
            required,
            "Fish is biting"
        );
        session
            .state
            .enter_biting(candidate, target_count, required, target_index, deadline);
        self.schedule_watchdog(cell, session);
        self.schedule_relocation(cell, session);
        self.publish(cell, session).await;
        Ok(())
    }

    /// Terminal resolution: cancel timers, settle, render, purge.
    async fn finish(
        &self,
        cell: &SessionCell,
        session: &mut LiveSession,
        outcome: Outcome,
    ) -> SessionView {
        session.timers.cancel_all();
        let resolution = session.state.resolve(outcome);
        let key = resolution.key;

        tracing::info!(
            player_id = %key.player_id,
            realm_id = %key.realm_id,
            outcome = resolution.outcome.label(),
            loss = resolution.loss,
            tool_broken = resolution.tool_broken,
            "Fishing session resolved"
        );

        match self.settlement.settle(&resolution).await {
            Ok(receipt) => tracing::debug!(
                session = %key,
                consumed = receipt.consumed,
                first_discovery = receipt.first_discovery,
                "Settlement committed"
            ),
            Err(e) => tracing::error!(session = %key, error = %e, "Settlement failed"),
        }

        let view = session.state.view();
        if let Err(e) = self.ports.presenter.render(&view).await {
            tracing::warn!(session = %key, error = %e, "Could not render resolution");
        }
        session.close();
        self.registry.release(&key, cell);
        view
    }

    /// Purge without settlement. Caller holds the lock.
    fn abandon_locked(&self, cell: &SessionCell, session: &mut LiveSession) {
        let key = session.state.key();
        session.close();
        self.registry.release(&key, cell);
    }

    /// Render the current view. An unreachable surface abandons the session.
    async fn publish(&self, cell: &SessionCell, session: &mut LiveSession) -> bool {
        let view = session.state.view();
        match self.ports.presenter.render(&view).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    session = %session.state.key(),
                    stage = %view.stage,
                    error = %e,
                    "Presentation surface unreachable, abandoning session"
                );
                self.abandon_locked(cell, session);
                false
            }
        }
    }

    async fn applied(&self, cell: &SessionCell, session: &mut LiveSession) -> ActionOutcome {
        let view = session.state.view();
        self.publish(cell, session).await;
        ActionOutcome::Applied(view)
    }

    fn roll_target(&self, target_count: u32) -> u32 {
        let random = &self.ports.random;
        pick_index(target_count, &mut || random.gen_unit())
    }
}
