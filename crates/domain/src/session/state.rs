//! Per-player session record and its stage transitions
//!
//! `SessionState` enforces the invariants that do not depend on timers:
//! a single stage at a time, monotonically non-decreasing loss, and progress
//! that only moves on a correct choice while biting. Scheduling lives in the
//! engine; every method here is synchronous and deterministic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::SessionView;
use crate::entities::{CatchCandidate, PlayerInventory, ToolSnapshot, TrashItem};
use crate::error::{BeginRejection, MissingEquipment};
use crate::{PlayerId, RealmId};

/// Exactly one live session may exist per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub player_id: PlayerId,
    pub realm_id: RealmId,
}

impl SessionKey {
    pub fn new(player_id: PlayerId, realm_id: RealmId) -> Self {
        Self {
            player_id,
            realm_id,
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.player_id, self.realm_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Waiting,
    Biting,
    Resolving,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Waiting => write!(f, "waiting"),
            Self::Biting => write!(f, "biting"),
            Self::Resolving => write!(f, "resolving"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Caught { candidate: CatchCandidate },
    /// The fish got away: watchdog deadline or a broken tool
    Escaped,
    Trash { item: TrashItem },
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Caught { .. } => "caught",
            Self::Escaped => "escaped",
            Self::Trash { .. } => "trash",
        }
    }
}

/// Terminal result of an attempt, handed to settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub key: SessionKey,
    pub outcome: Outcome,
    /// Tool as snapshotted at begin
    pub tool: ToolSnapshot,
    /// Durability loss to commit
    pub loss: u32,
    pub tool_broken: bool,
}

/// Effect of a choice made during the biting game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceEffect {
    Hit { progress: u32, completed: bool },
    Miss { loss: u32, broken: bool },
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(duration.as_millis().min(i64::MAX as u128) as i64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    key: SessionKey,
    stage: Stage,
    tool: ToolSnapshot,
    consumable_count: u32,
    candidate: Option<CatchCandidate>,
    progress: u32,
    required_progress: u32,
    accumulated_loss: u32,
    target_index: u32,
    target_count: u32,
    deadline: Option<DateTime<Utc>>,
    started_at: DateTime<Utc>,
    resolution: Option<Resolution>,
}

impl SessionState {
    /// Check begin preconditions and snapshot the equipment.
    pub fn open(
        key: SessionKey,
        inventory: &PlayerInventory,
        capacity: usize,
        now: DateTime<Utc>,
    ) -> Result<Self, BeginRejection> {
        if inventory.catches.len() >= capacity {
            return Err(BeginRejection::InventoryFull {
                current: inventory.catches.len(),
                capacity,
            });
        }
        let tool = match &inventory.tool {
            Some(tool) if tool.is_usable() => tool.clone(),
            _ => return Err(BeginRejection::EquipmentMissing(MissingEquipment::Tool)),
        };
        if inventory.consumables == 0 {
            return Err(BeginRejection::EquipmentMissing(
                MissingEquipment::Consumable,
            ));
        }

        Ok(Self {
            key,
            stage: Stage::Idle,
            tool,
            consumable_count: inventory.consumables,
            candidate: None,
            progress: 0,
            required_progress: 0,
            accumulated_loss: 0,
            target_index: 0,
            target_count: 0,
            deadline: None,
            started_at: now,
            resolution: None,
        })
    }

    pub fn key(&self) -> SessionKey {
        self.key
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn tool(&self) -> &ToolSnapshot {
        &self.tool
    }

    pub fn candidate(&self) -> Option<&CatchCandidate> {
        self.candidate.as_ref()
    }

    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn required_progress(&self) -> u32 {
        self.required_progress
    }

    pub fn accumulated_loss(&self) -> u32 {
        self.accumulated_loss
    }

    pub fn target_index(&self) -> u32 {
        self.target_index
    }

    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolution.as_ref()
    }

    /// Idle -> Waiting. Returns the wait deadline.
    pub fn start_waiting(&mut self, wait: Duration, now: DateTime<Utc>) -> DateTime<Utc> {
        let deadline = now + to_chrono(wait);
        self.stage = Stage::Waiting;
        self.deadline = Some(deadline);
        deadline
    }

    /// Time left until `deadline`, zero once it has passed.
    pub fn remaining(&self, now: DateTime<Utc>) -> Duration {
        self.deadline
            .and_then(|deadline| (deadline - now).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    /// Shorten the remaining wait by `decrement`, clamped at zero.
    ///
    /// Returns the new remaining wait, or `None` outside `Waiting`. The
    /// deadline is recomputed from `now`.
    pub fn shorten_wait(&mut self, decrement: Duration, now: DateTime<Utc>) -> Option<Duration> {
        if self.stage != Stage::Waiting {
            return None;
        }
        let remaining = self.remaining(now).saturating_sub(decrement);
        self.deadline = Some(now + to_chrono(remaining));
        Some(remaining)
    }

    /// Waiting -> Biting.
    pub fn enter_biting(
        &mut self,
        candidate: CatchCandidate,
        target_count: u32,
        required_progress: u32,
        target_index: u32,
        deadline: DateTime<Utc>,
    ) {
        self.stage = Stage::Biting;
        self.candidate = Some(candidate);
        self.target_count = target_count.max(1);
        self.target_index = target_index.min(self.target_count - 1);
        self.required_progress = required_progress.max(1);
        self.progress = 0;
        self.deadline = Some(deadline);
    }

    /// Record the candidate that was landed without the biting game.
    pub fn hook(&mut self, candidate: CatchCandidate) {
        self.candidate = Some(candidate);
    }

    pub fn relocate_target(&mut self, index: u32) {
        if self.stage == Stage::Biting {
            self.target_index = index.min(self.target_count.saturating_sub(1));
        }
    }

    /// Apply a choice while biting. `None` outside `Biting`.
    ///
    /// A hit adds the tool's power to progress. A miss adds the candidate's
    /// miss penalty to the accumulated loss and may break the tool.
    pub fn apply_choice(&mut self, index: u32) -> Option<ChoiceEffect> {
        if self.stage != Stage::Biting {
            return None;
        }
        if index == self.target_index {
            self.progress = self.progress.saturating_add(self.tool.power);
            return Some(ChoiceEffect::Hit {
                progress: self.progress,
                completed: self.progress >= self.required_progress,
            });
        }

        let penalty = self
            .candidate
            .as_ref()
            .map_or(0, |candidate| candidate.durability_loss);
        let broken = self.add_loss(penalty);
        Some(ChoiceEffect::Miss {
            loss: self.accumulated_loss,
            broken,
        })
    }

    /// Apply the penalty for running out of time. Returns whether the tool broke.
    pub fn apply_timeout(&mut self, fail_penalty: u32) -> bool {
        self.add_loss(fail_penalty)
    }

    /// Loss is capped at the tool's remaining durability, at which point the
    /// tool is destroyed.
    fn add_loss(&mut self, amount: u32) -> bool {
        let next = self.accumulated_loss.saturating_add(amount);
        if self.tool.breaks_under(next) {
            self.accumulated_loss = self.tool.durability.max(self.accumulated_loss);
            true
        } else {
            self.accumulated_loss = next;
            false
        }
    }

    pub fn is_tool_broken(&self) -> bool {
        self.tool.breaks_under(self.accumulated_loss)
    }

    /// Enter `Resolving` and produce the settlement request.
    pub fn resolve(&mut self, outcome: Outcome) -> Resolution {
        self.stage = Stage::Resolving;
        self.deadline = None;
        let resolution = Resolution {
            key: self.key,
            outcome,
            tool: self.tool.clone(),
            loss: self.accumulated_loss,
            tool_broken: self.is_tool_broken(),
        };
        self.resolution = Some(resolution.clone());
        resolution
    }

    /// Terminal: back to `Idle`, ready to be purged.
    pub fn close(&mut self) {
        self.stage = Stage::Idle;
        self.deadline = None;
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            player_id: self.key.player_id,
            realm_id: self.key.realm_id,
            stage: self.stage,
            tool: self.tool.clone(),
            consumable_count: self.consumable_count,
            progress: self.progress,
            required_progress: self.required_progress,
            accumulated_loss: self.accumulated_loss,
            target_index: self.target_index,
            target_count: self.target_count,
            started_at: self.started_at,
            deadline: self.deadline,
            candidate: self.candidate.clone(),
            resolution: self.resolution.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CatchRecord;
    use crate::value_objects::Rarity;
    use crate::CatchId;

    fn key() -> SessionKey {
        SessionKey::new(PlayerId::new(10), RealmId::new(20))
    }

    fn rod(power: u32, durability: u32) -> ToolSnapshot {
        ToolSnapshot {
            item_id: "rod-1".to_string(),
            display_id: "fishing_rod_tier1".to_string(),
            tier: 1,
            power,
            durability,
        }
    }

    fn candidate(miss_penalty: u32) -> CatchCandidate {
        CatchCandidate {
            species_id: "pike".to_string(),
            name: "Pike".to_string(),
            rarity: Rarity::Rare,
            weight: 2.5,
            power_requirement: 3,
            durability_loss: miss_penalty,
            base_value: 25.0,
            value: 25.0,
            mutation: None,
        }
    }

    fn inventory(tool: Option<ToolSnapshot>, bait: u32, catches: usize) -> PlayerInventory {
        let record = CatchRecord::from_candidate(CatchId::new(), &candidate(1), Utc::now());
        PlayerInventory {
            tool,
            consumables: bait,
            catches: vec![record; catches],
        }
    }

    fn biting(power: u32, durability: u32, miss_penalty: u32) -> SessionState {
        let now = Utc::now();
        let stock = inventory(Some(rod(power, durability)), 5, 0);
        let mut state = SessionState::open(key(), &stock, 10, now).unwrap();
        state.start_waiting(Duration::from_secs(5), now);
        state.enter_biting(
            candidate(miss_penalty),
            4,
            3,
            2,
            now + chrono::Duration::seconds(15),
        );
        state
    }

    #[test]
    fn open_rejects_missing_bait() {
        let result = SessionState::open(key(), &inventory(Some(rod(1, 10)), 0, 0), 10, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            BeginRejection::EquipmentMissing(MissingEquipment::Consumable)
        );
    }

    #[test]
    fn open_rejects_missing_or_broken_rod() {
        let none = SessionState::open(key(), &inventory(None, 3, 0), 10, Utc::now());
        let worn = SessionState::open(key(), &inventory(Some(rod(1, 0)), 3, 0), 10, Utc::now());
        for result in [none, worn] {
            assert_eq!(
                result.unwrap_err(),
                BeginRejection::EquipmentMissing(MissingEquipment::Tool)
            );
        }
    }

    #[test]
    fn open_rejects_full_inventory() {
        let result = SessionState::open(key(), &inventory(Some(rod(1, 10)), 3, 10), 10, Utc::now());
        assert_eq!(
            result.unwrap_err(),
            BeginRejection::InventoryFull {
                current: 10,
                capacity: 10
            }
        );
    }

    #[test]
    fn shorten_wait_clamps_at_zero_and_recomputes_deadline() {
        let now = Utc::now();
        let stock = inventory(Some(rod(1, 10)), 1, 0);
        let mut state = SessionState::open(key(), &stock, 10, now).unwrap();
        state.start_waiting(Duration::from_secs(5), now);

        let later = now + chrono::Duration::seconds(1);
        assert_eq!(
            state.shorten_wait(Duration::from_secs(2), later),
            Some(Duration::from_secs(2))
        );
        assert_eq!(state.deadline(), Some(later + chrono::Duration::seconds(2)));
        assert_eq!(
            state.shorten_wait(Duration::from_secs(9), later),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn choice_outside_biting_has_no_effect() {
        let now = Utc::now();
        let stock = inventory(Some(rod(1, 10)), 1, 0);
        let mut state = SessionState::open(key(), &stock, 10, now).unwrap();
        assert_eq!(state.apply_choice(0), None);
        state.start_waiting(Duration::from_secs(5), now);
        assert_eq!(state.apply_choice(0), None);
        assert_eq!(state.progress(), 0);
    }

    #[test]
    fn hits_accumulate_power_until_threshold() {
        let mut state = biting(2, 10, 3);
        assert_eq!(
            state.apply_choice(2),
            Some(ChoiceEffect::Hit {
                progress: 2,
                completed: false,
            })
        );
        assert_eq!(
            state.apply_choice(2),
            Some(ChoiceEffect::Hit {
                progress: 4,
                completed: true,
            })
        );
        assert_eq!(state.accumulated_loss(), 0);
    }

    #[test]
    fn fourth_miss_breaks_the_rod() {
        let mut state = biting(1, 10, 3);
        let mut losses = Vec::new();
        for _ in 0..3 {
            match state.apply_choice(0) {
                Some(ChoiceEffect::Miss { loss, broken }) => {
                    assert!(!broken);
                    losses.push(loss);
                }
                other => panic!("expected miss, got {other:?}"),
            }
        }
        assert_eq!(losses, vec![3, 6, 9]);

        assert_eq!(
            state.apply_choice(1),
            Some(ChoiceEffect::Miss {
                loss: 10,
                broken: true,
            })
        );
        let resolution = state.resolve(Outcome::Escaped);
        assert!(resolution.tool_broken);
        assert_eq!(resolution.loss, 10);
        assert_eq!(state.stage(), Stage::Resolving);
    }

    #[test]
    fn timeout_penalty_is_monotonic_and_may_break() {
        let mut state = biting(1, 4, 3);
        state.apply_choice(0);
        assert_eq!(state.accumulated_loss(), 3);
        assert!(state.apply_timeout(1));
        assert_eq!(state.accumulated_loss(), 4);

        let mut intact = biting(1, 10, 3);
        assert!(!intact.apply_timeout(1));
        assert_eq!(intact.accumulated_loss(), 1);
    }

    #[test]
    fn view_reflects_biting_state() {
        let state = biting(1, 10, 3);
        let view = state.view();
        assert_eq!(view.stage, Stage::Biting);
        assert_eq!(view.target_count, 4);
        assert_eq!(view.target_index, 2);
        assert_eq!(view.required_progress, 3);
        assert_eq!(
            view.deadline.unwrap() - view.started_at,
            chrono::Duration::seconds(15)
        );
        assert!(view.candidate.is_some());
        assert!(view.resolution.is_none());
    }
}
