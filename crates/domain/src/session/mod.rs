//! Fishing session model.

mod state;

pub use state::{ChoiceEffect, Outcome, Resolution, SessionKey, SessionState, Stage};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::{CatchCandidate, ToolSnapshot};
use crate::{PlayerId, RealmId};

/// Stage-tagged view model emitted on every transition. Front ends render
/// it; the engine never renders UI itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    pub player_id: PlayerId,
    pub realm_id: RealmId,
    pub stage: Stage,
    pub tool: ToolSnapshot,
    pub consumable_count: u32,
    pub progress: u32,
    pub required_progress: u32,
    pub accumulated_loss: u32,
    pub target_index: u32,
    pub target_count: u32,
    pub started_at: DateTime<Utc>,
    /// End of the current wait or biting window
    pub deadline: Option<DateTime<Utc>>,
    pub candidate: Option<CatchCandidate>,
    pub resolution: Option<Resolution>,
}
