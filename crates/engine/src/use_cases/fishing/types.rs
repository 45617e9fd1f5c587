//! Fishing use case result types.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use castline_domain::{CatchRecord, SessionView, Stage};

use crate::infrastructure::ports::{
    ClockPort, EnvironmentPort, LedgerPort, PresentationPort, RandomPort, ToolWear,
};

/// Collaborators shared by the fishing use cases.
#[derive(Clone)]
pub struct FishingPorts {
    pub ledger: Arc<dyn LedgerPort>,
    pub presenter: Arc<dyn PresentationPort>,
    pub environment: Arc<dyn EnvironmentPort>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

/// Result of a player action against a live session.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The action changed the session; carries the view after the change
    Applied(SessionView),
    /// Stale or rate-limited; nothing changed
    Ignored(StaleAction),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn view(&self) -> Option<&SessionView> {
        match self {
            Self::Applied(view) => Some(view),
            Self::Ignored(_) => None,
        }
    }
}

/// Why an action was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StaleAction {
    NoSession,
    WrongStage { stage: Stage },
    CoolingDown,
    TargetOutOfRange { index: u32, target_count: u32 },
    SessionActive,
}

impl fmt::Display for StaleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSession => write!(f, "no live session"),
            Self::WrongStage { stage } => write!(f, "action not valid while {stage}"),
            Self::CoolingDown => write!(f, "shake is cooling down"),
            Self::TargetOutOfRange {
                index,
                target_count,
            } => write!(f, "choice {index} outside 0..{target_count}"),
            Self::SessionActive => write!(f, "a session is already running"),
        }
    }
}

/// What settlement committed to the ledger.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SettlementReceipt {
    pub consumed: bool,
    /// `None` when there was no loss to apply
    pub wear: Option<ToolWear>,
    pub catch: Option<CatchRecord>,
    pub first_discovery: bool,
    pub trash_item: Option<String>,
}
