//! Hand-written port doubles.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use castline_domain::{SessionView, Stage};

use crate::infrastructure::ports::{PresentationError, PresentationPort, RandomPort};

/// Replays scripted unit rolls, then `fallback` forever.
pub struct ScriptedRandom {
    rolls: Mutex<VecDeque<f64>>,
    fallback: f64,
}

impl ScriptedRandom {
    pub fn new(rolls: &[f64]) -> Self {
        Self::with_fallback(rolls, 0.0)
    }

    pub fn with_fallback(rolls: &[f64], fallback: f64) -> Self {
        Self {
            rolls: Mutex::new(rolls.iter().copied().collect()),
            fallback,
        }
    }
}

impl RandomPort for ScriptedRandom {
    fn gen_unit(&self) -> f64 {
        self.rolls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.fallback)
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Records every rendered view. Can be switched to fail like a deleted message.
#[derive(Default)]
pub struct RecordingPresenter {
    views: Mutex<Vec<SessionView>>,
    unreachable: AtomicBool,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn views(&self) -> Vec<SessionView> {
        self.views.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<SessionView> {
        self.views.lock().unwrap().last().cloned()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.views.lock().unwrap().iter().map(|v| v.stage).collect()
    }
}

#[async_trait]
impl PresentationPort for RecordingPresenter {
    async fn render(&self, view: &SessionView) -> Result<(), PresentationError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(PresentationError::SurfaceUnreachable(
                "message deleted".to_string(),
            ));
        }
        self.views.lock().unwrap().push(view.clone());
        Ok(())
    }
}
