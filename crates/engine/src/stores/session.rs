//! Live fishing sessions.
//!
//! One entry per (player, realm). Each entry is a lock around the session
//! state and the timers it owns, so callbacks and player actions for the same
//! session are serialized while different sessions proceed independently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use castline_domain::{SessionKey, SessionState};

use crate::infrastructure::timers::SessionTimers;

/// A session record together with its timers.
#[derive(Debug)]
pub struct LiveSession {
    pub state: SessionState,
    pub timers: SessionTimers,
}

impl LiveSession {
    pub fn new(state: SessionState) -> Self {
        Self {
            state,
            timers: SessionTimers::new(),
        }
    }

    /// Cancel every timer and return the state to `Idle`.
    pub fn close(&mut self) {
        self.timers.cancel_all();
        self.state.close();
    }
}

pub type SessionCell = Arc<Mutex<LiveSession>>;

/// Process-wide map of live sessions.
pub struct SessionRegistry {
    sessions: DashMap<SessionKey, SessionCell>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Insert a session, closing any session it replaces.
    pub async fn begin(&self, session: LiveSession) -> SessionCell {
        let key = session.state.key();
        let cell = Arc::new(Mutex::new(session));
        if let Some(previous) = self.sessions.insert(key, cell.clone()) {
            previous.lock().await.close();
            tracing::debug!(session = %key, "Replaced live session");
        }
        cell
    }

    pub fn get(&self, key: &SessionKey) -> Option<SessionCell> {
        self.sessions.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Remove a session and cancel its timers.
    pub async fn terminate(&self, key: &SessionKey) -> bool {
        let Some((_, cell)) = self.sessions.remove(key) else {
            return false;
        };
        cell.lock().await.close();
        true
    }

    /// Remove `cell` if it is still the live session for `key`.
    ///
    /// For callers already holding the cell's lock; a session that replaced
    /// `cell` in the meantime is left alone.
    pub fn release(&self, key: &SessionKey, cell: &SessionCell) -> bool {
        self.sessions
            .remove_if(key, |_, live| Arc::ptr_eq(live, cell))
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
