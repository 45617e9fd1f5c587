//! Cancellable per-session timers.
//!
//! Each session owns one [`SessionTimers`] with a fixed set of slots. A slot
//! holds at most one scheduled task; scheduling into an occupied slot aborts
//! the previous task first. Every task is tagged with a [`TimerToken`] so a
//! callback that was already running when its slot got replaced can tell it
//! is stale once it reacquires the session lock.

use std::future::Future;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerSlot {
    /// Counts down the waiting stage
    Wait,
    /// Periodically moves the biting target
    Relocation,
    /// Forces failure at the biting deadline
    Watchdog,
    /// Rate limit on shaking
    ShakeCooldown,
}

impl TimerSlot {
    pub const ALL: [TimerSlot; 4] = [
        TimerSlot::Wait,
        TimerSlot::Relocation,
        TimerSlot::Watchdog,
        TimerSlot::ShakeCooldown,
    ];

    fn index(self) -> usize {
        match self {
            Self::Wait => 0,
            Self::Relocation => 1,
            Self::Watchdog => 2,
            Self::ShakeCooldown => 3,
        }
    }
}

/// Generation tag of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct ActiveTimer {
    token: TimerToken,
    handle: AbortHandle,
}

/// The timers owned by one session.
#[derive(Debug, Default)]
pub struct SessionTimers {
    slots: [Option<ActiveTimer>; 4],
    generation: u64,
}

impl SessionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once after `delay`, replacing whatever occupied `slot`.
    pub fn schedule_once<F, Fut>(&mut self, slot: TimerSlot, delay: Duration, task: F) -> TimerToken
    where
        F: FnOnce(TimerToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(slot);
        let token = self.next_token();
        let fire = task(token);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            fire.await;
        })
        .abort_handle();
        self.slots[slot.index()] = Some(ActiveTimer { token, handle });
        token
    }

    /// Run `tick` every `period`, first after one full period. The task ends
    /// when `tick` resolves to false or the slot is cancelled.
    pub fn schedule_every<F, Fut>(
        &mut self,
        slot: TimerSlot,
        period: Duration,
        mut tick: F,
    ) -> TimerToken
    where
        F: FnMut(TimerToken) -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        self.cancel(slot);
        let token = self.next_token();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !tick(token).await {
                    break;
                }
            }
        })
        .abort_handle();
        self.slots[slot.index()] = Some(ActiveTimer { token, handle });
        token
    }

    pub fn is_current(&self, slot: TimerSlot, token: TimerToken) -> bool {
        self.slots[slot.index()]
            .as_ref()
            .is_some_and(|active| active.token == token)
    }

    pub fn is_active(&self, slot: TimerSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Called by a one-shot task when it fires. Clears the slot without
    /// aborting the caller and reports whether the token was still current.
    pub fn complete(&mut self, slot: TimerSlot, token: TimerToken) -> bool {
        if self.is_current(slot, token) {
            self.slots[slot.index()] = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self, slot: TimerSlot) {
        if let Some(active) = self.slots[slot.index()].take() {
            active.handle.abort();
        }
    }

    /// Abort every scheduled task. Runs on every stage exit.
    pub fn cancel_all(&mut self) {
        for slot in TimerSlot::ALL {
            self.cancel(slot);
        }
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    fn next_token(&mut self) -> TimerToken {
        self.generation += 1;
        TimerToken(self.generation)
    }
}

impl Drop for SessionTimers {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
