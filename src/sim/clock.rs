//! Simulated-time scheduler
//!
//! Every periodic and one-shot timer in a session lives here, so tearing a
//! session down is a single `cancel_all`. Firings are handed out one at a time
//! in due order (ties by creation order); a handler that cancels another
//! schedule therefore stops it before its next firing.

use serde::{Deserialize, Serialize};

use super::state::PickupKind;

/// What a timer firing asks the session to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerEvent {
    SimulationTick,
    SpawnObstacle,
    SpawnEnemy,
    PickupRoll,
    ScoreTick,
    PowerUpExpired(PickupKind),
    InvulnerabilityBlink,
    InvulnerabilityEnd,
}

/// Opaque handle for cancelling a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Schedule {
    handle: TimerHandle,
    event: TimerEvent,
    /// `None` for one-shot timers
    period_ms: Option<f64>,
    due_ms: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Clock {
    now_ms: f64,
    schedules: Vec<Schedule>,
    next_handle: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Fire `event` every `period_ms`, first at `now + period_ms`
    pub fn schedule(&mut self, event: TimerEvent, period_ms: f64) -> TimerHandle {
        debug_assert!(period_ms > 0.0, "periodic timer needs a positive period");
        self.push(event, Some(period_ms), period_ms)
    }

    /// Fire `event` once after `delay_ms`
    pub fn schedule_once(&mut self, event: TimerEvent, delay_ms: f64) -> TimerHandle {
        self.push(event, None, delay_ms.max(0.0))
    }

    fn push(&mut self, event: TimerEvent, period_ms: Option<f64>, delay_ms: f64) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.schedules.push(Schedule {
            handle,
            event,
            period_ms,
            due_ms: self.now_ms + delay_ms,
        });
        handle
    }

    /// Stop a schedule. Returns whether it was still active.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.schedules.len();
        self.schedules.retain(|s| s.handle != handle);
        self.schedules.len() != before
    }

    /// Stop every schedule
    pub fn cancel_all(&mut self) {
        self.schedules.clear();
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.schedules.iter().any(|s| s.handle == handle)
    }

    pub fn active_count(&self) -> usize {
        self.schedules.len()
    }

    /// Take the earliest firing due at or before `until_ms`.
    ///
    /// Moves the clock to the firing's due time and re-arms periodic timers.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(TimerHandle, TimerEvent)> {
        let idx = self
            .schedules
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due_ms <= until_ms)
            .min_by(|(_, a), (_, b)| {
                a.due_ms
                    .partial_cmp(&b.due_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.handle.0.cmp(&b.handle.0))
            })
            .map(|(i, _)| i)?;

        let schedule = &mut self.schedules[idx];
        let fired = (schedule.handle, schedule.event);
        self.now_ms = self.now_ms.max(schedule.due_ms);
        match schedule.period_ms {
            Some(period) => schedule.due_ms += period,
            None => {
                self.schedules.remove(idx);
            }
        }
        Some(fired)
    }

    /// Move the clock forward once every due firing has been taken
    pub fn settle(&mut self, until_ms: f64) {
        self.now_ms = self.now_ms.max(until_ms);
    }
}
