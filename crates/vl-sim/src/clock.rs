//! Tick scheduling.
//!
//! The controller never owns a real timer. A [`TimeSource`] reports "now" in
//! milliseconds and the [`SimulationClock`] decides which periodic task, if
//! any, is due. Hosts poll; tests drive a [`ManualClock`] by hand.
//!
//! At most one task is armed at a time. Arming always cancels the previous
//! task first, so two tick streams can never overlap.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Milliseconds since an arbitrary origin.
pub type Millis = u64;

/// Source of the current time in milliseconds.
pub trait TimeSource {
    fn now_ms(&self) -> Millis;
}

/// Monotonic wall clock.
#[derive(Debug, Clone)]
pub struct WallClock {
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock for tests and scenario replay.
///
/// Clones share the same instant, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move forward by `ms`.
    pub fn advance(&self, ms: Millis) {
        self.now.set(self.now.get().saturating_add(ms));
    }

    /// Jump to `ms`. Time never runs backwards; earlier values are ignored.
    pub fn set(&self, ms: Millis) {
        self.now.set(self.now.get().max(ms));
    }
}

impl TimeSource for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

/// Which handler a periodic task drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Full discharge tick: model, history, drain
    Discharge,
    /// Charge replenishment step only
    Charge,
}

/// Fixed-period repeating task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicTask {
    pub kind: TaskKind,
    pub period_ms: Millis,
    /// Time of next scheduled firing.
    pub next_fire_ms: Millis,
}

impl PeriodicTask {
    /// First firing is one full period after `now`.
    ///
    /// # Panics
    ///
    /// Panics if `period_ms` is zero.
    pub fn new(kind: TaskKind, period_ms: Millis, now: Millis) -> Self {
        assert!(period_ms > 0, "Task period must be positive");
        Self {
            kind,
            period_ms,
            next_fire_ms: now.saturating_add(period_ms),
        }
    }

    pub fn should_fire(&self, now: Millis) -> bool {
        now >= self.next_fire_ms
    }

    /// Should be called after a firing has been handled.
    pub fn advance(&mut self) {
        self.next_fire_ms = self.next_fire_ms.saturating_add(self.period_ms);
    }

    pub fn time_until_fire(&self, now: Millis) -> Millis {
        self.next_fire_ms.saturating_sub(now)
    }
}

/// Holds the single active periodic task.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    discharge_period_ms: Millis,
    charge_period_ms: Millis,
    active: Option<PeriodicTask>,
}

impl SimulationClock {
    /// # Panics
    ///
    /// Panics if either period is zero.
    pub fn new(discharge_period_ms: Millis, charge_period_ms: Millis) -> Self {
        assert!(
            discharge_period_ms > 0 && charge_period_ms > 0,
            "Task period must be positive"
        );
        Self {
            discharge_period_ms,
            charge_period_ms,
            active: None,
        }
    }

    pub fn period_for(&self, kind: TaskKind) -> Millis {
        match kind {
            TaskKind::Discharge => self.discharge_period_ms,
            TaskKind::Charge => self.charge_period_ms,
        }
    }

    /// Cancel whatever is armed, then arm `kind` starting at `now`.
    pub fn arm(&mut self, kind: TaskKind, now: Millis) {
        self.cancel();
        let task = PeriodicTask::new(kind, self.period_for(kind), now);
        tracing::trace!(?kind, next_fire_ms = task.next_fire_ms, "armed task");
        self.active = Some(task);
    }

    /// Cancel the armed task. Returns what was cancelled.
    pub fn cancel(&mut self) -> Option<TaskKind> {
        let cancelled = self.active.take().map(|t| t.kind);
        if let Some(kind) = cancelled {
            tracing::trace!(?kind, "cancelled task");
        }
        cancelled
    }

    pub fn active(&self) -> Option<TaskKind> {
        self.active.map(|t| t.kind)
    }

    pub fn active_task(&self) -> Option<&PeriodicTask> {
        self.active.as_ref()
    }

    pub fn next_deadline(&self) -> Option<Millis> {
        self.active.map(|t| t.next_fire_ms)
    }

    /// If the armed task is due at `now`, consume one firing and report it.
    ///
    /// Call repeatedly to catch up on missed periods; the caller must
    /// re-check after each firing because the handler may re-arm or cancel.
    pub fn take_due(&mut self, now: Millis) -> Option<TaskKind> {
        let task = self.active.as_mut()?;
        if task.should_fire(now) {
            task.advance();
            Some(task.kind)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_shared_and_monotonic() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(150);
        assert_eq!(b.now_ms(), 150);
        b.set(100);
        assert_eq!(a.now_ms(), 150);
        b.set(400);
        assert_eq!(a.now_ms(), 400);
    }

    #[test]
    fn periodic_task_basic() {
        let mut task = PeriodicTask::new(TaskKind::Discharge, 100, 0);

        // Should not fire at t=0
        assert!(!task.should_fire(0));
        assert!(task.should_fire(100));

        task.advance();
        assert!(!task.should_fire(100));
        assert!(task.should_fire(200));
        assert_eq!(task.time_until_fire(150), 50);
        assert_eq!(task.time_until_fire(250), 0);
    }

    #[test]
    fn deadline_saturates_near_end_of_time() {
        let mut task = PeriodicTask::new(TaskKind::Discharge, 3_600_000, u64::MAX - 10);
        assert_eq!(task.time_until_fire(u64::MAX - 10), 10);
        task.advance();
        assert!(!task.should_fire(u64::MAX - 1));
    }

    #[test]
    fn arm_replaces_previous() {
        let mut clock = SimulationClock::new(100, 50);
        clock.arm(TaskKind::Charge, 0);
        assert_eq!(clock.next_deadline(), Some(50));
        clock.arm(TaskKind::Discharge, 20);
        assert_eq!(clock.active(), Some(TaskKind::Discharge));
        assert_eq!(clock.next_deadline(), Some(120));
    }

    #[test]
    fn take_due_catches_up_one_at_a_time() {
        let mut clock = SimulationClock::new(100, 50);
        clock.arm(TaskKind::Discharge, 0);
        let mut fired = 0;
        while clock.take_due(350).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(clock.next_deadline(), Some(400));
    }

    #[test]
    fn cancel_stops_firing() {
        let mut clock = SimulationClock::new(100, 50);
        clock.arm(TaskKind::Charge, 0);
        assert_eq!(clock.cancel(), Some(TaskKind::Charge));
        assert_eq!(clock.take_due(10_000), None);
        assert_eq!(clock.cancel(), None);
    }
}
