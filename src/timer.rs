//! Deferred-action timer queue.
//!
//! This is the "run once after a delay" capability the pump interlock
//! relies on.  Actions are plain data ([`TimerAction`]) rather than
//! closures, so the queue is fixed-size, inspectable, and testable without
//! a real clock:
//!
//! ```text
//!   Pump::run ──after(now, d, StopPump)──▶ ┌────────────┐
//!                                          │ TimerQueue │
//!   GameService::tick(now) ◀──pop_due──────└────────────┘
//! ```
//!
//! Time is injected as a monotonic [`Duration`] since boot.  Due actions
//! are released in deadline order; actions sharing a deadline come out in
//! the order they were scheduled.  Everything runs on the single control
//! thread, so a fired action never interleaves with an interrupt dispatch.

use core::time::Duration;

use log::debug;

use crate::drivers::pump::PumpId;
use crate::error::{Error, Result};

/// Maximum number of pending actions.  Each pump holds at most one.
pub const MAX_TIMERS: usize = 16;

/// Work to perform when a timer expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// End a pump run (drive the actuator off).
    StopPump(PumpId),
    /// End a pump's post-run cooldown.
    EndCooldown(PumpId),
}

#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    due: Duration,
    seq: u32,
    action: TimerAction,
}

/// Fixed-capacity queue of deferred actions.
pub struct TimerQueue {
    entries: heapless::Vec<TimerEntry, MAX_TIMERS>,
    next_seq: u32,
}

impl Default for TimerQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerQueue {
    pub fn new() -> Self {
        Self {
            entries: heapless::Vec::new(),
            next_seq: 0,
        }
    }

    /// Schedule `action` to fire once `delay` has elapsed after `now`.
    /// Returns the absolute deadline.
    pub fn after(&mut self, now: Duration, delay: Duration, action: TimerAction) -> Result<Duration> {
        let due = now.saturating_add(delay);
        let entry = TimerEntry {
            due,
            seq: self.next_seq,
            action,
        };
        self.entries.push(entry).map_err(|_| Error::SchedulerFull)?;
        self.next_seq = self.next_seq.wrapping_add(1);
        debug!("Timer: {:?} due at {:?}", action, due);
        Ok(due)
    }

    /// Drop every pending instance of `action`.  Returns whether any was removed.
    pub fn cancel(&mut self, action: TimerAction) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.action != action);
        before != self.entries.len()
    }

    /// Remove and return the earliest action due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<TimerAction> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;
        Some(self.entries.swap_remove(idx).action)
    }

    /// Deadline of the earliest pending action.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Whether `action` is currently pending.
    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.entries.iter().any(|e| e.action == action)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_fires_before_deadline() {
        let mut q = TimerQueue::new();
        q.after(ms(0), ms(500), TimerAction::StopPump(PumpId(0))).unwrap();

        assert_eq!(q.pop_due(ms(499)), None);
        assert_eq!(q.pop_due(ms(500)), Some(TimerAction::StopPump(PumpId(0))));
        assert!(q.is_empty());
    }

    #[test]
    fn fires_in_deadline_then_schedule_order() {
        let mut q = TimerQueue::new();
        q.after(ms(0), ms(300), TimerAction::StopPump(PumpId(2))).unwrap();
        q.after(ms(0), ms(100), TimerAction::StopPump(PumpId(1))).unwrap();
        q.after(ms(50), ms(50), TimerAction::EndCooldown(PumpId(3))).unwrap();

        assert_eq!(q.next_deadline(), Some(ms(100)));
        assert_eq!(q.pop_due(ms(1000)), Some(TimerAction::StopPump(PumpId(1))));
        assert_eq!(q.pop_due(ms(1000)), Some(TimerAction::EndCooldown(PumpId(3))));
        assert_eq!(q.pop_due(ms(1000)), Some(TimerAction::StopPump(PumpId(2))));
        assert_eq!(q.pop_due(ms(1000)), None);
    }

    #[test]
    fn full_queue_reports_scheduler_full() {
        let mut q = TimerQueue::new();
        for i in 0..MAX_TIMERS {
            q.after(ms(0), ms(10), TimerAction::StopPump(PumpId(i as u8))).unwrap();
        }
        assert_eq!(
            q.after(ms(0), ms(10), TimerAction::StopPump(PumpId(99))),
            Err(Error::SchedulerFull)
        );
    }

    #[test]
    fn cancel_removes_pending_action() {
        let mut q = TimerQueue::new();
        let stop = TimerAction::StopPump(PumpId(0));
        q.after(ms(0), ms(10), stop).unwrap();
        assert!(q.is_pending(stop));
        assert!(q.cancel(stop));
        assert!(!q.cancel(stop));
        assert_eq!(q.next_deadline(), None);
    }
}
