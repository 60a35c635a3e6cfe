//! Cadence scheduling
//!
//! The engine never owns a timer. It asks a `Scheduler` to arm a repeating
//! cadence and gets back a handle; each firing is routed back into
//! `Engine::on_cadence` with that handle. A firing whose handle is no longer
//! armed is stale and must be ignored by the receiver.

use std::time::Duration;

/// The two repeating schedules a round needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// ~60 Hz simulation + redraw
    Frame,
    /// 1 Hz round clock
    Countdown,
}

/// Identity of one armed cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CadenceHandle {
    pub id: u64,
    pub cadence: Cadence,
}

pub trait Scheduler {
    /// Start a repeating cadence. The first firing happens one period from now.
    fn arm(&mut self, cadence: Cadence, period: Duration) -> CadenceHandle;

    /// Stop a cadence. Cancelling an unknown or already-cancelled handle is a no-op.
    fn cancel(&mut self, handle: CadenceHandle);

    /// Number of cadences currently armed
    fn live(&self) -> usize;
}

#[derive(Debug, Clone)]
struct Entry {
    handle: CadenceHandle,
    period: Duration,
    due: Duration,
}

/// Deterministic virtual-clock scheduler
///
/// Nothing fires on its own. The driver pulls due firings one at a time with
/// `next_due`, so a cancellation made while handling a firing takes effect
/// before the next one is produced.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
    armed_total: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Total `arm` calls over the scheduler's life
    pub fn armed_total(&self) -> u64 {
        self.armed_total
    }

    /// Live cadences of one kind
    pub fn live_of(&self, cadence: Cadence) -> usize {
        self.entries
            .iter()
            .filter(|e| e.handle.cadence == cadence)
            .count()
    }

    pub fn is_armed(&self, handle: CadenceHandle) -> bool {
        self.entries.iter().any(|e| e.handle == handle)
    }

    /// Pop the earliest firing due at or before `until` and move the clock to it.
    /// Ties fire in arm order.
    pub fn next_due(&mut self, until: Duration) -> Option<CadenceHandle> {
        let entry = self
            .entries
            .iter_mut()
            .filter(|e| e.due <= until)
            .min_by_key(|e| (e.due, e.handle.id))?;

        self.now = self.now.max(entry.due);
        entry.due += entry.period;
        Some(entry.handle)
    }

    /// Move the clock forward without firing anything
    pub fn settle(&mut self, until: Duration) {
        self.now = self.now.max(until);
    }
}

impl Scheduler for ManualScheduler {
    fn arm(&mut self, cadence: Cadence, period: Duration) -> CadenceHandle {
        self.next_id += 1;
        self.armed_total += 1;
        let handle = CadenceHandle {
            id: self.next_id,
            cadence,
        };
        // Zero periods would fire forever within one `next_due` window
        let period = period.max(Duration::from_micros(1));
        self.entries.push(Entry {
            handle,
            period,
            due: self.now + period,
        });
        log::trace!("Armed {cadence:?} #{} every {period:?}", handle.id);
        handle
    }

    fn cancel(&mut self, handle: CadenceHandle) {
        let before = self.entries.len();
        self.entries.retain(|e| e.handle != handle);
        if self.entries.len() != before {
            log::trace!("Cancelled {:?} #{}", handle.cadence, handle.id);
        }
    }

    fn live(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_fires_in_time_order() {
        let mut s = ManualScheduler::new();
        let slow = s.arm(Cadence::Countdown, 10 * MS);
        let fast = s.arm(Cadence::Frame, 4 * MS);

        let until = 11 * MS;
        let mut order = Vec::new();
        while let Some(h) = s.next_due(until) {
            order.push(h);
        }
        s.settle(until);
        assert_eq!(order, vec![fast, fast, slow]);
        assert_eq!(s.now(), until);
    }

    #[test]
    fn test_cancel_is_immediate_and_idempotent() {
        let mut s = ManualScheduler::new();
        let a = s.arm(Cadence::Frame, MS);
        let b = s.arm(Cadence::Countdown, MS);
        assert_eq!(s.next_due(5 * MS), Some(a));
        s.cancel(b);
        s.cancel(b);
        assert_eq!(s.live(), 1);
        assert!(!s.is_armed(b));
        while let Some(h) = s.next_due(5 * MS) {
            assert_eq!(h, a);
        }
    }

    #[test]
    fn test_handles_are_unique() {
        let mut s = ManualScheduler::new();
        let a = s.arm(Cadence::Frame, MS);
        s.cancel(a);
        let b = s.arm(Cadence::Frame, MS);
        assert_ne!(a, b);
        assert_eq!(s.armed_total(), 2);
        assert_eq!(s.live_of(Cadence::Frame), 1);
    }

    #[test]
    fn test_first_firing_one_period_after_arm() {
        let mut s = ManualScheduler::new();
        s.settle(100 * MS);
        let h = s.arm(Cadence::Countdown, 1000 * MS);
        assert_eq!(s.next_due(1099 * MS), None);
        assert_eq!(s.next_due(1100 * MS), Some(h));
    }
}
