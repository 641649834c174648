//! Deadline-based one-shot timers.
//!
//! [`DeadlineTimers`] keeps one optional deadline per [`TimerId`]. It does not
//! wake anything by itself: the event loop in [`crate::runner`] waits for the
//! earliest deadline and then expires it, which keeps timer handling on the
//! same task as frame handling.

use embassy_time::{Duration, Instant};

use crate::error::RadioError;
use crate::radio::{TimerControl, TimerId};

/// Probe and dwell deadlines for a session running under an async executor.
#[derive(Debug, Clone, Default)]
pub struct DeadlineTimers {
    deadlines: [Option<Instant>; 2],
}

impl DeadlineTimers {
    /// Both timers idle.
    pub const fn new() -> Self {
        Self {
            deadlines: [None; 2],
        }
    }

    /// Arm `timer` relative to an explicit `now`.
    pub fn arm_from(&mut self, timer: TimerId, now: Instant, after: Duration) {
        self.deadlines[timer.index()] = Some(now + after);
    }

    /// Pending deadline of `timer`.
    pub fn deadline(&self, timer: TimerId) -> Option<Instant> {
        self.deadlines[timer.index()]
    }

    /// The armed timer with the earliest deadline. Ties go to the probe timer.
    pub fn next_deadline(&self) -> Option<(TimerId, Instant)> {
        TimerId::ALL
            .into_iter()
            .filter_map(|timer| self.deadline(timer).map(|at| (timer, at)))
            .min_by_key(|&(_, at)| at)
    }

    /// Disarm `timer` because it fired.
    pub fn expire(&mut self, timer: TimerId) {
        self.deadlines[timer.index()] = None;
    }

    /// Expire and return the earliest timer whose deadline is not after `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<TimerId> {
        let (timer, at) = self.next_deadline()?;
        if at > now {
            return None;
        }
        self.expire(timer);
        Some(timer)
    }
}

impl TimerControl for DeadlineTimers {
    fn arm(&mut self, timer: TimerId, after: Duration) -> Result<(), RadioError> {
        self.arm_from(timer, Instant::now(), after);
        Ok(())
    }

    fn cancel(&mut self, timer: TimerId) -> Result<(), RadioError> {
        self.deadlines[timer.index()] = None;
        Ok(())
    }

    fn is_armed(&self, timer: TimerId) -> bool {
        self.deadline(timer).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earliest_deadline_wins() {
        let mut timers = DeadlineTimers::new();
        let start = Instant::from_millis(1_000);
        timers.arm_from(TimerId::Dwell, start, Duration::from_millis(100));
        timers.arm_from(TimerId::Probe, start, Duration::from_millis(20));

        assert_eq!(
            timers.next_deadline(),
            Some((TimerId::Probe, Instant::from_millis(1_020)))
        );
        assert!(timers.is_armed(TimerId::Probe));
        assert!(timers.is_armed(TimerId::Dwell));
    }

    #[test]
    fn ties_go_to_probe() {
        let mut timers = DeadlineTimers::new();
        let start = Instant::from_millis(0);
        timers.arm_from(TimerId::Dwell, start, Duration::from_millis(20));
        timers.arm_from(TimerId::Probe, start, Duration::from_millis(20));
        assert_eq!(timers.next_deadline().map(|(t, _)| t), Some(TimerId::Probe));
    }

    #[test]
    fn take_due_expires_only_elapsed_timers() {
        let mut timers = DeadlineTimers::new();
        let start = Instant::from_millis(0);
        timers.arm_from(TimerId::Probe, start, Duration::from_millis(20));
        timers.arm_from(TimerId::Dwell, start, Duration::from_millis(120));

        assert_eq!(timers.take_due(Instant::from_millis(19)), None);
        assert_eq!(timers.take_due(Instant::from_millis(20)), Some(TimerId::Probe));
        assert!(!timers.is_armed(TimerId::Probe));
        assert_eq!(timers.take_due(Instant::from_millis(100)), None);
        assert_eq!(timers.take_due(Instant::from_millis(500)), Some(TimerId::Dwell));
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn take_due_drains_timers_due_together() {
        let mut timers = DeadlineTimers::new();
        let start = Instant::from_millis(0);
        timers.arm_from(TimerId::Dwell, start, Duration::from_millis(30));
        timers.arm_from(TimerId::Probe, start, Duration::from_millis(20));

        let late = Instant::from_millis(45);
        let mut fired = Vec::new();
        while let Some(timer) = timers.take_due(late) {
            fired.push(timer);
        }
        assert_eq!(fired, [TimerId::Probe, TimerId::Dwell]);
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn rearming_replaces_the_deadline() {
        let mut timers = DeadlineTimers::new();
        timers.arm_from(TimerId::Dwell, Instant::from_millis(0), Duration::from_millis(100));
        timers.arm_from(TimerId::Dwell, Instant::from_millis(50), Duration::from_millis(100));
        assert_eq!(timers.deadline(TimerId::Dwell), Some(Instant::from_millis(150)));

        timers.cancel(TimerId::Dwell).unwrap();
        assert!(!timers.is_armed(TimerId::Dwell));
    }
}
