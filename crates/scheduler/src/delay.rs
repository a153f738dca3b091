//! One-shot delay timer
//!
//! Used to hold an action back for a fixed interval (the end-of-chapter
//! dialog waits a moment before interrupting the reader). Scheduling while
//! a deadline is pending replaces it.

/// Cancellable one-shot timer polled with explicit `now` timestamps.
///
/// # Example
///
/// ```
/// use inkstrip_scheduler::DelayTimer;
///
/// let mut timer = DelayTimer::new();
/// timer.schedule(0, 1000);
///
/// assert!(!timer.fire(999));
/// assert!(timer.fire(1000));
/// assert!(!timer.fire(2000)); // spent until rescheduled
/// ```
#[derive(Debug, Clone, Default)]
pub struct DelayTimer {
    deadline_ms: Option<u64>,
}

impl DelayTimer {
    pub fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Schedule the action `delay_ms` from `now_ms`, replacing any
    /// pending deadline.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(delay_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Milliseconds until the pending deadline, if any.
    pub fn time_until_deadline(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Returns `true` exactly once, when the deadline has passed.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_exactly_once_after_delay() {
        let mut timer = DelayTimer::new();
        timer.schedule(500, 1000);

        assert!(!timer.fire(1499));
        assert!(timer.fire(1500));
        assert!(!timer.fire(1500));
        assert!(!timer.fire(9999));
    }

    #[test]
    fn reschedule_replaces_deadline() {
        let mut timer = DelayTimer::new();
        timer.schedule(0, 1000);
        timer.schedule(600, 1000);

        assert!(!timer.fire(1000));
        assert!(timer.fire(1600));
    }

    #[test]
    fn cancel_discards_pending_deadline() {
        let mut timer = DelayTimer::new();
        timer.schedule(0, 1000);
        timer.cancel();

        assert!(!timer.is_pending());
        assert!(!timer.fire(5000));
    }

    #[test]
    fn unscheduled_timer_never_fires() {
        let mut timer = DelayTimer::new();
        assert!(!timer.fire(0));
        assert!(!timer.fire(u64::MAX));
    }
}
