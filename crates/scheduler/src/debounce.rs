//! Debounce timer for coalescing event bursts
//!
//! A burst of events (scroll deltas, for instance) should produce a single
//! evaluation once the burst has gone quiet. Each `arm` call replaces any
//! pending deadline, so at most one evaluation is ever pending.

/// Cancellable debounce handle polled with explicit `now` timestamps.
///
/// The owner arms the timer on every event and polls `fire` once per
/// frame. `fire` returns `true` exactly once per armed deadline, after
/// `window_ms` of quiescence.
///
/// # Example
///
/// ```
/// use inkstrip_scheduler::DebounceTimer;
///
/// let mut timer = DebounceTimer::new(100);
///
/// timer.arm(0);
/// timer.arm(40); // burst continues; previous deadline is cancelled
///
/// assert!(!timer.fire(120)); // only 80ms of quiet so far
/// assert!(timer.fire(140));
/// assert!(!timer.fire(200)); // disarmed until the next arm
/// ```
#[derive(Debug, Clone)]
pub struct DebounceTimer {
    window_ms: u64,
    deadline_ms: Option<u64>,
}

impl DebounceTimer {
    pub fn new(window_ms: u64) -> Self {
        Self { window_ms, deadline_ms: None }
    }

    /// Schedule an evaluation `window_ms` from `now_ms`, cancelling any
    /// pending deadline first.
    pub fn arm(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(self.window_ms));
    }

    /// Drop the pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Milliseconds until the pending deadline, if any. Lets the owner
    /// ask for a wakeup instead of polling blindly.
    pub fn time_until_deadline(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms.map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Returns `true` once the quiet window has elapsed, then disarms.
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
