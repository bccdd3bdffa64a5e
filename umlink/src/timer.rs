//! Single-shot reordering timer.
//!
//! The timer bounds how long the entity waits for a missing PDU before
//! forcing the reordering cursor past it. It is a plain scheduled-event
//! handle: the owner arms it with a deadline, polls it against the
//! current time, and cancels it by dropping the deadline. No thread or
//! runtime is involved.

/// Restartable single-shot timer over `u64` millisecond timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReorderingTimer {
    deadline: Option<u64>,
}

impl ReorderingTimer {
    /// Creates a stopped timer.
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Arms (or re-arms) the timer to fire `timeout_ms` from `now_ms`.
    pub fn start(&mut self, now_ms: u64, timeout_ms: u64) {
        self.deadline = Some(now_ms.saturating_add(timeout_ms));
    }

    /// Cancels the timer.
    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Returns true if the timer is armed.
    pub const fn busy(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true if the timer is armed and its deadline has passed.
    pub fn expired(&self, now_ms: u64) -> bool {
        match self.deadline {
            Some(deadline) => now_ms >= deadline,
            None => false,
        }
    }

    /// The armed deadline, if any.
    pub const fn deadline(&self) -> Option<u64> {
        self.deadline
    }
}
