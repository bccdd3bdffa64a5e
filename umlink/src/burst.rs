//! Contiguous-burst detection over buffer occupancy.
//!
//! A burst is a span of events during which the entity's buffers stay
//! non-empty. The tracker observes occupancy at the end of each enqueue
//! or reordering event and reports a finished burst once the buffers
//! drain, provided the span exceeded one tick. This is a telemetry-only
//! side channel; it never influences reordering or reassembly.

use crate::sink::BurstReport;

/// Which event the tracker is observing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BurstEvent {
    /// End of a PDU-arrival event.
    Enqueue,

    /// End of a reordering-timer expiry event.
    Reordering,
}

/// Observer that turns occupancy transitions into burst reports.
#[derive(Debug, Clone, Copy)]
pub struct BurstTracker {
    /// Minimum span for a burst to count, in milliseconds.
    tick_ms: u64,

    in_burst: bool,

    /// Bytes accumulated since the burst began.
    total_bytes: u64,

    /// When the burst began.
    started_ms: u64,

    /// Last enqueue observed while the burst was running.
    last_ms: u64,
}

impl BurstTracker {
    /// Creates an idle tracker.
    pub const fn new(tick_ms: u64) -> Self {
        Self {
            in_burst: false,
            total_bytes: 0,
            started_ms: 0,
            last_ms: 0,
            tick_ms,
        }
    }

    /// Returns true if a burst is currently running.
    pub const fn in_burst(&self) -> bool {
        self.in_burst
    }

    /// Observes the buffer state at the end of an event.
    ///
    /// `occupancy` counts pending PDUs plus the buffered partial SDU;
    /// `event_bytes` is the payload progress made during the event.
    /// Returns a report when a burst longer than one tick just ended.
    pub fn observe(
        &mut self,
        event: BurstEvent,
        occupancy: usize,
        event_bytes: u64,
        now_ms: u64,
    ) -> Option<BurstReport> {
        let mut report = None;

        if occupancy == 0 {
            if self.in_burst {
                if self.last_ms.saturating_sub(self.started_ms) > self.tick_ms {
                    report = Some(BurstReport {
                        bytes: self.total_bytes,
                        duration_ms: self.last_ms - self.started_ms,
                    });
                }
                self.total_bytes = 0;
                self.started_ms = 0;
                self.last_ms = 0;
                self.in_burst = false;
            }
        } else if self.in_burst {
            // Only enqueues extend a running burst; an expiry that leaves
            // data pending keeps the burst open without progress.
            if event == BurstEvent::Enqueue {
                self.total_bytes += event_bytes;
                self.last_ms = now_ms;
            }
        } else {
            self.in_burst = true;
            self.total_bytes = event_bytes;
            self.started_ms = now_ms;
            self.last_ms = now_ms;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_lifecycle() {
        let mut tracker = BurstTracker::new(1);

        // Burst starts with pending data.
        assert!(tracker.observe(BurstEvent::Enqueue, 1, 100, 0).is_none());
        assert!(tracker.in_burst());

        // Continues across several ticks.
        assert!(tracker.observe(BurstEvent::Enqueue, 2, 100, 5).is_none());
        assert!(tracker.observe(BurstEvent::Enqueue, 1, 100, 10).is_none());

        // Buffers drain: the burst ends and is long enough to report.
        let report = tracker.observe(BurstEvent::Enqueue, 0, 0, 11).unwrap();
        assert_eq!(report.bytes, 300);
        assert_eq!(report.duration_ms, 10);
        assert!(!tracker.in_burst());
    }

    #[test]
    fn test_short_burst_not_reported() {
        let mut tracker = BurstTracker::new(1);
        tracker.observe(BurstEvent::Enqueue, 1, 50, 0);
        // Drained within a single tick.
        assert!(tracker.observe(BurstEvent::Enqueue, 0, 0, 1).is_none());
        assert!(!tracker.in_burst());
    }

    #[test]
    fn test_reordering_keeps_burst_open() {
        let mut tracker = BurstTracker::new(1);
        tracker.observe(BurstEvent::Enqueue, 1, 100, 0);
        tracker.observe(BurstEvent::Enqueue, 1, 100, 5);

        // Expiry with data still pending: no progress counted.
        assert!(tracker.observe(BurstEvent::Reordering, 1, 40, 7).is_none());

        let report = tracker.observe(BurstEvent::Enqueue, 0, 0, 9).unwrap();
        assert_eq!(report.bytes, 200);
        assert_eq!(report.duration_ms, 5);
    }
}
