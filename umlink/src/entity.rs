//! The unacknowledged-mode receive entity.
//!
//! Ties the window descriptor, slot buffer, reassembly engine,
//! reordering timer and burst tracker together under run-to-completion
//! semantics: exactly two events drive the entity — a PDU arrival
//! ([`UmRxEntity::enqueue`]) and a reordering-timer expiry
//! ([`UmRxEntity::poll_timer`]) — and each is handled fully, including
//! any upper-layer deliveries, before the call returns.

use log::{debug, trace};

use crate::burst::{BurstEvent, BurstTracker};
use crate::config::RxConfig;
use crate::core::UmPdu;
use crate::error::{Error, Result};
use crate::reassembly::ReassemblyEngine;
use crate::sink::{SduSink, Telemetry};
use crate::timer::ReorderingTimer;
use crate::window::{RxWindowDesc, SlotBuffer};

/// Counters maintained by the entity itself.
///
/// SDU-level outcomes (deliveries, losses) flow through the
/// [`Telemetry`] collaborator instead; these cover what only the entity
/// can see.
#[derive(Debug, Default, Clone, Copy)]
pub struct RxStats {
    /// PDUs handed to `enqueue`.
    pub pdus_received: u64,

    /// PDUs discarded because their slot was already occupied.
    pub duplicates: u64,

    /// PDUs discarded because their TSN was already processed for
    /// reordering.
    pub stale: u64,

    /// Reordering timer expiries handled.
    pub timer_expiries: u64,

    /// Payload bytes across all accepted PDUs.
    pub bytes_received: u64,
}

/// Receive-side reordering and reassembly entity.
///
/// `W` is the slot capacity; the configured window size may be smaller
/// but never larger. The entity owns all mutable state and is driven
/// single-threaded; collaborators are passed in per event.
///
/// # Example
///
/// ```rust,ignore
/// use umlink::{RxConfig, UmRxEntity};
///
/// let mut entity: UmRxEntity<16> = UmRxEntity::new(RxConfig::new())?;
/// entity.enqueue(pdu, now_ms, &mut sink, &mut telemetry)?;
/// entity.poll_timer(now_ms, &mut sink, &mut telemetry)?;
/// ```
#[derive(Debug)]
pub struct UmRxEntity<const W: usize> {
    /// Live window size (at most `W`).
    window_size: usize,

    /// Reordering timeout in milliseconds.
    timeout_ms: u64,

    /// Window cursors.
    desc: RxWindowDesc,

    /// Pending PDUs, one slot per in-window TSN.
    slots: SlotBuffer<W>,

    /// SDU reassembly state.
    engine: ReassemblyEngine,

    /// The t-reordering handle.
    timer: ReorderingTimer,

    /// Burst/idle observer.
    burst: BurstTracker,

    /// Entity-local counters.
    stats: RxStats,
}

impl<const W: usize> UmRxEntity<W> {
    /// Creates an entity from a validated configuration.
    pub fn new(config: RxConfig) -> Result<Self> {
        if config.window_size == 0 || config.window_size > W {
            return Err(Error::InvalidWindowSize);
        }
        if config.reordering_timeout_ms == 0 {
            return Err(Error::InvalidTimeout);
        }
        Ok(Self {
            window_size: config.window_size,
            timeout_ms: config.reordering_timeout_ms,
            desc: RxWindowDesc::new(config.window_size),
            slots: SlotBuffer::new(),
            engine: ReassemblyEngine::new(),
            timer: ReorderingTimer::new(),
            burst: BurstTracker::new(config.burst_tick_ms),
            stats: RxStats::default(),
        })
    }

    /// Handles a PDU arrival from the lower layer.
    ///
    /// Duplicates and stale arrivals are discarded silently (counted in
    /// [`RxStats`]); everything else is buffered, the window advanced if
    /// needed, contiguous PDUs reassembled and the reordering timer
    /// re-evaluated. Only reassembly corruption produces an `Err`.
    pub fn enqueue<S: SduSink, T: Telemetry>(
        &mut self,
        pdu: UmPdu,
        now_ms: u64,
        sink: &mut S,
        telemetry: &mut T,
    ) -> Result<()> {
        let tsn = pdu.tsn;
        self.stats.pdus_received += 1;

        trace!(
            "enqueue tsn {}, window [{}, {}), cursor {}",
            tsn,
            self.desc.first_sno(),
            self.desc.highest_received(),
            self.desc.first_for_reordering()
        );

        // Duplicate of a PDU still waiting in its slot.
        if tsn >= self.desc.first_for_reordering && tsn < self.desc.highest_received {
            let index = (tsn - self.desc.first_sno) as usize;
            if self.slots.is_occupied(index) {
                debug!("tsn {tsn} already buffered at slot {index}, discarding duplicate");
                self.stats.duplicates += 1;
                return Ok(());
            }
        }

        // Already walked over by reordering: it can no longer be used.
        if tsn < self.desc.first_for_reordering {
            debug!("tsn {tsn} already considered for reordering, discarding");
            self.stats.stale += 1;
            return Ok(());
        }

        self.stats.bytes_received += pdu.payload_len() as u64;

        // Beyond the horizon: advance the window, reassembling every
        // slot that falls off the front. Large jumps advance in steps
        // of at most one window size, and the floor never moves past
        // the arriving TSN.
        if tsn >= self.desc.highest_received {
            let old_highest = self.desc.highest_received;
            self.desc.highest_received = tsn + 1;

            if (self.desc.first_sno as u64 + self.window_size as u64)
                < self.desc.highest_received as u64
            {
                let mut shift = (self.desc.highest_received - old_highest) as usize;
                while shift > 0 {
                    let step = shift.min(self.window_size);
                    shift -= step;

                    let step = if self.desc.first_sno as u64 + step as u64 > tsn as u64 {
                        (tsn - self.desc.first_sno) as usize
                    } else {
                        step
                    };

                    for i in 0..step {
                        self.reassemble(i, sink, telemetry)?;
                    }
                    self.move_rx_window(step);
                }

                if self.desc.first_for_reordering < self.desc.first_sno {
                    self.desc.first_for_reordering = self.desc.first_sno;
                }
            }
        }

        // Buffer the PDU at its (possibly shifted) slot.
        let index = (tsn - self.desc.first_sno) as usize;
        debug_assert!(index < self.window_size);
        let stored = self.slots.insert(index, pdu);
        debug_assert!(stored);
        trace!("tsn {tsn} stored at slot {index}");

        // Walk the reordering cursor over every contiguously occupied
        // slot and reassemble each one walked over.
        if self
            .slots
            .is_occupied((self.desc.first_for_reordering - self.desc.first_sno) as usize)
        {
            let old = self.desc.first_for_reordering;
            while self.desc.first_for_reordering < self.desc.highest_received
                && self.slots.is_occupied(
                    (self.desc.first_for_reordering - self.desc.first_sno) as usize,
                )
            {
                self.desc.first_for_reordering += 1;
            }

            let start = (old - self.desc.first_sno) as usize;
            let end = (self.desc.first_for_reordering - self.desc.first_sno) as usize;
            for i in start..end {
                self.reassemble(i, sink, telemetry)?;
            }
        }

        // The timer's target may have been overtaken or invalidated.
        if self.timer.busy()
            && (self.desc.reordering_sno <= self.desc.first_for_reordering
                || self.desc.reordering_sno < self.desc.first_sno
                || self.desc.reordering_sno > self.desc.highest_received)
        {
            self.timer.stop();
        }
        if !self.timer.busy() && self.desc.has_gap() {
            self.desc.reordering_sno = self.desc.highest_received;
            self.timer.start(now_ms, self.timeout_ms);
            trace!(
                "t-reordering armed, target {}",
                self.desc.reordering_sno()
            );
        }

        self.observe_burst(BurstEvent::Enqueue, now_ms, telemetry);
        Ok(())
    }

    /// Fires the reordering timeout if it is due.
    ///
    /// Walks the cursor past the missing slot(s) up to the armed target
    /// (and onward across occupied slots), reassembles everything
    /// walked over, and re-arms if a gap remains. Returns whether the
    /// timer fired.
    pub fn poll_timer<S: SduSink, T: Telemetry>(
        &mut self,
        now_ms: u64,
        sink: &mut S,
        telemetry: &mut T,
    ) -> Result<bool> {
        if !self.timer.expired(now_ms) {
            return Ok(false);
        }
        self.timer.stop();
        self.stats.timer_expiries += 1;

        debug!(
            "t-reordering expired, skipping to target {} (cursor {})",
            self.desc.reordering_sno(),
            self.desc.first_for_reordering()
        );

        let old = self.desc.first_for_reordering;
        while self.desc.first_for_reordering < self.desc.highest_received
            && (self
                .slots
                .is_occupied((self.desc.first_for_reordering - self.desc.first_sno) as usize)
                || self.desc.first_for_reordering < self.desc.reordering_sno)
        {
            self.desc.first_for_reordering += 1;
        }

        let start = (old - self.desc.first_sno) as usize;
        let end = (self.desc.first_for_reordering - self.desc.first_sno) as usize;
        for i in start..end {
            self.reassemble(i, sink, telemetry)?;
        }

        if self.desc.has_gap() {
            self.desc.reordering_sno = self.desc.highest_received;
            self.timer.start(now_ms, self.timeout_ms);
        }

        self.observe_burst(BurstEvent::Reordering, now_ms, telemetry);
        Ok(true)
    }

    /// Resets the entity for a new numbering domain.
    ///
    /// The window is returned to its initial empty state and the next
    /// arriving PDU/SDU redefines the delivery-counter baselines: no
    /// loss is reported for the sequence numbers preceding it.
    pub fn reset_full(&mut self) {
        debug!("full reset: new numbering domain");
        self.desc.clear(0);
        self.slots.clear();
        self.engine.clear_partial();
        let _ = self.engine.take_event_bytes();
        self.timer.stop();
        self.engine.set_resync();
    }

    /// Flushes the entity before it is discarded.
    ///
    /// Every still-occupied slot is reassembled in TSN order, then all
    /// buffers are cleared and the timer stopped.
    pub fn reset_drain<S: SduSink, T: Telemetry>(
        &mut self,
        sink: &mut S,
        telemetry: &mut T,
    ) -> Result<()> {
        debug!("drain reset: flushing {} buffered PDUs", self.slots.len());
        for i in 0..self.window_size {
            self.reassemble(i, sink, telemetry)?;
        }
        self.slots.clear();
        self.engine.clear_partial();
        let _ = self.engine.take_event_bytes();
        self.timer.stop();
        Ok(())
    }

    /// Returns true if no PDU and no partial SDU is buffered.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && !self.engine.has_partial()
    }

    /// The armed reordering deadline, if any.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timer.deadline()
    }

    /// The window cursors.
    pub fn window(&self) -> &RxWindowDesc {
        &self.desc
    }

    /// Entity-local counters.
    pub fn stats(&self) -> &RxStats {
        &self.stats
    }

    /// Hands the slot at `index` to the reassembly engine. Empty slots
    /// (missing or already reassembled) are skipped.
    fn reassemble<S: SduSink, T: Telemetry>(
        &mut self,
        index: usize,
        sink: &mut S,
        telemetry: &mut T,
    ) -> Result<()> {
        match self.slots.take(index) {
            Some(pdu) => self.engine.process_pdu(pdu, sink, telemetry),
            None => Ok(()),
        }
    }

    /// Moves the window floor forward by `pos` slots.
    fn move_rx_window(&mut self, pos: usize) {
        if pos == 0 {
            return;
        }
        debug_assert!(pos <= self.window_size);
        self.slots.shift_down(pos, self.window_size);
        self.desc.first_sno += pos as u32;
        trace!("window floor moved to {}", self.desc.first_sno());
    }

    /// Reports buffer occupancy to the burst tracker at the end of an
    /// event.
    fn observe_burst<T: Telemetry>(&mut self, event: BurstEvent, now_ms: u64, telemetry: &mut T) {
        let occupancy = self.slots.len() + usize::from(self.engine.has_partial());
        let bytes = self.engine.take_event_bytes();
        if let Some(report) = self.burst.observe(event, occupancy, bytes, now_ms) {
            telemetry.burst_ended(report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FramingInfo, Segment};
    use crate::sink::{BurstReport, NullTelemetry};
    use alloc::vec;
    use alloc::vec::Vec;

    #[derive(Default)]
    struct Recorder {
        sdus: Vec<(u32, Vec<u8>)>,
    }

    impl SduSink for Recorder {
        fn on_sdu_ready(&mut self, sdu_sno: u32, payload: Vec<u8>) {
            self.sdus.push((sdu_sno, payload));
        }
    }

    #[derive(Default)]
    struct Events {
        sdu_losses: Vec<u32>,
        pdu_losses: Vec<u32>,
        bursts: Vec<BurstReport>,
    }

    impl Telemetry for Events {
        fn sdu_lost(&mut self, sdu_sno: u32) {
            self.sdu_losses.push(sdu_sno);
        }
        fn pdu_lost(&mut self, tsn: u32) {
            self.pdu_losses.push(tsn);
        }
        fn burst_ended(&mut self, report: BurstReport) {
            self.bursts.push(report);
        }
    }

    fn whole(tsn: u32, len: usize) -> UmPdu {
        UmPdu::with_segment(
            tsn,
            FramingInfo::Complete,
            Segment::new(tsn, len, vec![tsn as u8; len]),
        )
    }

    fn entity() -> UmRxEntity<16> {
        UmRxEntity::new(RxConfig::new().with_reordering_timeout_ms(50)).unwrap()
    }

    #[test]
    fn test_config_validation() {
        assert_eq!(
            UmRxEntity::<8>::new(RxConfig::new().with_window_size(0)).err(),
            Some(Error::InvalidWindowSize)
        );
        assert_eq!(
            UmRxEntity::<8>::new(RxConfig::new().with_window_size(9)).err(),
            Some(Error::InvalidWindowSize)
        );
        assert_eq!(
            UmRxEntity::<8>::new(
                RxConfig::new().with_window_size(8).with_reordering_timeout_ms(0)
            )
            .err(),
            Some(Error::InvalidTimeout)
        );
    }

    #[test]
    fn test_in_order_delivery() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        for tsn in 0..5 {
            rx.enqueue(whole(tsn, 3), tsn as u64, &mut sink, &mut events).unwrap();
        }

        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![0, 1, 2, 3, 4]);
        assert!(rx.is_empty());
        // Nothing pending: the timer never armed.
        assert_eq!(rx.next_deadline(), None);
    }

    #[test]
    fn test_gap_arms_timer_and_duplicate_is_discarded() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(1, 3), 0, &mut sink, &mut events).unwrap();
        assert!(sink.sdus.is_empty());
        assert_eq!(rx.next_deadline(), Some(50));
        assert_eq!(rx.window().reordering_sno(), 2);

        rx.enqueue(whole(1, 3), 1, &mut sink, &mut events).unwrap();
        assert_eq!(rx.stats().duplicates, 1);
        assert!(sink.sdus.is_empty());

        // Filling the gap delivers both and disarms the timer.
        rx.enqueue(whole(0, 3), 2, &mut sink, &mut events).unwrap();
        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![0, 1]);
        assert_eq!(rx.next_deadline(), None);
    }

    #[test]
    fn test_stale_arrival_discarded() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(0, 3), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(0, 3), 1, &mut sink, &mut events).unwrap();

        assert_eq!(rx.stats().stale, 1);
        assert_eq!(sink.sdus.len(), 1);
    }

    #[test]
    fn test_timeout_skips_gap() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(0, 3), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(2, 3), 1, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(3, 3), 2, &mut sink, &mut events).unwrap();
        assert_eq!(sink.sdus.len(), 1);

        // Not due yet.
        assert!(!rx.poll_timer(50, &mut sink, &mut events).unwrap());
        assert!(rx.poll_timer(51, &mut sink, &mut events).unwrap());

        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![0, 2, 3]);
        assert_eq!(events.pdu_losses, vec![1]);
        assert_eq!(events.sdu_losses, vec![1]);
        assert_eq!(rx.stats().timer_expiries, 1);
        assert_eq!(rx.next_deadline(), None);
    }

    #[test]
    fn test_timeout_rearms_for_second_gap() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        // Gaps at 0 and 2.
        rx.enqueue(whole(1, 3), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(3, 3), 1, &mut sink, &mut events).unwrap();
        // Timer target was set on the first arrival (highest = 2), so
        // the expiry walk stops at the second gap.
        assert_eq!(rx.window().reordering_sno(), 2);

        assert!(rx.poll_timer(50, &mut sink, &mut events).unwrap());
        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![1]);

        // Re-armed for the remaining gap.
        assert_eq!(rx.window().reordering_sno(), 4);
        assert!(rx.poll_timer(100, &mut sink, &mut events).unwrap());
        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![1, 3]);
    }

    #[test]
    fn test_window_shift_reassembles_vacated_slots() {
        let mut rx: UmRxEntity<8> =
            UmRxEntity::new(RxConfig::new().with_window_size(8).with_reordering_timeout_ms(50))
                .unwrap();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(0, 3), 0, &mut sink, &mut events).unwrap();
        // Buffered out of order behind the missing TSN 1.
        for tsn in [2, 3, 4] {
            rx.enqueue(whole(tsn, 3), 0, &mut sink, &mut events).unwrap();
        }
        assert_eq!(sink.sdus.len(), 1);

        // TSN 10 pushes the floor forward; 2..=4 are reassembled on the
        // way out, 1 is reported lost.
        rx.enqueue(whole(10, 3), 1, &mut sink, &mut events).unwrap();

        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![0, 2, 3, 4]);
        assert_eq!(events.pdu_losses, vec![1]);
        assert_eq!(events.sdu_losses, vec![1]);
        assert!(rx.window().first_for_reordering() >= rx.window().first_sno());
        assert_eq!(rx.window().highest_received(), 11);
    }

    #[test]
    fn test_reset_full_resynchronizes() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(0, 3), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(2, 3), 1, &mut sink, &mut events).unwrap();

        rx.reset_full();
        assert!(rx.is_empty());
        assert_eq!(rx.next_deadline(), None);

        // First PDU of the new domain, far from the old numbering:
        // accepted as if it were the first ever, no loss reported.
        let fresh = UmPdu::with_segment(
            50,
            FramingInfo::Complete,
            Segment::new(7, 3, vec![7; 3]),
        );
        events.sdu_losses.clear();
        events.pdu_losses.clear();
        rx.enqueue(fresh, 2, &mut sink, &mut events).unwrap();

        assert_eq!(sink.sdus.last().unwrap().0, 7);
        assert!(events.sdu_losses.is_empty());
        assert!(events.pdu_losses.is_empty());
    }

    #[test]
    fn test_reset_drain_flushes_in_order() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        rx.enqueue(whole(2, 3), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(1, 3), 1, &mut sink, &mut events).unwrap();
        assert!(sink.sdus.is_empty());

        rx.reset_drain(&mut sink, &mut events).unwrap();

        let snos: Vec<u32> = sink.sdus.iter().map(|(s, _)| *s).collect();
        assert_eq!(snos, vec![1, 2]);
        assert!(rx.is_empty());
        assert_eq!(rx.next_deadline(), None);
    }

    #[test]
    fn test_burst_reported_via_telemetry() {
        let mut rx = entity();
        let mut sink = Recorder::default();
        let mut events = Events::default();

        // A gap keeps the buffer occupied across several milliseconds.
        rx.enqueue(whole(1, 10), 0, &mut sink, &mut events).unwrap();
        rx.enqueue(whole(2, 10), 5, &mut sink, &mut events).unwrap();
        // Filling the gap drains everything.
        rx.enqueue(whole(0, 10), 9, &mut sink, &mut events).unwrap();

        // The burst spans the enqueues made while data was pending.
        assert_eq!(events.bursts.len(), 1);
        assert_eq!(events.bursts[0].duration_ms, 5);
    }

    #[test]
    fn test_corruption_is_fatal() {
        let mut rx = entity();
        let mut sink = Recorder::default();

        let bad = UmPdu::with_segment(
            0,
            FramingInfo::Complete,
            Segment::new(0, 10, vec![0; 4]),
        );
        let err = rx.enqueue(bad, 0, &mut sink, &mut NullTelemetry).unwrap_err();
        assert!(matches!(err, Error::ReassemblyCorrupt { .. }));
    }
}
