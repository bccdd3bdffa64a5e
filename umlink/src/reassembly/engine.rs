//! Per-segment reassembly state machine.
//!
//! Each segment of a consumed PDU resolves to one [`SegmentKind`] arm:
//!
//! - Whole: delivered immediately; its length must match the declared
//!   SDU length exactly.
//! - First: opens the pending partial SDU, superseding any stale one.
//! - Middle/Last: accepted only if the partial exists, belongs to the
//!   same SDU, and the contributing PDU's sequence number is exactly one
//!   past the partial's last contributor. A failed check discards both
//!   the partial and the fragment; the loss surfaces later through the
//!   delivery counter fast-forward.
//!
//! A Last fragment whose combined length disagrees with the declared SDU
//! length in either direction is a corruption of the flow, not a loss.

use alloc::vec::Vec;

use log::{debug, trace};

use crate::core::{Segment, SegmentKind, UmPdu};
use crate::error::{Error, Result};
use crate::sink::{SduSink, Telemetry};

/// The single SDU awaiting its missing portion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialSdu {
    /// Sequence number of the SDU being assembled.
    pub sdu_sno: u32,

    /// Declared length of the whole SDU.
    pub total_len: usize,

    /// Bytes assembled so far.
    pub bytes: Vec<u8>,

    /// TSN of the PDU that contributed the most recent fragment; the
    /// next contributor must carry exactly this plus one.
    pub last_tsn: u32,
}

/// Rebuilds SDUs from PDUs handed over by the window.
#[derive(Debug, Default)]
pub struct ReassemblyEngine {
    /// At most one outstanding partial SDU.
    partial: Option<PartialSdu>,

    /// Sequence number of the last SDU handed to the upper layer.
    last_sno_delivered: u32,

    /// Sequence number of the last PDU consumed by reassembly.
    last_pdu_reassembled: u32,

    /// When set, the next consumed PDU re-baselines both counters
    /// instead of reporting the gap before it as loss.
    resync: bool,

    /// Payload progress of the current event, consumed by the burst
    /// tracker.
    event_bytes: u64,
}

impl ReassemblyEngine {
    /// Creates an engine with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a partial SDU is buffered.
    pub const fn has_partial(&self) -> bool {
        self.partial.is_some()
    }

    /// Sequence number of the last SDU delivered.
    pub const fn last_sno_delivered(&self) -> u32 {
        self.last_sno_delivered
    }

    /// Sequence number of the last PDU reassembled.
    pub const fn last_pdu_reassembled(&self) -> u32 {
        self.last_pdu_reassembled
    }

    /// Arms the resynchronization flag: the next consumed PDU and SDU
    /// redefine the counter baselines, reporting no loss for the gap
    /// before them.
    pub fn set_resync(&mut self) {
        self.resync = true;
    }

    /// Discards the buffered partial SDU, if any. Its bytes no longer
    /// count as burst progress.
    pub fn clear_partial(&mut self) {
        if let Some(partial) = self.partial.take() {
            trace!(
                "discarding partial SDU {} ({} of {} B)",
                partial.sdu_sno,
                partial.bytes.len(),
                partial.total_len
            );
            self.event_bytes = self.event_bytes.saturating_sub(partial.bytes.len() as u64);
        }
    }

    /// Takes the payload progress accumulated since the last call.
    pub fn take_event_bytes(&mut self) -> u64 {
        core::mem::take(&mut self.event_bytes)
    }

    /// Consumes one PDU, delivering every SDU it completes.
    ///
    /// The PDU must be handed over in reordering order; the caller (the
    /// window) guarantees each TSN is consumed at most once.
    pub fn process_pdu<S: SduSink, T: Telemetry>(
        &mut self,
        pdu: UmPdu,
        sink: &mut S,
        telemetry: &mut T,
    ) -> Result<()> {
        let pdu_sno = pdu.tsn;
        let fi = pdu.framing;
        let num_segments = pdu.num_segments();

        if self.resync {
            self.last_pdu_reassembled = pdu_sno.wrapping_sub(1);
        }

        for (i, segment) in pdu.into_segments().into_iter().enumerate() {
            let first = i == 0;
            let last = i == num_segments - 1;

            // After a full reset the first extracted SDU re-baselines
            // the delivery counter; a continuation fragment at that
            // point has lost its opening piece to the old numbering
            // domain and must be dropped.
            let mut ignore_fragment = false;
            if first && self.resync {
                self.last_sno_delivered = segment.sdu_sno.wrapping_sub(1);
                self.resync = false;
                ignore_fragment = true;
            }

            match SegmentKind::classify(fi, first, last) {
                SegmentKind::Whole => {
                    if segment.len() != segment.total_len {
                        return Err(Error::ReassemblyCorrupt {
                            sdu_sno: segment.sdu_sno,
                            expected: segment.total_len,
                            got: segment.len(),
                        });
                    }
                    trace!("pdu {}: whole SDU {}", pdu_sno, segment.sdu_sno);
                    self.clear_partial();
                    self.event_bytes += segment.len() as u64;
                    self.deliver(segment.sdu_sno, segment.payload, sink, telemetry);
                }
                SegmentKind::First => {
                    trace!(
                        "pdu {}: first fragment of SDU {} ({} B)",
                        pdu_sno,
                        segment.sdu_sno,
                        segment.len()
                    );
                    self.clear_partial();
                    self.event_bytes += segment.len() as u64;
                    self.partial = Some(PartialSdu {
                        sdu_sno: segment.sdu_sno,
                        total_len: segment.total_len,
                        bytes: segment.payload,
                        last_tsn: pdu_sno,
                    });
                }
                SegmentKind::Middle => {
                    match self.accept_continuation(pdu_sno, &segment, ignore_fragment) {
                        Some(mut partial) => {
                            self.event_bytes += segment.len() as u64;
                            partial.bytes.extend_from_slice(&segment.payload);
                            partial.last_tsn = pdu_sno;
                            trace!(
                                "pdu {}: middle fragment of SDU {}, {} of {} B",
                                pdu_sno,
                                partial.sdu_sno,
                                partial.bytes.len(),
                                partial.total_len
                            );
                            self.partial = Some(partial);
                        }
                        None => continue,
                    }
                }
                SegmentKind::Last => {
                    match self.accept_continuation(pdu_sno, &segment, ignore_fragment) {
                        Some(mut partial) => {
                            let assembled = partial.bytes.len() + segment.len();
                            if assembled != segment.total_len {
                                // Short or long, the transmitter's
                                // declared length can no longer be met.
                                return Err(Error::ReassemblyCorrupt {
                                    sdu_sno: segment.sdu_sno,
                                    expected: segment.total_len,
                                    got: assembled,
                                });
                            }
                            self.event_bytes += segment.len() as u64;
                            partial.bytes.extend_from_slice(&segment.payload);
                            trace!(
                                "pdu {}: last fragment completes SDU {} ({} B)",
                                pdu_sno,
                                partial.sdu_sno,
                                partial.bytes.len()
                            );
                            self.deliver(partial.sdu_sno, partial.bytes, sink, telemetry);
                        }
                        None => continue,
                    }
                }
            }
        }

        // Any TSN skipped between the previous consumed PDU and this one
        // is now permanently lost.
        while pdu_sno > self.last_pdu_reassembled.wrapping_add(1) {
            self.last_pdu_reassembled = self.last_pdu_reassembled.wrapping_add(1);
            telemetry.pdu_lost(self.last_pdu_reassembled);
        }
        self.last_pdu_reassembled = pdu_sno;

        Ok(())
    }

    /// Validates a Middle/Last fragment against the pending partial.
    ///
    /// On success the partial is taken out for the caller to extend or
    /// complete. On failure the partial and the fragment are both
    /// unrecoverable: the partial is discarded and `None` returned.
    fn accept_continuation(
        &mut self,
        pdu_sno: u32,
        segment: &Segment,
        ignore_fragment: bool,
    ) -> Option<PartialSdu> {
        let continues = self.partial.as_ref().is_some_and(|p| {
            p.sdu_sno == segment.sdu_sno && pdu_sno == p.last_tsn.wrapping_add(1)
        });
        if ignore_fragment || !continues {
            debug!(
                "pdu {}: dropping continuation of SDU {}, {}",
                pdu_sno,
                segment.sdu_sno,
                if self.partial.is_some() {
                    "fragments not contiguous"
                } else {
                    "first part missing"
                }
            );
            self.clear_partial();
            return None;
        }
        self.partial.take()
    }

    /// Hands a finished SDU upward, fast-forwarding the delivery counter
    /// over any SDUs that can no longer arrive.
    fn deliver<S: SduSink, T: Telemetry>(
        &mut self,
        sdu_sno: u32,
        payload: Vec<u8>,
        sink: &mut S,
        telemetry: &mut T,
    ) {
        while sdu_sno > self.last_sno_delivered.wrapping_add(1) {
            self.last_sno_delivered = self.last_sno_delivered.wrapping_add(1);
            telemetry.sdu_lost(self.last_sno_delivered);
        }
        self.last_sno_delivered = sdu_sno;

        debug!("delivering SDU {} ({} B)", sdu_sno, payload.len());
        telemetry.sdu_delivered(sdu_sno, payload.len());
        sink.on_sdu_ready(sdu_sno, payload);
    }
}
