//! Collaborator interfaces of the receive entity.
//!
//! The entity never owns its collaborators; they are handed in by
//! reference on each event, so a single caller can drive many flows
//! with one sink.

use alloc::vec::Vec;

/// Upper-layer delivery sink.
///
/// Called zero or more times per input event, strictly in increasing
/// `sdu_sno` order over the lifetime of an entity (a full reset starts a
/// new numbering domain).
pub trait SduSink {
    /// Receives a completely reassembled SDU.
    fn on_sdu_ready(&mut self, sdu_sno: u32, payload: Vec<u8>);
}

/// A finished data burst, as seen by the burst tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurstReport {
    /// Payload bytes progressed during the burst.
    pub bytes: u64,

    /// Burst duration in milliseconds.
    pub duration_ms: u64,
}

/// Statistics collaborator.
///
/// Every method has a no-op default so implementors subscribe only to
/// the events they care about. Loss events are one-shot: exactly one
/// call per permanently missing unit.
pub trait Telemetry {
    /// An SDU was skipped: it can never be delivered.
    fn sdu_lost(&mut self, _sdu_sno: u32) {}

    /// A PDU was never reassembled: its sequence number was passed over.
    fn pdu_lost(&mut self, _tsn: u32) {}

    /// An SDU of `len` bytes was handed to the upper layer.
    fn sdu_delivered(&mut self, _sdu_sno: u32, _len: usize) {}

    /// A data burst ended.
    fn burst_ended(&mut self, _report: BurstReport) {}
}

/// Telemetry implementation that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTelemetry;

impl Telemetry for NullTelemetry {}
