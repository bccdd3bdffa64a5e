//! PDU and segment definitions.
//!
//! A PDU carries an ordered list of segments, each of which is a whole
//! SDU or a fragment of one. The PDU-level framing tag says whether the
//! PDU's edges continue an SDU begun in a neighbouring PDU:
//!
//! ```text
//! FI  first byte of PDU          last byte of PDU
//! 00  starts an SDU              ends an SDU
//! 01  starts an SDU              SDU continues in the next PDU
//! 10  continues a previous SDU   ends an SDU
//! 11  continues a previous SDU   SDU continues in the next PDU
//! ```
//!
//! Combined with a segment's position inside the PDU, the tag resolves to
//! exactly one [`SegmentKind`]; segments strictly between the first and
//! last are always whole SDUs.

use alloc::vec::Vec;

use crate::error::{Error, Result};

/// Maximum number of segments a single PDU may carry.
pub const MAX_PDU_SEGMENTS: usize = 32;

/// PDU-level framing tag (two bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FramingInfo {
    /// The PDU begins and ends on SDU boundaries.
    Complete = 0b00,

    /// The PDU ends mid-SDU: its last segment is a first fragment.
    FirstPiece = 0b01,

    /// The PDU begins mid-SDU: its first segment is a last fragment.
    LastPiece = 0b10,

    /// The PDU begins and ends mid-SDU.
    MiddlePiece = 0b11,
}

impl FramingInfo {
    /// Converts the two-bit wire value to a tag.
    pub const fn from_bits(value: u8) -> Option<Self> {
        match value {
            0b00 => Some(Self::Complete),
            0b01 => Some(Self::FirstPiece),
            0b10 => Some(Self::LastPiece),
            0b11 => Some(Self::MiddlePiece),
            _ => None,
        }
    }

    /// Returns the two-bit wire value.
    pub const fn bits(&self) -> u8 {
        *self as u8
    }
}

/// What a segment is, relative to the SDU it belongs to.
///
/// This is the state machine alphabet of the reassembly engine: each
/// variant maps to one arm of the per-segment dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A complete SDU contained in this PDU.
    Whole,

    /// The first fragment of an SDU; the rest follows in later PDUs.
    First,

    /// A middle fragment: continues a pending partial SDU and leaves it
    /// still incomplete.
    Middle,

    /// The last fragment: completes a pending partial SDU.
    Last,
}

impl SegmentKind {
    /// Classifies a segment from the PDU framing tag and the segment's
    /// position within the PDU.
    ///
    /// `first` and `last` say whether the segment is the first/last of
    /// its PDU; a sole segment is both.
    pub const fn classify(fi: FramingInfo, first: bool, last: bool) -> Self {
        match (first, last) {
            // Sole segment: the tag maps one-to-one.
            (true, true) => match fi {
                FramingInfo::Complete => Self::Whole,
                FramingInfo::FirstPiece => Self::First,
                FramingInfo::LastPiece => Self::Last,
                FramingInfo::MiddlePiece => Self::Middle,
            },
            // First of several: only the leading edge of the tag applies.
            (true, false) => match fi {
                FramingInfo::Complete | FramingInfo::FirstPiece => Self::Whole,
                FramingInfo::LastPiece | FramingInfo::MiddlePiece => Self::Last,
            },
            // Last of several: only the trailing edge applies.
            (false, true) => match fi {
                FramingInfo::Complete | FramingInfo::LastPiece => Self::Whole,
                FramingInfo::FirstPiece | FramingInfo::MiddlePiece => Self::First,
            },
            // Interior segments start and end inside this PDU.
            (false, false) => Self::Whole,
        }
    }
}

/// One (portion of an) SDU carried by a PDU.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Sequence number of the SDU this segment belongs to.
    pub sdu_sno: u32,

    /// Declared length of the whole SDU, in bytes.
    pub total_len: usize,

    /// Payload bytes of this segment.
    pub payload: Vec<u8>,
}

impl Segment {
    /// Creates a segment.
    pub const fn new(sdu_sno: u32, total_len: usize, payload: Vec<u8>) -> Self {
        Self { sdu_sno, total_len, payload }
    }

    /// Length of this segment's payload in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Returns true if the segment carries no bytes.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A protocol data unit delivered by the lower layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UmPdu {
    /// Transmission sequence number.
    pub tsn: u32,

    /// PDU-level framing tag.
    pub framing: FramingInfo,

    /// Segments in transmission order.
    segments: heapless::Vec<Segment, MAX_PDU_SEGMENTS>,
}

impl UmPdu {
    /// Creates an empty PDU.
    pub fn new(tsn: u32, framing: FramingInfo) -> Self {
        Self {
            tsn,
            framing,
            segments: heapless::Vec::new(),
        }
    }

    /// Appends a segment, preserving transmission order.
    pub fn push_segment(&mut self, segment: Segment) -> Result<()> {
        self.segments.push(segment).map_err(|_| Error::TooManySegments)
    }

    /// Convenience constructor for a PDU carrying a single segment.
    pub fn with_segment(tsn: u32, framing: FramingInfo, segment: Segment) -> Self {
        let mut pdu = Self::new(tsn, framing);
        // A fresh PDU always has room for one segment.
        let _ = pdu.push_segment(segment);
        pdu
    }

    /// Number of segments in this PDU.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// The segments in transmission order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Consumes the PDU, yielding its segments in transmission order.
    pub fn into_segments(self) -> heapless::Vec<Segment, MAX_PDU_SEGMENTS> {
        self.segments
    }

    /// Total payload bytes across all segments.
    pub fn payload_len(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}
