//! Core data units exchanged with the receive entity.
//!
//! - UmPdu: the unit delivered by the lower layer, identified by a TSN
//! - Segment: one (portion of an) SDU carried inside a PDU
//! - FramingInfo / SegmentKind: the fragmentation tags driving reassembly

mod pdu;

pub use pdu::{FramingInfo, Segment, SegmentKind, UmPdu, MAX_PDU_SEGMENTS};
