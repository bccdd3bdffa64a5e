//! SDU reassembly from buffered PDUs.
//!
//! The engine consumes PDUs that the window has confirmed (or given up
//! waiting on) and rebuilds the upper layer's in-order SDU stream,
//! keeping at most one partial SDU in flight.

mod engine;

pub use engine::{PartialSdu, ReassemblyEngine};
