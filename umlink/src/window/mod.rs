//! Receive window state.
//!
//! - RxWindowDesc: the four window cursors and the window size
//! - SlotBuffer: fixed-capacity storage for pending PDUs, one slot per
//!   in-window sequence number

mod descriptor;
mod slots;

pub use descriptor::RxWindowDesc;
pub use slots::SlotBuffer;
