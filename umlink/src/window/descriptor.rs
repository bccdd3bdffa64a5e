//! Window cursor bookkeeping.

/// Cursors describing the receive window.
///
/// The invariant
/// `first_sno <= first_for_reordering <= highest_received <= first_sno + window_size`
/// holds between events; the upper bound may flex while the window is
/// being advanced in batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxWindowDesc {
    /// Sequence number of the first PDU tracked by the window (the floor).
    pub(crate) first_sno: u32,

    /// First sequence number not yet walked over by in-order reordering.
    pub(crate) first_for_reordering: u32,

    /// Target sequence number of the armed reordering timer: when the
    /// timer fires, the reordering cursor is forced up to here.
    pub(crate) reordering_sno: u32,

    /// One past the highest sequence number received so far.
    pub(crate) highest_received: u32,

    /// Number of live slots in the window. Never cleared.
    window_size: usize,
}

impl RxWindowDesc {
    /// Creates a descriptor with all cursors at zero.
    pub const fn new(window_size: usize) -> Self {
        Self {
            first_sno: 0,
            first_for_reordering: 0,
            reordering_sno: 0,
            highest_received: 0,
            window_size,
        }
    }

    /// Resets every cursor to `sno`, keeping the window size.
    pub fn clear(&mut self, sno: u32) {
        self.first_sno = sno;
        self.first_for_reordering = sno;
        self.reordering_sno = sno;
        self.highest_received = sno;
    }

    /// The window floor.
    pub const fn first_sno(&self) -> u32 {
        self.first_sno
    }

    /// The reordering cursor.
    pub const fn first_for_reordering(&self) -> u32 {
        self.first_for_reordering
    }

    /// The armed timer's target sequence number.
    pub const fn reordering_sno(&self) -> u32 {
        self.reordering_sno
    }

    /// One past the highest sequence number seen.
    pub const fn highest_received(&self) -> u32 {
        self.highest_received
    }

    /// The window size.
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    /// Returns true if a gap remains between the reordering cursor and
    /// the highest received sequence number.
    pub const fn has_gap(&self) -> bool {
        self.highest_received > self.first_for_reordering
    }
}
