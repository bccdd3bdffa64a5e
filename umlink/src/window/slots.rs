//! Fixed-capacity slot storage for pending PDUs.

use crate::core::UmPdu;

/// Index-addressable store of at most `W` pending PDUs.
///
/// Slot `i` holds the PDU whose sequence number is `floor + i`; an
/// occupied slot is a `Some`, so the occupancy flag and the payload can
/// never disagree. The runtime window size may be smaller than `W`.
#[derive(Debug)]
pub struct SlotBuffer<const W: usize> {
    slots: [Option<UmPdu>; W],

    /// Number of occupied slots.
    len: usize,
}

impl<const W: usize> SlotBuffer<W> {
    /// Creates an empty slot buffer.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| None),
            len: 0,
        }
    }

    /// Number of occupied slots.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no slot is occupied.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if slot `index` holds a PDU.
    pub fn is_occupied(&self, index: usize) -> bool {
        index < W && self.slots[index].is_some()
    }

    /// Stores a PDU at `index`.
    ///
    /// Returns false (and drops nothing) if the slot is already
    /// occupied; the caller treats that as a duplicate.
    pub fn insert(&mut self, index: usize, pdu: UmPdu) -> bool {
        if self.slots[index].is_some() {
            return false;
        }
        self.slots[index] = Some(pdu);
        self.len += 1;
        true
    }

    /// Removes and returns the PDU at `index`, if any.
    pub fn take(&mut self, index: usize) -> Option<UmPdu> {
        if index >= W {
            return None;
        }
        let pdu = self.slots[index].take();
        if pdu.is_some() {
            self.len -= 1;
        }
        pdu
    }

    /// Renumbers the slots after the window floor moved forward by
    /// `pos`: slot `i` becomes slot `i - pos`, slots falling off the
    /// front must already have been vacated by reassembly.
    pub fn shift_down(&mut self, pos: usize, window_size: usize) {
        if pos == 0 {
            return;
        }
        debug_assert!(pos <= window_size && window_size <= W);
        for i in 0..window_size {
            if i < pos {
                // Vacate anything left below the new floor.
                if self.slots[i].take().is_some() {
                    self.len -= 1;
                }
            }
            if i + pos < window_size {
                self.slots[i] = self.slots[i + pos].take();
            } else {
                self.slots[i] = None;
            }
        }
    }

    /// Empties every slot.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.len = 0;
    }
}

impl<const W: usize> Default for SlotBuffer<W> {
    fn default() -> Self {
        Self::new()
    }
}
