//! Receive entity configuration.

use crate::{DEFAULT_BURST_TICK_MS, DEFAULT_REORDERING_TIMEOUT_MS, DEFAULT_WINDOW_SIZE};

/// Construction-time parameters of a receive entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxConfig {
    /// Number of live window slots. Must be positive and no larger than
    /// the slot capacity `W` of the entity it configures.
    pub window_size: usize,

    /// How long the reordering timer waits for a missing PDU before
    /// forcing the window past it, in milliseconds. Must be positive.
    pub reordering_timeout_ms: u64,

    /// Tick period used by the burst tracker: a burst only counts if it
    /// spans more than one tick.
    pub burst_tick_ms: u64,
}

impl RxConfig {
    /// Creates a configuration with the crate defaults.
    pub const fn new() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            reordering_timeout_ms: DEFAULT_REORDERING_TIMEOUT_MS,
            burst_tick_ms: DEFAULT_BURST_TICK_MS,
        }
    }

    /// Sets the window size.
    pub const fn with_window_size(mut self, size: usize) -> Self {
        self.window_size = size;
        self
    }

    /// Sets the reordering timeout in milliseconds.
    pub const fn with_reordering_timeout_ms(mut self, timeout: u64) -> Self {
        self.reordering_timeout_ms = timeout;
        self
    }

    /// Sets the burst tick period in milliseconds.
    pub const fn with_burst_tick_ms(mut self, tick: u64) -> Self {
        self.burst_tick_ms = tick;
        self
    }
}

impl Default for RxConfig {
    fn default() -> Self {
        Self::new()
    }
}
