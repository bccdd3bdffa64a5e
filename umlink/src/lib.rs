//! # UmLink - Unacknowledged-Mode Receive Reordering
//!
//! UmLink is a `no_std` compatible receive-side engine for an
//! unacknowledged-mode link layer that provides:
//!
//! - **Sliding-window reordering**: Out-of-order PDUs are buffered per
//!   sequence number and released in order
//! - **Timer-driven loss recovery**: A reordering timeout forces the
//!   window past PDUs that never arrive
//! - **Segment reassembly**: SDUs fragmented across consecutive PDUs
//!   are stitched back together before delivery
//! - **Loss accounting**: Exactly one loss event per skipped PDU/SDU
//! - **Burst detection**: Spans of sustained buffer occupancy are
//!   reported as data bursts
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                     Upper Layer (SduSink)                │
//! ├─────────────────────────────────────────────────────────┤
//! │                     Receive Entity                       │
//! │  ┌─────────────┐ ┌──────────────┐ ┌─────────────────┐  │
//! │  │ Reassembly  │ │ Slot Buffer  │ │ Window Cursors  │  │
//! │  └─────────────┘ └──────────────┘ └─────────────────┘  │
//! │  ┌─────────────┐ ┌──────────────┐                      │
//! │  │  Reordering │ │    Burst     │                      │
//! │  │    Timer    │ │   Tracker    │                      │
//! │  └─────────────┘ └──────────────┘                      │
//! ├─────────────────────────────────────────────────────────┤
//! │                 Lower Layer (PDU arrivals)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use umlink::{RxConfig, UmRxEntity};
//!
//! let mut rx: UmRxEntity<16> = UmRxEntity::new(RxConfig::new())?;
//!
//! // Feed PDUs as they arrive from the lower layer.
//! rx.enqueue(pdu, now_ms, &mut sink, &mut telemetry)?;
//!
//! // Drive the reordering timeout from the caller's clock.
//! rx.poll_timer(now_ms, &mut sink, &mut telemetry)?;
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod burst;
pub mod config;
pub mod core;
pub mod entity;
pub mod error;
pub mod reassembly;
pub mod sink;
pub mod timer;
pub mod window;

// Re-export commonly used types
pub use config::RxConfig;
pub use core::{FramingInfo, Segment, SegmentKind, UmPdu, MAX_PDU_SEGMENTS};
pub use entity::{RxStats, UmRxEntity};
pub use error::{Error, Result};
pub use sink::{BurstReport, NullTelemetry, SduSink, Telemetry};

/// Default number of live window slots
pub const DEFAULT_WINDOW_SIZE: usize = 16;

/// Default reordering timeout in milliseconds
pub const DEFAULT_REORDERING_TIMEOUT_MS: u64 = 100;

/// Default burst tick period in milliseconds
pub const DEFAULT_BURST_TICK_MS: u64 = 1;
