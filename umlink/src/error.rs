//! Error types for the receive entity.

use core::fmt;

/// Errors produced by the receive entity.
///
/// Recoverable protocol conditions (loss, duplicates, stale arrivals,
/// timeout-forced skips) are not errors; they are handled in place and
/// surface only through the telemetry collaborator. An `Err` from this
/// crate means either bad construction parameters or an unrecoverable
/// reassembly corruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The configured window size is zero or exceeds the slot capacity.
    InvalidWindowSize,

    /// The configured reordering timeout is zero.
    InvalidTimeout,

    /// A PDU cannot hold more segments.
    TooManySegments,

    /// Reassembly produced an SDU whose length contradicts the length
    /// declared by the transmitter. Continuing would hand corrupt data
    /// to the upper layer, so the flow must be torn down.
    ReassemblyCorrupt {
        /// Sequence number of the affected SDU.
        sdu_sno: u32,
        /// Declared total SDU length in bytes.
        expected: usize,
        /// Length actually accumulated.
        got: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidWindowSize => write!(f, "invalid receive window size"),
            Error::InvalidTimeout => write!(f, "reordering timeout must be positive"),
            Error::TooManySegments => write!(f, "too many segments in PDU"),
            Error::ReassemblyCorrupt { sdu_sno, expected, got } => write!(
                f,
                "corrupt reassembly of SDU {sdu_sno}: declared {expected} B, assembled {got} B"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
