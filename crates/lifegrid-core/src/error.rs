//! Error types for the lifegrid workspace.
//!
//! Organized by failure class: configuration (fail fast at construction),
//! exchange (fatal protocol violations between workers), and export
//! (failures reported by an image sink). [`WorkerError`] is what a single
//! generation step can return.

use std::error::Error;
use std::fmt;

use crate::id::{Rank, Tag};

/// Errors detected while validating a configuration or building a tile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The global frame has side length zero.
    ZeroFrameSize,
    /// The cooperating set has no workers.
    ZeroWorkers,
    /// A decomposition would hand a worker a tile with no interior cells.
    EmptyTile {
        /// The worker that would own the empty tile.
        rank: Rank,
        /// Interior width of the tile.
        width: usize,
        /// Interior height of the tile.
        height: usize,
    },
    /// A rank is outside `0..workers`.
    RankOutOfRange {
        /// The offending rank.
        rank: Rank,
        /// Number of workers in the set.
        workers: usize,
    },
    /// The rank exists but takes no part in the decomposition (2D layouts
    /// only use the largest square number of workers).
    InactiveRank {
        /// The idle rank.
        rank: Rank,
        /// Number of ranks that own a tile.
        active: usize,
    },
    /// A tile's interior does not fit inside the global frame.
    TileOutsideFrame {
        /// Description of the overflow.
        reason: String,
    },
    /// A halo margin is present on a global edge, or missing on an
    /// internal one.
    HaloMismatch {
        /// Which edge is inconsistent.
        reason: String,
    },
    /// The transport's worker count disagrees with the decomposition's.
    TransportMismatch {
        /// Workers the decomposition expects.
        expected: usize,
        /// Workers the transport connects.
        actual: usize,
    },
    /// A pattern name or numeric code was not recognized.
    UnknownPattern {
        /// The unrecognized input.
        input: String,
    },
    /// A decomposition name was not recognized.
    UnknownLayout {
        /// The unrecognized input.
        input: String,
    },
    /// Text grid input is not a square of cells.
    MalformedGrid {
        /// What is wrong with the input.
        reason: String,
    },
    /// The export pixel scale is zero.
    ZeroScale,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroFrameSize => write!(f, "frame size must be at least 1"),
            Self::ZeroWorkers => write!(f, "worker count must be at least 1"),
            Self::EmptyTile {
                rank,
                width,
                height,
            } => write!(f, "rank {rank} would own an empty {width}x{height} tile"),
            Self::RankOutOfRange { rank, workers } => {
                write!(f, "rank {rank} out of range for {workers} workers")
            }
            Self::InactiveRank { rank, active } => {
                write!(f, "rank {rank} owns no tile (only {active} ranks are active)")
            }
            Self::TileOutsideFrame { reason } => write!(f, "tile outside frame: {reason}"),
            Self::HaloMismatch { reason } => write!(f, "halo mismatch: {reason}"),
            Self::TransportMismatch { expected, actual } => write!(
                f,
                "transport connects {actual} workers, decomposition expects {expected}"
            ),
            Self::UnknownPattern { input } => write!(f, "unknown pattern '{input}'"),
            Self::UnknownLayout { input } => {
                write!(f, "unknown layout '{input}' (expected strips or blocks)")
            }
            Self::MalformedGrid { reason } => write!(f, "malformed grid: {reason}"),
            Self::ZeroScale => write!(f, "export scale must be at least 1"),
        }
    }
}

impl Error for ConfigError {}

/// Fatal violations of the halo-exchange protocol.
///
/// The protocols assume a reliable, ordered, lossless channel between
/// any two ranks. Any of these means the assumption (or the exchange
/// ordering) is broken; there is no retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExchangeError {
    /// A message carried a different number of cells than expected.
    SizeMismatch {
        /// The peer the message came from.
        peer: Rank,
        /// Tag of the message.
        tag: Tag,
        /// Cells the receiver expected.
        expected: usize,
        /// Cells the message carried.
        actual: usize,
    },
    /// A message arrived with a tag other than the one being waited for.
    TagMismatch {
        /// The peer the message came from.
        peer: Rank,
        /// Tag the receiver expected.
        expected: Tag,
        /// Tag the message carried.
        actual: Tag,
    },
    /// The peer's end of the channel is gone.
    Disconnected {
        /// The vanished peer.
        peer: Rank,
    },
    /// The peer rank is not addressable from this worker (out of range,
    /// or the worker itself).
    UnknownPeer {
        /// The unaddressable rank.
        peer: Rank,
    },
}

impl fmt::Display for ExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch {
                peer,
                tag,
                expected,
                actual,
            } => write!(
                f,
                "{tag} message from rank {peer} carried {actual} cells, expected {expected}"
            ),
            Self::TagMismatch {
                peer,
                expected,
                actual,
            } => write!(
                f,
                "out-of-order message from rank {peer}: got {actual}, expected {expected}"
            ),
            Self::Disconnected { peer } => write!(f, "rank {peer} disconnected"),
            Self::UnknownPeer { peer } => write!(f, "rank {peer} is not a reachable peer"),
        }
    }
}

impl Error for ExchangeError {}

/// Failures reported by an image sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportError {
    /// A pixel was set outside the frame announced by `begin_frame`.
    PixelOutOfBounds {
        /// Column of the pixel.
        x: usize,
        /// Row of the pixel.
        y: usize,
        /// Frame width.
        width: usize,
        /// Frame height.
        height: usize,
    },
    /// A pixel was set or a frame flushed before `begin_frame`.
    NoOpenFrame,
    /// The downstream consumer of painted frames has gone away.
    Closed,
    /// Writing the frame to storage failed.
    Io {
        /// Description of the failure.
        reason: String,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PixelOutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({x}, {y}) outside {width}x{height} frame"),
            Self::NoOpenFrame => write!(f, "no frame has been begun"),
            Self::Closed => write!(f, "frame consumer closed"),
            Self::Io { reason } => write!(f, "frame write failed: {reason}"),
        }
    }
}

impl Error for ExportError {}

/// Errors from running one generation on a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkerError {
    /// The halo exchange failed.
    Exchange(ExchangeError),
    /// The image sink failed.
    Export(ExportError),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exchange(e) => write!(f, "halo exchange failed: {e}"),
            Self::Export(e) => write!(f, "export failed: {e}"),
        }
    }
}

impl Error for WorkerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Exchange(e) => Some(e),
            Self::Export(e) => Some(e),
        }
    }
}

impl From<ExchangeError> for WorkerError {
    fn from(e: ExchangeError) -> Self {
        Self::Exchange(e)
    }
}

impl From<ExportError> for WorkerError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_error_chains_source() {
        let err = WorkerError::from(ExchangeError::Disconnected { peer: Rank(2) });
        assert_eq!(err.to_string(), "halo exchange failed: rank 2 disconnected");
        assert!(err.source().is_some());
    }

    #[test]
    fn parse_errors_echo_the_input() {
        let err = ConfigError::UnknownLayout { input: "hex".into() };
        assert_eq!(err.to_string(), "unknown layout 'hex' (expected strips or blocks)");
    }

    #[test]
    fn size_mismatch_names_tag_and_counts() {
        let err = ExchangeError::SizeMismatch {
            peer: Rank(1),
            tag: Tag::HaloRow,
            expected: 8,
            actual: 7,
        };
        let msg = err.to_string();
        assert!(msg.contains("halo-row(15)"));
        assert!(msg.contains("7 cells"));
        assert!(msg.contains("expected 8"));
    }
}
