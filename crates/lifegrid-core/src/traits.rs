//! Seams between the simulation core and its collaborators.

use crate::error::{ExchangeError, ExportError};
use crate::id::{Generation, Rank, Tag};

/// Colour painted for a live cell.
pub const ALIVE_RGB: [u8; 3] = [255, 255, 255];

/// Colour painted for a dead cell.
pub const DEAD_RGB: [u8; 3] = [0, 0, 0];

/// Colour for a cell state.
#[inline]
pub fn cell_color(alive: bool) -> [u8; 3] {
    if alive {
        ALIVE_RGB
    } else {
        DEAD_RGB
    }
}

/// Blocking, rank-addressed point-to-point messaging over boolean payloads.
///
/// Implementations must be reliable and ordered per (source, destination)
/// pair. Both operations block until the transfer completes; there is no
/// timeout. The exchange protocols are written so that this never
/// deadlocks for a correct peer set.
pub trait Transport: Send {
    /// This worker's rank.
    fn rank(&self) -> Rank;

    /// Number of workers reachable through this transport (including self).
    fn size(&self) -> usize;

    /// Send `payload` to `dest` under `tag`, blocking until it is taken.
    fn send(&mut self, dest: Rank, tag: Tag, payload: &[bool]) -> Result<(), ExchangeError>;

    /// Receive the next message from `source` into `buf`.
    ///
    /// `buf.len()` is the expected message length. A message with a
    /// different length or tag is a protocol violation and must be
    /// reported, not truncated or skipped.
    fn receive(&mut self, source: Rank, tag: Tag, buf: &mut [bool]) -> Result<(), ExchangeError>;
}

/// Receives rendered frames, one pixel at a time.
///
/// Coordinates are global frame coordinates. A worker paints only the
/// region it exports, then commits it with [`flush_frame`](Self::flush_frame).
/// Persistence format and file naming belong to the implementation.
pub trait FrameSink {
    /// Announce a frame of `width x height` pixels.
    fn begin_frame(&mut self, width: usize, height: usize) -> Result<(), ExportError>;

    /// Set one pixel of the open frame.
    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) -> Result<(), ExportError>;

    /// Commit everything painted since `begin_frame` as part of `frame`.
    fn flush_frame(&mut self, frame: Generation) -> Result<(), ExportError>;
}

/// Per-cell callback invoked while the rule is evaluated.
///
/// Receives interior-local `(row, col)` and the cell's value *before*
/// the update. Observers cannot influence the rule.
pub trait CellObserver {
    /// Observe one interior cell.
    fn observe(&mut self, row: usize, col: usize, alive: bool);
}

impl<F: FnMut(usize, usize, bool)> CellObserver for F {
    fn observe(&mut self, row: usize, col: usize, alive: bool) {
        self(row, col, alive)
    }
}
