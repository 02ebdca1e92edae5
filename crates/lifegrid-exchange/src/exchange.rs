//! The [`HaloExchange`] trait and helpers shared by both protocols.

use lifegrid_core::{
    cell_color, CellObserver, ExchangeError, ExportError, FrameSink, Generation, Rank, Tag,
    Transport, WorkerError,
};
use lifegrid_tile::Grid;

/// A sink together with the frame number being painted into it.
pub struct ExportFrame<'a> {
    /// Where pixels go.
    pub sink: &'a mut dyn FrameSink,
    /// The generation shown by the frame.
    pub frame: Generation,
}

/// Per-generation halo refresh for one rank.
///
/// A worker calls [`refresh`](Self::refresh) and then
/// [`advance`](Self::advance) once per generation. Each protocol decides
/// where export happens: the strip protocol paints pre-update values
/// while the rule runs, the block protocol paints assembled row bands
/// during the refresh.
///
/// # Contract
///
/// - On return from `refresh`, every halo cell of `grid` holds the
///   neighbour's current interior value.
/// - Interior cells are only read by `refresh`.
/// - Any transport error is fatal and returned as-is.
pub trait HaloExchange: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Bring every halo cell of `grid` up to date with its neighbours.
    fn refresh(
        &mut self,
        grid: &mut Grid,
        transport: &mut dyn Transport,
        export: Option<&mut ExportFrame<'_>>,
    ) -> Result<(), WorkerError>;

    /// Apply the rule to `grid`'s interior.
    fn advance(
        &mut self,
        grid: &mut Grid,
        export: Option<&mut ExportFrame<'_>>,
    ) -> Result<(), ExportError> {
        let _ = export;
        grid.advance();
        Ok(())
    }
}

/// Scratch row buffer reused across generations.
#[derive(Debug, Default)]
pub(crate) struct RowScratch {
    buf: Vec<bool>,
}

impl RowScratch {
    fn take(&mut self, len: usize) -> &mut [bool] {
        self.buf.resize(len, false);
        &mut self.buf[..len]
    }
}

/// Vertical halo exchange shared by both layouts.
///
/// Sends the first/last interior buffer row (full width) to the rank
/// above/below and fills the upper/lower halo row from them. Ordering
/// anchors the chain at the bottom-most tile, which has no southern
/// neighbour: it sends north first and then receives. Every other tile
/// first completes its southern exchange (receive, then send) and then
/// its northern one (send, then receive). The chain therefore resolves
/// from the bottom up and never waits in a cycle, even when sends block
/// until matched.
pub(crate) fn exchange_rows(
    grid: &mut Grid,
    transport: &mut dyn Transport,
    north: Option<Rank>,
    south: Option<Rank>,
    tag: Tag,
    scratch: &mut RowScratch,
) -> Result<(), ExchangeError> {
    let fw = grid.full_width();
    let first = grid.geometry().interior_rows().start;
    let last = grid.geometry().interior_rows().end - 1;
    let bottom_halo = grid.full_height() - 1;

    if let Some(south) = south {
        let buf = scratch.take(fw);
        transport.receive(south, tag, buf)?;
        grid.set_row(bottom_halo, buf);
        transport.send(south, tag, grid.row(last))?;
    }
    if let Some(north) = north {
        transport.send(north, tag, grid.row(first))?;
        let buf = scratch.take(fw);
        transport.receive(north, tag, buf)?;
        grid.set_row(0, buf);
    }
    Ok(())
}

/// Observer that paints each interior cell at its global position.
///
/// Keeps the first sink error and ignores later cells; the caller
/// reports it once the rule pass is over.
pub(crate) struct Painter<'s, 'a> {
    export: &'s mut ExportFrame<'a>,
    origin_x: usize,
    origin_y: usize,
    error: Option<ExportError>,
}

impl<'s, 'a> Painter<'s, 'a> {
    pub(crate) fn new(export: &'s mut ExportFrame<'a>, origin_x: usize, origin_y: usize) -> Self {
        Self {
            export,
            origin_x,
            origin_y,
            error: None,
        }
    }

    pub(crate) fn finish(self) -> Result<(), ExportError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl CellObserver for Painter<'_, '_> {
    fn observe(&mut self, row: usize, col: usize, alive: bool) {
        if self.error.is_some() {
            return;
        }
        let [r, g, b] = cell_color(alive);
        if let Err(e) =
            self.export
                .sink
                .set_pixel(self.origin_x + col, self.origin_y + row, r, g, b)
        {
            self.error = Some(e);
        }
    }
}
