//! Square block decomposition and its relay-plus-rows exchange.
//!
//! With `n` workers, the frame is cut into a `k x k` grid of blocks,
//! `k = floor(sqrt(n))`. Rank `r` owns block `(bx, by) = (r % k, r / k)`.
//! Every block is `base = ceil(frame_size / k)` cells on a side except
//! those in the last block column/row, which take what is left over.
//!
//! ```text
//!          bx = 0      bx = 1      bx = 2
//!        +---------+---------+------+
//! by = 0 | rank 0  | rank 1  |  2   |   ---> column bundle grows east
//!        +---------+---------+------+   <--- one column returns west
//! by = 1 | rank 3  | rank 4  |  5   |
//!        +---------+---------+------+   full-width rows between rows
//! by = 2 |    6    |    7    |  8   |
//!        +---------+---------+------+
//! ```

use lifegrid_core::{cell_color, ConfigError, ExportError, Rank, Tag, Transport, WorkerError};
use lifegrid_tile::{Grid, Halo, TileGeometry};
use smallvec::SmallVec;
use tracing::trace;

use crate::bundle::ColumnBundle;
use crate::decomposition::Decomposition;
use crate::exchange::{exchange_rows, ExportFrame, HaloExchange, RowScratch};

/// A `k x k` grid of square-ish blocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockGrid {
    frame_size: usize,
    workers: usize,
    k: usize,
    base: usize,
}

impl BlockGrid {
    /// Partition a `frame_size` frame for `workers` workers.
    ///
    /// Only `k*k` of them get a block. Fails if the frame is too small
    /// to give the last block row and column at least one cell.
    pub fn new(frame_size: usize, workers: usize) -> Result<Self, ConfigError> {
        if frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        let k = workers.isqrt();
        let base = frame_size.div_ceil(k);
        let grid = Self {
            frame_size,
            workers,
            k,
            base,
        };
        let last = grid.extent(k - 1);
        if last == 0 {
            return Err(ConfigError::EmptyTile {
                rank: Rank(k * k - 1),
                width: last,
                height: last,
            });
        }
        Ok(grid)
    }

    /// Blocks per side.
    pub fn blocks_per_side(&self) -> usize {
        self.k
    }

    /// Side length of every block outside the last row and column.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Block coordinates `(bx, by)` of `rank`.
    pub fn block_of(&self, rank: Rank) -> (usize, usize) {
        (rank.0 % self.k, rank.0 / self.k)
    }

    fn extent(&self, i: usize) -> usize {
        if i + 1 == self.k {
            self.frame_size.saturating_sub(self.base * (self.k - 1))
        } else {
            self.base
        }
    }

    fn check_rank(&self, rank: Rank) -> Result<(), ConfigError> {
        if rank.0 >= self.workers {
            return Err(ConfigError::RankOutOfRange {
                rank,
                workers: self.workers,
            });
        }
        let active = self.k * self.k;
        if rank.0 >= active {
            return Err(ConfigError::InactiveRank { rank, active });
        }
        Ok(())
    }
}

impl Decomposition for BlockGrid {
    fn name(&self) -> &'static str {
        "blocks"
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn active_workers(&self) -> usize {
        self.k * self.k
    }

    fn tile(&self, rank: Rank) -> Result<TileGeometry, ConfigError> {
        self.check_rank(rank)?;
        let (bx, by) = self.block_of(rank);
        let last = self.k - 1;
        Ok(TileGeometry {
            width: self.extent(bx),
            height: self.extent(by),
            halo: Halo {
                up: by > 0,
                down: by < last,
                left: bx > 0,
                right: bx < last,
            },
            origin_x: bx * self.base,
            origin_y: by * self.base,
        })
    }

    fn neighbours(&self, rank: Rank) -> SmallVec<[Rank; 4]> {
        let mut out = SmallVec::new();
        if self.check_rank(rank).is_err() {
            return out;
        }
        let (bx, by) = self.block_of(rank);
        if by > 0 {
            out.push(Rank(rank.0 - self.k));
        }
        if by + 1 < self.k {
            out.push(Rank(rank.0 + self.k));
        }
        if bx > 0 {
            out.push(Rank(rank.0 - 1));
        }
        if bx + 1 < self.k {
            out.push(Rank(rank.0 + 1));
        }
        out
    }

    fn exchange(&self, rank: Rank) -> Result<Box<dyn HaloExchange>, ConfigError> {
        self.check_rank(rank)?;
        let (bx, by) = self.block_of(rank);
        Ok(Box::new(BlockExchange::new(rank, self.k, bx, by)))
    }
}

/// Halo exchange for one block.
///
/// Per generation:
///
/// 1. Horizontal relay. A block with a western neighbour receives the
///    bundle of every interior column to its west, fills its left halo
///    from the bundle's last column, and sends its own first interior
///    column back west. It then appends its interior to the bundle and,
///    if it has an eastern neighbour, sends the bundle east and fills
///    its right halo from the column that comes back.
/// 2. The rightmost block of each block row now holds the whole band of
///    rows and paints it when exporting.
/// 3. Vertical exchange of full-width rows with the blocks above and
///    below. These rows include the halo columns filled in step 1, so
///    corner halo cells arrive without diagonal messages.
///
/// A single block row (`k == 1`) exchanges nothing and paints the whole
/// frame.
#[derive(Debug)]
pub struct BlockExchange {
    rank: Rank,
    k: usize,
    bx: usize,
    by: usize,
    bundle: ColumnBundle,
    column: Vec<bool>,
    scratch: RowScratch,
}

impl BlockExchange {
    /// Protocol state for `rank` at block `(bx, by)` of a `k x k` grid.
    pub fn new(rank: Rank, k: usize, bx: usize, by: usize) -> Self {
        Self {
            rank,
            k,
            bx,
            by,
            bundle: ColumnBundle::default(),
            column: Vec::new(),
            scratch: RowScratch::default(),
        }
    }

    /// Whether this block ends its block row and exports the band.
    pub fn is_rightmost(&self) -> bool {
        self.bx + 1 == self.k
    }

    /// The bundle as of the last refresh.
    pub fn bundle(&self) -> &ColumnBundle {
        &self.bundle
    }

    fn west(&self) -> Option<Rank> {
        (self.bx > 0).then(|| Rank(self.rank.0 - 1))
    }

    fn east(&self) -> Option<Rank> {
        (!self.is_rightmost()).then(|| self.rank.next())
    }

    fn north(&self) -> Option<Rank> {
        (self.by > 0).then(|| Rank(self.rank.0 - self.k))
    }

    fn south(&self) -> Option<Rank> {
        (self.by + 1 < self.k).then(|| Rank(self.rank.0 + self.k))
    }

    fn relay_columns(
        &mut self,
        grid: &mut Grid,
        transport: &mut dyn Transport,
    ) -> Result<(), WorkerError> {
        let h = grid.height();
        let west_columns = grid.geometry().origin_x;
        self.bundle.reset(h, west_columns);

        if let Some(west) = self.west() {
            transport.receive(west, Tag::ColumnBundle, self.bundle.cells_mut())?;
            if let Some(col) = self.bundle.last_column() {
                grid.set_column(0, col);
            }
            transport.send(west, Tag::ReturnColumn, &grid.interior_column(0))?;
        }

        self.bundle.append_interior(grid);

        if let Some(east) = self.east() {
            transport.send(east, Tag::ColumnBundle, self.bundle.cells())?;
            self.column.resize(h, false);
            transport.receive(east, Tag::ReturnColumn, &mut self.column)?;
            let right_halo = grid.full_width() - 1;
            grid.set_column(right_halo, &self.column);
        }
        trace!(
            rank = %self.rank,
            columns = self.bundle.column_count(),
            "column relay done"
        );
        Ok(())
    }

    fn paint_band(
        &self,
        frame_size: usize,
        origin_y: usize,
        export: &mut ExportFrame<'_>,
    ) -> Result<(), ExportError> {
        debug_assert_eq!(self.bundle.column_count(), frame_size);
        export.sink.begin_frame(frame_size, frame_size)?;
        for col in 0..self.bundle.column_count() {
            for row in 0..self.bundle.height() {
                let [r, g, b] = cell_color(self.bundle.get(row, col));
                export.sink.set_pixel(col, origin_y + row, r, g, b)?;
            }
        }
        export.sink.flush_frame(export.frame)
    }
}

impl HaloExchange for BlockExchange {
    fn name(&self) -> &'static str {
        "blocks"
    }

    fn refresh(
        &mut self,
        grid: &mut Grid,
        transport: &mut dyn Transport,
        export: Option<&mut ExportFrame<'_>>,
    ) -> Result<(), WorkerError> {
        self.relay_columns(grid, transport)?;

        if self.is_rightmost() {
            if let Some(export) = export {
                self.paint_band(grid.frame_size(), grid.geometry().origin_y, export)?;
            }
        }

        let (north, south) = (self.north(), self.south());
        exchange_rows(
            grid,
            transport,
            north,
            south,
            Tag::BlockRow,
            &mut self.scratch,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn four_workers_make_two_by_two() {
        let d = BlockGrid::new(10, 4).unwrap();
        assert_eq!(d.blocks_per_side(), 2);
        assert_eq!(d.base(), 5);
        let t = d.tile(Rank(3)).unwrap();
        assert_eq!((t.origin_x, t.origin_y, t.width, t.height), (5, 5, 5, 5));
        assert_eq!(
            t.halo,
            Halo {
                up: true,
                down: false,
                left: true,
                right: false
            }
        );
    }

    #[test]
    fn last_block_takes_remainder() {
        let d = BlockGrid::new(10, 9).unwrap();
        assert_eq!(d.base(), 4);
        let t = d.tile(Rank(8)).unwrap();
        assert_eq!((t.origin_x, t.width), (8, 2));
        let t = d.tile(Rank(5)).unwrap();
        assert_eq!((t.origin_x, t.origin_y, t.width, t.height), (8, 4, 2, 4));
    }

    #[test]
    fn surplus_workers_are_inactive() {
        let d = BlockGrid::new(12, 7).unwrap();
        assert_eq!(d.active_workers(), 4);
        assert_eq!(
            d.tile(Rank(5)),
            Err(ConfigError::InactiveRank {
                rank: Rank(5),
                active: 4
            })
        );
        assert!(d.neighbours(Rank(5)).is_empty());
        assert!(d.exchange(Rank(6)).is_err());
        assert!(matches!(
            d.tile(Rank(7)),
            Err(ConfigError::RankOutOfRange { .. })
        ));
    }

    #[test]
    fn too_small_frame_is_rejected() {
        // base = 2, so the third block row would start at row 4.
        assert!(matches!(
            BlockGrid::new(4, 9),
            Err(ConfigError::EmptyTile { .. })
        ));
        assert_eq!(BlockGrid::new(0, 4), Err(ConfigError::ZeroFrameSize));
        assert_eq!(BlockGrid::new(4, 0), Err(ConfigError::ZeroWorkers));
    }

    #[test]
    fn neighbours_share_edges_only() {
        let d = BlockGrid::new(9, 9).unwrap();
        let mut n = d.neighbours(Rank(4)).into_vec();
        n.sort();
        assert_eq!(n, vec![Rank(1), Rank(3), Rank(5), Rank(7)]);
        let mut n = d.neighbours(Rank(0)).into_vec();
        n.sort();
        assert_eq!(n, vec![Rank(1), Rank(3)]);
    }

    #[test]
    fn rightmost_block_exports() {
        assert!(BlockExchange::new(Rank(2), 3, 2, 0).is_rightmost());
        assert!(!BlockExchange::new(Rank(4), 3, 1, 1).is_rightmost());
        assert!(BlockExchange::new(Rank(0), 1, 0, 0).is_rightmost());
    }

    proptest! {
        #[test]
        fn blocks_tile_frame_exactly(frame_size in 1usize..60, workers in 1usize..40) {
            let Ok(d) = BlockGrid::new(frame_size, workers) else {
                return Ok(());
            };
            let mut cover = vec![0u8; frame_size * frame_size];
            for (rank, t) in d.tiles().unwrap() {
                prop_assert!(t.validate(frame_size, rank).is_ok());
                for y in t.origin_y..t.origin_y + t.height {
                    for x in t.origin_x..t.origin_x + t.width {
                        cover[y * frame_size + x] += 1;
                    }
                }
            }
            prop_assert!(cover.iter().all(|&c| c == 1));
        }
    }
}
