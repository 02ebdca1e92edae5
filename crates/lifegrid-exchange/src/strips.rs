//! Row-strip decomposition and its single-row exchange.
//!
//! ```text
//!   rank 0   +----------------+
//!            |     strip 0    |
//!            +----------------+  <- one row each way
//!   rank 1   |     strip 1    |
//!            +----------------+
//!   rank n-1 |  strip n-1     |  <- absorbs frame_size % n rows
//!            +----------------+
//! ```

use lifegrid_core::{ConfigError, ExportError, Rank, Tag, Transport, WorkerError};
use lifegrid_tile::{Grid, Halo, TileGeometry};
use smallvec::SmallVec;

use crate::decomposition::Decomposition;
use crate::exchange::{exchange_rows, ExportFrame, HaloExchange, Painter, RowScratch};

/// Horizontal strips, one per worker.
///
/// Rank `r` owns rows `[r*h, (r+1)*h)` with `h = frame_size / workers`;
/// the last rank also owns the `frame_size % workers` leftover rows so
/// that every row is simulated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowStrips {
    frame_size: usize,
    workers: usize,
}

impl RowStrips {
    /// Partition `frame_size` rows over `workers` strips.
    ///
    /// Fails if either is zero or if there are more workers than rows.
    pub fn new(frame_size: usize, workers: usize) -> Result<Self, ConfigError> {
        if frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if workers > frame_size {
            return Err(ConfigError::EmptyTile {
                rank: Rank(0),
                width: frame_size,
                height: frame_size / workers,
            });
        }
        Ok(Self {
            frame_size,
            workers,
        })
    }

    /// Rows in every strip but the last.
    pub fn strip_height(&self) -> usize {
        self.frame_size / self.workers
    }

    fn check_rank(&self, rank: Rank) -> Result<(), ConfigError> {
        if rank.0 >= self.workers {
            return Err(ConfigError::RankOutOfRange {
                rank,
                workers: self.workers,
            });
        }
        Ok(())
    }
}

impl Decomposition for RowStrips {
    fn name(&self) -> &'static str {
        "strips"
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn active_workers(&self) -> usize {
        self.workers
    }

    fn tile(&self, rank: Rank) -> Result<TileGeometry, ConfigError> {
        self.check_rank(rank)?;
        let h = self.strip_height();
        let is_last = rank.0 == self.workers - 1;
        let origin_y = rank.0 * h;
        let height = if is_last { self.frame_size - origin_y } else { h };
        Ok(TileGeometry {
            width: self.frame_size,
            height,
            halo: Halo {
                up: rank.0 > 0,
                down: !is_last,
                left: false,
                right: false,
            },
            origin_x: 0,
            origin_y,
        })
    }

    fn neighbours(&self, rank: Rank) -> SmallVec<[Rank; 4]> {
        let mut out = SmallVec::new();
        if rank.0 >= self.workers {
            return out;
        }
        if let Some(up) = rank.prev() {
            out.push(up);
        }
        if rank.0 + 1 < self.workers {
            out.push(rank.next());
        }
        out
    }

    fn exchange(&self, rank: Rank) -> Result<Box<dyn HaloExchange>, ConfigError> {
        self.check_rank(rank)?;
        Ok(Box::new(StripExchange::new(rank, self.workers)))
    }
}

/// Single-row halo exchange between vertically adjacent strips.
///
/// Each generation a strip sends its first interior row up and its last
/// interior row down, and receives the rows that fill its upper and
/// lower halo. The last rank anchors the ordering (see
/// [`exchange_rows`](crate::exchange)). Export, when enabled, paints
/// the strip's pre-update cells during the rule pass.
#[derive(Debug)]
pub struct StripExchange {
    rank: Rank,
    workers: usize,
    scratch: RowScratch,
}

impl StripExchange {
    /// Protocol state for `rank` of `workers`.
    pub fn new(rank: Rank, workers: usize) -> Self {
        Self {
            rank,
            workers,
            scratch: RowScratch::default(),
        }
    }

    fn north(&self) -> Option<Rank> {
        self.rank.prev()
    }

    fn south(&self) -> Option<Rank> {
        (self.rank.0 + 1 < self.workers).then(|| self.rank.next())
    }
}

impl HaloExchange for StripExchange {
    fn name(&self) -> &'static str {
        "strips"
    }

    fn refresh(
        &mut self,
        grid: &mut Grid,
        transport: &mut dyn Transport,
        _export: Option<&mut ExportFrame<'_>>,
    ) -> Result<(), WorkerError> {
        debug_assert_eq!(grid.full_width(), grid.width(), "strips span the frame");
        let (north, south) = (self.north(), self.south());
        exchange_rows(
            grid,
            transport,
            north,
            south,
            Tag::HaloRow,
            &mut self.scratch,
        )?;
        Ok(())
    }

    fn advance(
        &mut self,
        grid: &mut Grid,
        export: Option<&mut ExportFrame<'_>>,
    ) -> Result<(), ExportError> {
        let Some(export) = export else {
            grid.advance();
            return Ok(());
        };
        let frame_size = grid.frame_size();
        let (origin_x, origin_y) = (grid.geometry().origin_x, grid.geometry().origin_y);
        export.sink.begin_frame(frame_size, frame_size)?;
        let mut painter = Painter::new(&mut *export, origin_x, origin_y);
        grid.advance_observed(&mut painter);
        painter.finish()?;
        export.sink.flush_frame(export.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn even_split() {
        let d = RowStrips::new(12, 3).unwrap();
        let t: Vec<_> = d.tiles().unwrap().into_iter().map(|(_, t)| t).collect();
        assert_eq!(
            t.iter().map(|t| (t.origin_y, t.height)).collect::<Vec<_>>(),
            vec![(0, 4), (4, 4), (8, 4)]
        );
        assert_eq!(t[0].halo, Halo { up: false, down: true, left: false, right: false });
        assert_eq!(t[1].halo, Halo { up: true, down: true, left: false, right: false });
        assert_eq!(t[2].halo, Halo { up: true, down: false, left: false, right: false });
    }

    #[test]
    fn last_strip_absorbs_remainder() {
        let d = RowStrips::new(10, 4).unwrap();
        assert_eq!(d.strip_height(), 2);
        let last = d.tile(Rank(3)).unwrap();
        assert_eq!((last.origin_y, last.height), (6, 4));
    }

    #[test]
    fn single_worker_owns_whole_frame() {
        let d = RowStrips::new(5, 1).unwrap();
        assert_eq!(d.tile(Rank(0)).unwrap(), TileGeometry::whole_frame(5));
        assert!(d.neighbours(Rank(0)).is_empty());
    }

    #[test]
    fn rejects_bad_configuration() {
        assert_eq!(RowStrips::new(0, 2), Err(ConfigError::ZeroFrameSize));
        assert_eq!(RowStrips::new(4, 0), Err(ConfigError::ZeroWorkers));
        assert!(matches!(
            RowStrips::new(3, 4),
            Err(ConfigError::EmptyTile { .. })
        ));
        let d = RowStrips::new(4, 2).unwrap();
        assert_eq!(
            d.tile(Rank(2)),
            Err(ConfigError::RankOutOfRange {
                rank: Rank(2),
                workers: 2
            })
        );
    }

    #[test]
    fn neighbours_are_adjacent_strips() {
        let d = RowStrips::new(9, 3).unwrap();
        assert_eq!(d.neighbours(Rank(0)).as_slice(), &[Rank(1)]);
        assert_eq!(d.neighbours(Rank(1)).as_slice(), &[Rank(0), Rank(2)]);
        assert_eq!(d.neighbours(Rank(2)).as_slice(), &[Rank(1)]);
    }

    proptest! {
        #[test]
        fn strips_tile_frame_exactly(frame_size in 1usize..80, workers in 1usize..20) {
            prop_assume!(workers <= frame_size);
            let d = RowStrips::new(frame_size, workers).unwrap();
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
