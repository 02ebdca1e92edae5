//! The [`Decomposition`] trait and the [`Layout`] selector.

use std::fmt;
use std::str::FromStr;

use lifegrid_core::{ConfigError, Rank};
use lifegrid_tile::TileGeometry;
use smallvec::SmallVec;

use crate::blocks::BlockGrid;
use crate::exchange::HaloExchange;
use crate::strips::RowStrips;

/// A partition of a square frame into per-rank tiles.
///
/// The interiors of ranks `0..active_workers()` tile
/// `[0, frame_size) x [0, frame_size)` exactly once. Ranks at or above
/// `active_workers()` (possible only when the layout cannot use every
/// worker) own nothing.
///
/// # Object safety
///
/// Drivers hold decompositions as `Box<dyn Decomposition>`.
pub trait Decomposition: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Side length of the frame being partitioned.
    fn frame_size(&self) -> usize;

    /// Workers in the cooperating set.
    fn workers(&self) -> usize;

    /// Workers that own a tile.
    fn active_workers(&self) -> usize;

    /// Tile owned by `rank`.
    fn tile(&self, rank: Rank) -> Result<TileGeometry, ConfigError>;

    /// Ranks whose tiles share an edge with `rank`'s tile.
    fn neighbours(&self, rank: Rank) -> SmallVec<[Rank; 4]>;

    /// The exchange protocol `rank` runs each generation.
    fn exchange(&self, rank: Rank) -> Result<Box<dyn HaloExchange>, ConfigError>;

    /// Every active rank with its tile, in rank order.
    fn tiles(&self) -> Result<Vec<(Rank, TileGeometry)>, ConfigError> {
        (0..self.active_workers())
            .map(|r| self.tile(Rank(r)).map(|t| (Rank(r), t)))
            .collect()
    }
}

/// Which decomposition to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// One horizontal strip per worker.
    #[default]
    Strips,
    /// A `k x k` grid of blocks, `k = floor(sqrt(workers))`.
    Blocks,
}

impl Layout {
    /// Build the decomposition of a `frame_size` frame over `workers`.
    pub fn build(
        self,
        frame_size: usize,
        workers: usize,
    ) -> Result<Box<dyn Decomposition>, ConfigError> {
        Ok(match self {
            Self::Strips => Box::new(RowStrips::new(frame_size, workers)?),
            Self::Blocks => Box::new(BlockGrid::new(frame_size, workers)?),
        })
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strips => f.write_str("strips"),
            Self::Blocks => f.write_str("blocks"),
        }
    }
}

impl FromStr for Layout {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strips" | "rows" | "1d" => Ok(Self::Strips),
            "blocks" | "2d" => Ok(Self::Blocks),
            _ => Err(ConfigError::UnknownLayout { input: s.to_string() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_parses_aliases() {
        assert_eq!("1d".parse::<Layout>(), Ok(Layout::Strips));
        assert_eq!("Blocks".parse::<Layout>(), Ok(Layout::Blocks));
        assert_eq!(
            "hex".parse::<Layout>(),
            Err(ConfigError::UnknownLayout { input: "hex".into() })
        );
    }

    #[test]
    fn layout_builds_matching_decomposition() {
        let d = Layout::Strips.build(10, 3).unwrap();
        assert_eq!(d.name(), "strips");
        assert_eq!(d.active_workers(), 3);

        let d = Layout::Blocks.build(10, 5).unwrap();
        assert_eq!(d.name(), "blocks");
        assert_eq!(d.workers(), 5);
        assert_eq!(d.active_workers(), 4);
    }

    #[test]
    fn tiles_lists_active_ranks_only() {
        let d = Layout::Blocks.build(9, 10).unwrap();
        let tiles = d.tiles().unwrap();
        assert_eq!(tiles.len(), 9);
        assert_eq!(tiles[4].0, Rank(4));
    }
}
