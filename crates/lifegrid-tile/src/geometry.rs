//! Tile placement within the global frame.

use std::ops::Range;

use lifegrid_core::{ConfigError, Rank};

/// Which edges of a tile carry a one-cell halo margin.
///
/// An edge has a halo exactly when another worker's tile lies across it;
/// edges on the global frame boundary never do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Halo {
    /// A halo row above the interior.
    pub up: bool,
    /// A halo row below the interior.
    pub down: bool,
    /// A halo column left of the interior.
    pub left: bool,
    /// A halo column right of the interior.
    pub right: bool,
}

impl Halo {
    /// No halo on any edge (a tile covering the whole frame).
    pub const NONE: Halo = Halo {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    /// Rows of margin above the interior (0 or 1).
    #[inline]
    pub fn up_rows(&self) -> usize {
        self.up as usize
    }

    /// Rows of margin below the interior (0 or 1).
    #[inline]
    pub fn down_rows(&self) -> usize {
        self.down as usize
    }

    /// Columns of margin left of the interior (0 or 1).
    #[inline]
    pub fn left_cols(&self) -> usize {
        self.left as usize
    }

    /// Columns of margin right of the interior (0 or 1).
    #[inline]
    pub fn right_cols(&self) -> usize {
        self.right as usize
    }
}

/// Size and placement of one worker's tile.
///
/// `origin_x`/`origin_y` locate the top-left *interior* cell in global
/// coordinates (`x` = column, `y` = row).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileGeometry {
    /// Interior columns owned by the worker.
    pub width: usize,
    /// Interior rows owned by the worker.
    pub height: usize,
    /// Halo margins.
    pub halo: Halo,
    /// Global column of the first interior column.
    pub origin_x: usize,
    /// Global row of the first interior row.
    pub origin_y: usize,
}

impl TileGeometry {
    /// A single tile covering a whole `frame_size x frame_size` frame.
    pub fn whole_frame(frame_size: usize) -> Self {
        Self {
            width: frame_size,
            height: frame_size,
            halo: Halo::NONE,
            origin_x: 0,
            origin_y: 0,
        }
    }

    /// Buffer width: interior plus left and right halo columns.
    #[inline]
    pub fn full_width(&self) -> usize {
        self.width + self.halo.left_cols() + self.halo.right_cols()
    }

    /// Buffer height: interior plus upper and lower halo rows.
    #[inline]
    pub fn full_height(&self) -> usize {
        self.height + self.halo.up_rows() + self.halo.down_rows()
    }

    /// Buffer rows that hold interior cells.
    pub fn interior_rows(&self) -> Range<usize> {
        self.halo.up_rows()..self.halo.up_rows() + self.height
    }

    /// Buffer columns that hold interior cells.
    pub fn interior_cols(&self) -> Range<usize> {
        self.halo.left_cols()..self.halo.left_cols() + self.width
    }

    /// Number of interior cells.
    pub fn interior_len(&self) -> usize {
        self.width * self.height
    }

    /// Global `(x, y)` of the buffer cell at `(row, col)`.
    ///
    /// Valid for any buffer cell of a validated geometry: halo cells only
    /// exist where a neighbouring tile does, so they never map outside
    /// the frame.
    #[inline]
    pub fn to_global(&self, row: usize, col: usize) -> (usize, usize) {
        (
            self.origin_x + col - self.halo.left_cols(),
            self.origin_y + row - self.halo.up_rows(),
        )
    }

    /// Whether global `(x, y)` lies in this tile's interior.
    pub fn owns(&self, x: usize, y: usize) -> bool {
        x >= self.origin_x
            && x - self.origin_x < self.width
            && y >= self.origin_y
            && y - self.origin_y < self.height
    }

    /// Check that the tile is non-empty, lies inside the frame, and has a
    /// halo on exactly the edges that face another tile.
    pub fn validate(&self, frame_size: usize, rank: Rank) -> Result<(), ConfigError> {
        if frame_size == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyTile {
                rank,
                width: self.width,
                height: self.height,
            });
        }
        let (Some(right_edge), Some(bottom_edge)) = (
            self.origin_x.checked_add(self.width),
            self.origin_y.checked_add(self.height),
        ) else {
            return Err(ConfigError::TileOutsideFrame {
                reason: format!(
                    "rank {rank} interior at ({}, {}) overflows the coordinate range",
                    self.origin_x, self.origin_y
                ),
            });
        };
        if right_edge > frame_size || bottom_edge > frame_size {
            return Err(ConfigError::TileOutsideFrame {
                reason: format!(
                    "rank {rank} interior spans [{}, {}) x [{}, {}) in a frame of {frame_size}",
                    self.origin_x, right_edge, self.origin_y, bottom_edge
                ),
            });
        }
        let expected = Halo {
            up: self.origin_y > 0,
            down: bottom_edge < frame_size,
            left: self.origin_x > 0,
            right: right_edge < frame_size,
        };
        if self.halo != expected {
            return Err(ConfigError::HaloMismatch {
                reason: format!(
                    "rank {rank} has halo {:?}, its placement requires {:?}",
                    self.halo, expected
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn middle_tile() -> TileGeometry {
        TileGeometry {
            width: 4,
            height: 3,
            halo: Halo {
                up: true,
                down: true,
                left: true,
                right: false,
            },
            origin_x: 6,
            origin_y: 3,
        }
    }

    #[test]
    fn full_extent_includes_halo() {
        let g = middle_tile();
        assert_eq!(g.full_width(), 5);
        assert_eq!(g.full_height(), 5);
        assert_eq!(g.interior_rows(), 1..4);
        assert_eq!(g.interior_cols(), 1..5);
        assert_eq!(g.interior_len(), 12);
    }

    #[test]
    fn to_global_maps_halo_cells_to_neighbours() {
        let g = middle_tile();
        assert_eq!(g.to_global(1, 1), (6, 3));
        assert_eq!(g.to_global(0, 0), (5, 2));
        assert_eq!(g.to_global(4, 4), (9, 6));
    }

    #[test]
    fn validate_accepts_consistent_tile() {
        assert!(middle_tile().validate(10, Rank(1)).is_ok());
        assert!(TileGeometry::whole_frame(7).validate(7, Rank(0)).is_ok());
    }

    #[test]
    fn validate_rejects_empty_tile() {
        let mut g = middle_tile();
        g.height = 0;
        assert_eq!(
            g.validate(10, Rank(2)),
            Err(ConfigError::EmptyTile {
                rank: Rank(2),
                width: 4,
                height: 0
            })
        );
    }

    #[test]
    fn validate_rejects_halo_on_global_edge() {
        let mut g = TileGeometry::whole_frame(5);
        g.halo.up = true;
        assert!(matches!(
            g.validate(5, Rank(0)),
            Err(ConfigError::HaloMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_missing_internal_halo() {
        let mut g = middle_tile();
        g.halo.left = false;
        assert!(matches!(
            g.validate(10, Rank(1)),
            Err(ConfigError::HaloMismatch { .. })
        ));
    }

    #[test]
    fn validate_rejects_overflowing_tile() {
        let g = middle_tile();
        assert!(matches!(
            g.validate(9, Rank(1)),
            Err(ConfigError::TileOutsideFrame { .. })
        ));
        assert_eq!(g.validate(0, Rank(1)), Err(ConfigError::ZeroFrameSize));
    }

    #[test]
    fn validate_rejects_origin_near_usize_max() {
        let mut g = middle_tile();
        g.origin_x = usize::MAX;
        assert!(matches!(
            g.validate(10, Rank(1)),
            Err(ConfigError::TileOutsideFrame { .. })
        ));
        let mut g = middle_tile();
        g.origin_y = usize::MAX - 1;
        assert!(matches!(
            g.validate(10, Rank(1)),
            Err(ConfigError::TileOutsideFrame { .. })
        ));
    }
}
