//! Per-worker cell buffer and local rule application.

use std::fmt;

use lifegrid_core::{CellObserver, ConfigError, Rank};

use crate::geometry::{Halo, TileGeometry};
use crate::pattern::Initializer;
use crate::rule::Rule;

/// All 8 offsets: N, S, W, E, NW, NE, SW, SE.
const OFFSETS_8: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// One worker's tile: interior cells, halo margin, and the snapshot the
/// rule reads from.
///
/// Both buffers are row-major `full_height x full_width`. Buffer
/// coordinates `(row, col)` include the halo; interior coordinates used
/// by observers and [`interior_row`](Grid::interior_row) do not.
///
/// Only interior cells are authoritative. Halo cells are copies of a
/// neighbour's interior that the exchange protocol refreshes once per
/// generation; [`advance`](Grid::advance) reads them but never writes
/// them.
#[derive(Clone, Debug)]
pub struct Grid {
    rank: Rank,
    frame_size: usize,
    geometry: TileGeometry,
    rule: Rule,
    cells: Vec<bool>,
    previous: Vec<bool>,
}

impl Grid {
    /// Build and seed the tile for `rank`.
    ///
    /// Every buffer cell, halo included, is seeded from `init` at its
    /// global position.
    pub fn new(
        init: &mut Initializer,
        frame_size: usize,
        geometry: TileGeometry,
        rank: Rank,
    ) -> Result<Self, ConfigError> {
        geometry.validate(frame_size, rank)?;
        let fw = geometry.full_width();
        let fh = geometry.full_height();
        let mut cells = vec![false; fw * fh];
        for (row, buf) in cells.chunks_exact_mut(fw).enumerate() {
            let (x0, y) = geometry.to_global(row, 0);
            init.fill_row(x0, y, frame_size, buf);
        }
        Ok(Self {
            rank,
            frame_size,
            geometry,
            rule: Rule::CONWAY,
            previous: vec![false; cells.len()],
            cells,
        })
    }

    /// Build a whole-frame tile from rows of text: `*`, `#` or `O` is
    /// alive, anything else dead. Every row must have as many characters
    /// as there are rows.
    pub fn from_ascii(text: &str) -> Result<Self, ConfigError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let n = rows.len();
        if n == 0 {
            return Err(ConfigError::ZeroFrameSize);
        }
        let mut cells = Vec::with_capacity(n * n);
        for (y, line) in rows.iter().enumerate() {
            let count = line.chars().count();
            if count != n {
                return Err(ConfigError::MalformedGrid {
                    reason: format!("row {y} has {count} cells, expected {n}"),
                });
            }
            cells.extend(line.chars().map(|c| matches!(c, '*' | '#' | 'O')));
        }
        Ok(Self {
            rank: Rank(0),
            frame_size: n,
            geometry: TileGeometry::whole_frame(n),
            rule: Rule::CONWAY,
            previous: vec![false; cells.len()],
            cells,
        })
    }

    /// Replace the update rule.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rule = rule;
        self
    }

    /// Owning worker.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Side length of the global frame.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Tile placement.
    pub fn geometry(&self) -> &TileGeometry {
        &self.geometry
    }

    /// Halo margins.
    pub fn halo(&self) -> Halo {
        self.geometry.halo
    }

    /// Update rule.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Interior columns.
    pub fn width(&self) -> usize {
        self.geometry.width
    }

    /// Interior rows.
    pub fn height(&self) -> usize {
        self.geometry.height
    }

    /// Buffer columns, halo included.
    pub fn full_width(&self) -> usize {
        self.geometry.full_width()
    }

    /// Buffer rows, halo included.
    pub fn full_height(&self) -> usize {
        self.geometry.full_height()
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.full_width() + col
    }

    /// Buffer cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is outside the buffer.
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.full_height() && col < self.full_width());
        self.cells[self.index(row, col)]
    }

    /// Overwrite buffer cell `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is outside the buffer.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        assert!(row < self.full_height() && col < self.full_width());
        let i = self.index(row, col);
        self.cells[i] = alive;
    }

    /// Whole buffer row, halo columns included.
    pub fn row(&self, row: usize) -> &[bool] {
        let fw = self.full_width();
        &self.cells[row * fw..(row + 1) * fw]
    }

    /// Overwrite a whole buffer row. Used by exchanges to fill halo rows.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != full_width()`.
    pub fn set_row(&mut self, row: usize, values: &[bool]) {
        let fw = self.full_width();
        self.cells[row * fw..(row + 1) * fw].copy_from_slice(values);
    }

    /// Interior cells of interior row `i` (halo columns excluded).
    pub fn interior_row(&self, i: usize) -> &[bool] {
        let row = self.halo().up_rows() + i;
        let cols = self.geometry.interior_cols();
        &self.row(row)[cols]
    }

    /// Interior cells of interior column `j`, top to bottom.
    pub fn interior_column(&self, j: usize) -> Vec<bool> {
        let col = self.halo().left_cols() + j;
        self.geometry
            .interior_rows()
            .map(|row| self.cells[self.index(row, col)])
            .collect()
    }

    /// Overwrite buffer column `col` on the interior rows only. Used by
    /// exchanges to fill halo columns; corners arrive with the rows.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != height()`.
    pub fn set_column(&mut self, col: usize, values: &[bool]) {
        assert_eq!(values.len(), self.height());
        for (row, &v) in self.geometry.interior_rows().zip(values) {
            let i = self.index(row, col);
            self.cells[i] = v;
        }
    }

    /// Interior cells, row-major, `height x width`.
    pub fn interior_cells(&self) -> Vec<bool> {
        (0..self.height())
            .flat_map(|i| self.interior_row(i).iter().copied())
            .collect()
    }

    /// Live interior cells.
    pub fn population(&self) -> usize {
        (0..self.height())
            .map(|i| self.interior_row(i).iter().filter(|&&c| c).count())
            .sum()
    }

    /// Apply the rule to every interior cell.
    pub fn advance(&mut self) {
        self.advance_observed(&mut |_: usize, _: usize, _: bool| {});
    }

    /// Apply the rule to every interior cell, reporting each cell's
    /// pre-update value to `observer` in row-major interior order.
    ///
    /// The rule reads neighbour counts from a snapshot taken on entry, so
    /// all cells update simultaneously regardless of visiting order.
    pub fn advance_observed<O: CellObserver + ?Sized>(&mut self, observer: &mut O) {
        self.previous.copy_from_slice(&self.cells);
        let fw = self.full_width();
        let fh = self.full_height();
        let up = self.halo().up_rows();
        let left = self.halo().left_cols();
        for row in self.geometry.interior_rows() {
            for col in self.geometry.interior_cols() {
                let i = row * fw + col;
                let was = self.previous[i];
                observer.observe(row - up, col - left, was);
                let n = live_neighbours(&self.previous, fw, fh, row, col);
                self.cells[i] = self.rule.next_state(was, n);
            }
        }
    }

    /// Render the buffer, halo included: `*` alive, `_` dead, one line
    /// per row.
    pub fn to_ascii(&self) -> String {
        let mut s = String::with_capacity((self.full_width() + 1) * self.full_height());
        for row in 0..self.full_height() {
            for &c in self.row(row) {
                s.push(if c { '*' } else { '_' });
            }
            s.push('\n');
        }
        s
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii())
    }
}

/// Live cells among the up-to-8 neighbours of `(row, col)`. Neighbours
/// outside the buffer are absent, not wrapped.
fn live_neighbours(buf: &[bool], width: usize, height: usize, row: usize, col: usize) -> u8 {
    let mut count = 0;
    for (dr, dc) in OFFSETS_8 {
        let (Some(r), Some(c)) = (row.checked_add_signed(dr), col.checked_add_signed(dc)) else {
            continue;
        };
        if r < height && c < width && buf[r * width + c] {
            count += 1;
        }
    }
    count
}
