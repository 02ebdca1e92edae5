//! Column-major bundle of interior columns relayed along a block row.

use lifegrid_tile::Grid;

/// Interior columns of consecutive blocks in one block row, stored
/// column-major: column `c` occupies `cells[c*height..(c+1)*height]`.
///
/// Column 0 is global column 0. After block `bx` appends its interior
/// the bundle covers global columns `[0, origin_x + width)` for the
/// block row's `height` global rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColumnBundle {
    height: usize,
    cells: Vec<bool>,
}

impl ColumnBundle {
    /// An empty bundle for columns of `height` cells.
    pub fn new(height: usize) -> Self {
        Self {
            height,
            cells: Vec::new(),
        }
    }

    /// A zeroed bundle of `columns` columns, ready to receive into.
    pub fn with_columns(height: usize, columns: usize) -> Self {
        Self {
            height,
            cells: vec![false; height * columns],
        }
    }

    /// Cells per column.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Columns held.
    pub fn column_count(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            self.cells.len() / self.height
        }
    }

    /// Flat column-major payload.
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Flat column-major payload, for receiving into.
    pub fn cells_mut(&mut self) -> &mut [bool] {
        &mut self.cells
    }

    /// Column `c`, top to bottom.
    pub fn column(&self, c: usize) -> &[bool] {
        &self.cells[c * self.height..(c + 1) * self.height]
    }

    /// The most recently appended column, if any.
    pub fn last_column(&self) -> Option<&[bool]> {
        self.column_count()
            .checked_sub(1)
            .map(|c| self.column(c))
    }

    /// Cell at bundle row `row`, bundle column `col`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[col * self.height + row]
    }

    /// Append every interior column of `grid`, left to right.
    ///
    /// # Panics
    ///
    /// Panics if `grid.height()` differs from the bundle height.
    pub fn append_interior(&mut self, grid: &Grid) {
        assert_eq!(grid.height(), self.height, "bundle height mismatch");
        self.cells.reserve(grid.width() * self.height);
        for j in 0..grid.width() {
            self.cells.extend(grid.interior_column(j));
        }
    }

    /// Drop every column, keeping the height.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Resize to `columns` zeroed columns of `height`, reusing the
    /// allocation.
    pub fn reset(&mut self, height: usize, columns: usize) {
        self.height = height;
        self.cells.clear();
        self.cells.resize(height * columns, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_is_column_major() {
        let g = Grid::from_ascii("*__\n_*_\n__*").unwrap();
        let mut b = ColumnBundle::new(3);
        b.append_interior(&g);
        assert_eq!(b.column_count(), 3);
        assert_eq!(b.column(0), &[true, false, false]);
        assert_eq!(b.column(2), &[false, false, true]);
        assert_eq!(b.last_column(), Some(&[false, false, true][..]));
        assert!(b.get(1, 1));
        assert!(!b.get(0, 1));
    }

    #[test]
    fn empty_bundle_has_no_last_column() {
        let b = ColumnBundle::new(4);
        assert_eq!(b.column_count(), 0);
        assert_eq!(b.last_column(), None);
        assert_eq!(ColumnBundle::with_columns(4, 2).cells().len(), 8);
    }

    #[test]
    fn appending_grows_the_bundle() {
        let g = Grid::from_ascii("**\n__").unwrap();
        let mut b = ColumnBundle::with_columns(2, 1);
        b.cells_mut()[1] = true;
        b.append_interior(&g);
        assert_eq!(b.column_count(), 3);
        assert_eq!(b.column(0), &[false, true]);
        assert_eq!(b.column(1), &[true, false]);
        b.clear();
        assert_eq!(b.column_count(), 0);
        assert_eq!(b.height(), 2);
    }
}
