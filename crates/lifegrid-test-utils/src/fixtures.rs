//! Whole-frame reference simulation and frame helpers.

use lifegrid_tile::{Grid, Initializer};

/// One Conway step over a whole `n x n` frame, row-major, no wrapping.
///
/// Written independently of [`Grid`] so the two can be compared.
pub fn reference_step(cells: &[bool], n: usize) -> Vec<bool> {
    assert_eq!(cells.len(), n * n);
    let mut next = vec![false; n * n];
    for y in 0..n {
        for x in 0..n {
            let mut live = 0;
            for ny in y.saturating_sub(1)..=(y + 1).min(n - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(n - 1) {
                    if (nx, ny) != (x, y) && cells[ny * n + nx] {
                        live += 1;
                    }
                }
            }
            let alive = cells[y * n + x];
            next[y * n + x] = live == 3 || (alive && live == 2);
        }
    }
    next
}

/// Seed an `n x n` frame from `init` and run `generations` steps.
pub fn reference_run(init: &mut Initializer, n: usize, generations: u64) -> Vec<bool> {
    let mut cells = Vec::with_capacity(n * n);
    for y in 0..n {
        for x in 0..n {
            cells.push(init.is_alive(x, y, n));
        }
    }
    for _ in 0..generations {
        cells = reference_step(&cells, n);
    }
    cells
}

/// Place each grid's interior at its global position in an `n x n`
/// frame.
pub fn assemble<'a>(n: usize, grids: impl IntoIterator<Item = &'a Grid>) -> Vec<bool> {
    let mut out = vec![false; n * n];
    for grid in grids {
        let g = grid.geometry();
        for i in 0..g.height {
            let y = g.origin_y + i;
            out[y * n + g.origin_x..y * n + g.origin_x + g.width]
                .copy_from_slice(grid.interior_row(i));
        }
    }
    out
}

/// `*` for alive, `_` for dead, one line per row.
pub fn render(cells: &[bool], n: usize) -> String {
    let mut s = String::with_capacity(cells.len() + n);
    for row in cells.chunks(n.max(1)) {
        s.extend(row.iter().map(|&c| if c { '*' } else { '_' }));
        s.push('\n');
    }
    s
}
