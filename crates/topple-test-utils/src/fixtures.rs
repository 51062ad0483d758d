//! Reusable grid fixtures.
//!
//! - [`stable_grid`]: every cell strictly below threshold, deterministic
//! - [`single_peak`]: zeros except one cell at threshold
//! - [`map_text`]: render rows in map format without the engine

use topple_core::Cell;
use topple_space::{Grid, Square4};

/// A `rows * cols` integer grid with values cycling through `0..threshold`.
///
/// Panics if the shape is empty or `threshold < 1`.
pub fn stable_grid(rows: u32, cols: u32, threshold: i64) -> Grid<i64> {
    assert!(threshold >= 1, "threshold must be at least 1");
    let shape = Square4::new(rows, cols).expect("fixture shape");
    Grid::from_fn(shape, |r, c| (r as i64 * 7 + c as i64 * 3) % threshold)
}

/// A grid of zeros with `value` at `(row, col)`.
pub fn single_peak<T: Cell>(rows: u32, cols: u32, row: u32, col: u32, value: T) -> Grid<T> {
    let shape = Square4::new(rows, cols).expect("fixture shape");
    let mut grid = Grid::zeros(shape);
    assert!(grid.set(row, col, value), "peak outside grid");
    grid
}

/// Render rows as map text: `;` after every value, one line per row.
pub fn map_text<T: Cell>(rows: &[Vec<T>]) -> String {
    let mut out = String::new();
    for row in rows {
        for v in row {
            out.push_str(&format!("{v};"));
        }
        out.push('\n');
    }
    out
}
