//! Dense row-major cell storage.

use topple_core::{Cell, Frame, StepId};

use crate::error::SpaceError;
use crate::square4::Square4;

/// A `rows * cols` block of cell values laid out row-major.
///
/// Used both for the sandpile heights and for the pending-delta buffers.
/// Length always equals `shape.cell_count()`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    shape: Square4,
    cells: Vec<T>,
}

impl<T: Cell> Grid<T> {
    /// A grid of zeros.
    pub fn zeros(shape: Square4) -> Self {
        Self::filled(shape, T::ZERO)
    }

    /// A grid with every cell set to `value`.
    pub fn filled(shape: Square4, value: T) -> Self {
        Self {
            shape,
            cells: vec![value; shape.cell_count()],
        }
    }

    /// A grid built by calling `f(row, col)` for each cell in row-major order.
    pub fn from_fn(shape: Square4, mut f: impl FnMut(u32, u32) -> T) -> Self {
        let mut cells = Vec::with_capacity(shape.cell_count());
        for r in 0..shape.rows() {
            for c in 0..shape.cols() {
                cells.push(f(r, c));
            }
        }
        Self { shape, cells }
    }

    /// Build a grid from nested rows. All rows must have the same length.
    ///
    /// # Examples
    ///
    /// ```
    /// use topple_space::Grid;
    ///
    /// let g = Grid::from_rows(vec![vec![1i64, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(g.get(1, 0), Some(3));
    /// assert_eq!(g.sum(), 10);
    /// assert!(Grid::<i64>::from_rows(vec![vec![1], vec![2, 3]]).is_err());
    /// ```
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, SpaceError> {
        let n_rows = u32::try_from(rows.len()).map_err(|_| SpaceError::DimensionTooLarge {
            name: "rows",
            value: u32::MAX,
            max: Square4::MAX_DIM,
        })?;
        let expected = rows.first().map_or(0, Vec::len);
        let n_cols = u32::try_from(expected).map_err(|_| SpaceError::DimensionTooLarge {
            name: "cols",
            value: u32::MAX,
            max: Square4::MAX_DIM,
        })?;
        if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(SpaceError::RaggedRows {
                row,
                expected,
                found: r.len(),
            });
        }
        let shape = Square4::new(n_rows, n_cols)?;
        Ok(Self {
            shape,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// The grid shape.
    pub fn shape(&self) -> Square4 {
        self.shape
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.shape.rows()
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.shape.cols()
    }

    /// Value at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: u32, col: u32) -> Option<T> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        Some(self.cells[self.shape.index(row, col)])
    }

    /// Overwrite `(row, col)`. Returns `false` when out of range.
    pub fn set(&mut self, row: u32, col: u32, value: T) -> bool {
        if row >= self.rows() || col >= self.cols() {
            return false;
        }
        let i = self.shape.index(row, col);
        self.cells[i] = value;
        true
    }

    /// Add `delta` to the cell at flat index `index`.
    #[inline]
    pub fn add_at(&mut self, index: usize, delta: T) {
        self.cells[index] += delta;
    }

    /// Row-major cell values.
    pub fn as_slice(&self) -> &[T] {
        &self.cells
    }

    /// Mutable row-major cell values.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Sum of all cells.
    pub fn sum(&self) -> T {
        T::sum_of(self.cells.iter().copied())
    }

    /// Reset every cell to zero.
    pub fn clear(&mut self) {
        self.cells.fill(T::ZERO);
    }

    /// A borrowed frame tagged with `step`.
    pub fn frame(&self, step: StepId) -> Frame<'_, T> {
        Frame {
            step,
            rows: self.rows(),
            cols: self.cols(),
            cells: &self.cells,
        }
    }
}
