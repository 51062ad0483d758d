//! 2D square grid shape with 4-connected neighbourhood (N/S/W/E).

use smallvec::SmallVec;

use crate::edge::{BoundaryPolicy, Landing};
use crate::error::SpaceError;
use crate::grid2d;

/// The shape of a two-dimensional, 4-connected sandpile grid.
///
/// Each cell has coordinate `(row, col)` where `0 <= row < rows` and
/// `0 <= col < cols`. Cells are stored row-major, so `(row, col)` has
/// flat index `row * cols + col`. Neighbours are the four cardinal
/// directions, always emitted in the order north, south, west, east.
///
/// `Square4` only describes topology; what happens to a neighbour that
/// falls off the grid is decided by a [`BoundaryPolicy`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square4 {
    rows: u32,
    cols: u32,
}

impl Square4 {
    /// Maximum dimension size: coordinates use `i32`, so each axis must fit.
    pub const MAX_DIM: u32 = i32::MAX as u32;

    /// Unit offsets `(drow, dcol)` to the four neighbours, in emission order.
    pub const OFFSETS: [(i32, i32); 4] = grid2d::OFFSETS;

    /// Create a new `rows * cols` grid shape.
    ///
    /// Returns `Err(SpaceError::EmptySpace)` if either dimension is 0, or
    /// `Err(SpaceError::DimensionTooLarge)` if either exceeds `i32::MAX`.
    ///
    /// # Examples
    ///
    /// ```
    /// use topple_space::Square4;
    ///
    /// let grid = Square4::new(16, 8).unwrap();
    /// assert_eq!(grid.cell_count(), 128);
    /// assert_eq!(grid.index(1, 0), 8);
    /// assert!(Square4::new(0, 8).is_err());
    /// ```
    pub fn new(rows: u32, cols: u32) -> Result<Self, SpaceError> {
        if rows == 0 || cols == 0 {
            return Err(SpaceError::EmptySpace);
        }
        if rows > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "rows",
                value: rows,
                max: Self::MAX_DIM,
            });
        }
        if cols > Self::MAX_DIM {
            return Err(SpaceError::DimensionTooLarge {
                name: "cols",
                value: cols,
                max: Self::MAX_DIM,
            });
        }
        Ok(Self { rows, cols })
    }

    /// Number of rows.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.rows as usize) * (self.cols as usize)
    }

    /// Always returns `false`: construction rejects empty grids.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Flat row-major index of `(row, col)`. The caller guarantees bounds.
    #[inline]
    pub fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.cols as usize + col as usize
    }

    /// Inverse of [`index`](Self::index).
    #[inline]
    pub fn coord(&self, index: usize) -> (u32, u32) {
        let cols = self.cols as usize;
        ((index / cols) as u32, (index % cols) as u32)
    }

    /// Whether a signed coordinate lies inside the grid.
    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> bool {
        row >= 0 && col >= 0 && (row as u32) < self.rows && (col as u32) < self.cols
    }

    /// Where each of the four neighbours of `(row, col)` lands under
    /// `policy`, in emission order. Off-grid neighbours are resolved by
    /// the policy; in-grid neighbours never consult it.
    pub fn neighbours(
        &self,
        row: u32,
        col: u32,
        policy: &dyn BoundaryPolicy,
    ) -> SmallVec<[Landing; 4]> {
        Self::OFFSETS
            .iter()
            .map(|&(dr, dc)| {
                let nr = row as i32 + dr;
                let nc = col as i32 + dc;
                if self.contains(nr, nc) {
                    Landing::InGrid {
                        row: nr as u32,
                        col: nc as u32,
                    }
                } else {
                    policy.resolve(nr, nc, self)
                }
            })
            .collect()
    }

    /// Length of the longest straight path from `(row, col)` off the grid.
    ///
    /// An avalanche front started at a single cell on an otherwise empty
    /// grid moves one cell per step, so this bounds how many steps it can
    /// take to drain through the nearest-or-farthest edge.
    pub fn longest_exit_path(&self, row: u32, col: u32) -> u32 {
        (row + 1)
            .max(self.rows - row)
            .max(col + 1)
            .max(self.cols - col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::EdgeBehavior;
    use proptest::prelude::*;

    fn in_grid(row: u32, col: u32) -> Landing {
        Landing::InGrid { row, col }
    }

    // ── Neighbour tests ─────────────────────────────────────────

    #[test]
    fn neighbours_interior_ignore_policy() {
        let s = Square4::new(5, 5).unwrap();
        let n = s.neighbours(2, 2, &EdgeBehavior::Absorb);
        assert_eq!(
            n.as_slice(),
            &[in_grid(1, 2), in_grid(3, 2), in_grid(2, 1), in_grid(2, 3)]
        );
    }

    #[test]
    fn neighbours_absorb_corner() {
        let s = Square4::new(5, 5).unwrap();
        let n = s.neighbours(0, 0, &EdgeBehavior::Absorb);
        assert_eq!(
            n.as_slice(),
            &[Landing::Void, in_grid(1, 0), Landing::Void, in_grid(0, 1)]
        );
    }

    #[test]
    fn neighbours_wrap_opposite_corner() {
        let s = Square4::new(5, 5).unwrap();
        let n = s.neighbours(4, 4, &EdgeBehavior::Wrap);
        assert_eq!(
            n.as_slice(),
            &[in_grid(3, 4), in_grid(0, 4), in_grid(4, 3), in_grid(4, 0)]
        );
    }

    #[test]
    fn neighbours_clamp_corner_self_loops() {
        let s = Square4::new(5, 5).unwrap();
        let n = s.neighbours(0, 0, &EdgeBehavior::Clamp);
        assert_eq!(n.iter().filter(|l| **l == in_grid(0, 0)).count(), 2);
    }

    // ── Constructor tests ───────────────────────────────────────

    #[test]
    fn new_zero_rows_returns_error() {
        assert!(matches!(Square4::new(0, 5), Err(SpaceError::EmptySpace)));
    }

    #[test]
    fn new_zero_cols_returns_error() {
        assert!(matches!(Square4::new(5, 0), Err(SpaceError::EmptySpace)));
    }

    #[test]
    fn new_rejects_dims_exceeding_i32_max() {
        let big = i32::MAX as u32 + 1;
        assert!(matches!(
            Square4::new(big, 5),
            Err(SpaceError::DimensionTooLarge { name: "rows", .. })
        ));
        assert!(matches!(
            Square4::new(5, big),
            Err(SpaceError::DimensionTooLarge { name: "cols", .. })
        ));
        assert!(Square4::new(i32::MAX as u32, 1).is_ok());
    }

    // ── Path length ─────────────────────────────────────────────

    #[test]
    fn longest_exit_path_centre_and_corner() {
        let s = Square4::new(5, 7).unwrap();
        assert_eq!(s.longest_exit_path(2, 3), 4);
        assert_eq!(s.longest_exit_path(0, 0), 7);
        let one = Square4::new(1, 1).unwrap();
        assert_eq!(one.longest_exit_path(0, 0), 1);
    }

    // ── Property tests ──────────────────────────────────────────

    proptest! {
        #[test]
        fn index_and_coord_agree(rows in 1u32..40, cols in 1u32..40, seed in any::<usize>()) {
            let s = Square4::new(rows, cols).unwrap();
            let i = seed % s.cell_count();
            let (r, c) = s.coord(i);
            prop_assert!(s.contains(r as i32, c as i32));
            prop_assert_eq!(s.index(r, c), i);
        }

        #[test]
        fn interior_neighbours_are_adjacent(rows in 3u32..20, cols in 3u32..20) {
            let s = Square4::new(rows, cols).unwrap();
            for landing in s.neighbours(rows / 2, cols / 2, &EdgeBehavior::Absorb) {
                match landing {
                    Landing::InGrid { row, col } => {
                        let d = (row as i32 - (rows / 2) as i32).abs()
                            + (col as i32 - (cols / 2) as i32).abs();
                        prop_assert_eq!(d, 1);
                    }
                    Landing::Void => prop_assert!(false, "interior neighbour fell off the grid"),
                }
            }
        }
    }
}
