//! Boundary policies: where a grain shed across the grid edge lands.

use std::fmt;

use crate::grid2d;
use crate::square4::Square4;

/// Outcome of resolving an off-grid coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landing {
    /// The grain is redirected to this in-grid cell.
    InGrid {
        /// Row of the landing cell.
        row: u32,
        /// Column of the landing cell.
        col: u32,
    },
    /// The grain leaves the system and is counted as lost.
    Void,
}

/// Maps a coordinate just outside the grid to a landing site.
///
/// # Contract
///
/// - `resolve()` is only called for coordinates exactly one step outside
///   the grid on one axis, i.e. an in-grid coordinate plus a unit offset.
/// - `resolve()` MUST be pure and deterministic.
/// - An `InGrid` landing MUST lie inside `shape`.
///
/// The relaxation engine relies on nothing else; it does not know which
/// policy is active.
///
/// # Examples
///
/// ```
/// use topple_space::{BoundaryPolicy, EdgeBehavior, Landing, Square4};
///
/// let shape = Square4::new(4, 4).unwrap();
/// assert_eq!(EdgeBehavior::Absorb.resolve(-1, 2, &shape), Landing::Void);
/// assert_eq!(
///     EdgeBehavior::Wrap.resolve(-1, 2, &shape),
///     Landing::InGrid { row: 3, col: 2 }
/// );
/// assert_eq!(
///     EdgeBehavior::Clamp.resolve(1, 4, &shape),
///     Landing::InGrid { row: 1, col: 3 }
/// );
/// ```
pub trait BoundaryPolicy: fmt::Debug + Send + Sync {
    /// Resolve the off-grid coordinate `(row, col)` against `shape`.
    fn resolve(&self, row: i32, col: i32, shape: &Square4) -> Landing;
}

/// The built-in boundary policies.
///
/// The names follow lattice topology: `Absorb` drops the neighbour,
/// `Wrap` makes the grid a torus, `Clamp` folds the neighbour back onto
/// the edge cell (a reflecting wall for grains).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EdgeBehavior {
    /// Out-of-bounds grains are permanently lost.
    #[default]
    Absorb,
    /// Out-of-bounds grains wrap to the opposite side (periodic).
    Wrap,
    /// Out-of-bounds grains return to the boundary cell they left.
    Clamp,
}

impl BoundaryPolicy for EdgeBehavior {
    fn resolve(&self, row: i32, col: i32, shape: &Square4) -> Landing {
        match (
            grid2d::resolve_axis(row, shape.rows(), *self),
            grid2d::resolve_axis(col, shape.cols(), *self),
        ) {
            (Some(row), Some(col)) => Landing::InGrid { row, col },
            _ => Landing::Void,
        }
    }
}

impl fmt::Display for EdgeBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absorb => write!(f, "absorb"),
            Self::Wrap => write!(f, "wrap"),
            Self::Clamp => write!(f, "clamp"),
        }
    }
}
