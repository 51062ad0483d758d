//! The [`ToppleRule`] trait and its result type.

use std::fmt;

use rand::Rng;
use topple_core::Cell;

/// What a critical cell does when it topples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Toppled<T> {
    /// Value left on the toppled cell.
    pub residual: T,
    /// Amount emitted to each of the four axis neighbours.
    pub share: T,
}

impl<T: Cell> Toppled<T> {
    /// Total amount leaving the cell: four shares.
    pub fn shed(&self) -> T {
        self.share + self.share + self.share + self.share
    }
}

/// A threshold model: criticality test plus toppling arithmetic.
///
/// # Contract
///
/// - `topple(v)` is only called with `is_critical(v) == true`.
/// - `residual + 4 * share == v` exactly for integer cells, and up to
///   rounding for real cells. The relaxation engine's grain books rely
///   on this.
/// - Both methods MUST be pure: the engine calls them once per critical
///   cell per step and expects identical results for identical input.
///
/// # Examples
///
/// A rule that drains the whole cell:
///
/// ```
/// use rand::Rng;
/// use topple_rules::{ToppleRule, Toppled};
///
/// #[derive(Debug)]
/// struct Drain;
///
/// impl ToppleRule for Drain {
///     type Cell = i64;
///
///     fn name(&self) -> &str { "drain" }
///
///     fn threshold(&self) -> i64 { 8 }
///
///     fn topple(&self, value: i64) -> Toppled<i64> {
///         let share = value / 4;
///         Toppled { residual: value - 4 * share, share }
///     }
///
///     fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
///         rng.random_range(0..8)
///     }
/// }
///
/// assert!(Drain.is_critical(8));
/// assert_eq!(Drain.topple(9), Toppled { residual: 1, share: 2 });
/// ```
pub trait ToppleRule: fmt::Debug + Send + Sync + 'static {
    /// Numeric kind of the grid this rule operates on.
    type Cell: Cell;

    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Criticality threshold: a cell with value `>= threshold` topples.
    fn threshold(&self) -> Self::Cell;

    /// Whether a cell holding `value` is critical.
    #[inline]
    fn is_critical(&self, value: Self::Cell) -> bool {
        value >= self.threshold()
    }

    /// Split a critical value into residual and per-neighbour share.
    fn topple(&self, value: Self::Cell) -> Toppled<Self::Cell>;

    /// Draw one cell value for random grid initialisation. Always
    /// non-critical.
    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Cell;
}

/// Invalid rule parameters.
#[derive(Clone, Debug, PartialEq)]
pub enum RuleError {
    /// The threshold is not usable.
    InvalidThreshold {
        /// The rejected value.
        value: f64,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The retention fraction lies outside `[0, 1)`.
    InvalidEpsilon {
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold { value, reason } => {
                write!(f, "invalid threshold {value}: {reason}")
            }
            Self::InvalidEpsilon { value } => {
                write!(f, "epsilon must lie in [0, 1), got {value}")
            }
        }
    }
}

impl std::error::Error for RuleError {}
