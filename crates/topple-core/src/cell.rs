//! Numeric kind of a grid cell.
//!
//! A sandpile grid stores either integer grain counts (abelian model) or
//! real-valued heights (dissipative model). [`Cell`] captures the small
//! arithmetic surface the relaxation step needs so the engine can be
//! written once and monomorphised per model.

use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Which numeric representation a cell uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Signed 64-bit integer grain counts. Arithmetic is exact.
    Integer,
    /// 64-bit floating-point heights. Arithmetic is exact up to rounding.
    Real,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Real => write!(f, "real"),
        }
    }
}

/// A value stored in one grid cell (and in the pending-delta buffer).
///
/// Implemented for `i64` and `f64`. Deltas share the cell type, so the
/// type must be signed.
///
/// # Examples
///
/// ```
/// use topple_core::Cell;
///
/// assert_eq!(i64::from_grains(3), 3);
/// assert_eq!(f64::parse_token(" 2.5 "), Some(2.5));
/// assert_eq!(i64::parse_token("x"), None);
/// assert!(0i64.is_zero());
/// ```
pub trait Cell:
    Copy
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + PartialOrd
    + Default
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + SubAssign
    + Send
    + Sync
    + 'static
{
    /// The additive identity.
    const ZERO: Self;

    /// Numeric kind tag, used in logs and error messages.
    const KIND: CellKind;

    /// Convert a whole number of grains into a cell value.
    fn from_grains(grains: u64) -> Self;

    /// Lossy conversion to `f64` for trend fitting and tolerance checks.
    fn to_f64(self) -> f64;

    /// Parse one map token. Surrounding whitespace is ignored.
    fn parse_token(token: &str) -> Option<Self>;

    /// `true` when the value equals [`Cell::ZERO`].
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    /// Sum a sequence of cell values.
    fn sum_of<I: IntoIterator<Item = Self>>(values: I) -> Self {
        values.into_iter().fold(Self::ZERO, |acc, v| acc + v)
    }
}

impl Cell for i64 {
    const ZERO: Self = 0;
    const KIND: CellKind = CellKind::Integer;

    fn from_grains(grains: u64) -> Self {
        grains as i64
    }

    fn to_f64(self) -> f64 {
        self as f64
    }

    fn parse_token(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }
}

impl Cell for f64 {
    const ZERO: Self = 0.0;
    const KIND: CellKind = CellKind::Real;

    fn from_grains(grains: u64) -> Self {
        grains as f64
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn parse_token(token: &str) -> Option<Self> {
        let v: f64 = token.trim().parse().ok()?;
        // "NaN" and "inf" parse successfully but are not grain heights.
        v.is_finite().then_some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn integer_parse_rejects_fractions() {
        assert_eq!(i64::parse_token("3"), Some(3));
        assert_eq!(i64::parse_token("3.0"), None);
        assert_eq!(i64::parse_token(""), None);
    }

    #[test]
    fn real_parse_accepts_integers_and_rejects_non_finite() {
        assert_eq!(f64::parse_token("3"), Some(3.0));
        assert_eq!(f64::parse_token("1e-3"), Some(0.001));
        assert_eq!(f64::parse_token("NaN"), None);
        assert_eq!(f64::parse_token("inf"), None);
    }

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(i64::sum_of(Vec::new()), 0);
        assert_eq!(f64::sum_of(Vec::new()), 0.0);
    }

    #[test]
    fn kind_tags() {
        assert_eq!(<i64 as Cell>::KIND, CellKind::Integer);
        assert_eq!(<f64 as Cell>::KIND, CellKind::Real);
        assert_eq!(CellKind::Real.to_string(), "real");
    }

    proptest! {
        #[test]
        fn real_display_parses_back_exactly(v in -1.0e12f64..1.0e12) {
            // Display for f64 emits the shortest representation that
            // round-trips, which is what the map writer relies on.
            prop_assert_eq!(f64::parse_token(&v.to_string()), Some(v));
        }
    }
}
