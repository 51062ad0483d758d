//! Error types for space construction.

use std::fmt;

/// Errors arising from grid shape or grid storage construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpaceError {
    /// Attempted to construct a grid with zero cells.
    EmptySpace,
    /// A dimension exceeds the maximum supported size.
    DimensionTooLarge {
        /// Which dimension (`"rows"` or `"cols"`).
        name: &'static str,
        /// The requested value.
        value: u32,
        /// The maximum allowed value.
        max: u32,
    },
    /// Rows handed to [`Grid::from_rows`](crate::Grid::from_rows) differ in length.
    RaggedRows {
        /// Zero-based index of the first offending row.
        row: usize,
        /// Length of row 0.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
}

impl fmt::Display for SpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "grid must have at least one cell"),
            Self::DimensionTooLarge { name, value, max } => {
                write!(f, "{name} = {value} exceeds maximum {max}")
            }
            Self::RaggedRows {
                row,
                expected,
                found,
            } => {
                write!(f, "row {row} has {found} cells, row 0 has {expected}")
            }
        }
    }
}

impl std::error::Error for SpaceError {}
