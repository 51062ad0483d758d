//! Error types shared across the workspace.
//!
//! Configuration errors live with the configuration in `topple-engine`;
//! space construction errors live in `topple-space`. What remains here is
//! the map text format, which is parsed against a [`Cell`](crate::Cell)
//! kind and a grid shape.

use std::error::Error;
use std::fmt;

use crate::cell::CellKind;

/// Errors from parsing a serialized grid map.
///
/// All map errors are fatal at load time: a map is never silently
/// truncated or padded to fit the configured shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    /// The map has a different number of rows than the grid.
    RowCount {
        /// Rows the grid was configured with.
        expected: u32,
        /// Non-empty lines found in the map.
        found: usize,
    },
    /// A row has a different number of cells than the grid.
    RowLength {
        /// Zero-based row index.
        row: usize,
        /// Columns the grid was configured with.
        expected: u32,
        /// Tokens found on the line.
        found: usize,
    },
    /// A token is not a valid number of the grid's cell kind.
    BadToken {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
        /// The offending token.
        token: String,
        /// The cell kind the token was parsed as.
        kind: CellKind,
    },
    /// A token parsed but is below zero; grain heights never are.
    Negative {
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
        /// The offending token.
        token: String,
    },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCount { expected, found } => {
                write!(f, "map has {found} rows, grid expects {expected}")
            }
            Self::RowLength {
                row,
                expected,
                found,
            } => {
                write!(f, "map row {row} has {found} cells, grid expects {expected}")
            }
            Self::BadToken {
                row,
                col,
                token,
                kind,
            } => {
                write!(f, "map cell ({row}, {col}) is not a valid {kind} value: {token:?}")
            }
            Self::Negative { row, col, token } => {
                write!(f, "map cell ({row}, {col}) is negative: {token:?}")
            }
        }
    }
}

impl Error for MapError {}
