//! Text map format for grid states.
//!
//! One line per row; cells separated by `;`. Writers end every value with
//! `;`. Readers trim any trailing run of `;` and whitespace from each
//! line and ignore blank lines at the end of the input.
//!
//! ```text
//! 0;1;3;
//! 2;2;0;
//! ```
//!
//! A map that does not match the configured shape is rejected outright;
//! it is never truncated or padded.

use std::fmt::Write as _;
use std::io::{self, Write};

use topple_core::{Cell, MapError};
use topple_space::{Grid, Square4};

const DELIMITER: char = ';';

fn trim_row(line: &str) -> &str {
    line.trim_end_matches(|c: char| c == DELIMITER || c.is_whitespace())
}

/// Parse map text into a grid of `shape`.
///
/// # Errors
///
/// - [`MapError::RowCount`] when the number of rows differs from `shape`
/// - [`MapError::RowLength`] when a row has the wrong number of cells
/// - [`MapError::BadToken`] when a token is not a number of the cell kind
/// - [`MapError::Negative`] when a value is below zero
///
/// # Examples
///
/// ```
/// use topple_engine::map::parse_map;
/// use topple_space::Square4;
///
/// let shape = Square4::new(2, 3).unwrap();
/// let grid = parse_map::<i64>("0;1;3;\n2;2;0;\n", shape).unwrap();
/// assert_eq!(grid.get(1, 0), Some(2));
/// assert!(parse_map::<i64>("0;1;3;\n", shape).is_err());
/// ```
pub fn parse_map<T: Cell>(text: &str, shape: Square4) -> Result<Grid<T>, MapError> {
    let mut lines: Vec<&str> = text.lines().map(trim_row).collect();
    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.len() != shape.rows() as usize {
        return Err(MapError::RowCount {
            expected: shape.rows(),
            found: lines.len(),
        });
    }

    let mut grid = Grid::zeros(shape);
    let cells = grid.as_mut_slice();
    for (row, line) in lines.iter().enumerate() {
        let tokens: Vec<&str> = if line.trim().is_empty() {
            Vec::new()
        } else {
            line.split(DELIMITER).collect()
        };
        if tokens.len() != shape.cols() as usize {
            return Err(MapError::RowLength {
                row,
                expected: shape.cols(),
                found: tokens.len(),
            });
        }
        for (col, token) in tokens.iter().enumerate() {
            let value = T::parse_token(token).ok_or_else(|| MapError::BadToken {
                row,
                col,
                token: token.trim().to_string(),
                kind: T::KIND,
            })?;
            if value < T::ZERO {
                return Err(MapError::Negative {
                    row,
                    col,
                    token: token.trim().to_string(),
                });
            }
            cells[row * shape.cols() as usize + col] = value;
        }
    }
    Ok(grid)
}

/// Render a grid in map format.
pub fn format_map<T: Cell>(grid: &Grid<T>) -> String {
    let mut out = String::new();
    for row in grid.frame(Default::default()).rows_iter() {
        for v in row {
            // Writing to a String cannot fail.
            let _ = write!(out, "{v}{DELIMITER}");
        }
        out.push('\n');
    }
    out
}

/// Write a grid in map format to `out`.
pub fn write_map<T: Cell, W: Write>(grid: &Grid<T>, mut out: W) -> io::Result<()> {
    out.write_all(format_map(grid).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use topple_core::CellKind;

    fn shape(rows: u32, cols: u32) -> Square4 {
        Square4::new(rows, cols).unwrap()
    }

    #[test]
    fn trailing_delimiters_and_blank_lines_are_ignored() {
        let text = "1;2;;  \r\n3;4\n\n  \n";
        let g = parse_map::<i64>(text, shape(2, 2)).unwrap();
        assert_eq!(g.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn tokens_may_be_padded() {
        let g = parse_map::<f64>(" 0.5 ; 1e1;\n", shape(1, 2)).unwrap();
        assert_eq!(g.as_slice(), &[0.5, 10.0]);
    }

    #[test]
    fn row_count_mismatch() {
        assert_eq!(
            parse_map::<i64>("1;2;\n3;4;\n5;6;\n", shape(2, 2)).unwrap_err(),
            MapError::RowCount {
                expected: 2,
                found: 3
            }
        );
    }

    #[test]
    fn row_length_mismatch() {
        assert_eq!(
            parse_map::<i64>("1;2;\n3;\n", shape(2, 2)).unwrap_err(),
            MapError::RowLength {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        // A blank row in the middle has no cells.
        assert_eq!(
            parse_map::<i64>("1;2;\n\n3;4;\n", shape(3, 2)).unwrap_err(),
            MapError::RowLength {
                row: 1,
                expected: 2,
                found: 0
            }
        );
    }

    #[test]
    fn bad_token() {
        assert_eq!(
            parse_map::<i64>("1;2.5;\n", shape(1, 2)).unwrap_err(),
            MapError::BadToken {
                row: 0,
                col: 1,
                token: "2.5".to_string(),
                kind: CellKind::Integer
            }
        );
        assert!(parse_map::<i64>("1;;2;\n", shape(1, 3)).is_err());
    }

    #[test]
    fn negative_values_are_rejected() {
        assert_eq!(
            parse_map::<i64>("-5;0;\n", shape(1, 2)).unwrap_err(),
            MapError::Negative {
                row: 0,
                col: 0,
                token: "-5".to_string()
            }
        );
        assert!(matches!(
            parse_map::<f64>("0.5;1;\n2;-0.25;\n", shape(2, 2)),
            Err(MapError::Negative { row: 1, col: 1, .. })
        ));
        // Negative zero is still zero.
        assert!(parse_map::<f64>("-0;1;\n", shape(1, 2)).is_ok());
    }

    #[test]
    fn format_ends_each_value_with_delimiter() {
        let g = Grid::from_rows(vec![vec![0i64, 1, 3], vec![2, 2, 0]]).unwrap();
        assert_eq!(format_map(&g), "0;1;3;\n2;2;0;\n");
        let mut out = Vec::new();
        write_map(&g, &mut out).unwrap();
        assert_eq!(out, b"0;1;3;\n2;2;0;\n");
    }

    #[test]
    fn saved_real_map_loads_back() {
        let g = Grid::from_rows(vec![vec![0.1f64, 2.0 / 3.0], vec![3.5, 0.0]]).unwrap();
        let back = parse_map::<f64>(&format_map(&g), g.shape()).unwrap();
        assert_eq!(back, g);
    }
}
