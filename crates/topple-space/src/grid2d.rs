//! Shared axis helpers for the 2D grid.

use crate::edge::EdgeBehavior;

/// The four axis offsets `(drow, dcol)`: north, south, west, east.
///
/// The order fixes the order in which a toppling cell emits to its
/// neighbours, which matters for floating-point reproducibility.
pub(crate) const OFFSETS: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Fold one coordinate back onto an axis of length `len`.
///
/// In-range values pass through untouched. Out-of-range values are
/// dropped (`Absorb`), pinned to the nearest end (`Clamp`) or taken
/// modulo `len` (`Wrap`).
pub(crate) fn resolve_axis(val: i32, len: u32, edge: EdgeBehavior) -> Option<u32> {
    if let Ok(v) = u32::try_from(val) {
        if v < len {
            return Some(v);
        }
    }
    match edge {
        EdgeBehavior::Absorb => None,
        EdgeBehavior::Clamp if val < 0 => Some(0),
        EdgeBehavior::Clamp => Some(len - 1),
        EdgeBehavior::Wrap => Some(val.rem_euclid(len as i32) as u32),
    }
}
