//! The relaxation step: one wavefront of toppling.
//!
//! Toppled grains are written into a separate `next` buffer, never back
//! into the grid, so a single call advances every avalanche by exactly
//! one cell of depth. An avalanche `k` cells deep needs `k` calls. Work
//! per call is bounded by the grid size, not the avalanche size.
//!
//! A toppled cell keeps the rule's residual. If that residual is still
//! critical it is not toppled again in the same call; the next call
//! reaches it because the skip test below never skips a critical cell.

use topple_core::Cell;
use topple_rules::ToppleRule;
use topple_space::{BoundaryPolicy, Grid, Landing, Square4};

/// What one wavefront did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Wavefront<T> {
    /// Cells that toppled.
    pub critical: u64,
    /// Amount that left through a void boundary.
    pub lost: T,
    /// Cells whose value was examined.
    pub visited: u64,
    /// Cells passed over without touching them.
    pub skipped: u64,
}

/// Run one wavefront over `grid`.
///
/// Scans cells row-major. With `pending` present, a cell is skipped when
/// its pending entry is zero and its current value is not critical;
/// otherwise the entry is added to the cell first. With `pending` absent
/// every cell is examined and nothing is added. A critical cell is set to
/// the rule's residual and emits the rule's share to each of its four
/// axis neighbours into `next`. Emissions falling off the grid go through
/// `policy`; void emissions are summed into [`Wavefront::lost`].
///
/// `next` is accumulated into, not cleared. The caller keeps the grain
/// books: `total -= lost`.
pub fn relax<R: ToppleRule>(
    rule: &R,
    policy: &dyn BoundaryPolicy,
    grid: &mut Grid<R::Cell>,
    pending: Option<&Grid<R::Cell>>,
    next: &mut Grid<R::Cell>,
) -> Wavefront<R::Cell> {
    let shape = grid.shape();
    debug_assert_eq!(shape, next.shape());
    let pending = pending.map(|p| {
        debug_assert_eq!(shape, p.shape());
        p.as_slice()
    });
    let cells = grid.as_mut_slice();
    let next = next.as_mut_slice();

    let mut wave = Wavefront {
        critical: 0,
        lost: R::Cell::ZERO,
        visited: 0,
        skipped: 0,
    };

    let mut i = 0usize;
    for r in 0..shape.rows() {
        for c in 0..shape.cols() {
            if let Some(pending) = pending {
                let delta = pending[i];
                if delta.is_zero() && !rule.is_critical(cells[i]) {
                    wave.skipped += 1;
                    i += 1;
                    continue;
                }
                cells[i] += delta;
            }
            wave.visited += 1;

            let value = cells[i];
            if rule.is_critical(value) {
                wave.critical += 1;
                let toppled = rule.topple(value);
                cells[i] = toppled.residual;
                for (dr, dc) in Square4::OFFSETS {
                    emit(
                        &shape,
                        policy,
                        next,
                        r as i32 + dr,
                        c as i32 + dc,
                        toppled.share,
                        &mut wave.lost,
                    );
                }
            }
            i += 1;
        }
    }
    wave
}

#[inline]
fn emit<T: Cell>(
    shape: &Square4,
    policy: &dyn BoundaryPolicy,
    next: &mut [T],
    row: i32,
    col: i32,
    amount: T,
    lost: &mut T,
) {
    if shape.contains(row, col) {
        next[shape.index(row as u32, col as u32)] += amount;
        return;
    }
    match policy.resolve(row, col, shape) {
        Landing::InGrid { row, col } => next[shape.index(row, col)] += amount,
        Landing::Void => *lost += amount,
    }
}
