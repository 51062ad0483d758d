//! Observer traits consumed by the drive loop.

use crate::id::StepId;
use crate::stats::StepStats;

/// Borrowed, read-only view of the grid after a step.
///
/// Cells are stored row-major: cell `(r, c)` lives at `r * cols + c`.
#[derive(Debug)]
pub struct Frame<'a, T> {
    /// The step that produced this grid state.
    pub step: StepId,
    /// Number of rows.
    pub rows: u32,
    /// Number of columns.
    pub cols: u32,
    /// Row-major cell values, `rows * cols` long.
    pub cells: &'a [T],
}

// Manual impls: a derive would require `T: Copy`.
impl<T> Clone for Frame<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Frame<'_, T> {}

impl<'a, T: Copy> Frame<'a, T> {
    /// Value at `(row, col)`, or `None` when out of range.
    pub fn get(&self, row: u32, col: u32) -> Option<T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells
            .get(row as usize * self.cols as usize + col as usize)
            .copied()
    }

    /// Iterate over rows as slices.
    pub fn rows_iter(&self) -> impl Iterator<Item = &'a [T]> + 'a {
        let cells: &'a [T] = self.cells;
        cells.chunks(self.cols.max(1) as usize)
    }
}

/// Receives the output of every step driven by the drive loop.
///
/// Both callbacks are fire-and-forget: nothing a sink does influences
/// the engine. Sinks that perform I/O must latch their own errors.
///
/// # Examples
///
/// ```
/// use topple_core::{StepId, StepSink, StepStats};
///
/// #[derive(Default)]
/// struct CountTopples(u64);
///
/// impl StepSink<i64> for CountTopples {
///     fn on_step(&mut self, _step: StepId, stats: &StepStats<i64>) {
///         self.0 += stats.critical;
///     }
/// }
///
/// let mut sink = CountTopples::default();
/// sink.on_step(StepId(1), &StepStats { critical: 2, added: 0, lost: 0, total: 9 });
/// assert_eq!(sink.0, 2);
/// assert!(!sink.wants_frames());
/// ```
pub trait StepSink<T> {
    /// Called once per completed step with its statistics.
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>);

    /// Whether [`on_frame`](StepSink::on_frame) should be called.
    ///
    /// Copying a frame is not free on large grids, so the drive loop
    /// only builds frames for sinks that ask for them. Default: `false`.
    fn wants_frames(&self) -> bool {
        false
    }

    /// Called after [`on_step`](StepSink::on_step) with the grid state,
    /// only when [`wants_frames`](StepSink::wants_frames) returns `true`.
    fn on_frame(&mut self, _frame: Frame<'_, T>) {}
}

/// The no-op sink.
impl<T> StepSink<T> for () {
    fn on_step(&mut self, _step: StepId, _stats: &StepStats<T>) {}
}

impl<T, S: StepSink<T> + ?Sized> StepSink<T> for &mut S {
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>) {
        (**self).on_step(step, stats);
    }

    fn wants_frames(&self) -> bool {
        (**self).wants_frames()
    }

    fn on_frame(&mut self, frame: Frame<'_, T>) {
        (**self).on_frame(frame);
    }
}

impl<T, S: StepSink<T> + ?Sized> StepSink<T> for Box<S> {
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>) {
        (**self).on_step(step, stats);
    }

    fn wants_frames(&self) -> bool {
        (**self).wants_frames()
    }

    fn on_frame(&mut self, frame: Frame<'_, T>) {
        (**self).on_frame(frame);
    }
}
