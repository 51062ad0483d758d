//! Test utilities for topple development.
//!
//! Provides a [`RecordingSink`] that keeps everything the drive loop
//! hands it, grid fixtures in [`fixtures`], and grain-book assertions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use topple_core::{Cell, Frame, StepId, StepSink, StepStats};

/// Records every step and, optionally, every frame.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink<T> {
    pub steps: Vec<(StepId, StepStats<T>)>,
    pub frames: Vec<(StepId, Vec<T>)>,
    record_frames: bool,
}

impl<T: Cell> RecordingSink<T> {
    /// Record statistics only.
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            frames: Vec::new(),
            record_frames: false,
        }
    }

    /// Record statistics and grid frames.
    pub fn with_frames() -> Self {
        Self {
            record_frames: true,
            ..Self::new()
        }
    }

    /// The recorded statistics without step ids.
    pub fn stats(&self) -> Vec<StepStats<T>> {
        self.steps.iter().map(|(_, s)| *s).collect()
    }

    /// Critical counts in step order.
    pub fn criticals(&self) -> Vec<u64> {
        self.steps.iter().map(|(_, s)| s.critical).collect()
    }
}

impl<T: Cell> StepSink<T> for RecordingSink<T> {
    fn on_step(&mut self, step: StepId, stats: &StepStats<T>) {
        self.steps.push((step, *stats));
    }

    fn wants_frames(&self) -> bool {
        self.record_frames
    }

    fn on_frame(&mut self, frame: Frame<'_, T>) {
        self.frames.push((frame.step, frame.cells.to_vec()));
    }
}

/// Assert exact integer grain books.
#[track_caller]
pub fn assert_books_exact(total: i64, recount: i64) {
    assert_eq!(
        total, recount,
        "grain books out of balance: total {total}, grid + pending {recount}"
    );
}

/// Assert real grain books within `1e-9` per cell, scaled by magnitude.
#[track_caller]
pub fn assert_books_close(total: f64, recount: f64, cells: usize) {
    let tol = 1e-9 * cells as f64 * total.abs().max(recount.abs()).max(1.0);
    assert!(
        (total - recount).abs() <= tol,
        "grain books out of balance: total {total}, grid + pending {recount}, tolerance {tol}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let mut sink = RecordingSink::<i64>::with_frames();
        for i in 1..=3 {
            sink.on_step(
                StepId(i),
                &StepStats {
                    critical: i,
                    added: 0,
                    lost: 0,
                    total: 10,
                },
            );
        }
        assert!(sink.wants_frames());
        sink.on_frame(Frame {
            step: StepId(3),
            rows: 1,
            cols: 2,
            cells: &[1, 2],
        });
        assert_eq!(sink.criticals(), vec![1, 2, 3]);
        assert_eq!(sink.frames, vec![(StepId(3), vec![1, 2])]);
        assert!(!RecordingSink::<i64>::new().wants_frames());
    }

    #[test]
    fn close_books_tolerate_rounding() {
        assert_books_close(1.0e6, 1.0e6 + 1.0e-6, 100);
        assert_books_exact(7, 7);
    }

    #[test]
    #[should_panic(expected = "out of balance")]
    fn close_books_catch_drift() {
        assert_books_close(100.0, 101.0, 100);
    }
}
