//! Per-step performance metrics for the relaxation engine.
//!
//! [`StepMetrics`] captures timing and scan coverage for a single step,
//! for profiling and for checking that the skip test pays off.

/// Timing and coverage metrics collected during a single step.
///
/// All durations are in microseconds. The engine populates these fields
/// after each step; consumers read them from the most recent step.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire step, in microseconds.
    pub total_us: u64,
    /// Time spent drawing and scattering forcing grains, in microseconds.
    pub forcing_us: u64,
    /// Time spent in the wavefront scan, in microseconds.
    pub relax_us: u64,
    /// Cells whose value was examined.
    pub cells_visited: u64,
    /// Cells passed over by the zero-delta skip test.
    pub cells_skipped: u64,
}

impl StepMetrics {
    /// Fraction of cells the scan skipped, in `[0, 1]`.
    pub fn skip_ratio(&self) -> f64 {
        let seen = self.cells_visited + self.cells_skipped;
        if seen == 0 {
            0.0
        } else {
            self.cells_skipped as f64 / seen as f64
        }
    }
}
