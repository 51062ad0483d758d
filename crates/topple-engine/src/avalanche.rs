//! Online avalanche bookkeeping.
//!
//! Because one step is one wavefront, an avalanche is a run of
//! consecutive active steps: its duration is the run length and its area
//! is the summed critical count. [`AvalancheTracker`] segments the step
//! stream this way while the simulation runs, so no per-step log has to
//! be post-processed.

use std::io::{self, Write};

use topple_core::{StepId, StepSink, StepStats};

/// One finished avalanche and the quiet spell that followed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AvalancheRecord {
    /// Consecutive active steps.
    pub duration: u64,
    /// Sum of critical counts over those steps.
    pub area: u64,
    /// Quiet steps between this avalanche and the next one.
    pub quiet: u64,
}

/// Segments the step stream into avalanches.
///
/// A step is active when its critical count exceeds `threshold`. Active
/// steps extend the current avalanche; quiet steps extend the quiet
/// spell after it. The record is emitted when activity resumes, since
/// only then is the quiet spell known. A quiet spell with no avalanche
/// before it (the start of a run) is not reported.
#[derive(Clone, Debug, Default)]
pub struct AvalancheTracker {
    threshold: u64,
    duration: u64,
    area: u64,
    quiet: u64,
    records: Vec<AvalancheRecord>,
}

impl AvalancheTracker {
    /// Track avalanches of steps with more than `threshold` topples.
    pub fn new(threshold: u64) -> Self {
        Self {
            threshold,
            ..Self::default()
        }
    }

    /// Feed one step's critical count.
    pub fn observe(&mut self, critical: u64) {
        if critical > self.threshold {
            if self.quiet != 0 {
                if self.duration != 0 {
                    self.records.push(AvalancheRecord {
                        duration: self.duration,
                        area: self.area,
                        quiet: self.quiet,
                    });
                }
                self.duration = 0;
                self.area = 0;
                self.quiet = 0;
            }
            self.duration += 1;
            self.area += critical;
        } else {
            self.quiet += 1;
        }
    }

    /// Avalanches completed so far.
    pub fn records(&self) -> &[AvalancheRecord] {
        &self.records
    }

    /// The avalanche in progress (or awaiting its quiet count), if any:
    /// `(duration, area)`.
    pub fn open(&self) -> Option<(u64, u64)> {
        (self.duration != 0).then_some((self.duration, self.area))
    }

    /// Write completed records as `duration,area,quiet` lines.
    pub fn write_csv<W: Write>(&self, mut out: W) -> io::Result<()> {
        for r in &self.records {
            writeln!(out, "{},{},{}", r.duration, r.area, r.quiet)?;
        }
        out.flush()
    }
}

impl<T> StepSink<T> for AvalancheTracker {
    fn on_step(&mut self, _step: StepId, stats: &StepStats<T>) {
        self.observe(stats.critical);
    }
}
