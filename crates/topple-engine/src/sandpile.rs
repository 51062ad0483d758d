//! The sandpile engine and its drive loop.
//!
//! [`Sandpile`] owns everything one simulation needs: the grid, the two
//! delta buffers, the grain total, the forcing source and the boundary
//! policy. Each [`step()`](Sandpile::step) runs forcing and one
//! wavefront; [`drive()`](Sandpile::drive) and
//! [`drive_to_stable()`](Sandpile::drive_to_stable) repeat it.
//!
//! # Ownership model
//!
//! `Sandpile` is [`Send`]: independent instances can run on separate
//! threads with no shared state. All mutating methods take `&mut self`.
//!
//! # Carried state
//!
//! The pending buffer and the previous step's critical count live on the
//! engine, not in the drive loop. An avalanche in flight when one
//! `drive` call ends resumes exactly where it stopped on the next call,
//! including across the warm-up / measurement boundary.

use std::time::Instant;

use topple_core::{Cell, StepId, StepSink, StepStats};
use topple_rules::ToppleRule;
use topple_space::{BoundaryPolicy, EdgeBehavior, Grid, Square4};
use tracing::{debug, info, trace};

use crate::config::{check_probability, ConfigError};
use crate::forcing::Forcing;
use crate::metrics::StepMetrics;
use crate::relax::{relax, Wavefront};
use crate::stability::{Stability, StabilityDetector};
use crate::stop::StopHandle;

// Compile-time assertion: Sandpile is Send for both reference rules.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<Sandpile<topple_rules::Abelian>>();
        assert_send::<Sandpile<topple_rules::Dissipative>>();
    }
};

// ── Reports ─────────────────────────────────────────────────────

/// Result of [`Sandpile::drive`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DriveReport {
    /// Steps actually run.
    pub steps: u64,
    /// Whether a stop request ended the call early.
    pub interrupted: bool,
}

/// How a warm-up ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WarmUpOutcome {
    /// The stability detector reported a plateau.
    Converged {
        /// Slope of the final check.
        slope: f64,
    },
    /// The step cap was reached first. Not an error.
    CapReached,
    /// A stop request ended the warm-up.
    Interrupted,
}

/// Result of [`Sandpile::drive_to_stable`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarmUp {
    /// Steps run during the warm-up.
    pub steps: u64,
    /// Why it ended.
    pub outcome: WarmUpOutcome,
}

// ── Builder ─────────────────────────────────────────────────────

/// Builder for [`Sandpile`].
///
/// Defaults: probability 1e-4, seed 0, gated forcing, absorbing edges.
#[derive(Debug)]
pub struct SandpileBuilder<R: ToppleRule> {
    rule: R,
    probability: f64,
    seed: u64,
    running: bool,
    policy: Box<dyn BoundaryPolicy>,
}

impl<R: ToppleRule> SandpileBuilder<R> {
    /// Set the per-cell forcing probability. Must lie in `[0, 1]`.
    pub fn probability(mut self, probability: f64) -> Self {
        self.probability = probability;
        self
    }

    /// Set the RNG seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Keep forcing while cells are critical.
    pub fn running(mut self, running: bool) -> Self {
        self.running = running;
        self
    }

    /// Use one of the built-in boundary policies.
    pub fn edge(self, edge: EdgeBehavior) -> Self {
        self.policy(Box::new(edge))
    }

    /// Use a custom boundary policy.
    pub fn policy(mut self, policy: Box<dyn BoundaryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Build an engine over a randomly initialised `shape`.
    ///
    /// Every cell is drawn independently from the rule's stable range,
    /// row-major, from the same generator that later drives forcing.
    pub fn build_random(self, shape: Square4) -> Result<Sandpile<R>, ConfigError> {
        let mut forcing = Forcing::new(shape, self.probability, self.seed)?;
        let rule = self.rule;
        let grid = {
            let rng = forcing.rng_mut();
            Grid::from_fn(shape, |_, _| rule.random_cell(&mut *rng))
        };
        let pile = Sandpile::assemble(rule, self.policy, grid, forcing, self.running);
        debug!(
            rule = pile.rule.name(),
            rows = shape.rows(),
            cols = shape.cols(),
            total = %pile.total,
            "sandpile initialised randomly"
        );
        Ok(pile)
    }

    /// Build an engine over a loaded grid.
    ///
    /// Runs one settling pass (no pending deltas, no forcing) before
    /// returning, so latent critical cells start toppling immediately.
    /// The settling statistics are available from
    /// [`last_stats`](Sandpile::last_stats).
    pub fn build_from_grid(self, grid: Grid<R::Cell>) -> Result<Sandpile<R>, ConfigError> {
        check_probability(self.probability)?;
        let forcing = Forcing::new(grid.shape(), self.probability, self.seed)?;
        let mut pile = Sandpile::assemble(self.rule, self.policy, grid, forcing, self.running);
        let stats = pile.settle();
        debug!(
            rule = pile.rule.name(),
            rows = pile.grid.rows(),
            cols = pile.grid.cols(),
            critical = stats.critical,
            lost = %stats.lost,
            total = %stats.total,
            "sandpile settled from map"
        );
        Ok(pile)
    }
}

// ── Sandpile ────────────────────────────────────────────────────

/// A single sandpile simulation.
///
/// # Example
///
/// ```
/// use topple_engine::Sandpile;
/// use topple_rules::Abelian;
/// use topple_space::Square4;
///
/// let shape = Square4::new(32, 32).unwrap();
/// let mut pile = Sandpile::builder(Abelian::default())
///     .probability(1e-3)
///     .seed(7)
///     .build_random(shape)
///     .unwrap();
/// let report = pile.drive(100, ());
/// assert_eq!(report.steps, 100);
/// assert_eq!(pile.total(), pile.recount());
/// ```
#[derive(Debug)]
pub struct Sandpile<R: ToppleRule> {
    rule: R,
    policy: Box<dyn BoundaryPolicy>,
    grid: Grid<R::Cell>,
    pending: Grid<R::Cell>,
    next: Grid<R::Cell>,
    total: R::Cell,
    forcing: Forcing,
    running: bool,
    prev_critical: u64,
    step_id: StepId,
    last: Option<StepStats<R::Cell>>,
    metrics: StepMetrics,
    stop: StopHandle,
}

impl<R: ToppleRule> Sandpile<R> {
    /// Start building an engine for `rule`.
    pub fn builder(rule: R) -> SandpileBuilder<R> {
        SandpileBuilder {
            rule,
            probability: 1e-4,
            seed: 0,
            running: false,
            policy: Box::new(EdgeBehavior::Absorb),
        }
    }

    fn assemble(
        rule: R,
        policy: Box<dyn BoundaryPolicy>,
        grid: Grid<R::Cell>,
        forcing: Forcing,
        running: bool,
    ) -> Self {
        let shape = grid.shape();
        // The only full re-sum outside of `recount`.
        let total = grid.sum();
        Self {
            rule,
            policy,
            grid,
            pending: Grid::zeros(shape),
            next: Grid::zeros(shape),
            total,
            forcing,
            running,
            prev_critical: 0,
            step_id: StepId::default(),
            last: None,
            metrics: StepMetrics::default(),
            stop: StopHandle::new(),
        }
    }

    /// Scan every cell once with no pending deltas and no forcing.
    fn settle(&mut self) -> StepStats<R::Cell> {
        self.next.clear();
        let wave = relax(
            &self.rule,
            &*self.policy,
            &mut self.grid,
            None,
            &mut self.next,
        );
        let stats = self.finish_wave(wave, 0);
        self.metrics = StepMetrics {
            cells_visited: wave.visited,
            cells_skipped: wave.skipped,
            ..StepMetrics::default()
        };
        stats
    }

    /// Book a finished wavefront: update the total, swap buffers, record
    /// the stats. Does not advance the step counter.
    fn finish_wave(&mut self, wave: Wavefront<R::Cell>, added: u64) -> StepStats<R::Cell> {
        self.total -= wave.lost;
        std::mem::swap(&mut self.pending, &mut self.next);
        self.next.clear();
        self.prev_critical = wave.critical;
        let stats = StepStats {
            critical: wave.critical,
            added,
            lost: wave.lost,
            total: self.total,
        };
        self.last = Some(stats);
        stats
    }

    /// Run one step: forcing (when due) followed by one wavefront.
    ///
    /// Forcing is due when the previous step toppled nothing, or always
    /// when the engine is running.
    pub fn step(&mut self) -> StepStats<R::Cell> {
        let step_start = Instant::now();
        let shape = self.grid.shape();

        let forcing_start = Instant::now();
        let added = if self.prev_critical == 0 || self.running {
            self.forcing.scatter(self.pending.as_mut_slice(), shape)
        } else {
            0
        };
        self.total += R::Cell::from_grains(added);
        let forcing_us = forcing_start.elapsed().as_micros() as u64;

        let relax_start = Instant::now();
        let wave = relax(
            &self.rule,
            &*self.policy,
            &mut self.grid,
            Some(&self.pending),
            &mut self.next,
        );
        let relax_us = relax_start.elapsed().as_micros() as u64;

        let stats = self.finish_wave(wave, added);
        self.step_id = self.step_id.next();
        self.metrics = StepMetrics {
            total_us: step_start.elapsed().as_micros() as u64,
            forcing_us,
            relax_us,
            cells_visited: wave.visited,
            cells_skipped: wave.skipped,
        };
        trace!(
            step = self.step_id.0,
            critical = stats.critical,
            added = stats.added,
            lost = %stats.lost,
            total = %stats.total,
            "step"
        );
        stats
    }

    /// Step exactly `n` times, unless stopped, forwarding every step's
    /// statistics (and frames, when wanted) to `sink`.
    ///
    /// The stop flag is checked before each step.
    pub fn drive<S: StepSink<R::Cell>>(&mut self, n: u64, mut sink: S) -> DriveReport {
        let mut steps = 0;
        while steps < n {
            if self.stop.is_stopped() {
                debug!(steps, requested = n, "drive interrupted");
                return DriveReport {
                    steps,
                    interrupted: true,
                };
            }
            let stats = self.step();
            steps += 1;
            sink.on_step(self.step_id, &stats);
            if sink.wants_frames() {
                sink.on_frame(self.grid.frame(self.step_id));
            }
        }
        DriveReport {
            steps,
            interrupted: false,
        }
    }

    /// Step until `detector` reports a plateau, `max_steps` is reached,
    /// or a stop is requested. Statistics go nowhere but the detector.
    pub fn drive_to_stable(
        &mut self,
        detector: &mut StabilityDetector,
        max_steps: u64,
    ) -> WarmUp {
        for steps in 0..max_steps {
            if self.stop.is_stopped() {
                debug!(steps, "warm-up interrupted");
                return WarmUp {
                    steps,
                    outcome: WarmUpOutcome::Interrupted,
                };
            }
            let stats = self.step();
            if let Stability::Stable { slope } = detector.push(stats.total.to_f64()) {
                info!(steps = steps + 1, slope, total = %stats.total, "warm-up converged");
                return WarmUp {
                    steps: steps + 1,
                    outcome: WarmUpOutcome::Converged { slope },
                };
            }
        }
        info!(steps = max_steps, total = %self.total, "warm-up gave up at step cap");
        WarmUp {
            steps: max_steps,
            outcome: WarmUpOutcome::CapReached,
        }
    }

    /// Re-sum grid plus pending buffer. Must equal [`total`](Self::total)
    /// (up to rounding for real cells).
    pub fn recount(&self) -> R::Cell {
        self.grid.sum() + self.pending.sum()
    }

    /// The incrementally maintained grain total.
    pub fn total(&self) -> R::Cell {
        self.total
    }

    /// The grid.
    pub fn grid(&self) -> &Grid<R::Cell> {
        &self.grid
    }

    /// Deltas to be applied at the start of the next step.
    pub fn pending(&self) -> &Grid<R::Cell> {
        &self.pending
    }

    /// Grid shape.
    pub fn shape(&self) -> Square4 {
        self.grid.shape()
    }

    /// The toppling rule.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Critical count of the most recent step (or settling pass).
    pub fn previous_critical(&self) -> u64 {
        self.prev_critical
    }

    /// Id of the most recent step. `StepId(0)` before the first step.
    pub fn step_id(&self) -> StepId {
        self.step_id
    }

    /// Statistics of the most recent step or settling pass.
    pub fn last_stats(&self) -> Option<StepStats<R::Cell>> {
        self.last
    }

    /// Metrics of the most recent step.
    pub fn metrics(&self) -> &StepMetrics {
        &self.metrics
    }

    /// Whether forcing ignores ongoing activity.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Per-cell forcing probability.
    pub fn probability(&self) -> f64 {
        self.forcing.probability()
    }

    /// The seed the forcing source was created with.
    pub fn seed(&self) -> u64 {
        self.forcing.seed()
    }

    /// A handle that stops this engine's drive loops between steps.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}
