//! Stochastic grain injection.
//!
//! Each injection draws `added ~ Binomial(rows * cols, p)` and drops
//! `added` single grains at independent, uniformly random cells. Repeats
//! are allowed: several grains may land on one cell in the same step.
//!
//! Respects the determinism contract: one [`ChaCha8Rng`] per engine,
//! seeded explicitly, so the same seed and call sequence reproduce the
//! same `(added, positions)` sequence.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Binomial;
use topple_core::Cell;
use topple_space::Square4;

use crate::config::{check_probability, ConfigError};

/// The forcing source of one engine.
#[derive(Clone, Debug)]
pub struct Forcing {
    rng: ChaCha8Rng,
    count: Binomial,
    probability: f64,
    seed: u64,
}

impl Forcing {
    /// Create a forcing source for `shape` with per-cell probability `p`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidProbability`] unless `0 <= p <= 1`.
    pub fn new(shape: Square4, probability: f64, seed: u64) -> Result<Self, ConfigError> {
        check_probability(probability)?;
        let trials = shape.cell_count() as u64;
        let count = Binomial::new(trials, probability)
            .map_err(|_| ConfigError::InvalidProbability { value: probability })?;
        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            count,
            probability,
            seed,
        })
    }

    /// Per-cell probability.
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// The seed this source was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw how many grains to inject this step.
    pub fn draw_count(&mut self) -> u64 {
        self.count.sample(&mut self.rng)
    }

    /// Draw one uniformly random cell of `shape`.
    pub fn draw_position(&mut self, shape: Square4) -> (u32, u32) {
        let r = self.rng.random_range(0..shape.rows());
        let c = self.rng.random_range(0..shape.cols());
        (r, c)
    }

    /// Inject one batch of grains into the row-major buffer `pending`.
    /// Returns the number of grains added.
    pub fn scatter<T: Cell>(&mut self, pending: &mut [T], shape: Square4) -> u64 {
        let added = self.draw_count();
        let one = T::from_grains(1);
        for _ in 0..added {
            let (r, c) = self.draw_position(shape);
            pending[shape.index(r, c)] += one;
        }
        added
    }

    /// The generator, for random grid initialisation before forcing starts.
    pub(crate) fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }
}
