//! Continuous (Zhang) toppling with a retained fraction.
//!
//! A critical cell of height `v` keeps `epsilon * v` and sends
//! `(1 - epsilon) * v / 4` to each axis neighbour. With `epsilon > 0` the
//! residual can itself stay above threshold; the engine resolves it on a
//! later step, never within the same scan.
//!
//! Constructed via the builder pattern: [`Dissipative::builder`].

use rand::Rng;

use crate::rule::{RuleError, ToppleRule, Toppled};

/// The dissipative sandpile rule on `f64` cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Dissipative {
    threshold: f64,
    epsilon: f64,
}

/// Builder for [`Dissipative`].
#[derive(Clone, Copy, Debug)]
pub struct DissipativeBuilder {
    threshold: f64,
    epsilon: f64,
}

impl Dissipative {
    /// Create a new builder. Defaults: threshold 4.0, epsilon 0.0.
    pub fn builder() -> DissipativeBuilder {
        DissipativeBuilder {
            threshold: 4.0,
            epsilon: 0.0,
        }
    }

    /// Fraction of its value a toppling cell keeps.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl DissipativeBuilder {
    /// Set the criticality threshold. Must be finite and > 0.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the retention fraction. Must lie in `[0, 1)`.
    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Build the rule, validating both parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - `threshold` is non-finite or not positive
    /// - `epsilon` is NaN or outside `[0, 1)`
    pub fn build(self) -> Result<Dissipative, RuleError> {
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(RuleError::InvalidThreshold {
                value: self.threshold,
                reason: "dissipative threshold must be finite and > 0",
            });
        }
        if !(0.0..1.0).contains(&self.epsilon) {
            return Err(RuleError::InvalidEpsilon {
                value: self.epsilon,
            });
        }
        Ok(Dissipative {
            threshold: self.threshold,
            epsilon: self.epsilon,
        })
    }
}

impl ToppleRule for Dissipative {
    type Cell = f64;

    fn name(&self) -> &str {
        "dissipative"
    }

    fn threshold(&self) -> f64 {
        self.threshold
    }

    #[inline]
    fn topple(&self, value: f64) -> Toppled<f64> {
        let share = (1.0 - self.epsilon) * value / 4.0;
        // Equals epsilon * value, computed so residual + 4 * share
        // reproduces value as closely as rounding allows.
        Toppled {
            residual: value - 4.0 * share,
            share,
        }
    }

    /// Uniform over `[0, threshold - 0.5)`, leaving half a grain of
    /// headroom. Thresholds at or below 0.5 use `[0, threshold)`.
    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let upper = if self.threshold > 0.5 {
            self.threshold - 0.5
        } else {
            self.threshold
        };
        rng.random::<f64>() * upper
    }
}
