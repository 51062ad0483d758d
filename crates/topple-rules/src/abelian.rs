//! Integer (Bak-Tang-Wiesenfeld) toppling.

use rand::Rng;

use crate::rule::{RuleError, ToppleRule, Toppled};

/// The abelian sandpile rule on `i64` cells.
///
/// A cell holding at least `threshold` grains topples by shedding exactly
/// 4 grains, one to each axis neighbour. The default threshold is 4, the
/// von Neumann neighbourhood degree, which keeps every cell non-negative.
///
/// Thresholds below 4 are accepted but let a toppled cell go negative;
/// they exist for boundary accounting tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Abelian {
    threshold: i64,
}

impl Abelian {
    /// Grains shed per topple.
    pub const SHED: i64 = 4;

    /// Create a rule with a custom threshold. Must be at least 1.
    pub fn new(threshold: i64) -> Result<Self, RuleError> {
        if threshold < 1 {
            return Err(RuleError::InvalidThreshold {
                value: threshold as f64,
                reason: "abelian threshold must be at least 1",
            });
        }
        Ok(Self { threshold })
    }
}

impl Default for Abelian {
    fn default() -> Self {
        Self {
            threshold: Self::SHED,
        }
    }
}

impl ToppleRule for Abelian {
    type Cell = i64;

    fn name(&self) -> &str {
        "abelian"
    }

    fn threshold(&self) -> i64 {
        self.threshold
    }

    #[inline]
    fn topple(&self, value: i64) -> Toppled<i64> {
        Toppled {
            residual: value - Self::SHED,
            share: 1,
        }
    }

    /// Uniform over `0..threshold`.
    fn random_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        rng.random_range(0..self.threshold)
    }
}
