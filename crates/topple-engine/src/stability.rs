//! Plateau detection for the warm-up phase.
//!
//! A heuristic, not an exact test: the grain total of a driven pile rises
//! until the pile reaches its critical state and then fluctuates around a
//! level. [`StabilityDetector`] keeps a sliding window of totals and
//! periodically fits a least-squares line through it; a flat line means
//! the plateau has been reached.

use std::collections::VecDeque;

use tracing::debug;

use crate::config::{ConfigError, StabilityConfig};

/// Verdict after one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stability {
    /// The window is not full yet.
    Filling,
    /// The window is full but no check was due this sample.
    Waiting,
    /// A check ran and the trend is still too steep.
    Trending {
        /// Fitted slope, grains per step.
        slope: f64,
    },
    /// A check ran and `|slope| < tolerance`.
    Stable {
        /// Fitted slope, grains per step.
        slope: f64,
    },
}

/// Sliding-window trend test over a stream of grain totals.
#[derive(Clone, Debug)]
pub struct StabilityDetector {
    window: VecDeque<f64>,
    capacity: usize,
    check_every: u64,
    tolerance: f64,
    samples: u64,
}

impl StabilityDetector {
    /// Create a detector. See [`StabilityConfig`] for the parameters.
    pub fn new(capacity: usize, check_every: u64, tolerance: f64) -> Result<Self, ConfigError> {
        let config = StabilityConfig {
            window: capacity,
            check_every,
            tolerance,
            ..StabilityConfig::default()
        };
        Self::from_config(&config)
    }

    /// Create a detector from validated settings.
    pub fn from_config(config: &StabilityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            window: VecDeque::with_capacity(config.window),
            capacity: config.window,
            check_every: config.check_every,
            tolerance: config.tolerance,
            samples: 0,
        })
    }

    /// Append one sample, evicting the oldest when full, and run the
    /// trend check if one is due.
    ///
    /// Samples are numbered from 0. A check runs on sample `i` when the
    /// window is full and `i % check_every == 0`.
    pub fn push(&mut self, total: f64) -> Stability {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(total);
        let index = self.samples;
        self.samples += 1;

        if self.window.len() < self.capacity {
            return Stability::Filling;
        }
        if index % self.check_every != 0 {
            return Stability::Waiting;
        }
        let slope = self.slope();
        debug!(sample = index, slope, "stability check");
        if slope.abs() < self.tolerance {
            Stability::Stable { slope }
        } else {
            Stability::Trending { slope }
        }
    }

    /// Least-squares slope of the window against sample position.
    ///
    /// Positions are centred so the sums stay small on long windows.
    /// Returns 0 for fewer than two samples.
    pub fn slope(&self) -> f64 {
        let n = self.window.len();
        if n < 2 {
            return 0.0;
        }
        let mid = (n - 1) as f64 / 2.0;
        let mean = self.window.iter().sum::<f64>() / n as f64;
        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (i, &y) in self.window.iter().enumerate() {
            let x = i as f64 - mid;
            sxy += x * (y - mean);
            sxx += x * x;
        }
        sxy / sxx
    }

    /// Samples pushed so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Samples currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// `true` before the first sample.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_of_a_line_is_exact() {
        let mut d = StabilityDetector::new(5, 1, 0.01).unwrap();
        for i in 0..5 {
            d.push(3.0 + 2.0 * i as f64);
        }
        assert!((d.slope() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn filling_until_full() {
        let mut d = StabilityDetector::new(4, 1, 0.01).unwrap();
        for _ in 0..3 {
            assert_eq!(d.push(1.0), Stability::Filling);
        }
        assert_eq!(d.len(), 3);
    }

    #[test]
    fn flat_window_is_stable() {
        let mut d = StabilityDetector::new(4, 1, 0.01).unwrap();
        let verdicts: Vec<_> = (0..4).map(|_| d.push(10.0)).collect();
        assert_eq!(verdicts[3], Stability::Stable { slope: 0.0 });
    }

    #[test]
    fn rising_window_is_trending() {
        let mut d = StabilityDetector::new(4, 1, 0.01).unwrap();
        let mut last = Stability::Filling;
        for i in 0..4 {
            last = d.push(i as f64);
        }
        assert!(matches!(last, Stability::Trending { slope } if (slope - 1.0).abs() < 1e-12));
    }

    #[test]
    fn checks_only_on_multiples() {
        // Window full from sample 2; checks at samples 3 and 6 only.
        let mut d = StabilityDetector::new(3, 3, 0.01).unwrap();
        let verdicts: Vec<_> = (0..7).map(|_| d.push(5.0)).collect();
        assert_eq!(verdicts[0], Stability::Filling);
        assert_eq!(verdicts[1], Stability::Filling);
        assert_eq!(verdicts[2], Stability::Waiting);
        assert!(matches!(verdicts[3], Stability::Stable { .. }));
        assert_eq!(verdicts[4], Stability::Waiting);
        assert_eq!(verdicts[5], Stability::Waiting);
        assert!(matches!(verdicts[6], Stability::Stable { .. }));
    }

    #[test]
    fn window_evicts_oldest() {
        let mut d = StabilityDetector::new(3, 1, 0.01).unwrap();
        for v in [100.0, 0.0, 0.0, 0.0] {
            d.push(v);
        }
        assert_eq!(d.len(), 3);
        assert_eq!(d.slope(), 0.0);
        assert_eq!(d.samples(), 4);
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert!(StabilityDetector::new(1, 1, 0.01).is_err());
        assert!(StabilityDetector::new(4, 0, 0.01).is_err());
        assert!(StabilityDetector::new(4, 1, -1.0).is_err());
    }
}
