//! Sandpile configuration, validation, and error types.
//!
//! [`SandpileConfig`] is the builder-input for constructing a
//! [`SandpileWorld`](crate::world::SandpileWorld). It is plain data built
//! in code; [`validate()`](SandpileConfig::validate) checks every
//! structural invariant before any simulation starts.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use topple_rules::{Abelian, Dissipative, RuleError};
use topple_space::{EdgeBehavior, SpaceError, Square4};

// ── ModelConfig ────────────────────────────────────────────────────

/// Which threshold model the grid runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ModelConfig {
    /// Integer toppling. `threshold` defaults to 4.
    Abelian {
        /// Criticality threshold. Must be at least 1.
        threshold: i64,
    },
    /// Continuous toppling with retention fraction `epsilon`.
    Dissipative {
        /// Criticality threshold. Must be finite and > 0.
        threshold: f64,
        /// Fraction of its value a toppling cell keeps, in `[0, 1)`.
        epsilon: f64,
    },
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::Abelian {
            threshold: Abelian::SHED,
        }
    }
}

impl ModelConfig {
    /// Map the flat option set `{zhang, z_threshold, z_epsilon}`.
    ///
    /// `zhang == false` selects the abelian model with its default
    /// threshold and ignores the other two values.
    pub fn from_flags(zhang: bool, z_threshold: f64, z_epsilon: f64) -> Self {
        if zhang {
            Self::Dissipative {
                threshold: z_threshold,
                epsilon: z_epsilon,
            }
        } else {
            Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Self::Abelian { threshold } => Abelian::new(*threshold).map(|_| ()),
            Self::Dissipative { threshold, epsilon } => Dissipative::builder()
                .threshold(*threshold)
                .epsilon(*epsilon)
                .build()
                .map(|_| ()),
        }
        .map_err(ConfigError::from)
    }
}

// ── OutputConfig ───────────────────────────────────────────────────

/// Where a world writes its results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Per-step data log, opened for append. `None` disables logging.
    pub data: Option<PathBuf>,
    /// Map file rewritten after every `drive`. `None` disables saving.
    pub map: Option<PathBuf>,
}

// ── StabilityConfig ────────────────────────────────────────────────

/// Parameters of the warm-up stability detector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StabilityConfig {
    /// Sliding window capacity (samples). Default: 20 000. Minimum: 2.
    pub window: usize,
    /// Steps between trend checks once the window is full. Default: 100.
    pub check_every: u64,
    /// Stable when `|slope| < tolerance`. Default: 0.01.
    pub tolerance: f64,
    /// Give-up cap on warm-up steps. Default: 1 000 000 000.
    pub max_steps: u64,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            window: 20_000,
            check_every: 100,
            tolerance: 0.01,
            max_steps: 1_000_000_000,
        }
    }
}

impl StabilityConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.window < 2 {
            return Err(ConfigError::InvalidStability {
                reason: format!("window must hold at least 2 samples, got {}", self.window),
            });
        }
        if self.check_every == 0 {
            return Err(ConfigError::InvalidStability {
                reason: "check_every must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidStability {
                reason: format!(
                    "tolerance must be finite and positive, got {}",
                    self.tolerance
                ),
            });
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`SandpileConfig::validate()`] and engine
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// `rows` or `cols` is zero.
    EmptySpace,
    /// A dimension exceeds the maximum supported size.
    DimensionTooLarge {
        /// Which dimension.
        name: &'static str,
        /// The configured value.
        value: u32,
    },
    /// `rows * cols` exceeds `u32::MAX`.
    CellCountOverflow {
        /// The overflowing cell count.
        value: u64,
    },
    /// Forcing probability is NaN or outside `[0, 1]`.
    InvalidProbability {
        /// The invalid value.
        value: f64,
    },
    /// The model threshold is unusable.
    InvalidThreshold {
        /// The invalid value.
        value: f64,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// The retention fraction lies outside `[0, 1)`.
    InvalidEpsilon {
        /// The invalid value.
        value: f64,
    },
    /// A stability detector invariant is violated.
    InvalidStability {
        /// Description of which invariant was violated.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySpace => write!(f, "grid must have at least one row and one column"),
            Self::DimensionTooLarge { name, value } => {
                write!(f, "{name} = {value} exceeds maximum {}", Square4::MAX_DIM)
            }
            Self::CellCountOverflow { value } => {
                write!(f, "cell count {value} exceeds u32::MAX")
            }
            Self::InvalidProbability { value } => {
                write!(f, "probability must lie in [0, 1], got {value}")
            }
            Self::InvalidThreshold { value, reason } => {
                write!(f, "invalid threshold {value}: {reason}")
            }
            Self::InvalidEpsilon { value } => {
                write!(f, "epsilon must lie in [0, 1), got {value}")
            }
            Self::InvalidStability { reason } => {
                write!(f, "invalid stability config: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

impl From<RuleError> for ConfigError {
    fn from(e: RuleError) -> Self {
        match e {
            RuleError::InvalidThreshold { value, reason } => {
                Self::InvalidThreshold { value, reason }
            }
            RuleError::InvalidEpsilon { value } => Self::InvalidEpsilon { value },
        }
    }
}

impl From<SpaceError> for ConfigError {
    fn from(e: SpaceError) -> Self {
        match e {
            SpaceError::DimensionTooLarge { name, value, .. } => {
                Self::DimensionTooLarge { name, value }
            }
            // Ragged rows cannot come from a shape; both remaining cases
            // mean "no cells".
            SpaceError::EmptySpace | SpaceError::RaggedRows { .. } => Self::EmptySpace,
        }
    }
}

/// Check a forcing probability.
pub(crate) fn check_probability(p: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(ConfigError::InvalidProbability { value: p })
    }
}

// ── SandpileConfig ─────────────────────────────────────────────────

/// Complete configuration for constructing a sandpile world.
#[derive(Clone, Debug, PartialEq)]
pub struct SandpileConfig {
    /// Grid rows.
    pub rows: u32,
    /// Grid columns.
    pub cols: u32,
    /// Per-cell forcing probability per injection. Default: 1e-4.
    pub probability: f64,
    /// RNG seed for initialisation and forcing. Default: 0.
    pub seed: u64,
    /// Keep forcing while cells are critical. Default: `false`.
    pub running: bool,
    /// Threshold model. Default: abelian, threshold 4.
    pub model: ModelConfig,
    /// Boundary policy. Default: absorb.
    pub edge: EdgeBehavior,
    /// Initial map to load instead of random initialisation.
    pub input: Option<PathBuf>,
    /// Output files.
    pub output: OutputConfig,
    /// Warm-up stability detector settings.
    pub stability: StabilityConfig,
}

impl SandpileConfig {
    /// A `rows * cols` configuration with every other field at its default.
    pub fn new(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            probability: 1e-4,
            seed: 0,
            running: false,
            model: ModelConfig::default(),
            edge: EdgeBehavior::default(),
            input: None,
            output: OutputConfig::default(),
            stability: StabilityConfig::default(),
        }
    }

    /// Validate all structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Shape must be non-empty and fit in i32 coordinates.
        let shape = self.shape()?;
        // 2. Cell count must fit in u32.
        let cells = shape.cell_count() as u64;
        if u32::try_from(cells).is_err() {
            return Err(ConfigError::CellCountOverflow { value: cells });
        }
        // 3. Forcing probability.
        check_probability(self.probability)?;
        // 4. Model parameters (delegates to topple-rules).
        self.model.validate()?;
        // 5. Stability detector.
        self.stability.validate()
    }

    /// The grid shape.
    pub fn shape(&self) -> Result<Square4, ConfigError> {
        Ok(Square4::new(self.rows, self.cols)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> SandpileConfig {
        SandpileConfig::new(16, 16)
    }

    #[test]
    fn validate_valid_config_succeeds() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn defaults_match_reference_run() {
        let cfg = valid_config();
        assert_eq!(cfg.probability, 1e-4);
        assert!(!cfg.running);
        assert_eq!(cfg.model, ModelConfig::Abelian { threshold: 4 });
        assert_eq!(cfg.edge, EdgeBehavior::Absorb);
        assert_eq!(cfg.stability.window, 20_000);
        assert_eq!(cfg.stability.check_every, 100);
        assert_eq!(cfg.stability.tolerance, 0.01);
    }

    #[test]
    fn validate_zero_rows_fails() {
        let mut cfg = valid_config();
        cfg.rows = 0;
        match cfg.validate() {
            Err(ConfigError::EmptySpace) => {}
            other => panic!("expected EmptySpace, got {other:?}"),
        }
    }

    #[test]
    fn validate_huge_dimension_fails() {
        let mut cfg = valid_config();
        cfg.cols = u32::MAX;
        match cfg.validate() {
            Err(ConfigError::DimensionTooLarge { name: "cols", .. }) => {}
            other => panic!("expected DimensionTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn validate_cell_count_overflow_fails() {
        let mut cfg = valid_config();
        cfg.rows = 1 << 17;
        cfg.cols = 1 << 17;
        match cfg.validate() {
            Err(ConfigError::CellCountOverflow { value }) => assert_eq!(value, 1 << 34),
            other => panic!("expected CellCountOverflow, got {other:?}"),
        }
    }

    #[test]
    fn validate_bad_probability_fails() {
        for p in [-0.1, 1.5, f64::NAN] {
            let mut cfg = valid_config();
            cfg.probability = p;
            match cfg.validate() {
                Err(ConfigError::InvalidProbability { .. }) => {}
                other => panic!("expected InvalidProbability for {p}, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_bad_model_fails() {
        let mut cfg = valid_config();
        cfg.model = ModelConfig::Abelian { threshold: 0 };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidThreshold { .. })
        ));
        cfg.model = ModelConfig::from_flags(true, 4.0, 1.0);
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidEpsilon { .. })
        ));
    }

    #[test]
    fn validate_bad_stability_fails() {
        let mut cfg = valid_config();
        cfg.stability.window = 1;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidStability { .. })
        ));
        let mut cfg = valid_config();
        cfg.stability.check_every = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidStability { .. })
        ));
        let mut cfg = valid_config();
        cfg.stability.tolerance = f64::NAN;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidStability { .. })
        ));
    }

    #[test]
    fn from_flags_selects_model() {
        assert_eq!(
            ModelConfig::from_flags(false, 9.0, 0.5),
            ModelConfig::Abelian { threshold: 4 }
        );
        assert_eq!(
            ModelConfig::from_flags(true, 9.0, 0.5),
            ModelConfig::Dissipative {
                threshold: 9.0,
                epsilon: 0.5
            }
        );
    }
}
