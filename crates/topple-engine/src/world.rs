//! Config-driven front end.
//!
//! [`SandpileWorld`] turns a [`SandpileConfig`] into a running engine:
//! it picks the threshold model once, loads or randomises the grid, and
//! wires up the data log and map file. Callers that want typed access to
//! the grid reach through [`pile()`](SandpileWorld::pile).

use std::error::Error;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use topple_core::{MapError, StepStats};
use topple_rules::{Abelian, Dissipative, ToppleRule};
use topple_space::Square4;
use tracing::info;

use crate::config::{ConfigError, ModelConfig, SandpileConfig, StabilityConfig};
use crate::map::{parse_map, write_map};
use crate::sandpile::{DriveReport, Sandpile, WarmUp};
use crate::sink::{DataHeader, DataLog};
use crate::stability::StabilityDetector;
use crate::stop::StopHandle;

// ── WorldError ──────────────────────────────────────────────────

/// Errors from building or driving a [`SandpileWorld`].
#[derive(Debug)]
pub enum WorldError {
    /// The configuration is invalid.
    Config(ConfigError),
    /// The input map does not match the configuration.
    Map(MapError),
    /// A file could not be read or written.
    Io(io::Error),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Map(e) => write!(f, "map: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
        }
    }
}

impl Error for WorldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Map(e) => Some(e),
            Self::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for WorldError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<MapError> for WorldError {
    fn from(e: MapError) -> Self {
        Self::Map(e)
    }
}

impl From<io::Error> for WorldError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ── Pile ────────────────────────────────────────────────────────

/// The engine behind a world, one variant per threshold model.
#[derive(Debug)]
pub enum Pile {
    /// Integer toppling.
    Abelian(Sandpile<Abelian>),
    /// Continuous toppling.
    Dissipative(Sandpile<Dissipative>),
}

/// Grain statistics widened to `f64`, common to both models.
pub type AnyStats = StepStats<f64>;

fn widen<T: topple_core::Cell>(s: StepStats<T>) -> AnyStats {
    StepStats {
        critical: s.critical,
        added: s.added,
        lost: s.lost.to_f64(),
        total: s.total.to_f64(),
    }
}

// ── SandpileWorld ───────────────────────────────────────────────

/// A sandpile built from a [`SandpileConfig`], with its output files.
///
/// # Example
///
/// ```
/// use topple_engine::{SandpileConfig, SandpileWorld};
///
/// let mut cfg = SandpileConfig::new(16, 16);
/// cfg.probability = 1e-2;
/// cfg.seed = 42;
/// let mut world = SandpileWorld::new(cfg).unwrap();
/// let report = world.drive(50).unwrap();
/// assert_eq!(report.steps, 50);
/// ```
#[derive(Debug)]
pub struct SandpileWorld {
    pile: Pile,
    data: Option<DataLog<BufWriter<File>>>,
    map_out: Option<PathBuf>,
    stability: StabilityConfig,
}

impl SandpileWorld {
    /// Validate `config` and build the world.
    ///
    /// With an input map, the map is loaded and settled and no header is
    /// written. Otherwise the grid is randomised and, when a data path is
    /// configured, the run header is appended to the data file.
    pub fn new(config: SandpileConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let shape = config.shape()?;

        let pile = match config.model {
            ModelConfig::Abelian { threshold } => {
                let rule = Abelian::new(threshold).map_err(ConfigError::from)?;
                Pile::Abelian(build(&config, rule, shape)?)
            }
            ModelConfig::Dissipative { threshold, epsilon } => {
                let rule = Dissipative::builder()
                    .threshold(threshold)
                    .epsilon(epsilon)
                    .build()
                    .map_err(ConfigError::from)?;
                Pile::Dissipative(build(&config, rule, shape)?)
            }
        };

        let data = match &config.output.data {
            Some(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                let mut log = DataLog::new(BufWriter::new(file));
                if config.input.is_none() {
                    log.write_header(&DataHeader {
                        rows: config.rows,
                        cols: config.cols,
                        probability: config.probability,
                        running: config.running,
                        seed: config.seed,
                    })?;
                }
                Some(log)
            }
            None => None,
        };

        Ok(Self {
            pile,
            data,
            map_out: config.output.map,
            stability: config.stability,
        })
    }

    /// The engine.
    pub fn pile(&self) -> &Pile {
        &self.pile
    }

    /// The engine, mutably.
    pub fn pile_mut(&mut self) -> &mut Pile {
        &mut self.pile
    }

    /// Step `n` times, logging each step to the data file, then save the
    /// map if a map path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::Io`] if the data log latched a write error
    /// or the map could not be saved. The steps have run regardless.
    pub fn drive(&mut self, n: u64) -> Result<DriveReport, WorldError> {
        let report = match (&mut self.pile, self.data.as_mut()) {
            (Pile::Abelian(p), Some(log)) => p.drive(n, log),
            (Pile::Abelian(p), None) => p.drive(n, ()),
            (Pile::Dissipative(p), Some(log)) => p.drive(n, log),
            (Pile::Dissipative(p), None) => p.drive(n, ()),
        };
        if let Some(log) = self.data.as_mut() {
            log.check()?;
        }
        if let Some(path) = self.map_out.clone() {
            self.save_map(&path)?;
        }
        Ok(report)
    }

    /// Warm up with the configured stability settings. Nothing is logged.
    pub fn drive_to_stable(&mut self) -> Result<WarmUp, WorldError> {
        let mut detector = StabilityDetector::from_config(&self.stability)?;
        let max = self.stability.max_steps;
        Ok(match &mut self.pile {
            Pile::Abelian(p) => p.drive_to_stable(&mut detector, max),
            Pile::Dissipative(p) => p.drive_to_stable(&mut detector, max),
        })
    }

    /// Write the current grid to `path`, replacing its contents.
    pub fn save_map(&self, path: &Path) -> Result<(), WorldError> {
        let out = BufWriter::new(File::create(path)?);
        match &self.pile {
            Pile::Abelian(p) => write_map(p.grid(), out)?,
            Pile::Dissipative(p) => write_map(p.grid(), out)?,
        }
        info!(path = %path.display(), "map saved");
        Ok(())
    }

    /// Statistics of the most recent step, widened to `f64`.
    pub fn last_stats(&self) -> Option<AnyStats> {
        match &self.pile {
            Pile::Abelian(p) => p.last_stats().map(widen),
            Pile::Dissipative(p) => p.last_stats().map(widen),
        }
    }

    /// Grain total, widened to `f64`.
    pub fn total(&self) -> f64 {
        match &self.pile {
            Pile::Abelian(p) => p.total() as f64,
            Pile::Dissipative(p) => p.total(),
        }
    }

    /// A handle that stops this world's drive loops between steps.
    pub fn stop_handle(&self) -> StopHandle {
        match &self.pile {
            Pile::Abelian(p) => p.stop_handle(),
            Pile::Dissipative(p) => p.stop_handle(),
        }
    }
}

fn build<R: ToppleRule>(
    config: &SandpileConfig,
    rule: R,
    shape: Square4,
) -> Result<Sandpile<R>, WorldError> {
    let builder = Sandpile::builder(rule)
        .probability(config.probability)
        .seed(config.seed)
        .running(config.running)
        .edge(config.edge);
    match &config.input {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let grid = parse_map::<R::Cell>(&text, shape)?;
            info!(path = %path.display(), rows = shape.rows(), cols = shape.cols(), "map loaded");
            Ok(builder.build_from_grid(grid)?)
        }
        None => Ok(builder.build_random(shape)?),
    }
}
