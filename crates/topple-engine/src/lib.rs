//! Relaxation engine for the topple sandpile simulator.
//!
//! Provides [`Sandpile`], which owns a grid and advances it one toppling
//! wavefront per step under stochastic forcing, plus the pieces around
//! it: configuration, the warm-up stability detector, ready-made step
//! sinks, the map text format, and the config-driven [`SandpileWorld`].
//!
//! # Grain books
//!
//! After every step, `total == sum(grid) + sum(pending)`: exactly for
//! integer cells, up to rounding for real cells. Grains enter only
//! through forcing and leave only through a void boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod avalanche;
pub mod config;
pub mod forcing;
pub mod map;
pub mod metrics;
pub mod relax;
pub mod sandpile;
pub mod sink;
pub mod stability;
pub mod stop;
pub mod world;

pub use avalanche::{AvalancheRecord, AvalancheTracker};
pub use config::{ConfigError, ModelConfig, OutputConfig, SandpileConfig, StabilityConfig};
pub use forcing::Forcing;
pub use metrics::StepMetrics;
pub use relax::{relax, Wavefront};
pub use sandpile::{DriveReport, Sandpile, SandpileBuilder, WarmUp, WarmUpOutcome};
pub use sink::{DataHeader, DataLog, Fanout, FrameRecorder, RecordedFrame, StatsWindow};
pub use stability::{Stability, StabilityDetector};
pub use stop::StopHandle;
pub use world::{AnyStats, Pile, SandpileWorld, WorldError};
