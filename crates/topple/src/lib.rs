//! Topple: a sandpile simulator for self-organized criticality.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all topple sub-crates. For most users, adding `topple` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use topple::prelude::*;
//!
//! let shape = Square4::new(32, 32).unwrap();
//! let mut pile = Sandpile::builder(Abelian::default())
//!     .probability(1e-3)
//!     .seed(42)
//!     .edge(EdgeBehavior::Absorb)
//!     .build_random(shape)
//!     .unwrap();
//!
//! // Warm up until the grain total stops trending (or give up at 2000).
//! let mut detector = StabilityDetector::new(500, 50, 0.05).unwrap();
//! let warm = pile.drive_to_stable(&mut detector, 2_000);
//! assert!(warm.steps <= 2_000);
//!
//! // Measure avalanches.
//! let mut tracker = AvalancheTracker::new(0);
//! let report = pile.drive(1_000, &mut tracker);
//! assert_eq!(report.steps, 1_000);
//! assert_eq!(pile.total(), pile.recount());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `topple-core` | Cell kinds, step ids and stats, the sink trait |
//! | [`space`] | `topple-space` | Grid shape and storage, boundary policies |
//! | [`rules`] | `topple-rules` | Toppling rules (abelian, dissipative) |
//! | [`engine`] | `topple-engine` | Relaxation, drive loop, sinks, map I/O, config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`topple-core`).
///
/// Contains the [`types::Cell`] trait, [`types::StepStats`] and the
/// [`types::StepSink`] trait that every consumer of step output implements.
pub use topple_core as types;

/// Grid shape, storage and boundary policies (`topple-space`).
///
/// [`space::Square4`] is the lattice, [`space::Grid`] the dense storage,
/// and [`space::BoundaryPolicy`] the extension point for custom edges.
pub use topple_space as space;

/// Toppling rules (`topple-rules`).
///
/// The [`rules::ToppleRule`] trait is the extension point for new
/// threshold models.
pub use topple_rules as rules;

/// The simulation engine (`topple-engine`).
///
/// [`engine::Sandpile`] for typed, in-code use and
/// [`engine::SandpileWorld`] for config-driven runs with output files.
pub use topple_engine as engine;

/// Common imports for typical topple usage.
///
/// ```rust
/// use topple::prelude::*;
/// ```
pub mod prelude {
    // Core types and traits
    pub use topple_core::{Cell, Frame, StepId, StepSink, StepStats};

    // Space
    pub use topple_space::{BoundaryPolicy, EdgeBehavior, Grid, Landing, Square4};

    // Rules
    pub use topple_rules::{Abelian, Dissipative, ToppleRule};

    // Engine
    pub use topple_engine::{
        AvalancheTracker, DataLog, DriveReport, Fanout, ModelConfig, Sandpile, SandpileConfig,
        SandpileWorld, StabilityDetector, StepMetrics, StopHandle, WarmUpOutcome,
    };

    // Errors
    pub use topple_engine::{ConfigError, WorldError};
}
