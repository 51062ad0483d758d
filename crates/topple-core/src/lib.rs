//! Core types and traits for the topple sandpile simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the workspace: the
//! [`Cell`] numeric kind, step identifiers, per-step statistics, the
//! [`StepSink`] observer trait, and map format errors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod error;
pub mod id;
pub mod stats;
pub mod traits;

pub use cell::{Cell, CellKind};
pub use error::MapError;
pub use id::StepId;
pub use stats::StepStats;
pub use traits::{Frame, StepSink};
