//! Spatial data structures for the topple sandpile simulator.
//!
//! This crate defines the [`Square4`] grid shape (4-connected, row-major),
//! the dense [`Grid`] storage used for both cell values and pending
//! deltas, and the [`BoundaryPolicy`] contract that decides where a grain
//! shed across the grid edge ends up.
//!
//! # Boundary policies
//!
//! - [`EdgeBehavior::Absorb`]: off-grid grains are lost (the reference policy)
//! - [`EdgeBehavior::Wrap`]: periodic boundary (torus)
//! - [`EdgeBehavior::Clamp`]: reflecting boundary, the grain falls back
//!   onto the edge cell it left
//!
//! Any other type implementing [`BoundaryPolicy`] is a drop-in substitute.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod error;
pub mod grid;
mod grid2d;
pub mod square4;

#[cfg(test)]
pub(crate) mod compliance;

pub use edge::{BoundaryPolicy, EdgeBehavior, Landing};
pub use error::SpaceError;
pub use grid::Grid;
pub use square4::Square4;
