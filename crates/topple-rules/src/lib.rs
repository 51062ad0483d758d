//! Toppling rules for the topple sandpile simulator.
//!
//! A [`ToppleRule`] decides when a cell is critical and how a critical
//! cell sheds its grains. The relaxation engine is generic over the rule,
//! so the choice between models is made once at construction and never
//! branched on per cell.
//!
//! # Reference rules
//!
//! - [`Abelian`]: integer grain counts, a critical cell sheds exactly 4
//!   grains, 1 to each axis neighbour
//! - [`Dissipative`]: real heights, a critical cell keeps a fraction
//!   `epsilon` of its value and spreads the rest evenly (Zhang model)

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod abelian;
pub mod dissipative;
pub mod rule;

pub use abelian::Abelian;
pub use dissipative::{Dissipative, DissipativeBuilder};
pub use rule::{RuleError, ToppleRule, Toppled};
