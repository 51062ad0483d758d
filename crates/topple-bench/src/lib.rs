//! Benchmark profiles for the topple sandpile simulator.
//!
//! Provides pre-built [`SandpileConfig`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 256x256 grid (64K cells), slowly driven
//! - [`stress_profile`]: 1024x1024 grid (~1M cells), slowly driven
//! - [`critical_grid`]: a grid with every cell at threshold

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use topple_engine::{ModelConfig, SandpileConfig};
use topple_space::{Grid, Square4};

/// Build a reference benchmark profile: 256x256 grid (64K cells).
///
/// Abelian toppling, absorbing edges, p = 1e-4, gated forcing.
pub fn reference_profile(seed: u64) -> SandpileConfig {
    let mut config = SandpileConfig::new(256, 256);
    config.probability = 1e-4;
    config.seed = seed;
    config
}

/// Build a stress benchmark profile: 1024x1024 grid (~1M cells).
///
/// Same parameters as [`reference_profile`] at 16x the cell count.
pub fn stress_profile(seed: u64) -> SandpileConfig {
    let mut config = reference_profile(seed);
    config.rows = 1024;
    config.cols = 1024;
    config
}

/// The dissipative variant of [`reference_profile`].
pub fn dissipative_profile(seed: u64) -> SandpileConfig {
    let mut config = reference_profile(seed);
    config.model = ModelConfig::Dissipative {
        threshold: 4.0,
        epsilon: 0.01,
    };
    config
}

/// A `rows * cols` integer grid with every cell at `threshold`: the
/// worst case for one wavefront, since every cell topples.
pub fn critical_grid(rows: u32, cols: u32, threshold: i64) -> Option<Grid<i64>> {
    let shape = Square4::new(rows, cols).ok()?;
    Some(Grid::filled(shape, threshold))
}
