//! Benchmark profiles for lifegrid.
//!
//! - [`seeded_tile`]: a whole-frame random tile for rule benchmarks
//! - [`profile`]: a fixed-seed, export-free run configuration

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use lifegrid::exchange::Layout;
use lifegrid::tile::{CellNoise, Grid, Initializer, Pattern, TileGeometry};
use lifegrid::types::Rank;
use lifegrid::SimulationConfig;

/// Seed shared by every profile.
pub const BENCH_SEED: u64 = 0x5eed;

/// A single tile covering a random `frame_size` frame.
pub fn seeded_tile(frame_size: usize) -> Grid {
    let mut init = Initializer::new(Pattern::Random, CellNoise::new(BENCH_SEED));
    Grid::new(
        &mut init,
        frame_size,
        TileGeometry::whole_frame(frame_size),
        Rank(0),
    )
    .expect("whole-frame tile is always valid")
}

/// A random-pattern run of `iterations` generations with no export.
pub fn profile(
    frame_size: usize,
    iterations: u64,
    workers: usize,
    layout: Layout,
) -> SimulationConfig {
    SimulationConfig {
        frame_size,
        iterations,
        pattern: Pattern::Random,
        seed: Some(BENCH_SEED),
        workers,
        layout,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_are_valid() {
        assert!(profile(128, 10, 4, Layout::Blocks).validate().is_ok());
        assert!(profile(128, 10, 4, Layout::Strips).validate().is_ok());
        assert_eq!(seeded_tile(32).width(), 32);
    }
}
