//! Tile state for one lifegrid worker.
//!
//! A [`Grid`] owns a worker's interior cells plus a one-cell halo margin
//! on every edge that borders another worker, and applies a [`Rule`] to
//! the interior once per generation. Tiles are seeded from a [`Pattern`]
//! evaluated in global frame coordinates, so every worker reproduces its
//! own slice of the same initial frame without communicating.
//!
//! # Geometry
//!
//! ```text
//!  +--+----------------+--+
//!  |  | halo row (up)  |  |   <- copy of the neighbour above
//!  +--+----------------+--+
//!  |h |                |h |
//!  |a |    interior    |a |   <- owned by this worker
//!  |l |                |l |
//!  +--+----------------+--+
//!  |  | halo row (down)|  |   <- copy of the neighbour below
//!  +--+----------------+--+
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod geometry;
pub mod grid;
pub mod pattern;
pub mod rule;

pub use geometry::{Halo, TileGeometry};
pub use grid::Grid;
pub use pattern::{CellNoise, Initializer, Pattern};
pub use rule::Rule;
