//! Lifegrid: Conway's Game of Life split across cooperating workers.
//!
//! Each worker owns one tile of a square frame plus a one-cell halo and
//! trades boundary rows and columns with its neighbours every
//! generation. This is the facade crate: it re-exports the sub-crates
//! and adds the threaded driver and its configuration.
//!
//! # Quick start
//!
//! ```rust
//! use lifegrid::prelude::*;
//!
//! let config = SimulationConfig {
//!     frame_size: 16,
//!     iterations: 8,
//!     pattern: Pattern::Border,
//!     workers: 4,
//!     layout: Layout::Blocks,
//!     ..Default::default()
//! };
//! let outcome = run_simulation(&config).unwrap();
//! assert_eq!(outcome.cells.len(), 16 * 16);
//! assert_eq!(outcome.reports.len(), 4);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `lifegrid-core` | Ranks, tags, errors, transport and sink traits |
//! | [`tile`] | `lifegrid-tile` | Tile geometry, patterns, rule, per-worker grid |
//! | [`exchange`] | `lifegrid-exchange` | Decompositions, halo exchange, mesh, worker |
//! | [`export`] | `lifegrid-export` | Band sinks and BMP frame assembly |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod driver;

pub use config::SimulationConfig;
pub use driver::{run_simulation, SimulationError, SimulationOutcome, WorkerReport};

/// Core identifiers, errors and traits (`lifegrid-core`).
pub use lifegrid_core as types;

/// Tile geometry, patterns and the per-worker grid (`lifegrid-tile`).
pub use lifegrid_tile as tile;

/// Decompositions, exchange protocols and workers (`lifegrid-exchange`).
///
/// Use [`exchange::Worker`] with your own [`types::Transport`] to run
/// workers outside this crate's thread driver.
pub use lifegrid_exchange as exchange;

/// Frame export (`lifegrid-export`).
pub use lifegrid_export as export;

/// Common imports for typical lifegrid usage.
pub mod prelude {
    // Core
    pub use lifegrid_core::{
        ConfigError, ExchangeError, ExportError, FrameSink, Generation, Rank, Tag, Transport,
        WorkerError,
    };

    // Tiles
    pub use lifegrid_tile::{CellNoise, Grid, Initializer, Pattern, Rule, TileGeometry};

    // Exchange
    pub use lifegrid_exchange::{Decomposition, Layout, Mesh, Worker};

    // Driver
    pub use crate::{
        run_simulation, SimulationConfig, SimulationError, SimulationOutcome, WorkerReport,
    };
}
