//! Core types and traits for the lifegrid halo-exchange simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: rank,
//! tag and generation identifiers, the error enums, and the seams the
//! core calls through ([`Transport`] for point-to-point messaging,
//! [`FrameSink`] for image export, [`CellObserver`] for per-cell
//! callbacks during rule evaluation).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod traits;

pub use error::{ConfigError, ExchangeError, ExportError, WorkerError};
pub use id::{Generation, Rank, Tag};
pub use traits::{cell_color, CellObserver, FrameSink, Transport, ALIVE_RGB, DEAD_RGB};
