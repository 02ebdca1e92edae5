//! Domain decomposition and halo exchange for lifegrid workers.
//!
//! A [`Decomposition`] splits a square frame into per-rank tiles and
//! hands each rank the [`HaloExchange`] protocol that keeps its halo
//! margin current:
//!
//! - [`RowStrips`] / [`StripExchange`]: horizontal strips, one row
//!   exchanged with the strip above and below.
//! - [`BlockGrid`] / [`BlockExchange`]: a `k x k` grid of blocks. Columns
//!   travel east along each block row inside a growing [`ColumnBundle`]
//!   and single columns travel back west; full-width rows (corners
//!   included) then travel between block rows. No diagonal links.
//!
//! A [`Worker`] ties one rank's [`Grid`](lifegrid_tile::Grid), protocol and
//! [`Transport`](lifegrid_core::Transport) together and runs generations.
//! [`Mesh`] builds an in-process transport on crossbeam channels, one
//! channel per ordered pair of ranks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blocks;
pub mod bundle;
pub mod decomposition;
pub mod exchange;
pub mod mesh;
pub mod metrics;
pub mod strips;
pub mod worker;

pub use blocks::{BlockExchange, BlockGrid};
pub use bundle::ColumnBundle;
pub use decomposition::{Decomposition, Layout};
pub use exchange::{ExportFrame, HaloExchange};
pub use mesh::{Mesh, MeshEndpoint};
pub use metrics::GenerationMetrics;
pub use strips::{RowStrips, StripExchange};
pub use worker::Worker;
