//! Frame export for lifegrid.
//!
//! Workers paint into a [`BandSink`], which ships each flushed region as
//! a [`FrameBand`] over a crossbeam channel. A single
//! [`FrameAssembler`] on the other end stitches bands into whole frames
//! and writes each one as `frame{N}.bmp` once every cell is covered,
//! scaling every cell to a square of pixels.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod assembler;
pub mod band;

pub use assembler::{ExportSummary, FrameAssembler, DEFAULT_SCALE};
pub use band::{band_channel, BandSink, FrameBand};
