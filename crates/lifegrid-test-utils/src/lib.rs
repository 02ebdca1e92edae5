//! Test fixtures and mock collaborators for lifegrid development.
//!
//! Provides a [`ScriptedTransport`] that replays pre-queued messages and
//! records what is sent, a [`RecordingSink`] that keeps every painted
//! pixel, and (in [`fixtures`]) a naive whole-frame reference stepper.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{assemble, reference_run, reference_step, render};

use std::collections::{BTreeMap, VecDeque};

use lifegrid_core::{
    ExchangeError, ExportError, FrameSink, Generation, Rank, Tag, Transport, ALIVE_RGB,
};

/// A message as queued or recorded by [`ScriptedTransport`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub peer: Rank,
    pub tag: Tag,
    pub payload: Vec<bool>,
}

/// [`Transport`] that serves receives from a script and never blocks.
///
/// `receive(source, ..)` takes the oldest queued message from `source`;
/// if there is none the peer counts as disconnected. Tag and length are
/// checked the same way the channel mesh checks them.
#[derive(Debug)]
pub struct ScriptedTransport {
    rank: Rank,
    size: usize,
    incoming: VecDeque<Message>,
    sent: Vec<Message>,
}

impl ScriptedTransport {
    pub fn new(rank: Rank, size: usize) -> Self {
        Self {
            rank,
            size,
            incoming: VecDeque::new(),
            sent: Vec::new(),
        }
    }

    /// Queue a message that will appear to come from `peer`.
    pub fn push_incoming(&mut self, peer: Rank, tag: Tag, payload: Vec<bool>) {
        self.incoming.push_back(Message { peer, tag, payload });
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> &[Message] {
        &self.sent
    }

    /// Queued messages not yet received.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }

    fn check_peer(&self, peer: Rank) -> Result<(), ExchangeError> {
        if peer == self.rank || peer.0 >= self.size {
            return Err(ExchangeError::UnknownPeer { peer });
        }
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, dest: Rank, tag: Tag, payload: &[bool]) -> Result<(), ExchangeError> {
        self.check_peer(dest)?;
        self.sent.push(Message {
            peer: dest,
            tag,
            payload: payload.to_vec(),
        });
        Ok(())
    }

    fn receive(&mut self, source: Rank, tag: Tag, buf: &mut [bool]) -> Result<(), ExchangeError> {
        self.check_peer(source)?;
        let pos = self
            .incoming
            .iter()
            .position(|m| m.peer == source)
            .ok_or(ExchangeError::Disconnected { peer: source })?;
        let Some(msg) = self.incoming.remove(pos) else {
            return Err(ExchangeError::Disconnected { peer: source });
        };
        if msg.tag != tag {
            return Err(ExchangeError::TagMismatch {
                peer: source,
                expected: tag,
                actual: msg.tag,
            });
        }
        if msg.payload.len() != buf.len() {
            return Err(ExchangeError::SizeMismatch {
                peer: source,
                tag,
                expected: buf.len(),
                actual: msg.payload.len(),
            });
        }
        buf.copy_from_slice(&msg.payload);
        Ok(())
    }
}

/// Pixels of one frame keyed by global `(x, y)`; `true` means painted
/// with the live-cell colour.
pub type PixelMap = BTreeMap<(usize, usize), bool>;

/// [`FrameSink`] that keeps every flushed pixel in memory.
///
/// Several workers may flush into the same frame number; their pixels
/// are merged. Enforces the begin/set/flush order and pixel bounds.
#[derive(Debug, Default)]
pub struct RecordingSink {
    open: Option<(usize, usize, PixelMap)>,
    frames: BTreeMap<Generation, PixelMap>,
    sizes: BTreeMap<Generation, (usize, usize)>,
}

impl RecordingSink {
    /// Pixels flushed for `frame`.
    pub fn frame(&self, frame: Generation) -> Option<&PixelMap> {
        self.frames.get(&frame)
    }

    /// Announced `(width, height)` of `frame`.
    pub fn frame_size(&self, frame: Generation) -> Option<(usize, usize)> {
        self.sizes.get(&frame).copied()
    }

    /// Frame numbers flushed so far, ascending.
    pub fn frame_numbers(&self) -> Vec<Generation> {
        self.frames.keys().copied().collect()
    }

    /// `frame` as a row-major cell vector, if every pixel was painted.
    pub fn cells(&self, frame: Generation) -> Option<Vec<bool>> {
        let (w, h) = self.frame_size(frame)?;
        let pixels = self.frame(frame)?;
        if pixels.len() != w * h {
            return None;
        }
        let mut out = vec![false; w * h];
        for (&(x, y), &alive) in pixels {
            out[y * w + x] = alive;
        }
        Some(out)
    }
}

impl FrameSink for RecordingSink {
    fn begin_frame(&mut self, width: usize, height: usize) -> Result<(), ExportError> {
        self.open = Some((width, height, PixelMap::new()));
        Ok(())
    }

    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) -> Result<(), ExportError> {
        let (width, height, pixels) = self.open.as_mut().ok_or(ExportError::NoOpenFrame)?;
        if x >= *width || y >= *height {
            return Err(ExportError::PixelOutOfBounds {
                x,
                y,
                width: *width,
                height: *height,
            });
        }
        pixels.insert((x, y), [r, g, b] == ALIVE_RGB);
        Ok(())
    }

    fn flush_frame(&mut self, frame: Generation) -> Result<(), ExportError> {
        let (width, height, pixels) = self.open.take().ok_or(ExportError::NoOpenFrame)?;
        self.sizes.insert(frame, (width, height));
        self.frames.entry(frame).or_default().extend(pixels);
        Ok(())
    }
}
