//! Stitches bands into whole frames and writes them as BMP files.

use std::fs;
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use image::{ImageFormat, Rgb, RgbImage};
use indexmap::IndexMap;
use lifegrid_core::{ConfigError, ExportError, Generation};
use tracing::{debug, warn};

use crate::band::FrameBand;

/// Output pixels per cell side.
pub const DEFAULT_SCALE: u32 = 4;

/// What a [`FrameAssembler`] wrote.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Files written, in completion order.
    pub paths: Vec<PathBuf>,
    /// Frames written before every cell had been painted.
    pub incomplete: Vec<Generation>,
}

#[derive(Debug)]
struct PendingFrame {
    width: usize,
    height: usize,
    covered: Vec<bool>,
    remaining: usize,
    image: RgbImage,
}

impl PendingFrame {
    fn new(width: usize, height: usize, scale: u32) -> Result<Self, ExportError> {
        let side = |cells: usize| {
            u32::try_from(cells)
                .ok()
                .and_then(|c| c.checked_mul(scale))
                .ok_or_else(|| ExportError::Io {
                    reason: format!("{width}x{height} frame at scale {scale} is too large"),
                })
        };
        Ok(Self {
            width,
            height,
            covered: vec![false; width * height],
            remaining: width * height,
            image: RgbImage::new(side(width)?, side(height)?),
        })
    }

    fn paint(&mut self, x: usize, y: usize, rgb: [u8; 3], scale: u32) -> Result<(), ExportError> {
        if x >= self.width || y >= self.height {
            return Err(ExportError::PixelOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let i = y * self.width + x;
        if !self.covered[i] {
            self.covered[i] = true;
            self.remaining -= 1;
        }
        // Bounds were checked against width/height, which fit in u32.
        let (px, py) = (x as u32 * scale, y as u32 * scale);
        for dy in 0..scale {
            for dx in 0..scale {
                self.image.put_pixel(px + dx, py + dy, Rgb(rgb));
            }
        }
        Ok(())
    }
}

/// Collects [`FrameBand`]s and writes each frame once it is complete.
///
/// Frames may complete in any order; bands for several frames can be in
/// flight at once because workers only synchronise with neighbours.
#[derive(Debug)]
pub struct FrameAssembler {
    out_dir: PathBuf,
    scale: u32,
    pending: IndexMap<Generation, PendingFrame>,
    summary: ExportSummary,
}

impl FrameAssembler {
    /// Write frames into `out_dir`, `scale` pixels per cell side.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroScale`] if `scale` is zero. The
    /// directory is only created when the first frame is written.
    pub fn new(out_dir: impl Into<PathBuf>, scale: u32) -> Result<Self, ConfigError> {
        if scale == 0 {
            return Err(ConfigError::ZeroScale);
        }
        Ok(Self {
            out_dir: out_dir.into(),
            scale,
            pending: IndexMap::new(),
            summary: ExportSummary::default(),
        })
    }

    /// Where `frame` is written.
    pub fn frame_path(&self, frame: Generation) -> PathBuf {
        self.out_dir.join(format!("frame{}.bmp", frame.0))
    }

    /// Frames with at least one band but not yet written.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }

    /// Paint `band` into its frame, writing the frame if it is now
    /// complete. Returns the path written, if any.
    pub fn accept(&mut self, band: FrameBand) -> Result<Option<PathBuf>, ExportError> {
        let scale = self.scale;
        let frame = match self.pending.entry(band.frame) {
            indexmap::map::Entry::Occupied(e) => e.into_mut(),
            indexmap::map::Entry::Vacant(e) => {
                e.insert(PendingFrame::new(band.width, band.height, scale)?)
            }
        };
        for (x, y, rgb) in band.pixels {
            frame.paint(x, y, rgb, scale)?;
        }
        if frame.remaining > 0 {
            return Ok(None);
        }
        let Some(done) = self.pending.shift_remove(&band.frame) else {
            return Ok(None);
        };
        self.write(band.frame, &done.image).map(Some)
    }

    /// Drain `rx` until every sender is gone, then [`finish`](Self::finish).
    pub fn collect(mut self, rx: &Receiver<FrameBand>) -> Result<ExportSummary, ExportError> {
        for band in rx.iter() {
            self.accept(band)?;
        }
        self.finish()
    }

    /// Write whatever is still pending, unpainted cells left black.
    pub fn finish(mut self) -> Result<ExportSummary, ExportError> {
        let pending = std::mem::take(&mut self.pending);
        for (frame, partial) in pending {
            warn!(
                %frame,
                missing = partial.remaining,
                "writing incomplete frame"
            );
            self.write(frame, &partial.image)?;
            self.summary.incomplete.push(frame);
        }
        Ok(self.summary)
    }

    fn write(&mut self, frame: Generation, image: &RgbImage) -> Result<PathBuf, ExportError> {
        ensure_dir(&self.out_dir)?;
        let path = self.frame_path(frame);
        image
            .save_with_format(&path, ImageFormat::Bmp)
            .map_err(|e| ExportError::Io {
                reason: format!("{}: {e}", path.display()),
            })?;
        debug!(%frame, path = %path.display(), "frame written");
        self.summary.paths.push(path.clone());
        Ok(path)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), ExportError> {
    fs::create_dir_all(dir).map_err(|e| ExportError::Io {
        reason: format!("{}: {e}", dir.display()),
    })
}
