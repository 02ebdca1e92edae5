//! A [`FrameSink`] that forwards painted regions over a channel.

use crossbeam_channel::{unbounded, Receiver, Sender};
use lifegrid_core::{ExportError, FrameSink, Generation};

/// The pixels one worker painted into one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBand {
    /// Frame number.
    pub frame: Generation,
    /// Frame width announced by `begin_frame`.
    pub width: usize,
    /// Frame height announced by `begin_frame`.
    pub height: usize,
    /// Painted pixels as `(x, y, rgb)` in global coordinates.
    pub pixels: Vec<(usize, usize, [u8; 3])>,
}

/// An unbounded channel for bands. Workers never wait on the writer.
pub fn band_channel() -> (Sender<FrameBand>, Receiver<FrameBand>) {
    unbounded()
}

/// Buffers the pixels of the open frame and sends them on flush.
#[derive(Debug)]
pub struct BandSink {
    tx: Sender<FrameBand>,
    open: Option<FrameBand>,
}

impl BandSink {
    /// A sink sending to `tx`.
    pub fn new(tx: Sender<FrameBand>) -> Self {
        Self { tx, open: None }
    }
}

impl FrameSink for BandSink {
    fn begin_frame(&mut self, width: usize, height: usize) -> Result<(), ExportError> {
        self.open = Some(FrameBand {
            frame: Generation::default(),
            width,
            height,
            pixels: Vec::new(),
        });
        Ok(())
    }

    fn set_pixel(&mut self, x: usize, y: usize, r: u8, g: u8, b: u8) -> Result<(), ExportError> {
        let band = self.open.as_mut().ok_or(ExportError::NoOpenFrame)?;
        if x >= band.width || y >= band.height {
            return Err(ExportError::PixelOutOfBounds {
                x,
                y,
                width: band.width,
                height: band.height,
            });
        }
        band.pixels.push((x, y, [r, g, b]));
        Ok(())
    }

    fn flush_frame(&mut self, frame: Generation) -> Result<(), ExportError> {
        let mut band = self.open.take().ok_or(ExportError::NoOpenFrame)?;
        band.frame = frame;
        self.tx.send(band).map_err(|_| ExportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_sends_painted_pixels() {
        let (tx, rx) = band_channel();
        let mut sink = BandSink::new(tx);
        sink.begin_frame(3, 3).unwrap();
        sink.set_pixel(2, 1, 255, 255, 255).unwrap();
        sink.flush_frame(Generation(4)).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            FrameBand {
                frame: Generation(4),
                width: 3,
                height: 3,
                pixels: vec![(2, 1, [255, 255, 255])],
            }
        );
    }

    #[test]
    fn pixels_need_an_open_frame() {
        let (tx, _rx) = band_channel();
        let mut sink = BandSink::new(tx);
        assert_eq!(sink.set_pixel(0, 0, 0, 0, 0), Err(ExportError::NoOpenFrame));
        sink.begin_frame(1, 1).unwrap();
        sink.flush_frame(Generation(0)).unwrap();
        assert_eq!(sink.flush_frame(Generation(1)), Err(ExportError::NoOpenFrame));
    }

    #[test]
    fn out_of_bounds_pixel_is_rejected() {
        let (tx, _rx) = band_channel();
        let mut sink = BandSink::new(tx);
        sink.begin_frame(2, 2).unwrap();
        assert_eq!(
            sink.set_pixel(1, 2, 0, 0, 0),
            Err(ExportError::PixelOutOfBounds {
                x: 1,
                y: 2,
                width: 2,
                height: 2
            })
        );
    }

    #[test]
    fn closed_writer_is_reported() {
        let (tx, rx) = band_channel();
        drop(rx);
        let mut sink = BandSink::new(tx);
        sink.begin_frame(1, 1).unwrap();
        assert_eq!(sink.flush_frame(Generation(0)), Err(ExportError::Closed));
    }
}
