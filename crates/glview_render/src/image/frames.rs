//! In-memory image source.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::ImageSource;
use crate::error::{ImageError, ImageResult};
use crate::pixels::PixelBuffer;

/// One decoded frame and how long it stays on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Pixels of the frame.
    pub pixels: PixelBuffer,
    /// Display time (ms).
    pub delay_ms: u64,
}

impl Frame {
    /// Creates a frame.
    #[must_use]
    pub fn new(pixels: PixelBuffer, delay_ms: u64) -> Self {
        Self { pixels, delay_ms }
    }
}

/// Produces the full frame list of a deferred image.
pub type FrameDecoder = Box<dyn FnOnce() -> ImageResult<Vec<Frame>> + Send>;

struct Frames {
    frames: Vec<Frame>,
    current: usize,
    decoder: Option<FrameDecoder>,
}

/// A frame list held in memory.
///
/// Three shapes are supported: a still image, an eagerly decoded
/// animation, and a deferred animation that shows its first frame until
/// [`complete`](ImageSource::complete) runs the decoder.
pub struct FrameSequence {
    width: u32,
    height: u32,
    opaque: bool,
    frames: Mutex<Frames>,
    completed: AtomicBool,
    recycled: AtomicBool,
    releases: AtomicUsize,
    advances: AtomicUsize,
    #[cfg(test)]
    failing_advances: AtomicUsize,
}

impl std::fmt::Debug for FrameSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameSequence")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frame_count", &self.frame_count())
            .field("completed", &self.is_completed())
            .field("recycled", &self.is_recycled())
            .finish_non_exhaustive()
    }
}

impl FrameSequence {
    /// A single complete frame.
    #[must_use]
    pub fn still(pixels: PixelBuffer) -> Self {
        Self::build(vec![Frame::new(pixels, 0)], None)
    }

    /// A fully decoded animation.
    ///
    /// # Panics
    ///
    /// Panics if `frames` is empty or the frames differ in size.
    #[must_use]
    pub fn animated(frames: Vec<Frame>) -> Self {
        Self::build(frames, None)
    }

    /// An animation decoded on demand. `first` is shown until the decoder
    /// has run.
    #[must_use]
    pub fn deferred(first: Frame, decoder: FrameDecoder) -> Self {
        Self::build(vec![first], Some(decoder))
    }

    fn build(frames: Vec<Frame>, decoder: Option<FrameDecoder>) -> Self {
        assert!(!frames.is_empty(), "an image needs at least one frame");
        let (width, height) = (frames[0].pixels.width(), frames[0].pixels.height());
        assert!(
            frames
                .iter()
                .all(|frame| frame.pixels.width() == width && frame.pixels.height() == height),
            "all frames must be {width}x{height}"
        );
        let opaque = frames.iter().all(|frame| frame.pixels.is_opaque());
        let completed = decoder.is_none();
        Self {
            width,
            height,
            opaque,
            frames: Mutex::new(Frames {
                frames,
                current: 0,
                decoder,
            }),
            completed: AtomicBool::new(completed),
            recycled: AtomicBool::new(false),
            releases: AtomicUsize::new(0),
            advances: AtomicUsize::new(0),
            #[cfg(test)]
            failing_advances: AtomicUsize::new(0),
        }
    }

    /// Makes the next `count` advances fail.
    #[cfg(test)]
    pub(crate) fn fail_next_advances(&self, count: usize) {
        self.failing_advances.store(count, Ordering::Release);
    }

    /// Drops the pixels from outside the streaming engine.
    pub fn recycle(&self) {
        self.recycled.store(true, Ordering::Release);
        self.frames.lock().frames.clear();
    }

    /// Index of the current frame.
    #[must_use]
    pub fn current_frame(&self) -> usize {
        self.frames.lock().current
    }

    /// Number of `release` calls so far.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::Acquire)
    }

    /// Number of successful advances so far.
    #[must_use]
    pub fn advance_count(&self) -> usize {
        self.advances.load(Ordering::Acquire)
    }
}

impl ImageSource for FrameSequence {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_opaque(&self) -> bool {
        self.opaque
    }

    fn frame_count(&self) -> usize {
        self.frames.lock().frames.len()
    }

    fn delay_ms(&self) -> u64 {
        let frames = self.frames.lock();
        frames
            .frames
            .get(frames.current)
            .map_or(0, |frame| frame.delay_ms)
    }

    fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn complete(&self) -> ImageResult<()> {
        if self.is_recycled() {
            return Err(ImageError::Recycled);
        }
        let Some(decoder) = self.frames.lock().decoder.take() else {
            return Ok(());
        };
        // Decode outside the lock so tile reads keep going.
        let decoded = decoder();
        self.completed.store(true, Ordering::Release);
        let decoded = decoded?;
        let fits = decoded.iter().all(|frame| {
            frame.pixels.width() == self.width && frame.pixels.height() == self.height
        });
        if decoded.is_empty() || !fits {
            return Err(ImageError::Decode(format!(
                "decoder produced {} frames not matching {}x{}",
                decoded.len(),
                self.width,
                self.height
            )));
        }
        let mut frames = self.frames.lock();
        if !self.is_recycled() {
            frames.frames = decoded;
            frames.current = 0;
        }
        Ok(())
    }

    fn advance(&self) -> ImageResult<()> {
        #[cfg(test)]
        if self
            .failing_advances
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(ImageError::Decode("frame advance failed".into()));
        }
        let mut frames = self.frames.lock();
        if frames.frames.is_empty() {
            return Err(ImageError::Recycled);
        }
        frames.current = (frames.current + 1) % frames.frames.len();
        self.advances.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::Acquire)
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::AcqRel);
        self.recycle();
    }

    fn read_region(&self, x: i32, y: i32, width: u32, height: u32) -> ImageResult<PixelBuffer> {
        let frames = self.frames.lock();
        let frame = frames
            .frames
            .get(frames.current)
            .ok_or(ImageError::Recycled)?;
        Ok(frame.pixels.region_clamped(x, y, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::Rgba;

    fn solid(value: u8) -> PixelBuffer {
        PixelBuffer::filled(4, 4, Rgba::new(value, value, value, 255))
    }

    #[test]
    fn test_still_is_complete_single_frame() {
        let image = FrameSequence::still(solid(1));
        assert!(image.is_completed());
        assert_eq!(image.frame_count(), 1);
        assert!(image.is_opaque());
    }

    #[test]
    fn test_advance_wraps() {
        let image =
            FrameSequence::animated(vec![Frame::new(solid(1), 10), Frame::new(solid(2), 20)]);
        assert_eq!(image.delay_ms(), 10);
        image.advance().unwrap();
        assert_eq!(image.delay_ms(), 20);
        image.advance().unwrap();
        assert_eq!(image.current_frame(), 0);
        assert_eq!(image.advance_count(), 2);
    }

    #[test]
    fn test_deferred_decodes_on_complete() {
        let image = FrameSequence::deferred(
            Frame::new(solid(1), 0),
            Box::new(|| Ok(vec![Frame::new(solid(5), 30), Frame::new(solid(6), 30)])),
        );
        assert!(!image.is_completed());
        assert_eq!(image.frame_count(), 1);
        image.complete().unwrap();
        assert!(image.is_completed());
        assert_eq!(image.frame_count(), 2);
        assert_eq!(image.read_region(0, 0, 1, 1).unwrap().get(0, 0).r, 5);
    }

    #[test]
    fn test_failed_decode_keeps_first_frame() {
        let image = FrameSequence::deferred(
            Frame::new(solid(1), 0),
            Box::new(|| Err(ImageError::Decode("truncated".into()))),
        );
        assert!(image.complete().is_err());
        assert!(image.is_completed());
        assert_eq!(image.frame_count(), 1);
    }

    #[test]
    fn test_injected_advance_failures() {
        let image =
            FrameSequence::animated(vec![Frame::new(solid(1), 10), Frame::new(solid(2), 10)]);
        image.fail_next_advances(1);
        assert!(image.advance().is_err());
        assert!(image.advance().is_ok());
        assert_eq!(image.current_frame(), 1);
    }

    #[test]
    fn test_release_drops_pixels() {
        let image = FrameSequence::still(solid(1));
        image.release();
        assert!(image.is_recycled());
        assert_eq!(image.release_count(), 1);
        assert_eq!(image.read_region(0, 0, 1, 1), Err(ImageError::Recycled));
    }
}
