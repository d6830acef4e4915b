//! Decoded image abstraction consumed by the streaming engine.

use crate::error::ImageResult;
use crate::pixels::PixelBuffer;

/// A decoded, possibly animated, image.
///
/// Implementations are shared between the render thread (reading tile
/// regions) and one animation worker (advancing frames), so every method
/// takes `&self`. The streaming engine never calls `advance`/`complete`
/// and `release` at the same time.
pub trait ImageSource: Send + Sync {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Whether every pixel is opaque.
    fn is_opaque(&self) -> bool;

    /// Number of frames known so far.
    fn frame_count(&self) -> usize;

    /// Display time of the current frame (ms).
    fn delay_ms(&self) -> u64;

    /// Whether every frame is decoded.
    fn is_completed(&self) -> bool;

    /// Decodes every remaining frame. Blocking and expensive.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error. The image keeps the frames it had.
    fn complete(&self) -> ImageResult<()>;

    /// Moves to the next frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the next frame could not be produced. The
    /// current frame stays.
    fn advance(&self) -> ImageResult<()>;

    /// Whether the pixels are gone.
    fn is_recycled(&self) -> bool;

    /// Drops the decoded pixels. Called at most once per texture.
    fn release(&self);

    /// Reads a region of the current frame.
    ///
    /// The region may extend past the image; those pixels repeat the
    /// nearest edge.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::Recycled`](crate::error::ImageError::Recycled)
    /// once the pixels are gone.
    fn read_region(&self, x: i32, y: i32, width: u32, height: u32) -> ImageResult<PixelBuffer>;
}
