//! # Render Error Types
//!
//! Failures reported by image sources. Context loss is not an error: a new
//! canvas simply carries a new context id.

use thiserror::Error;

/// Errors that can occur while reading or decoding an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The decoder failed on a frame.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The image was released and its pixels are gone.
    #[error("image has been recycled")]
    Recycled,

    /// Width, height or buffer length don't match.
    #[error("invalid dimensions {width}x{height} for {len} bytes")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
        /// Bytes supplied.
        len: usize,
    },
}

/// Result type for image operations.
pub type ImageResult<T> = Result<T, ImageError>;
