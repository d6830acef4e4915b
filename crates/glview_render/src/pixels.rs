//! # Pixel Buffers
//!
//! Tightly packed RGBA8 images. The pixel type is `Pod`, so raw byte
//! buffers from a decoder are viewed in place instead of copied per channel.

use bytemuck::{Pod, Zeroable};

use crate::error::{ImageError, ImageResult};

/// One RGBA8 pixel (straight alpha).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    /// Creates a pixel.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// A width x height grid of pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<Rgba>,
}

impl PixelBuffer {
    /// Creates a buffer filled with one pixel value.
    #[must_use]
    pub fn filled(width: u32, height: u32, px: Rgba) -> Self {
        Self {
            width,
            height,
            data: vec![px; width as usize * height as usize],
        }
    }

    /// Creates a transparent buffer.
    #[must_use]
    pub fn transparent(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Creates a buffer by evaluating `f(x, y)` for every pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgba) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wraps packed RGBA8 bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::InvalidDimensions`] if `bytes` is not exactly
    /// `width * height * 4` long.
    pub fn from_rgba_bytes(width: u32, height: u32, bytes: &[u8]) -> ImageResult<Self> {
        let expected = width as usize * height as usize * 4;
        let invalid = || ImageError::InvalidDimensions {
            width,
            height,
            len: bytes.len(),
        };
        if bytes.len() != expected {
            return Err(invalid());
        }
        let pixels: &[Rgba] = bytemuck::try_cast_slice(bytes).map_err(|_| invalid())?;
        Ok(Self {
            width,
            height,
            data: pixels.to_vec(),
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixels, row-major.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.data
    }

    /// Pixels as raw bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Reads one pixel. Coordinates must be in range.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Rgba {
        self.data[y as usize * self.width as usize + x as usize]
    }

    /// Writes one pixel. Coordinates must be in range.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, px: Rgba) {
        let index = y as usize * self.width as usize + x as usize;
        self.data[index] = px;
    }

    /// Fills every pixel.
    pub fn fill(&mut self, px: Rgba) {
        self.data.fill(px);
    }

    /// Copies `src` into this buffer at `(x, y)`, clipped to the bounds.
    pub fn blit(&mut self, x: u32, y: u32, src: &Self) {
        if x >= self.width || y >= self.height {
            return;
        }
        let w = src.width.min(self.width - x) as usize;
        let h = src.height.min(self.height - y);
        for row in 0..h {
            let dst_start = (y + row) as usize * self.width as usize + x as usize;
            let src_start = row as usize * src.width as usize;
            self.data[dst_start..dst_start + w]
                .copy_from_slice(&src.data[src_start..src_start + w]);
        }
    }

    /// Reads a region that may extend past the edges.
    ///
    /// Out-of-range coordinates are clamped to the nearest edge pixel, which
    /// is what tile borders need at the image boundary. An empty buffer
    /// yields a transparent region.
    #[must_use]
    pub fn region_clamped(&self, x: i32, y: i32, width: u32, height: u32) -> Self {
        if self.width == 0 || self.height == 0 {
            return Self::transparent(width, height);
        }
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;
        Self::from_fn(width, height, |dx, dy| {
            let sx = (x + dx as i32).clamp(0, max_x);
            let sy = (y + dy as i32).clamp(0, max_y);
            self.get(sx as u32, sy as u32)
        })
    }

    /// Returns true if every pixel has full alpha.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.data.iter().all(|px| px.a == u8::MAX)
    }
}
