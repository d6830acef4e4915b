//! # Textures
//!
//! - [`BasicTexture`]: one texture object with a closed set of content
//!   sources (bitmap, raw storage, image tile)
//! - [`FadeTexture`]: fade-in from a color or fade-out of any [`Drawable`]
//!
//! Tiled image textures live in [`crate::image`].

mod basic;
mod fade;

use glview_core::Rect;

use crate::canvas::Canvas;
use crate::color::Color;

pub use basic::{BasicTexture, LoadState, TextureKind};
pub use fade::{FadeMode, FadeTexture, DEFAULT_FADE_MS};

/// Anything that can draw itself through a [`Canvas`].
///
/// Drawing binds (and if needed uploads) lazily, so every method takes the
/// render thread's canvas.
pub trait Drawable {
    /// Content width in pixels.
    fn width(&self) -> u32;

    /// Content height in pixels.
    fn height(&self) -> u32;

    /// Whether the content has no transparent pixels.
    fn is_opaque(&self) -> bool;

    /// Draws the whole content into a rectangle.
    fn draw(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32, height: f32);

    /// Draws the `src` part of the content into `dst`.
    fn draw_region(&mut self, canvas: &mut dyn Canvas, src: &Rect, dst: &Rect);

    /// Draws the whole content cross-faded with `color` by `ratio`.
    #[allow(clippy::too_many_arguments)]
    fn draw_mixed(
        &mut self,
        canvas: &mut dyn Canvas,
        color: Color,
        ratio: f32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    );
}

impl Drawable for BasicTexture {
    fn width(&self) -> u32 {
        BasicTexture::width(self)
    }

    fn height(&self) -> u32 {
        BasicTexture::height(self)
    }

    fn is_opaque(&self) -> bool {
        BasicTexture::is_opaque(self)
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32, height: f32) {
        canvas.draw_texture(self, x, y, width, height);
    }

    fn draw_region(&mut self, canvas: &mut dyn Canvas, src: &Rect, dst: &Rect) {
        canvas.draw_texture_region(self, src, dst);
    }

    fn draw_mixed(
        &mut self,
        canvas: &mut dyn Canvas,
        color: Color,
        ratio: f32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        canvas.draw_mixed(self, color, ratio, x, y, width, height);
    }
}
