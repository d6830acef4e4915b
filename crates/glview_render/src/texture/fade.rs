//! Fade transitions over any [`Drawable`].

use glview_core::anim::AlphaAnimation;
use glview_core::Rect;

use super::Drawable;
use crate::canvas::{Canvas, SaveFlags};
use crate::color::Color;

/// Default fade length.
pub const DEFAULT_FADE_MS: u64 = 180;

/// Direction of a fade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeMode {
    /// Starts as a flat color and cross-fades into the content.
    In {
        /// Color shown at the start.
        color: Color,
    },
    /// Starts as the content and fades to fully transparent.
    Out,
}

/// A drawable wrapped in a timed fade.
///
/// The fade is driven by [`update`](Self::update) with the frame timestamp.
/// Once it finishes, a fade-in draws the content as is and a fade-out draws
/// nothing.
#[derive(Debug)]
pub struct FadeTexture<D> {
    inner: D,
    mode: FadeMode,
    ratio: AlphaAnimation,
}

impl<D: Drawable> FadeTexture<D> {
    /// Fades `inner` in from `color`.
    #[must_use]
    pub fn fade_in(inner: D, color: Color) -> Self {
        Self::new(inner, FadeMode::In { color })
    }

    /// Fades `inner` out.
    #[must_use]
    pub fn fade_out(inner: D) -> Self {
        Self::new(inner, FadeMode::Out)
    }

    fn new(inner: D, mode: FadeMode) -> Self {
        let mut ratio = AlphaAnimation::alpha(1.0, 0.0, DEFAULT_FADE_MS);
        ratio.start();
        Self { inner, mode, ratio }
    }

    /// Changes the fade length.
    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.ratio.set_duration(duration_ms);
        self
    }

    /// Pins the fade start to a frame timestamp.
    pub fn set_start_time(&mut self, time_ms: u64) {
        if self.ratio.is_running() {
            self.ratio.set_start_time(time_ms);
        }
    }

    /// Advances the fade. Returns true while it is still animating.
    pub fn update(&mut self, now_ms: u64) -> bool {
        self.ratio.calculate(now_ms)
    }

    /// Returns true until the fade has run its course.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.ratio.is_running()
    }

    /// Remaining share of the start state, 1 at the start and 0 at the end.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.is_animating() {
            self.ratio.value()
        } else {
            0.0
        }
    }

    /// Fade direction.
    #[must_use]
    pub fn mode(&self) -> FadeMode {
        self.mode
    }

    /// The wrapped drawable.
    #[must_use]
    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// The wrapped drawable, mutably.
    pub fn inner_mut(&mut self) -> &mut D {
        &mut self.inner
    }

    /// Unwraps the drawable.
    #[must_use]
    pub fn into_inner(self) -> D {
        self.inner
    }

    fn draw_with(
        &mut self,
        canvas: &mut dyn Canvas,
        draw: impl FnOnce(&mut D, &mut dyn Canvas, Option<Color>, f32),
    ) {
        let ratio = self.ratio();
        match self.mode {
            FadeMode::In { color } if self.is_animating() => {
                draw(&mut self.inner, canvas, Some(color), ratio);
            }
            FadeMode::In { .. } => draw(&mut self.inner, canvas, None, 0.0),
            FadeMode::Out if self.is_animating() => {
                canvas.save_with(SaveFlags::ALPHA);
                canvas.multiply_alpha(ratio);
                draw(&mut self.inner, &mut *canvas, None, 0.0);
                canvas.restore();
            }
            FadeMode::Out => {}
        }
    }
}

impl<D: Drawable> Drawable for FadeTexture<D> {
    fn width(&self) -> u32 {
        self.inner.width()
    }

    fn height(&self) -> u32 {
        self.inner.height()
    }

    fn is_opaque(&self) -> bool {
        match self.mode {
            FadeMode::In { color } => self.inner.is_opaque() && color.a >= 1.0,
            FadeMode::Out => false,
        }
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32, height: f32) {
        self.draw_with(canvas, |inner, canvas, mix, ratio| match mix {
            Some(color) => inner.draw_mixed(canvas, color, ratio, x, y, width, height),
            None => inner.draw(canvas, x, y, width, height),
        });
    }

    fn draw_region(&mut self, canvas: &mut dyn Canvas, src: &Rect, dst: &Rect) {
        // Region draws have no cross-fade path, so a fade-in shows the
        // content directly.
        self.draw_with(canvas, |inner, canvas, _, _| inner.draw_region(canvas, src, dst));
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
        self.inner.draw_mixed(canvas, color, ratio, x, y, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, SoftwareCanvas};
    use crate::pixels::{PixelBuffer, Rgba};
    use crate::texture::BasicTexture;
    use std::sync::Arc;

    fn texture() -> BasicTexture {
        BasicTexture::from_pixels(Arc::new(PixelBuffer::filled(2, 2, Rgba::new(0, 255, 0, 255))))
    }

    #[test]
    fn test_fade_in_uses_mixed_draw_then_plain() {
        let mut canvas = SoftwareCanvas::new(4, 4).recording();
        let mut fade = FadeTexture::fade_in(texture(), Color::BLACK).with_duration(100);

        assert!(fade.update(0));
        fade.draw(&mut canvas, 0.0, 0.0, 4.0, 4.0);
        assert!(fade.update(50));
        fade.draw(&mut canvas, 0.0, 0.0, 4.0, 4.0);
        assert!(!fade.update(100));
        fade.draw(&mut canvas, 0.0, 0.0, 4.0, 4.0);

        let ops = canvas.take_ops();
        assert!(matches!(ops[0], DrawOp::Mixed { ratio, .. } if (ratio - 1.0).abs() < 1e-6));
        assert!(matches!(ops[1], DrawOp::Mixed { ratio, .. } if (ratio - 0.5).abs() < 1e-6));
        assert!(matches!(ops[2], DrawOp::Texture { .. }));
    }

    #[test]
    fn test_fade_out_scales_alpha_and_restores() {
        let mut canvas = SoftwareCanvas::new(4, 4).recording();
        let mut fade = FadeTexture::fade_out(texture()).with_duration(100);

        fade.update(0);
        fade.update(25);
        fade.draw(&mut canvas, 0.0, 0.0, 4.0, 4.0);
        assert!((canvas.alpha() - 1.0).abs() < f32::EPSILON);
        assert_eq!(canvas.state().depth(), 0);

        fade.update(100);
        fade.draw(&mut canvas, 0.0, 0.0, 4.0, 4.0);

        let ops = canvas.take_ops();
        assert_eq!(ops.len(), 1);
        assert!(matches!(ops[0], DrawOp::Texture { alpha, .. } if (alpha - 0.75).abs() < 1e-6));
    }

    #[test]
    fn test_start_time_can_be_pinned() {
        let mut fade = FadeTexture::fade_out(texture()).with_duration(100);
        fade.set_start_time(1_000);
        assert!(fade.update(1_050));
        assert!((fade.ratio() - 0.5).abs() < 1e-6);
    }
}
