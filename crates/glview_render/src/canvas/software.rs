//! # Software Canvas
//!
//! A CPU implementation of [`Canvas`] over an RGBA8 framebuffer.
//!
//! Every primitive is rasterized the same way: the local shape bounds are
//! mapped to device space, and each covered device pixel center is mapped
//! back through the inverse matrix and tested against the shape. Texture
//! sampling is nearest-neighbour, blending is source-over.

use std::collections::HashMap;

use glview_core::{Matrix, Rect};

use super::{
    BufferId, Canvas, CanvasStats, ContextId, ResourceRecycler, StateStack, TextureId,
    UploadBudget,
};
use crate::color::Color;
use crate::paint::Paint;
use crate::pixels::{PixelBuffer, Rgba};
use crate::texture::BasicTexture;

/// Geometry of a recorded primitive, in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle.
    Rect(Rect),
    /// Oval around a center.
    Oval {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Horizontal radius.
        rx: f32,
        /// Vertical radius.
        ry: f32,
    },
    /// Oval slice starting at 12 o'clock.
    Sector {
        /// Center x.
        cx: f32,
        /// Center y.
        cy: f32,
        /// Horizontal radius.
        rx: f32,
        /// Vertical radius.
        ry: f32,
        /// Sweep in degrees, clockwise when positive.
        sweep: f32,
    },
    /// Line segment.
    Line {
        /// Start x.
        x1: f32,
        /// Start y.
        y1: f32,
        /// End x.
        x2: f32,
        /// End y.
        y2: f32,
    },
}

/// A draw call as seen by the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Whole-surface clear.
    Clear(Color),
    /// Filled shape.
    Fill {
        /// Geometry.
        shape: Shape,
        /// Fill color.
        color: Color,
        /// Transform at draw time.
        matrix: Matrix,
        /// Alpha at draw time.
        alpha: f32,
    },
    /// Stroked shape.
    Stroke {
        /// Geometry.
        shape: Shape,
        /// Stroke color and width.
        paint: Paint,
        /// Transform at draw time.
        matrix: Matrix,
        /// Alpha at draw time.
        alpha: f32,
    },
    /// Texture region draw.
    Texture {
        /// Texture drawn.
        texture: TextureId,
        /// Source rect in texture space.
        src: Rect,
        /// Destination rect in local space.
        dst: Rect,
        /// Transform at draw time.
        matrix: Matrix,
        /// Alpha at draw time.
        alpha: f32,
    },
    /// Cross-fade texture draw.
    Mixed {
        /// Texture drawn.
        texture: TextureId,
        /// Color mixed in.
        color: Color,
        /// Share of the color.
        ratio: f32,
        /// Source rect in texture space.
        src: Rect,
        /// Destination rect in local space.
        dst: Rect,
        /// Transform at draw time.
        matrix: Matrix,
        /// Alpha at draw time.
        alpha: f32,
    },
}

/// Headless canvas rendering into memory.
pub struct SoftwareCanvas {
    context: ContextId,
    framebuffer: PixelBuffer,
    state: StateStack,
    textures: HashMap<TextureId, PixelBuffer>,
    buffers: HashMap<BufferId, Vec<f32>>,
    next_texture: u32,
    next_buffer: u32,
    recycler: ResourceRecycler,
    budget: UploadBudget,
    stats: CanvasStats,
    recording: Option<Vec<DrawOp>>,
}

impl std::fmt::Debug for SoftwareCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareCanvas")
            .field("context", &self.context)
            .field("width", &self.framebuffer.width())
            .field("height", &self.framebuffer.height())
            .field("textures", &self.textures.len())
            .field("buffers", &self.buffers.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl SoftwareCanvas {
    /// Creates a canvas with a fresh context id.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            context: ContextId::next(),
            framebuffer: PixelBuffer::transparent(width, height),
            state: StateStack::new(),
            textures: HashMap::new(),
            buffers: HashMap::new(),
            next_texture: 1,
            next_buffer: 1,
            recycler: ResourceRecycler::new(),
            budget: UploadBudget::default(),
            stats: CanvasStats::default(),
            recording: None,
        }
    }

    /// Sets the throttled uploads allowed per frame.
    #[must_use]
    pub fn with_upload_limit(mut self, limit: u32) -> Self {
        self.budget = UploadBudget::new(limit);
        self
    }

    /// Starts keeping a log of draw calls.
    #[must_use]
    pub fn recording(mut self) -> Self {
        self.recording = Some(Vec::new());
        self
    }

    /// Takes the draw calls logged so far.
    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        self.recording.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// The rendered pixels.
    #[must_use]
    pub fn framebuffer(&self) -> &PixelBuffer {
        &self.framebuffer
    }

    /// Reads one framebuffer pixel.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        self.framebuffer.get(x, y)
    }

    /// Returns true if the texture object exists.
    #[must_use]
    pub fn has_texture(&self, id: TextureId) -> bool {
        self.textures.contains_key(&id)
    }

    /// Number of live texture objects.
    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Storage of a texture object.
    #[must_use]
    pub fn texture_pixels(&self, id: TextureId) -> Option<&PixelBuffer> {
        self.textures.get(&id)
    }

    fn record(&mut self, op: impl FnOnce() -> DrawOp) {
        if let Some(ops) = self.recording.as_mut() {
            ops.push(op());
        }
    }

    fn fill_shape(&mut self, shape: Shape, color: Color) {
        self.stats.shape_draws += 1;
        let (matrix, alpha) = (self.state.matrix(), self.state.alpha());
        self.record(|| DrawOp::Fill {
            shape,
            color,
            matrix,
            alpha,
        });
        let bounds = shape_bounds(&shape, 0.0);
        rasterize(&mut self.framebuffer, &matrix, alpha, &bounds, |x, y| {
            covers_fill(&shape, x, y).then_some(color)
        });
    }

    fn stroke_shape(&mut self, shape: Shape, paint: &Paint) {
        self.stats.shape_draws += 1;
        let (matrix, alpha) = (self.state.matrix(), self.state.alpha());
        let paint = *paint;
        self.record(|| DrawOp::Stroke {
            shape,
            paint,
            matrix,
            alpha,
        });
        let half = (paint.line_width() * 0.5).max(0.5);
        let bounds = shape_bounds(&shape, half);
        let color = paint.color();
        rasterize(&mut self.framebuffer, &matrix, alpha, &bounds, |x, y| {
            covers_stroke(&shape, half, x, y).then_some(color)
        });
    }

    fn draw_textured(
        &mut self,
        texture: &mut BasicTexture,
        mix: Option<(Color, f32)>,
        src: &Rect,
        dst: &Rect,
    ) {
        let Some(id) = texture.bind(self) else {
            return;
        };
        let (matrix, alpha) = (self.state.matrix(), self.state.alpha());
        let (src, dst) = (*src, *dst);
        match mix {
            None => {
                self.stats.texture_draws += 1;
                self.record(|| DrawOp::Texture {
                    texture: id,
                    src,
                    dst,
                    matrix,
                    alpha,
                });
            }
            Some((color, ratio)) => {
                self.stats.mixed_draws += 1;
                self.record(|| DrawOp::Mixed {
                    texture: id,
                    color,
                    ratio,
                    src,
                    dst,
                    matrix,
                    alpha,
                });
            }
        }

        if dst.is_empty() || src.is_empty() {
            return;
        }
        let Some(pixels) = self.textures.get(&id) else {
            return;
        };
        let max_x = pixels.width().saturating_sub(1) as f32;
        let max_y = pixels.height().saturating_sub(1) as f32;
        let sx = src.width / dst.width;
        let sy = src.height / dst.height;
        rasterize(&mut self.framebuffer, &matrix, alpha, &dst, |x, y| {
            if !dst.contains(x, y) {
                return None;
            }
            let u = (src.x + (x - dst.x) * sx).floor().clamp(0.0, max_x);
            let v = (src.y + (y - dst.y) * sy).floor().clamp(0.0, max_y);
            let texel = Color::from_rgba8(pixels.get(u as u32, v as u32));
            Some(match mix {
                None => texel,
                Some((color, ratio)) => texel.lerp(color, ratio),
            })
        });
    }
}

impl Canvas for SoftwareCanvas {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if (width, height) != (self.framebuffer.width(), self.framebuffer.height()) {
            self.framebuffer = PixelBuffer::transparent(width, height);
        }
        self.state.reset();
    }

    fn size(&self) -> (u32, u32) {
        (self.framebuffer.width(), self.framebuffer.height())
    }

    fn clear_buffer_with(&mut self, color: Color) {
        self.record(|| DrawOp::Clear(color));
        self.framebuffer.fill(color.to_rgba8());
    }

    fn state(&self) -> &StateStack {
        &self.state
    }

    fn state_mut(&mut self) -> &mut StateStack {
        &mut self.state
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, paint: &Paint) {
        self.stroke_shape(Shape::Line { x1, y1, x2, y2 }, paint);
    }

    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint) {
        self.stroke_shape(Shape::Rect(Rect::new(x, y, width, height)), paint);
    }

    fn draw_oval(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, paint: &Paint) {
        self.stroke_shape(Shape::Oval { cx, cy, rx, ry }, paint);
    }

    fn draw_arc(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, sweep: f32, paint: &Paint) {
        self.stroke_shape(
            Shape::Sector {
                cx,
                cy,
                rx,
                ry,
                sweep,
            },
            paint,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.fill_shape(Shape::Rect(Rect::new(x, y, width, height)), color);
    }

    fn fill_oval(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Color) {
        self.fill_shape(Shape::Oval { cx, cy, rx, ry }, color);
    }

    fn fill_sector(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, sweep: f32, color: Color) {
        self.fill_shape(
            Shape::Sector {
                cx,
                cy,
                rx,
                ry,
                sweep,
            },
            color,
        );
    }

    fn draw_texture_region(&mut self, texture: &mut BasicTexture, src: &Rect, dst: &Rect) {
        self.draw_textured(texture, None, src, dst);
    }

    fn draw_mixed_region(
        &mut self,
        texture: &mut BasicTexture,
        color: Color,
        ratio: f32,
        src: &Rect,
        dst: &Rect,
    ) {
        self.draw_textured(texture, Some((color, ratio.clamp(0.0, 1.0))), src, dst);
    }

    fn allocate_texture(&mut self, width: u32, height: u32) -> TextureId {
        let id = TextureId(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(id, PixelBuffer::transparent(width, height));
        id
    }

    fn upload_pixels(&mut self, texture: TextureId, x: u32, y: u32, pixels: &PixelBuffer) {
        if let Some(storage) = self.textures.get_mut(&texture) {
            storage.blit(x, y, pixels);
            self.stats.uploads += 1;
        }
    }

    fn unload_texture(&mut self, texture: TextureId) -> bool {
        let removed = self.textures.remove(&texture).is_some();
        if removed {
            self.stats.deletions += 1;
        }
        removed
    }

    fn upload_buffer(&mut self, data: &[f32]) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id, data.to_vec());
        id
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            self.stats.deletions += 1;
        }
    }

    fn delete_recycled_resources(&mut self) {
        let (textures, buffers) = self.recycler.drain();
        for id in textures {
            self.unload_texture(id);
        }
        for id in buffers {
            self.delete_buffer(id);
        }
    }

    fn recycler(&self) -> ResourceRecycler {
        self.recycler.clone()
    }

    fn upload_budget(&mut self) -> &mut UploadBudget {
        &mut self.budget
    }

    fn stats(&self) -> CanvasStats {
        self.stats
    }

    fn take_stats(&mut self) -> CanvasStats {
        std::mem::take(&mut self.stats)
    }
}

// =============================================================================
// RASTERIZATION
// =============================================================================

fn rasterize(
    target: &mut PixelBuffer,
    matrix: &Matrix,
    alpha: f32,
    local: &Rect,
    mut shade: impl FnMut(f32, f32) -> Option<Color>,
) {
    if alpha <= 0.0 || local.is_empty() {
        return;
    }
    let Some(inverse) = matrix.invert() else {
        return;
    };
    let device = matrix.map_rect(local);
    let x0 = device.x.floor().max(0.0) as u32;
    let y0 = device.y.floor().max(0.0) as u32;
    let x1 = (device.right().ceil().max(0.0) as u32).min(target.width());
    let y1 = (device.bottom().ceil().max(0.0) as u32).min(target.height());

    for py in y0..y1 {
        for px in x0..x1 {
            let (lx, ly) = inverse.map_point(px as f32 + 0.5, py as f32 + 0.5);
            if let Some(color) = shade(lx, ly) {
                let blended = blend(target.get(px, py), color, alpha);
                target.set(px, py, blended);
            }
        }
    }
}

/// Source-over with straight alpha.
fn blend(dst: Rgba, src: Color, alpha: f32) -> Rgba {
    let sa = (src.a * alpha).clamp(0.0, 1.0);
    if sa <= 0.0 {
        return dst;
    }
    let d = Color::from_rgba8(dst);
    let da = d.a * (1.0 - sa);
    let out_a = sa + da;
    if out_a <= 0.0 {
        return Rgba::TRANSPARENT;
    }
    Color::rgba(
        (src.r * sa + d.r * da) / out_a,
        (src.g * sa + d.g * da) / out_a,
        (src.b * sa + d.b * da) / out_a,
        out_a,
    )
    .to_rgba8()
}

fn shape_bounds(shape: &Shape, pad: f32) -> Rect {
    let rect = match *shape {
        Shape::Rect(rect) => rect,
        Shape::Oval { cx, cy, rx, ry } | Shape::Sector { cx, cy, rx, ry, .. } => {
            Rect::from_ltrb(cx - rx, cy - ry, cx + rx, cy + ry)
        }
        Shape::Line { x1, y1, x2, y2 } => {
            Rect::from_ltrb(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
        }
    };
    Rect::new(
        rect.x - pad,
        rect.y - pad,
        rect.width + 2.0 * pad,
        rect.height + 2.0 * pad,
    )
}

fn covers_fill(shape: &Shape, x: f32, y: f32) -> bool {
    match *shape {
        Shape::Rect(rect) => rect.contains(x, y),
        Shape::Oval { cx, cy, rx, ry } => oval_distance(cx, cy, rx, ry, x, y) <= 1.0,
        Shape::Sector {
            cx,
            cy,
            rx,
            ry,
            sweep,
        } => oval_distance(cx, cy, rx, ry, x, y) <= 1.0 && in_sweep(cx, cy, sweep, x, y),
        Shape::Line { .. } => false,
    }
}

fn covers_stroke(shape: &Shape, half: f32, x: f32, y: f32) -> bool {
    match *shape {
        Shape::Rect(rect) => {
            let outer = Rect::from_ltrb(
                rect.x - half,
                rect.y - half,
                rect.right() + half,
                rect.bottom() + half,
            );
            let inner = Rect::from_ltrb(
                rect.x + half,
                rect.y + half,
                rect.right() - half,
                rect.bottom() - half,
            );
            outer.contains(x, y) && (inner.is_empty() || !inner.contains(x, y))
        }
        Shape::Oval { cx, cy, rx, ry } => in_ring(cx, cy, rx, ry, half, x, y),
        Shape::Sector {
            cx,
            cy,
            rx,
            ry,
            sweep,
        } => in_ring(cx, cy, rx, ry, half, x, y) && in_sweep(cx, cy, sweep, x, y),
        Shape::Line { x1, y1, x2, y2 } => segment_distance(x1, y1, x2, y2, x, y) <= half,
    }
}

fn oval_distance(cx: f32, cy: f32, rx: f32, ry: f32, x: f32, y: f32) -> f32 {
    if rx <= 0.0 || ry <= 0.0 {
        return f32::INFINITY;
    }
    let dx = (x - cx) / rx;
    let dy = (y - cy) / ry;
    dx * dx + dy * dy
}

fn in_ring(cx: f32, cy: f32, rx: f32, ry: f32, half: f32, x: f32, y: f32) -> bool {
    let outside_inner = rx - half <= 0.0
        || ry - half <= 0.0
        || oval_distance(cx, cy, rx - half, ry - half, x, y) > 1.0;
    outside_inner && oval_distance(cx, cy, rx + half, ry + half, x, y) <= 1.0
}

/// Angle test for sectors: 0 degrees at 12 o'clock, clockwise positive.
fn in_sweep(cx: f32, cy: f32, sweep: f32, x: f32, y: f32) -> bool {
    if sweep.abs() >= 360.0 {
        return true;
    }
    let mut angle = (x - cx).atan2(cy - y).to_degrees();
    if angle < 0.0 {
        angle += 360.0;
    }
    if sweep >= 0.0 {
        angle <= sweep
    } else {
        angle == 0.0 || angle >= 360.0 + sweep
    }
}

fn segment_distance(x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) -> f32 {
    let (dx, dy) = (x2 - x1, y2 - y1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq <= f32::EPSILON {
        0.0
    } else {
        (((x - x1) * dx + (y - y1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (px, py) = (x1 + t * dx, y1 + t * dy);
    ((x - px) * (x - px) + (y - py) * (y - py)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SaveFlags;
    use std::sync::Arc;

    const RED: Rgba = Rgba::new(255, 0, 0, 255);
    const BLUE: Rgba = Rgba::new(0, 0, 255, 255);

    #[test]
    fn test_fill_rect_respects_translate() {
        let mut canvas = SoftwareCanvas::new(10, 10);
        canvas.clear_buffer_with(Color::BLACK);
        canvas.translate(2.0, 3.0);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(canvas.pixel(2, 3), RED);
        assert_eq!(canvas.pixel(3, 4), RED);
        assert_eq!(canvas.pixel(1, 3), Rgba::new(0, 0, 0, 255));
        assert_eq!(canvas.pixel(4, 3), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_alpha_blends_over_background() {
        let mut canvas = SoftwareCanvas::new(2, 2);
        canvas.clear_buffer_with(Color::BLACK);
        canvas.set_alpha(0.5);
        canvas.fill_rect(0.0, 0.0, 2.0, 2.0, Color::WHITE);
        let px = canvas.pixel(0, 0);
        assert!((127..=128).contains(&px.r));
        assert_eq!(px.a, 255);
    }

    #[test]
    fn test_rotation_about_center() {
        let mut canvas = SoftwareCanvas::new(10, 10);
        canvas.clear_buffer_with(Color::BLACK);
        canvas.translate(5.0, 5.0);
        canvas.rotate(90.0);
        canvas.translate(-5.0, -5.0);
        // A bar across the top becomes a bar down the right side.
        canvas.fill_rect(0.0, 0.0, 10.0, 2.0, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(canvas.pixel(9, 5), RED);
        assert_eq!(canvas.pixel(5, 0), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_draw_texture_scales_nearest() {
        let mut canvas = SoftwareCanvas::new(8, 8);
        let pixels = PixelBuffer::from_fn(2, 1, |x, _| if x == 0 { RED } else { BLUE });
        let mut texture = BasicTexture::from_pixels(Arc::new(pixels));
        canvas.draw_texture(&mut texture, 0.0, 0.0, 8.0, 8.0);
        assert_eq!(canvas.pixel(1, 4), RED);
        assert_eq!(canvas.pixel(6, 4), BLUE);
        assert_eq!(canvas.stats().texture_draws, 1);
    }

    #[test]
    fn test_draw_mixed_ratio() {
        let mut canvas = SoftwareCanvas::new(4, 4);
        let mut texture = BasicTexture::from_pixels(Arc::new(PixelBuffer::filled(4, 4, RED)));

        canvas.draw_mixed(&mut texture, Color::rgb(0.0, 0.0, 1.0), 1.0, 0.0, 0.0, 4.0, 4.0);
        assert_eq!(canvas.pixel(0, 0), BLUE);

        canvas.draw_mixed(&mut texture, Color::rgb(0.0, 0.0, 1.0), 0.0, 0.0, 0.0, 4.0, 4.0);
        assert_eq!(canvas.pixel(0, 0), RED);

        canvas.draw_mixed(&mut texture, Color::rgb(0.0, 0.0, 1.0), 0.25, 0.0, 0.0, 4.0, 4.0);
        let px = canvas.pixel(0, 0);
        assert!((190..=192).contains(&px.r));
        assert!((63..=64).contains(&px.b));
        assert_eq!(canvas.stats().mixed_draws, 3);
    }

    #[test]
    fn test_fill_sector_quarter() {
        let mut canvas = SoftwareCanvas::new(20, 20);
        canvas.clear_buffer_with(Color::BLACK);
        canvas.fill_sector(10.0, 10.0, 8.0, 8.0, 90.0, Color::rgb(1.0, 0.0, 0.0));
        // Upper right quadrant covered, upper left not.
        assert_eq!(canvas.pixel(13, 6), RED);
        assert_eq!(canvas.pixel(6, 6), Rgba::new(0, 0, 0, 255));
        assert_eq!(canvas.pixel(13, 13), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_stroke_rect_leaves_inside_empty() {
        let mut canvas = SoftwareCanvas::new(12, 12);
        canvas.clear_buffer_with(Color::BLACK);
        let paint = Paint::new(Color::WHITE).with_line_width(2.0);
        canvas.draw_rect(2.0, 2.0, 8.0, 8.0, &paint);
        assert_eq!(canvas.pixel(2, 6), Rgba::new(255, 255, 255, 255));
        assert_eq!(canvas.pixel(6, 6), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_line_and_oval_cover_expected_pixels() {
        let mut canvas = SoftwareCanvas::new(16, 16);
        canvas.clear_buffer_with(Color::BLACK);
        canvas.draw_line(0.0, 8.0, 15.0, 8.0, &Paint::new(Color::WHITE));
        assert_eq!(canvas.pixel(7, 7).r, 255);
        canvas.fill_oval(8.0, 8.0, 3.0, 3.0, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(canvas.pixel(8, 8), BLUE);
        assert_eq!(canvas.pixel(1, 1), Rgba::new(0, 0, 0, 255));
    }

    #[test]
    fn test_recording_and_save_alpha() {
        let mut canvas = SoftwareCanvas::new(4, 4).recording();
        canvas.save_with(SaveFlags::ALPHA);
        canvas.set_alpha(0.5);
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);
        canvas.restore();
        canvas.fill_rect(0.0, 0.0, 1.0, 1.0, Color::WHITE);

        let ops = canvas.take_ops();
        assert_eq!(ops.len(), 2);
        assert!(matches!(ops[0], DrawOp::Fill { alpha, .. } if (alpha - 0.5).abs() < f32::EPSILON));
        assert!(matches!(ops[1], DrawOp::Fill { alpha, .. } if (alpha - 1.0).abs() < f32::EPSILON));
        assert!(canvas.take_ops().is_empty());
    }

    #[test]
    fn test_bounds_under_scale() {
        let mut canvas = SoftwareCanvas::new(4, 4);
        canvas.scale(2.0, 3.0);
        assert_eq!(canvas.bounds(1.0, 1.0, 2.0, 2.0), Rect::new(2.0, 3.0, 4.0, 6.0));
    }

    #[test]
    fn test_buffers_and_take_stats() {
        let mut canvas = SoftwareCanvas::new(4, 4);
        let buffer = canvas.upload_buffer(&[0.0, 1.0, 2.0]);
        canvas.recycler().recycle_buffer(buffer);
        canvas.delete_recycled_resources();
        assert_eq!(canvas.take_stats().deletions, 1);
        assert_eq!(canvas.stats(), CanvasStats::default());
    }
}
