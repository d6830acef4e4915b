//! # Drawing Surface
//!
//! The [`Canvas`] trait is the only path to the graphics context. It carries
//! a transform/alpha state stack, primitive draw operations, texture draws
//! and the upload primitives the streaming engine needs.
//!
//! ## Threading
//!
//! A canvas belongs to the render thread. Other threads hand GPU resources
//! back through a [`ResourceRecycler`]; the render thread frees them in
//! [`Canvas::delete_recycled_resources`] at the start of the next frame.
//!
//! ## Context Loss
//!
//! Every canvas has a unique [`ContextId`]. A texture remembers the id it
//! was uploaded under and re-uploads when it is bound to a different one.

mod software;
mod state;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glview_core::{Matrix, Rect};
use parking_lot::Mutex;

use crate::color::Color;
use crate::paint::Paint;
use crate::pixels::PixelBuffer;
use crate::texture::BasicTexture;

pub use software::{DrawOp, Shape, SoftwareCanvas};
pub use state::{SaveFlags, StateStack};

/// Default number of throttled texture uploads per frame.
pub const DEFAULT_UPLOADS_PER_FRAME: u32 = 100;

/// Identity of one graphics context instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// Returns a process-unique id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Handle of a texture object inside one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u32);

/// Handle of a buffer object inside one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Per-frame count of throttled texture uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadBudget {
    limit: u32,
    used: u32,
}

impl Default for UploadBudget {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOADS_PER_FRAME)
    }
}

impl UploadBudget {
    /// Creates a budget of `limit` uploads per frame.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self { limit, used: 0 }
    }

    /// Changes the slots per frame. Takes effect for the rest of this frame.
    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit;
    }

    /// Starts a new frame.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Takes one upload slot. Returns false if the frame is out of slots.
    pub fn try_consume(&mut self) -> bool {
        if self.reached() {
            return false;
        }
        self.used += 1;
        true
    }

    /// Returns true once every slot of this frame is used.
    #[must_use]
    pub fn reached(&self) -> bool {
        self.used >= self.limit
    }

    /// Slots used this frame.
    #[must_use]
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Slots per frame.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }
}

/// Draw call counters since the last [`Canvas::take_stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CanvasStats {
    /// Primitive fills and strokes.
    pub shape_draws: u32,
    /// Plain texture draws.
    pub texture_draws: u32,
    /// Cross-fade texture draws.
    pub mixed_draws: u32,
    /// Pixel uploads into textures.
    pub uploads: u32,
    /// Textures and buffers freed.
    pub deletions: u32,
}

#[derive(Debug, Default)]
struct RecycleQueue {
    textures: Vec<TextureId>,
    buffers: Vec<BufferId>,
    closed: bool,
}

/// Queue of GPU resources released off the render thread.
///
/// Closed when its context is lost; ids recycled after that refer to
/// objects that died with the context and are dropped.
#[derive(Debug, Clone, Default)]
pub struct ResourceRecycler {
    queue: Arc<Mutex<RecycleQueue>>,
}

impl ResourceRecycler {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a texture for deletion.
    pub fn recycle_texture(&self, id: TextureId) {
        let mut queue = self.queue.lock();
        if !queue.closed {
            queue.textures.push(id);
        }
    }

    /// Schedules a buffer for deletion.
    pub fn recycle_buffer(&self, id: BufferId) {
        let mut queue = self.queue.lock();
        if !queue.closed {
            queue.buffers.push(id);
        }
    }

    /// Discards everything queued and ignores later recycles.
    pub fn close(&self) {
        let mut queue = self.queue.lock();
        queue.closed = true;
        queue.textures.clear();
        queue.buffers.clear();
    }

    /// Returns true once [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.queue.lock().closed
    }

    /// Takes everything queued so far.
    #[must_use]
    pub fn drain(&self) -> (Vec<TextureId>, Vec<BufferId>) {
        let mut queue = self.queue.lock();
        (
            std::mem::take(&mut queue.textures),
            std::mem::take(&mut queue.buffers),
        )
    }

    /// Number of queued resources.
    #[must_use]
    pub fn pending(&self) -> usize {
        let queue = self.queue.lock();
        queue.textures.len() + queue.buffers.len()
    }
}

/// A stateful 2D drawing surface bound to one graphics context.
///
/// State methods have default implementations on top of
/// [`state`](Canvas::state) / [`state_mut`](Canvas::state_mut).
/// Angles are in degrees; arcs and sectors start at 12 o'clock and positive
/// sweeps run clockwise.
pub trait Canvas: Send {
    // ---------------------------------------------------------------------
    // Surface
    // ---------------------------------------------------------------------

    /// Identity of the underlying context.
    fn context_id(&self) -> ContextId;

    /// Sets the surface size. Must be called before the first draw and on
    /// every resize.
    fn set_size(&mut self, width: u32, height: u32);

    /// Returns the surface size.
    fn size(&self) -> (u32, u32);

    /// Clears the whole surface to opaque black.
    fn clear_buffer(&mut self) {
        self.clear_buffer_with(Color::BLACK);
    }

    /// Clears the whole surface to `color`.
    fn clear_buffer_with(&mut self, color: Color);

    // ---------------------------------------------------------------------
    // State
    // ---------------------------------------------------------------------

    /// Current transform/alpha state.
    fn state(&self) -> &StateStack;

    /// Current transform/alpha state, mutably.
    fn state_mut(&mut self) -> &mut StateStack;

    /// Returns the current alpha.
    fn alpha(&self) -> f32 {
        self.state().alpha()
    }

    /// Sets the current alpha, which must be in `[0, 1]`.
    fn set_alpha(&mut self, alpha: f32) {
        self.state_mut().set_alpha(alpha);
    }

    /// Multiplies the current alpha.
    fn multiply_alpha(&mut self, alpha: f32) {
        self.state_mut().multiply_alpha(alpha);
    }

    /// Returns the current matrix.
    fn matrix(&self) -> Matrix {
        self.state().matrix()
    }

    /// Translates the current matrix.
    fn translate(&mut self, x: f32, y: f32) {
        self.state_mut().translate(x, y);
    }

    /// Scales the current matrix.
    fn scale(&mut self, sx: f32, sy: f32) {
        self.state_mut().scale(sx, sy);
    }

    /// Rotates the current matrix.
    fn rotate(&mut self, degrees: f32) {
        self.state_mut().rotate(degrees);
    }

    /// Multiplies the current matrix by `matrix`.
    fn concat(&mut self, matrix: &Matrix) {
        self.state_mut().concat(matrix);
    }

    /// Saves alpha and matrix.
    fn save(&mut self) {
        self.save_with(SaveFlags::ALL);
    }

    /// Saves the parts selected by `flags`.
    fn save_with(&mut self, flags: SaveFlags) {
        self.state_mut().save_with(flags);
    }

    /// Restores the last save. Panics on an empty stack.
    fn restore(&mut self) {
        self.state_mut().restore();
    }

    /// Device-space bounding box of a local rectangle.
    fn bounds(&self, x: f32, y: f32, width: f32, height: f32) -> Rect {
        self.matrix().map_rect(&Rect::new(x, y, width, height))
    }

    // ---------------------------------------------------------------------
    // Primitives
    // ---------------------------------------------------------------------

    /// Strokes a line; both end points are included.
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, paint: &Paint);

    /// Strokes a rectangle outline.
    fn draw_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: &Paint);

    /// Strokes an oval outline.
    fn draw_oval(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, paint: &Paint);

    /// Strokes an arc of an oval.
    fn draw_arc(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, sweep: f32, paint: &Paint);

    /// Fills a rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color);

    /// Fills an oval.
    fn fill_oval(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, color: Color);

    /// Fills a pie slice of an oval.
    fn fill_sector(&mut self, cx: f32, cy: f32, rx: f32, ry: f32, sweep: f32, color: Color);

    // ---------------------------------------------------------------------
    // Textures
    // ---------------------------------------------------------------------

    /// Draws a whole texture into a rectangle.
    fn draw_texture(
        &mut self,
        texture: &mut BasicTexture,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let src = Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32);
        self.draw_texture_region(texture, &src, &Rect::new(x, y, width, height));
    }

    /// Draws the `src` part of a texture into `dst`.
    fn draw_texture_region(&mut self, texture: &mut BasicTexture, src: &Rect, dst: &Rect);

    /// Draws `texture * (1 - ratio) + color * ratio` into a rectangle.
    #[allow(clippy::too_many_arguments)]
    fn draw_mixed(
        &mut self,
        texture: &mut BasicTexture,
        color: Color,
        ratio: f32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        let src = Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32);
        self.draw_mixed_region(texture, color, ratio, &src, &Rect::new(x, y, width, height));
    }

    /// Cross-fade draw of the `src` part of a texture into `dst`.
    fn draw_mixed_region(
        &mut self,
        texture: &mut BasicTexture,
        color: Color,
        ratio: f32,
        src: &Rect,
        dst: &Rect,
    );

    // ---------------------------------------------------------------------
    // GPU resources
    // ---------------------------------------------------------------------

    /// Allocates an uninitialized texture.
    fn allocate_texture(&mut self, width: u32, height: u32) -> TextureId;

    /// Uploads pixels into a texture at `(x, y)`.
    fn upload_pixels(&mut self, texture: TextureId, x: u32, y: u32, pixels: &PixelBuffer);

    /// Frees a texture. Returns false if the id was unknown.
    fn unload_texture(&mut self, texture: TextureId) -> bool;

    /// Uploads a vertex buffer.
    fn upload_buffer(&mut self, data: &[f32]) -> BufferId;

    /// Frees a buffer.
    fn delete_buffer(&mut self, buffer: BufferId);

    /// Frees everything queued on the recycler.
    fn delete_recycled_resources(&mut self);

    /// Queue for resources released off the render thread.
    fn recycler(&self) -> ResourceRecycler;

    /// Per-frame throttled upload accounting.
    fn upload_budget(&mut self) -> &mut UploadBudget;

    // ---------------------------------------------------------------------
    // Statistics
    // ---------------------------------------------------------------------

    /// Returns the counters.
    fn stats(&self) -> CanvasStats;

    /// Returns the counters and clears them.
    fn take_stats(&mut self) -> CanvasStats;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_ids_are_unique() {
        let a = ContextId::next();
        let b = ContextId::next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_upload_budget() {
        let mut budget = UploadBudget::new(2);
        assert!(budget.try_consume());
        assert!(budget.try_consume());
        assert!(budget.reached());
        assert!(!budget.try_consume());
        budget.reset();
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_upload_budget_set_limit() {
        let mut budget = UploadBudget::default();
        assert_eq!(budget.limit(), DEFAULT_UPLOADS_PER_FRAME);
        budget.set_limit(1);
        assert!(budget.try_consume());
        assert!(budget.reached());
        assert!(!budget.try_consume());
    }

    #[test]
    fn test_recycler_drains() {
        let recycler = ResourceRecycler::new();
        recycler.recycle_texture(TextureId(3));
        recycler.clone().recycle_buffer(BufferId(1));
        assert_eq!(recycler.pending(), 2);
        let (textures, buffers) = recycler.drain();
        assert_eq!(textures, vec![TextureId(3)]);
        assert_eq!(buffers, vec![BufferId(1)]);
        assert_eq!(recycler.pending(), 0);
    }

    #[test]
    fn test_closed_recycler_drops_ids() {
        let recycler = ResourceRecycler::new();
        recycler.recycle_texture(TextureId(1));
        recycler.close();
        assert!(recycler.is_closed());
        assert_eq!(recycler.pending(), 0);

        recycler.recycle_texture(TextureId(2));
        recycler.clone().recycle_buffer(BufferId(2));
        assert_eq!(recycler.pending(), 0);
        assert_eq!(recycler.drain(), (Vec::new(), Vec::new()));
    }
}
