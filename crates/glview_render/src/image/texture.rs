//! Tiled image texture.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use glview_core::Rect;
use parking_lot::Mutex;
use tracing::debug;

use super::animator::FrameShared;
use super::engine::EngineShared;
use super::tile::{plan_tiles, Tile};
use super::ImageSource;
use crate::canvas::Canvas;
use crate::color::Color;
use crate::host::TextureCallback;
use crate::texture::Drawable;

struct TileSet {
    tiles: Vec<Tile>,
    /// Index of the next tile to upload. Only moves forward.
    cursor: usize,
}

/// An image drawn as a set of pooled tiles.
///
/// Created through [`StreamingEngine::create_texture`](super::StreamingEngine::create_texture).
/// Tiles upload lazily: either on first draw or ahead of time through an
/// [`Uploader`](super::Uploader). Animated images advance on a background
/// task and the tiles pick up the new frame on the next draw.
pub struct ImageTexture {
    width: u32,
    height: u32,
    opaque: bool,
    tiles: Mutex<TileSet>,
    frames: Arc<FrameShared>,
    engine: Arc<EngineShared>,
    recycled: AtomicBool,
}

impl std::fmt::Debug for ImageTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tiles = self.tiles.lock();
        f.debug_struct("ImageTexture")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("tiles", &tiles.tiles.len())
            .field("uploaded", &tiles.cursor)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl ImageTexture {
    pub(crate) fn new(image: Arc<dyn ImageSource>, engine: Arc<EngineShared>) -> Self {
        let (width, height) = (image.width(), image.height());
        let opaque = image.is_opaque();
        let tiles = plan_tiles(width, height)
            .into_iter()
            .map(|spec| engine.pool.obtain(spec, &image, opaque))
            .collect();

        let frames = Arc::new(FrameShared::new(
            Arc::clone(&image),
            engine.gate.clone(),
            Arc::clone(&engine.clock),
        ));
        if !image.is_completed() {
            frames.schedule(&engine.workers);
        }

        Self {
            width,
            height,
            opaque,
            tiles: Mutex::new(TileSet { tiles, cursor: 0 }),
            frames,
            engine,
            recycled: AtomicBool::new(false),
        }
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the image has no transparent pixels.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Number of tiles currently owned.
    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.lock().tiles.len()
    }

    /// The decoded image.
    #[must_use]
    pub fn image(&self) -> &Arc<dyn ImageSource> {
        &self.frames.image
    }

    /// Sets the receiver of new-frame notifications. Held weakly.
    pub fn set_callback(&self, callback: Weak<dyn TextureCallback>) {
        self.frames.set_callback(Some(callback));
    }

    /// Drops the callback.
    pub fn clear_callback(&self) {
        self.frames.set_callback(None);
    }

    /// Notifies the callback, if it is still alive.
    pub fn invalidate_self(&self) {
        self.frames.invalidate_self();
    }

    /// Starts frame animation. If the decode task is still busy, the start
    /// is remembered and honored once decoding ends.
    pub fn start(&self) {
        self.frames.start(&self.engine.workers);
    }

    /// Stops frame animation. The task exits at the top of its next
    /// iteration.
    pub fn stop(&self) {
        self.frames.stop();
    }

    /// Whether frame animation is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.frames.running.load(Ordering::Acquire)
    }

    /// Whether a background task is alive for this image.
    #[must_use]
    pub fn has_animation_task(&self) -> bool {
        self.frames.is_task_active()
    }

    /// Returns true once every tile went through the upload cursor.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        let tiles = self.tiles.lock();
        tiles.cursor == tiles.tiles.len()
    }

    /// Uploads the tile under the cursor and advances it. Render thread
    /// only. Returns true once every tile is uploaded.
    pub fn upload_next_tile(&self, canvas: &mut dyn Canvas) -> bool {
        let mut set = self.tiles.lock();
        let TileSet { tiles, cursor } = &mut *set;
        if let Some(tile) = tiles.get_mut(*cursor) {
            *cursor += 1;
            tile.texture.bind(canvas);
        }
        *cursor == tiles.len()
    }

    /// Hands every tile back to the pool and releases the decoded image.
    /// Safe from any thread and while the animation task runs. Only the
    /// first call has an effect.
    pub fn recycle(&self) {
        if self.recycled.swap(true, Ordering::AcqRel) {
            return;
        }
        self.frames.running.store(false, Ordering::Release);

        let tiles = {
            let mut set = self.tiles.lock();
            set.cursor = 0;
            std::mem::take(&mut set.tiles)
        };
        let count = tiles.len();
        for tile in tiles {
            self.engine.pool.free(tile);
        }
        self.frames.request_release();
        debug!(tiles = count, "image texture recycled");
    }

    /// Whether [`recycle`](Self::recycle) was called.
    #[must_use]
    pub fn is_recycled(&self) -> bool {
        self.recycled.load(Ordering::Acquire)
    }

    fn sync_frame(tiles: &mut [Tile], frames: &FrameShared) {
        if frames.frame_dirty.swap(false, Ordering::AcqRel) {
            for tile in tiles {
                tile.texture.invalidate_content();
            }
        }
    }

    /// Draws the whole image into a rectangle.
    pub fn draw(&self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32, height: f32) {
        self.draw_tiles(canvas, None, &self.bounds(), &Rect::new(x, y, width, height), false);
    }

    /// Draws the `source` part of the image into `target`. Tiles outside
    /// `source` are skipped.
    pub fn draw_region(&self, canvas: &mut dyn Canvas, source: &Rect, target: &Rect) {
        self.draw_tiles(canvas, None, source, target, true);
    }

    /// Draws the whole image cross-faded with `color`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_mixed(
        &self,
        canvas: &mut dyn Canvas,
        color: Color,
        ratio: f32,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    ) {
        self.draw_tiles(
            canvas,
            Some((color, ratio)),
            &self.bounds(),
            &Rect::new(x, y, width, height),
            false,
        );
    }

    /// Cross-fade draw of the `source` part of the image into `target`.
    pub fn draw_mixed_region(
        &self,
        canvas: &mut dyn Canvas,
        color: Color,
        ratio: f32,
        source: &Rect,
        target: &Rect,
    ) {
        self.draw_tiles(canvas, Some((color, ratio)), source, target, true);
    }

    fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    /// One linear map from image space to canvas space, one draw per tile.
    fn draw_tiles(
        &self,
        canvas: &mut dyn Canvas,
        mix: Option<(Color, f32)>,
        source: &Rect,
        target: &Rect,
        clip: bool,
    ) {
        if source.is_empty() {
            return;
        }
        let scale_x = target.width / source.width;
        let scale_y = target.height / source.height;
        let map = |r: &Rect| {
            Rect::new(
                target.x + (r.x - source.x) * scale_x,
                target.y + (r.y - source.y) * scale_y,
                r.width * scale_x,
                r.height * scale_y,
            )
        };

        let mut set = self.tiles.lock();
        Self::sync_frame(&mut set.tiles, &self.frames);
        for tile in &mut set.tiles {
            let content = tile.spec().content_rect();
            let src = if clip {
                match content.intersection(source) {
                    Some(src) => src,
                    None => continue,
                }
            } else {
                content
            };
            let dst = map(&src);
            let src = tile.texture_rect(&src);
            match mix {
                None => canvas.draw_texture_region(&mut tile.texture, &src, &dst),
                Some((color, ratio)) => {
                    canvas.draw_mixed_region(&mut tile.texture, color, ratio, &src, &dst);
                }
            }
        }
    }
}

impl Drop for ImageTexture {
    fn drop(&mut self) {
        self.recycle();
    }
}

impl Drawable for Arc<ImageTexture> {
    fn width(&self) -> u32 {
        ImageTexture::width(self)
    }

    fn height(&self) -> u32 {
        ImageTexture::height(self)
    }

    fn is_opaque(&self) -> bool {
        ImageTexture::is_opaque(self)
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, x: f32, y: f32, width: f32, height: f32) {
        ImageTexture::draw(self, canvas, x, y, width, height);
    }

    fn draw_region(&mut self, canvas: &mut dyn Canvas, src: &Rect, dst: &Rect) {
        ImageTexture::draw_region(self, canvas, src, dst);
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
        ImageTexture::draw_mixed(self, canvas, color, ratio, x, y, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{DrawOp, SoftwareCanvas};
    use crate::config::StreamingConfig;
    use crate::image::{FrameSequence, StreamingEngine, TileClass};
    use crate::pixels::{PixelBuffer, Rgba};

    fn engine() -> StreamingEngine {
        StreamingEngine::new(StreamingConfig::default())
    }

    fn gradient(width: u32, height: u32) -> Arc<FrameSequence> {
        Arc::new(FrameSequence::still(PixelBuffer::from_fn(width, height, |x, y| {
            Rgba::new((x % 256) as u8, (y % 256) as u8, 0, 255)
        })))
    }

    #[test]
    fn test_full_draw_maps_each_tile() {
        let engine = engine();
        let mut texture = engine.create_texture(gradient(600, 300));
        let mut canvas = SoftwareCanvas::new(300, 150).recording();
        texture.draw(&mut canvas, 0.0, 0.0, 300.0, 150.0);

        let ops = canvas.take_ops();
        let draws: Vec<(Rect, Rect)> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Texture { src, dst, .. } => Some((*src, *dst)),
                _ => None,
            })
            .collect();
        assert_eq!(
            draws,
            vec![
                (Rect::new(2.0, 2.0, 508.0, 300.0), Rect::new(0.0, 0.0, 254.0, 150.0)),
                (Rect::new(1.0, 1.0, 92.0, 254.0), Rect::new(254.0, 0.0, 46.0, 127.0)),
                (Rect::new(1.0, 1.0, 92.0, 46.0), Rect::new(254.0, 127.0, 46.0, 23.0)),
            ]
        );
    }

    #[test]
    fn test_region_draw_skips_other_tiles() {
        let engine = engine();
        let mut texture = engine.create_texture(gradient(600, 300));
        let mut canvas = SoftwareCanvas::new(100, 100).recording();
        texture.draw_region(
            &mut canvas,
            &Rect::new(520.0, 10.0, 40.0, 40.0),
            &Rect::new(0.0, 0.0, 80.0, 80.0),
        );

        let ops = canvas.take_ops();
        assert_eq!(ops.len(), 1);
        let DrawOp::Texture { src, dst, .. } = &ops[0] else {
            panic!("expected a texture draw, got {:?}", ops[0]);
        };
        assert_eq!(*src, Rect::new(13.0, 11.0, 40.0, 40.0));
        assert_eq!(*dst, Rect::new(0.0, 0.0, 80.0, 80.0));
    }

    #[test]
    fn test_drawn_pixels_match_source() {
        let engine = engine();
        let mut texture = engine.create_texture(gradient(600, 300));
        let mut canvas = SoftwareCanvas::new(600, 300);
        texture.draw(&mut canvas, 0.0, 0.0, 600.0, 300.0);
        assert_eq!(canvas.pixel(10, 20), Rgba::new(10, 20, 0, 255));
        assert_eq!(canvas.pixel(507, 299), Rgba::new(251, 43, 0, 255));
        assert_eq!(canvas.pixel(508, 254), Rgba::new(252, 254, 0, 255));
        assert_eq!(canvas.pixel(599, 0), Rgba::new(87, 0, 0, 255));
    }

    #[test]
    fn test_upload_cursor_moves_forward_once_per_tile() {
        let engine = engine();
        let texture = engine.create_texture(gradient(600, 300));
        let mut canvas = SoftwareCanvas::new(8, 8);
        assert!(!texture.is_ready());
        assert!(!texture.upload_next_tile(&mut canvas));
        assert!(!texture.upload_next_tile(&mut canvas));
        assert!(texture.upload_next_tile(&mut canvas));
        assert!(texture.is_ready());
        assert!(texture.upload_next_tile(&mut canvas));
        assert_eq!(canvas.stats().uploads, 3);
    }

    #[test]
    fn test_recycle_returns_tiles_and_releases_once() {
        let engine = engine();
        let image = gradient(600, 300);
        let texture = engine.create_texture(image.clone());
        assert_eq!(texture.tile_count(), 3);

        texture.recycle();
        texture.recycle();
        assert_eq!(engine.pool().free_count(TileClass::Large), 1);
        assert_eq!(engine.pool().free_count(TileClass::Small), 2);
        assert_eq!(image.release_count(), 1);
        assert_eq!(texture.tile_count(), 0);

        drop(texture);
        assert_eq!(image.release_count(), 1);
    }

    #[test]
    fn test_frame_dirty_invalidates_tiles() {
        let engine = engine();
        let mut texture = engine.create_texture(gradient(100, 100));
        let mut canvas = SoftwareCanvas::new(100, 100);
        texture.draw(&mut canvas, 0.0, 0.0, 100.0, 100.0);
        texture.draw(&mut canvas, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(canvas.stats().uploads, 1);

        texture.frames.frame_dirty.store(true, Ordering::Release);
        texture.draw(&mut canvas, 0.0, 0.0, 100.0, 100.0);
        assert_eq!(canvas.stats().uploads, 2);
    }
}
