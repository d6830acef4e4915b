//! # Basic Texture
//!
//! One GPU texture object and where its pixels come from.
//!
//! ```text
//!   bind (first)        invalidate_content        bind
//! Unloaded ─────► Loaded ─────────────────► Stale ─────► Loaded
//!     ▲             │
//!     └── recycle ──┘   (or: bound to a new context id)
//! ```

use std::sync::Arc;

use tracing::debug;

use crate::canvas::{Canvas, ContextId, ResourceRecycler, TextureId};
use crate::image::ImageSource;
use crate::pixels::PixelBuffer;

/// Where a texture's pixels come from.
#[derive(Clone)]
pub enum TextureKind {
    /// A fixed in-memory bitmap.
    Bitmap(Arc<PixelBuffer>),
    /// Storage only. Content is produced by drawing into it.
    Raw,
    /// A bordered region of a shared image.
    Tile {
        /// Source image while the tile is bound to an image texture.
        image: Option<Arc<dyn ImageSource>>,
        /// Left edge of the read region, border included.
        origin_x: i32,
        /// Top edge of the read region, border included.
        origin_y: i32,
    },
}

impl std::fmt::Debug for TextureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bitmap(pixels) => write!(f, "Bitmap({}x{})", pixels.width(), pixels.height()),
            Self::Raw => f.write_str("Raw"),
            Self::Tile {
                image,
                origin_x,
                origin_y,
            } => f
                .debug_struct("Tile")
                .field("bound", &image.is_some())
                .field("origin_x", origin_x)
                .field("origin_y", origin_y)
                .finish(),
        }
    }
}

/// Upload state of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No texture object in the current context.
    Unloaded,
    /// Texture object holds current content.
    Loaded,
    /// Texture object exists but its content is out of date.
    Stale,
}

#[derive(Debug)]
struct Binding {
    context: ContextId,
    id: TextureId,
    recycler: ResourceRecycler,
}

/// A texture with a closed set of content sources.
#[derive(Debug)]
pub struct BasicTexture {
    kind: TextureKind,
    width: u32,
    height: u32,
    texture_width: u32,
    texture_height: u32,
    opaque: bool,
    throttled: bool,
    binding: Option<Binding>,
    state: LoadState,
}

impl BasicTexture {
    /// Creates a texture backed by a bitmap. Bitmap uploads count against
    /// the per-frame upload budget.
    #[must_use]
    pub fn from_pixels(pixels: Arc<PixelBuffer>) -> Self {
        let (width, height) = (pixels.width(), pixels.height());
        let opaque = pixels.is_opaque();
        Self {
            kind: TextureKind::Bitmap(pixels),
            width,
            height,
            texture_width: width,
            texture_height: height,
            opaque,
            throttled: true,
            binding: None,
            state: LoadState::Unloaded,
        }
    }

    /// Creates a storage-only texture.
    #[must_use]
    pub fn raw(width: u32, height: u32, opaque: bool) -> Self {
        Self {
            kind: TextureKind::Raw,
            width,
            height,
            texture_width: width,
            texture_height: height,
            opaque,
            throttled: false,
            binding: None,
            state: LoadState::Unloaded,
        }
    }

    /// Creates an unbound tile texture with square storage of `texture_size`.
    #[must_use]
    pub fn tile(texture_size: u32) -> Self {
        Self {
            kind: TextureKind::Tile {
                image: None,
                origin_x: 0,
                origin_y: 0,
            },
            width: texture_size,
            height: texture_size,
            texture_width: texture_size,
            texture_height: texture_size,
            opaque: false,
            throttled: false,
            binding: None,
            state: LoadState::Unloaded,
        }
    }

    /// Content width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Content height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Allocated storage width.
    #[must_use]
    pub fn texture_width(&self) -> u32 {
        self.texture_width
    }

    /// Allocated storage height.
    #[must_use]
    pub fn texture_height(&self) -> u32 {
        self.texture_height
    }

    /// Sets the content size inside the existing storage.
    ///
    /// # Panics
    ///
    /// Panics if the content does not fit the storage.
    pub fn set_content_size(&mut self, width: u32, height: u32) {
        assert!(
            width <= self.texture_width && height <= self.texture_height,
            "content {width}x{height} exceeds texture {}x{}",
            self.texture_width,
            self.texture_height
        );
        self.width = width;
        self.height = height;
    }

    /// Returns the content source.
    #[must_use]
    pub fn kind(&self) -> &TextureKind {
        &self.kind
    }

    /// Whether the content has no transparent pixels.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Marks the content opaque or not.
    pub fn set_opaque(&mut self, opaque: bool) {
        self.opaque = opaque;
    }

    /// Whether uploads count against the per-frame budget.
    #[must_use]
    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// Returns the upload state.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Returns true if the texture holds current content.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state == LoadState::Loaded
    }

    /// Texture id in the context it was last bound to.
    #[must_use]
    pub fn id(&self) -> Option<TextureId> {
        self.binding.as_ref().map(|binding| binding.id)
    }

    /// Context the texture was last bound to.
    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.binding.as_ref().map(|binding| binding.context)
    }

    /// Points a tile texture at a region of `image`.
    ///
    /// # Panics
    ///
    /// Panics if this is not a tile texture.
    pub fn set_tile_source(&mut self, image: Arc<dyn ImageSource>, origin_x: i32, origin_y: i32) {
        let TextureKind::Tile { .. } = self.kind else {
            panic!("set_tile_source on a {:?} texture", self.kind);
        };
        self.kind = TextureKind::Tile {
            image: Some(image),
            origin_x,
            origin_y,
        };
    }

    /// Drops a tile texture's image reference.
    pub fn clear_tile_source(&mut self) {
        if let TextureKind::Tile { image, .. } = &mut self.kind {
            *image = None;
        }
    }

    /// Makes sure the texture is uploaded in `canvas`'s context.
    ///
    /// Returns `None` if a throttled upload had to wait for the next frame.
    pub fn bind(&mut self, canvas: &mut dyn Canvas) -> Option<TextureId> {
        let context = canvas.context_id();
        if self
            .binding
            .as_ref()
            .is_some_and(|binding| binding.context != context)
        {
            // The old context took its objects with it.
            self.binding = None;
            self.state = LoadState::Unloaded;
        }

        if let (LoadState::Loaded, Some(binding)) = (self.state, &self.binding) {
            return Some(binding.id);
        }

        if self.throttled && !canvas.upload_budget().try_consume() {
            return None;
        }

        let fresh = self.binding.is_none();
        let id = match &self.binding {
            Some(binding) => binding.id,
            None => {
                let id = canvas.allocate_texture(self.texture_width, self.texture_height);
                self.binding = Some(Binding {
                    context,
                    id,
                    recycler: canvas.recycler(),
                });
                id
            }
        };
        self.upload_content(canvas, id, fresh);
        self.state = LoadState::Loaded;
        Some(id)
    }

    fn upload_content(&self, canvas: &mut dyn Canvas, id: TextureId, fresh: bool) {
        match &self.kind {
            TextureKind::Bitmap(pixels) => canvas.upload_pixels(id, 0, 0, pixels),
            TextureKind::Raw => {}
            TextureKind::Tile {
                image: Some(image),
                origin_x,
                origin_y,
            } => {
                if image.is_recycled() {
                    return;
                }
                // A fresh texture is filled edge to edge so sampling past the
                // content never reads uninitialized storage.
                let (w, h) = if fresh {
                    (self.texture_width, self.texture_height)
                } else {
                    (self.width, self.height)
                };
                match image.read_region(*origin_x, *origin_y, w, h) {
                    Ok(pixels) => canvas.upload_pixels(id, 0, 0, &pixels),
                    Err(error) => debug!(%error, "tile upload skipped"),
                }
            }
            TextureKind::Tile { image: None, .. } => {}
        }
    }

    /// Marks the content out of date. The texture object is kept and
    /// refilled on the next bind.
    pub fn invalidate_content(&mut self) {
        if self.state == LoadState::Loaded {
            self.state = LoadState::Stale;
        }
    }

    /// Frees the texture object right away. Render thread only.
    pub fn unload(&mut self, canvas: &mut dyn Canvas) {
        if let Some(binding) = self.binding.take() {
            if binding.context == canvas.context_id() {
                canvas.unload_texture(binding.id);
            }
        }
        self.state = LoadState::Unloaded;
    }

    /// Hands the texture object to the recycler of its context. Any thread.
    pub fn recycle(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.recycler.recycle_texture(binding.id);
        }
        self.state = LoadState::Unloaded;
    }
}

impl Drop for BasicTexture {
    fn drop(&mut self) {
        self.recycle();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SoftwareCanvas;
    use crate::pixels::Rgba;

    fn red_bitmap() -> Arc<PixelBuffer> {
        Arc::new(PixelBuffer::filled(4, 4, Rgba::new(255, 0, 0, 255)))
    }

    #[test]
    fn test_bind_uploads_once() {
        let mut canvas = SoftwareCanvas::new(8, 8);
        let mut texture = BasicTexture::from_pixels(red_bitmap());
        assert_eq!(texture.state(), LoadState::Unloaded);

        let id = texture.bind(&mut canvas).unwrap();
        assert!(texture.is_loaded());
        assert_eq!(texture.bind(&mut canvas), Some(id));
        assert_eq!(canvas.stats().uploads, 1);
        assert_eq!(canvas.upload_budget().used(), 1);
    }

    #[test]
    fn test_new_context_reuploads() {
        let mut first = SoftwareCanvas::new(8, 8);
        let mut texture = BasicTexture::from_pixels(red_bitmap());
        texture.bind(&mut first).unwrap();

        let mut second = SoftwareCanvas::new(8, 8);
        texture.bind(&mut second).unwrap();
        assert_eq!(texture.context(), Some(second.context_id()));
        assert_eq!(second.stats().uploads, 1);
    }

    #[test]
    fn test_throttled_upload_waits_for_budget() {
        let mut canvas = SoftwareCanvas::new(8, 8).with_upload_limit(1);
        let mut a = BasicTexture::from_pixels(red_bitmap());
        let mut b = BasicTexture::from_pixels(red_bitmap());
        assert!(a.bind(&mut canvas).is_some());
        assert!(b.bind(&mut canvas).is_none());
        assert!(canvas.upload_budget().reached());

        canvas.upload_budget().reset();
        assert!(b.bind(&mut canvas).is_some());
    }

    #[test]
    fn test_invalidate_keeps_texture_object() {
        let mut canvas = SoftwareCanvas::new(8, 8);
        let mut texture = BasicTexture::from_pixels(red_bitmap());
        let id = texture.bind(&mut canvas).unwrap();
        texture.invalidate_content();
        assert_eq!(texture.state(), LoadState::Stale);
        assert_eq!(texture.bind(&mut canvas), Some(id));
        assert_eq!(canvas.stats().uploads, 2);
    }

    #[test]
    fn test_drop_recycles_through_queue() {
        let mut canvas = SoftwareCanvas::new(8, 8);
        let mut texture = BasicTexture::from_pixels(red_bitmap());
        let id = texture.bind(&mut canvas).unwrap();
        assert!(canvas.has_texture(id));

        drop(texture);
        assert_eq!(canvas.recycler().pending(), 1);
        canvas.delete_recycled_resources();
        assert!(!canvas.has_texture(id));
    }

    #[test]
    fn test_drop_after_context_loss_is_discarded() {
        let mut canvas = SoftwareCanvas::new(8, 8);
        let mut texture = BasicTexture::from_pixels(red_bitmap());
        texture.bind(&mut canvas).unwrap();

        canvas.recycler().close();
        drop(texture);
        assert_eq!(canvas.recycler().pending(), 0);
    }
}
