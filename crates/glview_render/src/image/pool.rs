//! Tile texture pool, one free list per size class.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glview_core::FreeList;

use super::tile::{Tile, TileClass, TileSpec};
use super::ImageSource;
use crate::texture::BasicTexture;

/// Snapshot of pool counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TilePoolStats {
    /// Small tile textures ever created.
    pub small_created: usize,
    /// Large tile textures ever created.
    pub large_created: usize,
    /// Small tile textures waiting for reuse.
    pub small_free: usize,
    /// Large tile textures waiting for reuse.
    pub large_free: usize,
}

/// Reusable tile textures.
///
/// A tile texture keeps its GPU object while pooled, so a new image reuses
/// the storage and only re-uploads content.
#[derive(Debug, Default)]
pub struct TilePool {
    small: FreeList<BasicTexture>,
    large: FreeList<BasicTexture>,
    small_created: AtomicUsize,
    large_created: AtomicUsize,
}

impl TilePool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, class: TileClass) -> &FreeList<BasicTexture> {
        match class {
            TileClass::Small => &self.small,
            TileClass::Large => &self.large,
        }
    }

    fn created(&self, class: TileClass) -> &AtomicUsize {
        match class {
            TileClass::Small => &self.small_created,
            TileClass::Large => &self.large_created,
        }
    }

    /// Takes a free texture of `spec`'s class, or creates one, and places it
    /// on `image`.
    pub fn obtain(&self, spec: TileSpec, image: &Arc<dyn ImageSource>, opaque: bool) -> Tile {
        let texture = self.list(spec.class).obtain_or_else(|| {
            self.created(spec.class).fetch_add(1, Ordering::Relaxed);
            BasicTexture::tile(spec.class.texture_size())
        });
        Tile::bind(texture, spec, image, opaque)
    }

    /// Detaches `tile` from its image and puts it back.
    pub fn free(&self, tile: Tile) {
        let (class, texture) = tile.unbind();
        self.list(class).recycle(texture);
    }

    /// Free textures of one class.
    #[must_use]
    pub fn free_count(&self, class: TileClass) -> usize {
        self.list(class).len()
    }

    /// Drops every pooled texture.
    pub fn clear(&self) {
        self.small.clear();
        self.large.clear();
    }

    /// Returns the counters.
    #[must_use]
    pub fn stats(&self) -> TilePoolStats {
        TilePoolStats {
            small_created: self.small_created.load(Ordering::Relaxed),
            large_created: self.large_created.load(Ordering::Relaxed),
            small_free: self.small.len(),
            large_free: self.large.len(),
        }
    }
}
