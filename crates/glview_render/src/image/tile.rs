//! # Tiling
//!
//! An image is cut into 508px cells, x outer and y inner. A cell that is
//! narrow or short (254px or less) uses one or two small tiles along its
//! long side instead of one large tile, so thin strips never allocate a
//! 512px texture.
//!
//! ```text
//!  content   border   texture
//!  254       1        256      small
//!  508       2        512      large
//! ```
//!
//! The border repeats neighbouring image pixels so filtering at a seam never
//! samples outside the image content.

use std::sync::Arc;

use glview_core::Rect;

use super::ImageSource;
use crate::texture::BasicTexture;

/// Size class of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileClass {
    /// 254px content, 1px border, 256px texture.
    Small,
    /// 508px content, 2px border, 512px texture.
    Large,
}

impl TileClass {
    /// Largest content edge of the class.
    #[must_use]
    pub const fn content_size(self) -> u32 {
        match self {
            Self::Small => 254,
            Self::Large => 508,
        }
    }

    /// Border on each side.
    #[must_use]
    pub const fn border(self) -> u32 {
        match self {
            Self::Small => 1,
            Self::Large => 2,
        }
    }

    /// Texture edge, always a power of two.
    #[must_use]
    pub const fn texture_size(self) -> u32 {
        self.content_size() + 2 * self.border()
    }
}

/// Where one tile sits in the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileSpec {
    /// Size class.
    pub class: TileClass,
    /// Left edge of the content in image pixels.
    pub x: u32,
    /// Top edge of the content in image pixels.
    pub y: u32,
    /// Content width.
    pub width: u32,
    /// Content height.
    pub height: u32,
}

impl TileSpec {
    /// Content rectangle in image coordinates.
    #[must_use]
    pub fn content_rect(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Border of the tile's class.
    #[must_use]
    pub fn border(&self) -> u32 {
        self.class.border()
    }
}

/// Computes the tiles covering a `width` x `height` image.
#[must_use]
pub fn plan_tiles(width: u32, height: u32) -> Vec<TileSpec> {
    let large = TileClass::Large.content_size();
    let small = TileClass::Small.content_size();
    let mut tiles = Vec::new();

    for x in (0..width).step_by(large as usize) {
        for y in (0..height).step_by(large as usize) {
            let w = large.min(width - x);
            let h = large.min(height - y);
            let tile = |x, y, width, height| TileSpec {
                class: TileClass::Small,
                x,
                y,
                width,
                height,
            };

            if w <= small {
                tiles.push(tile(x, y, w, small.min(h)));
                if h > small {
                    tiles.push(tile(x, y + small, w, h - small));
                }
            } else if h <= small {
                tiles.push(tile(x, y, small.min(w), h));
                if w > small {
                    tiles.push(tile(x + small, y, w - small, h));
                }
            } else {
                tiles.push(TileSpec {
                    class: TileClass::Large,
                    x,
                    y,
                    width: w,
                    height: h,
                });
            }
        }
    }
    tiles
}

/// A pooled tile texture placed on one image.
#[derive(Debug)]
pub struct Tile {
    pub(crate) texture: BasicTexture,
    spec: TileSpec,
}

impl Tile {
    /// Wraps a free tile texture of the matching class.
    pub(crate) fn bind(
        mut texture: BasicTexture,
        spec: TileSpec,
        image: &Arc<dyn ImageSource>,
        opaque: bool,
    ) -> Self {
        let border = spec.border();
        texture.set_content_size(spec.width + 2 * border, spec.height + 2 * border);
        texture.set_opaque(opaque);
        texture.set_tile_source(
            Arc::clone(image),
            spec.x as i32 - border as i32,
            spec.y as i32 - border as i32,
        );
        Self { texture, spec }
    }

    /// Detaches the tile from its image and hands back the texture.
    pub(crate) fn unbind(mut self) -> (TileClass, BasicTexture) {
        self.texture.clear_tile_source();
        self.texture.invalidate_content();
        (self.spec.class, self.texture)
    }

    /// Placement in the image.
    #[must_use]
    pub fn spec(&self) -> &TileSpec {
        &self.spec
    }

    /// The underlying texture.
    #[must_use]
    pub fn texture(&self) -> &BasicTexture {
        &self.texture
    }

    /// Maps an image-space rectangle inside this tile to texture space.
    #[must_use]
    pub fn texture_rect(&self, image_rect: &Rect) -> Rect {
        let border = self.spec.border() as f32;
        image_rect.offset(border - self.spec.x as f32, border - self.spec.y as f32)
    }
}
