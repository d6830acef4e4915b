//! # GLVIEW Render
//!
//! Drawing surface and texture streaming for the GLVIEW render loop:
//! - [`Canvas`]: transform/alpha state stack, shapes, texture draws
//! - [`SoftwareCanvas`]: CPU rasterizer used headless and in tests
//! - Textures: [`BasicTexture`] and [`FadeTexture`]
//! - [`image`]: large and animated images as pooled tiles, uploaded in
//!   time-boxed slices and advanced on background workers
//!
//! ## Threading Rules
//!
//! 1. **Canvas calls happen on the render thread** - workers only flip
//!    atomic flags and hand ids to a [`ResourceRecycler`]
//! 2. **Hosts are traits** - this crate never knows which loop drives it
//!
//! ## Example
//!
//! ```rust
//! use glview_render::{Canvas, Color, SoftwareCanvas};
//!
//! let mut canvas = SoftwareCanvas::new(16, 16);
//! canvas.save();
//! canvas.translate(4.0, 4.0);
//! canvas.fill_rect(0.0, 0.0, 8.0, 8.0, Color::WHITE);
//! canvas.restore();
//! assert_eq!(canvas.pixel(8, 8).a, 255);
//! assert_eq!(canvas.pixel(1, 1).a, 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod canvas;
pub mod color;
pub mod config;
pub mod error;
pub mod host;
pub mod image;
pub mod paint;
pub mod pixels;
pub mod texture;

pub use canvas::{
    BufferId, Canvas, CanvasStats, ContextId, DrawOp, ResourceRecycler, SaveFlags, Shape,
    SoftwareCanvas, TextureId, UploadBudget, DEFAULT_UPLOADS_PER_FRAME,
};
pub use color::Color;
pub use config::StreamingConfig;
pub use error::{ImageError, ImageResult};
pub use host::{IdleListener, RenderHost, TextureCallback};
pub use image::{FrameSequence, ImageSource, ImageTexture, StreamingEngine, Uploader};
pub use paint::Paint;
pub use pixels::{PixelBuffer, Rgba};
pub use texture::{BasicTexture, Drawable, FadeMode, FadeTexture};
