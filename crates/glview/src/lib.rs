//! # GLVIEW
//!
//! A retained-mode rendering view: one dedicated render thread draws a
//! scene tree through a [`Canvas`](render::Canvas) while large and animated
//! images stream in as pooled tiles.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                             glview_ui                            │
//! │   GlRoot (render thread, freeze, idle queue, touch)  SceneNode   │
//! └───────────────┬─────────────────────────────────┬────────────────┘
//!                 │ RenderHost / IdleListener       │ NodeContent
//! ┌───────────────▼─────────────────────────────────▼────────────────┐
//! │                           glview_render                          │
//! │   Canvas + state stack   textures   ImageTexture / TilePool      │
//! │   Uploader (time-boxed)  animator (worker pool, admission gate)  │
//! └───────────────┬──────────────────────────────────────────────────┘
//!                 │
//! ┌───────────────▼──────────────────────────────────────────────────┐
//! │                            glview_core                           │
//! │   Rect / Matrix   Animation   FrameClock   WorkerPool   FreeList │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub use glview_core as core;
pub use glview_render as render;
pub use glview_ui as ui;

pub use glview_render::{Canvas, Color, SoftwareCanvas, StreamingConfig, StreamingEngine};
pub use glview_ui::{
    GlRoot, GlviewConfig, ImageNode, RootConfig, SceneNode, TouchAction, TouchEvent,
};
