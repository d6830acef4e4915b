//! # Tiled Image Streaming
//!
//! ```text
//!                 ┌──────────────────── StreamingEngine ────────────────────┐
//!                 │  TilePool (small/large)   WorkerPool   AdmissionGate    │
//!                 └───────┬──────────────────────┬──────────────┬───────────┘
//!                         │ tiles                │ task         │ decode permit
//!                         ▼                      ▼              ▼
//!  ImageSource ──► ImageTexture ◄── frame_dirty ── animation task (advance, pace)
//!                         │
//!                         │ upload_next_tile (render thread, idle time)
//!                         ▼
//!                     Uploader ── 4ms per pass ──► RenderHost idle queue
//! ```
//!
//! Tiles are obtained from the pool when a texture is created and handed
//! back on recycle. Content uploads lazily: the uploader pushes tiles ahead
//! of time between frames, and a draw uploads whatever is still missing.

mod animator;
mod engine;
mod frames;
mod pool;
mod source;
mod texture;
mod tile;
mod uploader;

pub use animator::FramePacer;
pub use engine::StreamingEngine;
pub use frames::{Frame, FrameDecoder, FrameSequence};
pub use pool::{TilePool, TilePoolStats};
pub use source::ImageSource;
pub use texture::ImageTexture;
pub use tile::{plan_tiles, Tile, TileClass, TileSpec};
pub use uploader::Uploader;
