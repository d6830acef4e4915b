//! # GLVIEW Core
//!
//! Building blocks shared by the renderer and the scene tree:
//! - Geometry: [`Rect`] and the 2D affine [`Matrix`]
//! - Animation engine: [`Animation`], interpolators, launch latches
//! - Frame clocks for deterministic tests
//! - Sync primitives for background decode work
//!
//! ## Architecture Rules
//!
//! 1. **No GPU here** - everything in this crate runs on any thread
//! 2. **No globals** - pools and gates are owned values, injected where needed
//!
//! ## Example
//!
//! ```rust
//! use glview_core::anim::{FloatAnimation, RepeatCount, RepeatMode};
//!
//! let mut fade = FloatAnimation::float(0.0, 1.0, 200)
//!     .with_repeat(RepeatCount::Finite(1), RepeatMode::Restart);
//! fade.start_at(0);
//! assert!(fade.calculate(100));
//! assert!((fade.value() - 0.5).abs() < 1e-6);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod anim;
pub mod error;
pub mod math;
pub mod memory;
pub mod sync;
pub mod time;

pub use anim::{
    Animation, Calculate, Interpolator, LaunchLatch, RepeatCount, RepeatMode, RunState, Step,
};
pub use error::{PoolError, PoolResult};
pub use math::{Matrix, Rect};
pub use memory::FreeList;
pub use sync::{AdmissionGate, GatePermit, ResourceGuard, WorkerPool};
pub use time::{FrameClock, ManualClock, MonotonicClock};
