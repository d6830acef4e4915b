//! # Animation Engine
//!
//! Pure time to value calculators. Nothing here touches the GPU or spawns
//! threads: every animation is driven by one render pass calling
//! [`Animation::calculate`] with the frame timestamp.

mod animation;
mod interpolator;
mod latch;
mod values;

pub use animation::{Animation, Calculate, RepeatCount, RepeatMode, RunState, Step};
pub use interpolator::Interpolator;
pub use latch::LaunchLatch;
pub use values::{AlphaAnimation, FloatAnimation, FloatValue};
