//! # Host Hooks
//!
//! The renderer never talks to the render loop directly. It goes through
//! these traits, implemented by the loop controller:
//!
//! - [`RenderHost`]: render/layout requests and idle work submission
//! - [`IdleListener`]: work run on the render thread between frames
//! - [`TextureCallback`]: told when an animated texture has a new frame

use std::sync::Arc;

use glview_core::LaunchLatch;

use crate::canvas::Canvas;

/// Requests a render loop accepts from any thread.
pub trait RenderHost: Send + Sync {
    /// Asks for a frame. Requests made before the frame starts coalesce.
    fn request_render(&self);

    /// Asks for a layout pass of the content before the next frame.
    fn request_layout(&self);

    /// Queues work to run on the render thread between frames.
    fn add_idle_listener(&self, listener: Box<dyn IdleListener>);

    /// Sets `latch` to the timestamp of the next completed frame.
    fn register_launched_animation(&self, latch: Arc<LaunchLatch>);
}

/// Work run on the render thread with the render lock held.
pub trait IdleListener: Send {
    /// Runs one slice of work. Returns true to stay queued.
    ///
    /// `render_requested` tells whether a frame is already pending, so long
    /// work can yield to it.
    fn on_idle(&mut self, canvas: &mut dyn Canvas, render_requested: bool) -> bool;
}

/// Receiver of "texture content changed" notifications.
pub trait TextureCallback: Send + Sync {
    /// Called from the animation worker after a frame advance.
    fn invalidate_texture(&self);
}
