//! # Frame Animator
//!
//! Background task of an animated [`ImageTexture`](super::ImageTexture).
//!
//! ```text
//! acquire guard ─► complete() under the admission gate ─► release guard
//!                                                           │
//!                        frame_count <= 1 or released ◄─────┤ exit
//!                                                           ▼
//!     ┌─► acquire guard ─► advance ─► pace ─► mark dirty ─► release guard ─► sleep ─┐
//!     └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop never touches the GPU. It marks the frame dirty and the render
//! thread invalidates the tiles on its next draw. A release requested while
//! the task holds the guard is carried out by the task itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use glview_core::sync::{BusyOutcome, GuardState, ReleaseRequest};
use glview_core::{AdmissionGate, FrameClock, ResourceGuard, WorkerPool};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::ImageSource;
use crate::host::TextureCallback;

/// Error-feedback frame pacing.
///
/// Each frame's delay is shortened by the time the previous tick overran its
/// own delay, so slow advances do not accumulate drift. The result is not
/// clamped: a negative delay means the next frame is already late and is
/// advanced without sleeping.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramePacer {
    last: Option<(u64, i64)>,
}

impl FramePacer {
    /// Creates a pacer with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how long to sleep after the frame shown at `now_ms` whose
    /// nominal delay is `delay_ms`.
    pub fn next_delay(&mut self, delay_ms: u64, now_ms: u64) -> i64 {
        let mut delay = delay_ms as i64;
        if let Some((last_time, last_delay)) = self.last {
            let elapsed = now_ms.saturating_sub(last_time) as i64;
            delay -= elapsed - last_delay;
        }
        self.last = Some((now_ms, delay));
        delay
    }
}

/// State shared by a texture and its animation task.
pub(crate) struct FrameShared {
    pub(crate) image: Arc<dyn ImageSource>,
    pub(crate) guard: ResourceGuard,
    pub(crate) running: AtomicBool,
    pub(crate) request_animation: AtomicBool,
    pub(crate) frame_dirty: AtomicBool,
    task_active: Mutex<bool>,
    callback: Mutex<Option<Weak<dyn TextureCallback>>>,
    gate: AdmissionGate,
    clock: Arc<dyn FrameClock>,
}

impl FrameShared {
    pub(crate) fn new(
        image: Arc<dyn ImageSource>,
        gate: AdmissionGate,
        clock: Arc<dyn FrameClock>,
    ) -> Self {
        Self {
            image,
            guard: ResourceGuard::new(),
            running: AtomicBool::new(false),
            request_animation: AtomicBool::new(false),
            frame_dirty: AtomicBool::new(false),
            task_active: Mutex::new(false),
            callback: Mutex::new(None),
            gate,
            clock,
        }
    }

    pub(crate) fn set_callback(&self, callback: Option<Weak<dyn TextureCallback>>) {
        *self.callback.lock() = callback;
    }

    pub(crate) fn invalidate_self(&self) {
        let callback = self.callback.lock().as_ref().and_then(Weak::upgrade);
        if let Some(callback) = callback {
            callback.invalidate_texture();
        }
    }

    pub(crate) fn is_task_active(&self) -> bool {
        *self.task_active.lock()
    }

    /// Starts the animation task unless one is already alive.
    pub(crate) fn schedule(self: &Arc<Self>, workers: &WorkerPool) {
        let mut active = self.task_active.lock();
        if *active {
            return;
        }
        let shared = Arc::clone(self);
        match workers.execute(move || shared.run()) {
            Ok(()) => *active = true,
            Err(error) => warn!(%error, "animation task not scheduled"),
        }
    }

    /// Drops the decoded image now or hands that job to the running task.
    pub(crate) fn request_release(&self) {
        match self.guard.request_release() {
            ReleaseRequest::ReleaseNow => self.release_image(),
            ReleaseRequest::Deferred => debug!("image busy, release deferred"),
            ReleaseRequest::AlreadyReleased => {}
        }
    }

    /// Leaves a busy section, performing a release requested meanwhile.
    /// Returns false if the image is gone.
    pub(crate) fn leave_busy(&self) -> bool {
        match self.guard.release_busy() {
            BusyOutcome::Continue => true,
            BusyOutcome::ReleaseNow => {
                self.release_image();
                false
            }
        }
    }

    fn release_image(&self) {
        self.image.release();
        self.guard.mark_released();
        debug!("decoded image released");
    }

    /// Marks the task finished if `exit` holds, under the task lock so a
    /// concurrent `start` either sees the task alive or schedules a new one.
    fn exit_if(&self, exit: impl FnOnce() -> bool) -> bool {
        let mut active = self.task_active.lock();
        if exit() {
            *active = false;
            return true;
        }
        false
    }

    fn run(&self) {
        debug!(
            width = self.image.width(),
            height = self.image.height(),
            "animation task started"
        );
        self.animate();
        debug!("animation task exited");
    }

    fn animate(&self) {
        if self.exit_if(|| self.image.is_recycled() || !self.guard.try_acquire()) {
            return;
        }

        if !self.image.is_completed() {
            let _permit = self.gate.acquire();
            if !self.guard.is_released() {
                match self.image.complete() {
                    Ok(()) => {
                        self.frame_dirty.store(true, Ordering::Release);
                        self.invalidate_self();
                    }
                    Err(error) => debug!(%error, "decode failed"),
                }
            }
        }
        let frame_count = self.image.frame_count();

        let alive = self.leave_busy();
        if self.exit_if(|| !alive || frame_count <= 1) {
            return;
        }

        if self.request_animation.load(Ordering::Acquire) {
            self.running.store(true, Ordering::Release);
        }

        let mut pacer = FramePacer::new();
        loop {
            let stop = self.exit_if(|| {
                self.image.is_recycled()
                    || !self.running.load(Ordering::Acquire)
                    || !self.guard.try_acquire()
            });
            if stop {
                return;
            }

            let advanced = match self.image.advance() {
                Ok(()) => true,
                Err(error) => {
                    debug!(%error, "frame advance failed");
                    false
                }
            };
            let delay = pacer.next_delay(self.image.delay_ms(), self.clock.now_ms());
            if advanced {
                self.frame_dirty.store(true, Ordering::Release);
                self.invalidate_self();
            }

            if !self.leave_busy() {
                self.exit_if(|| true);
                return;
            }

            if delay > 0 {
                thread::sleep(Duration::from_millis(delay as u64));
            }
        }
    }

    /// Start request from the owning texture.
    pub(crate) fn start(self: &Arc<Self>, workers: &WorkerPool) {
        if !self.guard.try_acquire() {
            if self.guard.state() == GuardState::Busy {
                self.request_animation.store(true, Ordering::Release);
            }
            return;
        }

        let end = self.image.is_recycled()
            || (self.image.is_completed() && self.image.frame_count() <= 1)
            || self.running.load(Ordering::Acquire);

        if !self.leave_busy() || end {
            return;
        }

        self.running.store(true, Ordering::Release);
        self.schedule(workers);
    }

    pub(crate) fn stop(&self) {
        self.running.store(false, Ordering::Release);
        self.request_animation.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_uses_nominal_delay() {
        let mut pacer = FramePacer::new();
        assert_eq!(pacer.next_delay(100, 1_000), 100);
    }

    #[test]
    fn test_overrun_is_subtracted() {
        let mut pacer = FramePacer::new();
        pacer.next_delay(100, 0);
        // Woke 10ms late.
        assert_eq!(pacer.next_delay(100, 110), 90);
        // Back on schedule: 90ms slept, 90ms elapsed.
        assert_eq!(pacer.next_delay(100, 200), 100);
    }

    #[test]
    fn test_negative_delay_is_kept() {
        let mut pacer = FramePacer::new();
        pacer.next_delay(20, 0);
        assert_eq!(pacer.next_delay(20, 100), -60);
    }
}
