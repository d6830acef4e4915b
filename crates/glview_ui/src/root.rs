//! # Render Loop
//!
//! [`GlRoot`] owns the render thread, the scene tree and the canvas.
//!
//! ```text
//!  UI thread                           render thread
//!  ─────────                           ─────────────
//!  request_render ──► RenderEvent::Render ──► lock ─► wait while frozen
//!  add_idle_listener ─► RenderEvent::Idle       │
//!  surface_* ──► RenderEvent::Surface* (acked)  ├─ delete recycled resources
//!  dispatch_touch ──► lock ─► content           ├─ reset upload budget
//!  freeze / unfreeze ──► freeze condvar         ├─ layout if needed
//!                                               ├─ clear, rotate, render
//!                                               ├─ latch launched animations
//!                                               └─ re-request if budget hit
//! ```
//!
//! ## Locks
//!
//! The render lock guards [`RenderState`]. The idle queue, the launched
//! animation list and the frame counters have their own locks, always taken
//! after the render lock, never before. Render and layout requests are
//! atomics so nodes may issue them while the render lock is held.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use glview_core::{FrameClock, LaunchLatch, Matrix, MonotonicClock, Rect};
use glview_render::{Canvas, IdleListener, RenderHost, DEFAULT_UPLOADS_PER_FRAME};
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info, trace, warn};

use crate::config::{GlviewConfig, RootConfig};
use crate::error::{RootError, RootResult};
use crate::input::{TouchAction, TouchEvent};
use crate::orientation::OrientationSource;
use crate::view::{MeasureSpec, SceneNode};

/// A canvas the render thread can own.
pub type BoxedCanvas = Box<dyn Canvas + Send>;

/// Surface state of the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// No graphics context.
    Uninitialized,
    /// A context exists but has no size yet.
    Ready,
    /// Sized and able to render.
    Sized,
}

/// Frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RootStats {
    /// Frames rendered.
    pub frames: u64,
    /// Frames slower than [`RootConfig::slow_frame_ms`].
    pub slow_frames: u64,
    /// Duration of the last frame (ms).
    pub last_frame_ms: u64,
    /// Idle listener invocations.
    pub idle_runs: u64,
}

enum RenderEvent {
    Render,
    Idle,
    SurfaceCreated(BoxedCanvas, Sender<()>),
    SurfaceChanged(u32, u32, Sender<()>),
    SurfaceDestroyed(Sender<()>),
    Shutdown,
}

/// Everything guarded by the render lock.
pub struct RenderState {
    canvas: Option<BoxedCanvas>,
    content: Option<SceneNode>,
    lifecycle: Lifecycle,
    width: u32,
    height: u32,
    display_rotation: i32,
    compensation: i32,
    compensation_matrix: Matrix,
    orientation: Option<Arc<dyn OrientationSource>>,
    frozen: bool,
    in_down_state: bool,
}

impl RenderState {
    fn new() -> Self {
        Self {
            canvas: None,
            content: None,
            lifecycle: Lifecycle::Uninitialized,
            width: 0,
            height: 0,
            display_rotation: 0,
            compensation: 0,
            compensation_matrix: Matrix::IDENTITY,
            orientation: None,
            frozen: false,
            in_down_state: false,
        }
    }

    /// The content pane.
    #[must_use]
    pub fn content(&self) -> Option<&SceneNode> {
        self.content.as_ref()
    }

    /// The content pane, mutably.
    pub fn content_mut(&mut self) -> Option<&mut SceneNode> {
        self.content.as_mut()
    }

    /// The canvas, if a surface exists.
    pub fn canvas_mut(&mut self) -> Option<&mut dyn Canvas> {
        match self.canvas.as_deref_mut() {
            Some(canvas) => Some(canvas as &mut dyn Canvas),
            None => None,
        }
    }

    /// Surface state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    fn rotation_changed(&self) -> bool {
        self.orientation
            .as_ref()
            .is_some_and(|source| source.display_rotation() != self.display_rotation)
    }

    fn layout_content(&mut self) {
        let (rotation, compensation) = self
            .orientation
            .as_ref()
            .map_or((0, 0), |source| (source.display_rotation(), source.compensation()));
        self.display_rotation = rotation;
        self.compensation = compensation;
        self.compensation_matrix = compensation_matrix(compensation, self.width, self.height);

        let (mut width, mut height) = (self.width, self.height);
        if compensation % 180 != 0 {
            std::mem::swap(&mut width, &mut height);
        }
        info!(width, height, compensation, "layout content pane");

        if let Some(content) = &mut self.content {
            if width != 0 && height != 0 {
                let (w, h) = (width as f32, height as f32);
                content.measure(MeasureSpec::Exactly(w), MeasureSpec::Exactly(h));
                content.layout(Rect::new(0.0, 0.0, w, h));
            }
        }
    }
}

/// Maps surface coordinates to content coordinates for a compensation.
///
/// For 90 and 270 degrees the content is laid out with width and height
/// swapped, so the center moves from `(w/2, h/2)` to `(h/2, w/2)`.
#[must_use]
pub fn compensation_matrix(compensation: i32, width: u32, height: u32) -> Matrix {
    let (cx, cy) = ((width / 2) as f32, (height / 2) as f32);
    if compensation % 180 != 0 {
        let mut matrix = Matrix::rotation(compensation as f32);
        matrix.pre_translate(-cx, -cy);
        matrix.post_translate(cy, cx);
        matrix
    } else {
        Matrix::rotation_about(compensation as f32, cx, cy)
    }
}

fn rotate_canvas(canvas: &mut dyn Canvas, degrees: i32, width: u32, height: u32) {
    if degrees == 0 {
        return;
    }
    let (cx, cy) = ((width / 2) as f32, (height / 2) as f32);
    canvas.translate(cx, cy);
    canvas.rotate(degrees as f32);
    if degrees % 180 != 0 {
        canvas.translate(-cy, -cx);
    } else {
        canvas.translate(-cx, -cy);
    }
}

struct IdleQueue {
    listeners: VecDeque<Box<dyn IdleListener>>,
    /// An idle event is in the render thread's queue.
    active: bool,
}

struct RootInner {
    config: RootConfig,
    clock: Arc<dyn FrameClock>,
    host: Arc<dyn RenderHost>,
    state: Mutex<RenderState>,
    freeze: Condvar,
    render_requested: AtomicBool,
    needs_layout: AtomicBool,
    paused: AtomicBool,
    surface_ready: AtomicBool,
    uploads_per_frame: AtomicU32,
    idle: Mutex<IdleQueue>,
    launched: Mutex<Vec<Arc<LaunchLatch>>>,
    stats: Mutex<RootStats>,
    frame_done: Condvar,
    events: Sender<RenderEvent>,
}

impl RootInner {
    fn send(&self, event: RenderEvent) -> RootResult<()> {
        self.events
            .send(event)
            .map_err(|_| RootError::RenderThreadGone)
    }

    fn request_render(&self) {
        if self.render_requested.swap(true, Ordering::AcqRel) {
            return;
        }
        if self.send(RenderEvent::Render).is_err() {
            debug!("render requested after shutdown");
        }
    }

    fn request_render_forced(&self) {
        if self.send(RenderEvent::Render).is_err() {
            debug!("render requested after shutdown");
        }
    }

    fn request_layout(&self) {
        if self.needs_layout.swap(true, Ordering::AcqRel) {
            return;
        }
        self.request_render();
    }

    fn add_idle_listener(&self, listener: Box<dyn IdleListener>) {
        let mut idle = self.idle.lock();
        idle.listeners.push_back(listener);
        // Before the surface exists the listener waits for surface_created.
        if self.surface_ready.load(Ordering::Acquire) {
            self.enable_idle(&mut idle);
        }
    }

    fn enable_idle(&self, idle: &mut IdleQueue) {
        if idle.active {
            return;
        }
        idle.active = true;
        if self.send(RenderEvent::Idle).is_err() {
            idle.active = false;
        }
    }

    fn register_launched_animation(&self, latch: Arc<LaunchLatch>) {
        self.launched.lock().push(latch);
    }

    fn unfreeze(&self) {
        self.state.lock().frozen = false;
        self.freeze.notify_all();
    }

    fn run(&self, events: &Receiver<RenderEvent>) {
        for event in events {
            match event {
                RenderEvent::Render => self.draw_frame(),
                RenderEvent::Idle => self.run_idle(),
                RenderEvent::SurfaceCreated(canvas, ack) => {
                    self.on_surface_created(canvas);
                    // The caller may have given up waiting.
                    ack.send(()).ok();
                }
                RenderEvent::SurfaceChanged(width, height, ack) => {
                    self.on_surface_changed(width, height);
                    ack.send(()).ok();
                }
                RenderEvent::SurfaceDestroyed(ack) => {
                    self.on_surface_destroyed();
                    ack.send(()).ok();
                }
                RenderEvent::Shutdown => break,
            }
        }
    }

    fn on_surface_created(&self, mut canvas: BoxedCanvas) {
        canvas
            .upload_budget()
            .set_limit(self.uploads_per_frame.load(Ordering::Acquire));
        {
            let mut state = self.state.lock();
            let context = canvas.context_id();
            if let Some(old) = state.canvas.take() {
                old.recycler().close();
                info!(?context, "graphics context replaced");
            } else {
                info!(?context, "surface created");
            }
            state.canvas = Some(canvas);
            state.lifecycle = Lifecycle::Ready;
        }
        self.surface_ready.store(true, Ordering::Release);
        let mut idle = self.idle.lock();
        if !idle.listeners.is_empty() {
            self.enable_idle(&mut idle);
        }
    }

    fn on_surface_changed(&self, width: u32, height: u32) {
        {
            let mut state = self.state.lock();
            let Some(canvas) = state.canvas.as_deref_mut() else {
                warn!(width, height, "surface changed without a surface");
                return;
            };
            canvas.set_size(width, height);
            state.width = width;
            state.height = height;
            state.lifecycle = Lifecycle::Sized;
            info!(width, height, "surface changed");
        }
        self.needs_layout.store(true, Ordering::Release);
        self.request_render();
    }

    fn on_surface_destroyed(&self) {
        self.surface_ready.store(false, Ordering::Release);
        let mut state = self.state.lock();
        // Resources of a lost context are gone with it.
        if let Some(canvas) = state.canvas.take() {
            canvas.recycler().close();
        }
        state.lifecycle = Lifecycle::Uninitialized;
        info!("surface destroyed");
    }

    fn draw_frame(&self) {
        let started = Instant::now();
        let mut guard = self.state.lock();
        while guard.frozen {
            self.freeze.wait(&mut guard);
        }

        if self.paused.load(Ordering::Acquire) || guard.lifecycle != Lifecycle::Sized {
            self.render_requested.store(false, Ordering::Release);
            // A skipped frame still hands the thread to queued idle work.
            if guard.canvas.is_some() {
                let mut idle = self.idle.lock();
                if !idle.listeners.is_empty() {
                    self.enable_idle(&mut idle);
                }
            }
            return;
        }

        let state = &mut *guard;
        if let Some(canvas) = state.canvas.as_deref_mut() {
            canvas.delete_recycled_resources();
            canvas.upload_budget().reset();
        }
        self.render_requested.store(false, Ordering::Release);

        if self.needs_layout.swap(false, Ordering::AcqRel) || state.rotation_changed() {
            state.layout_content();
        }

        let (width, height, compensation) = (state.width, state.height, state.compensation);
        let RenderState {
            canvas, content, ..
        } = state;
        let Some(canvas) = canvas.as_deref_mut() else {
            return;
        };

        // Every frame starts from a defined buffer.
        canvas.clear_buffer_with(self.config.clear_color());
        canvas.save();
        rotate_canvas(canvas, -compensation, width, height);
        if let Some(content) = content {
            content.render(canvas);
        }
        canvas.restore();

        let now = self.clock.now_ms();
        for latch in self.launched.lock().drain(..) {
            latch.set(now);
        }

        let budget = *canvas.upload_budget();
        if budget.reached() {
            self.request_render();
        }

        {
            let mut idle = self.idle.lock();
            if !idle.listeners.is_empty() {
                self.enable_idle(&mut idle);
            }
        }
        drop(guard);

        let elapsed = started.elapsed().as_millis() as u64;
        trace!(uploads = budget.used(), elapsed_ms = elapsed, "frame");
        {
            let mut stats = self.stats.lock();
            stats.frames += 1;
            stats.last_frame_ms = elapsed;
            if elapsed > self.config.slow_frame_ms {
                stats.slow_frames += 1;
                warn!(elapsed_ms = elapsed, "slow frame");
            }
        }
        self.frame_done.notify_all();
    }

    fn run_idle(&self) {
        let mut listener = {
            let mut idle = self.idle.lock();
            idle.active = false;
            match idle.listeners.pop_front() {
                Some(listener) => listener,
                None => return,
            }
        };

        let keep = {
            let mut state = self.state.lock();
            let render_requested = self.render_requested.load(Ordering::Acquire);
            state
                .canvas
                .as_deref_mut()
                .map(|canvas| listener.on_idle(canvas, render_requested))
        };
        self.stats.lock().idle_runs += 1;

        let mut idle = self.idle.lock();
        let Some(keep) = keep else {
            // The surface went away; wait for the next one.
            idle.listeners.push_front(listener);
            return;
        };
        if keep {
            idle.listeners.push_back(listener);
        }
        if !self.render_requested.load(Ordering::Acquire) && !idle.listeners.is_empty() {
            self.enable_idle(&mut idle);
        }
    }
}

/// Weak handle to a root, given to scene nodes and textures.
///
/// Every call is a no-op once the root is gone.
#[derive(Clone)]
pub struct RootHandle {
    inner: Weak<RootInner>,
}

impl std::fmt::Debug for RootHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootHandle")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}

impl RenderHost for RootHandle {
    fn request_render(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.request_render();
        }
    }

    fn request_layout(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.request_layout();
        }
    }

    fn add_idle_listener(&self, listener: Box<dyn IdleListener>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.add_idle_listener(listener);
        }
    }

    fn register_launched_animation(&self, latch: Arc<LaunchLatch>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.register_launched_animation(latch);
        }
    }
}

/// Exclusive access to the render state. The render thread is stopped
/// between frames while this is held.
pub struct RenderLock<'a> {
    guard: MutexGuard<'a, RenderState>,
}

impl std::ops::Deref for RenderLock<'_> {
    type Target = RenderState;

    fn deref(&self) -> &RenderState {
        &self.guard
    }
}

impl std::ops::DerefMut for RenderLock<'_> {
    fn deref_mut(&mut self) -> &mut RenderState {
        &mut self.guard
    }
}

/// The render-loop controller.
///
/// Rendering happens on a dedicated thread, on demand: a frame runs after a
/// [`request_render`](Self::request_render), and requests made before the
/// frame starts coalesce into one.
///
/// Methods that wait for the render thread (`surface_*`, [`pause`](Self::pause))
/// unfreeze first. None of them may be called while holding a
/// [`RenderLock`].
pub struct GlRoot {
    inner: Arc<RootInner>,
    thread: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for GlRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlRoot")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl GlRoot {
    /// Starts a root on the wall clock.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::Spawn`] if the render thread cannot start.
    pub fn new(config: RootConfig) -> RootResult<Self> {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Starts a root whose launched animations latch `clock`'s time.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::Spawn`] if the render thread cannot start.
    pub fn with_clock(config: RootConfig, clock: Arc<dyn FrameClock>) -> RootResult<Self> {
        let (events, receiver) = unbounded();
        let thread_name = config.thread_name.clone();
        let inner = Arc::new_cyclic(|weak: &Weak<RootInner>| {
            let host: Arc<dyn RenderHost> = Arc::new(RootHandle {
                inner: weak.clone(),
            });
            RootInner {
                config,
                clock,
                host,
                state: Mutex::new(RenderState::new()),
                freeze: Condvar::new(),
                render_requested: AtomicBool::new(false),
                needs_layout: AtomicBool::new(true),
                paused: AtomicBool::new(false),
                surface_ready: AtomicBool::new(false),
                uploads_per_frame: AtomicU32::new(DEFAULT_UPLOADS_PER_FRAME),
                idle: Mutex::new(IdleQueue {
                    listeners: VecDeque::new(),
                    active: false,
                }),
                launched: Mutex::new(Vec::new()),
                stats: Mutex::new(RootStats::default()),
                frame_done: Condvar::new(),
                events,
            }
        });

        let worker = Arc::clone(&inner);
        let thread = thread::Builder::new()
            .name(thread_name.clone())
            .spawn(move || {
                info!(thread = %thread_name, "render thread started");
                worker.run(&receiver);
                info!(thread = %thread_name, "render thread exited");
            })?;

        Ok(Self {
            inner,
            thread: Some(thread),
        })
    }

    /// Starts a root on the wall clock with the render loop settings and
    /// the per-frame upload limit of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::Spawn`] if the render thread cannot start.
    pub fn from_config(config: &GlviewConfig) -> RootResult<Self> {
        let root = Self::new(config.root.clone())?;
        root.set_uploads_per_frame(config.streaming.uploads_per_frame);
        Ok(root)
    }

    /// Sets how many throttled bitmap uploads one frame may perform.
    ///
    /// Applies to the current canvas and to every later surface. A limit
    /// of zero is raised to one.
    pub fn set_uploads_per_frame(&self, limit: u32) {
        let limit = limit.max(1);
        self.inner.uploads_per_frame.store(limit, Ordering::Release);
        if let Some(canvas) = self.inner.state.lock().canvas.as_deref_mut() {
            canvas.upload_budget().set_limit(limit);
        }
    }

    /// Returns the per-frame upload limit applied to new surfaces.
    #[must_use]
    pub fn uploads_per_frame(&self) -> u32 {
        self.inner.uploads_per_frame.load(Ordering::Acquire)
    }

    fn call(&self, event: impl FnOnce(Sender<()>) -> RenderEvent) -> RootResult<()> {
        self.inner.unfreeze();
        let (ack, done) = bounded(1);
        self.inner.send(event(ack))?;
        done.recv().map_err(|_| RootError::RenderThreadGone)
    }

    /// Hands a fresh graphics context to the render thread. Textures
    /// uploaded to an earlier context re-upload on their next draw.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::RenderThreadGone`] if the render thread exited.
    pub fn surface_created(&self, canvas: BoxedCanvas) -> RootResult<()> {
        self.call(|ack| RenderEvent::SurfaceCreated(canvas, ack))
    }

    /// Resizes the surface and schedules a layout and a frame.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::RenderThreadGone`] if the render thread exited.
    pub fn surface_changed(&self, width: u32, height: u32) -> RootResult<()> {
        self.call(|ack| RenderEvent::SurfaceChanged(width, height, ack))
    }

    /// Drops the graphics context.
    ///
    /// # Errors
    ///
    /// Returns [`RootError::RenderThreadGone`] if the render thread exited.
    pub fn surface_destroyed(&self) -> RootResult<()> {
        self.call(RenderEvent::SurfaceDestroyed)
    }

    /// Replaces the content pane and returns the old one, detached. A
    /// gesture in progress is cancelled on the old content.
    pub fn set_content_pane(&self, content: Option<SceneNode>) -> Option<SceneNode> {
        let mut state = self.inner.state.lock();
        let old = state.content.take().map(|mut old| {
            if state.in_down_state {
                let now = self.inner.clock.now_ms();
                old.dispatch_touch(&TouchEvent::new(TouchAction::Cancel, 0.0, 0.0, now));
                state.in_down_state = false;
            }
            old.detach();
            old
        });

        if let Some(mut content) = content {
            content.attach(&self.inner.host);
            state.content = Some(content);
            info!("content pane attached");
            drop(state);
            self.request_layout_content_pane();
        }
        old
    }

    /// Delivers a touch in surface coordinates. Returns true if the content
    /// consumed it.
    ///
    /// Events other than DOWN are dropped until a DOWN was consumed.
    pub fn dispatch_touch(&self, event: TouchEvent) -> bool {
        let mut state = self.inner.state.lock();
        let action = event.action;
        if action.ends_gesture() {
            state.in_down_state = false;
        } else if !state.in_down_state && action != TouchAction::Down {
            return false;
        }

        let event = if state.compensation == 0 {
            event
        } else {
            event.transformed(&state.compensation_matrix)
        };

        let handled = state
            .content
            .as_mut()
            .is_some_and(|content| content.dispatch_touch(&event));
        if action == TouchAction::Down && handled {
            state.in_down_state = true;
        }
        handled
    }

    /// Asks for a frame. Coalesces with requests not yet served.
    pub fn request_render(&self) {
        self.inner.request_render();
    }

    /// Asks for a frame even if one is already pending.
    pub fn request_render_forced(&self) {
        self.inner.request_render_forced();
    }

    /// Schedules a layout pass before the next frame.
    pub fn request_layout_content_pane(&self) {
        self.inner.request_layout();
    }

    /// Queues work for the render thread between frames.
    pub fn add_idle_listener(&self, listener: Box<dyn IdleListener>) {
        self.inner.add_idle_listener(listener);
    }

    /// Sets `latch` to the end time of the next frame.
    pub fn register_launched_animation(&self, latch: Arc<LaunchLatch>) {
        self.inner.register_launched_animation(latch);
    }

    /// Sets where rotation values come from, and relayouts.
    pub fn set_orientation_source(&self, source: Option<Arc<dyn OrientationSource>>) {
        self.inner.state.lock().orientation = source;
        self.request_layout_content_pane();
    }

    /// Blocks the render thread at the start of its next frame.
    pub fn freeze(&self) {
        self.inner.state.lock().frozen = true;
    }

    /// Releases a [`freeze`](Self::freeze).
    pub fn unfreeze(&self) {
        self.inner.unfreeze();
    }

    /// Stops rendering and pauses the content.
    pub fn pause(&self) {
        self.unfreeze();
        self.inner.paused.store(true, Ordering::Release);
        if let Some(content) = self.inner.state.lock().content.as_mut() {
            content.pause();
        }
        info!("render loop paused");
    }

    /// Resumes the content and renders a frame.
    pub fn resume(&self) {
        if let Some(content) = self.inner.state.lock().content.as_mut() {
            content.resume();
        }
        self.inner.paused.store(false, Ordering::Release);
        self.inner.render_requested.store(false, Ordering::Release);
        info!("render loop resumed");
        self.request_render();
    }

    /// Takes the render lock. No frame runs until the lock is dropped.
    pub fn lock_render_thread(&self) -> RenderLock<'_> {
        RenderLock {
            guard: self.inner.state.lock(),
        }
    }

    /// A weak handle implementing [`RenderHost`].
    #[must_use]
    pub fn handle(&self) -> RootHandle {
        RootHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The shared host handle, as given to attached nodes.
    #[must_use]
    pub fn host(&self) -> Arc<dyn RenderHost> {
        Arc::clone(&self.inner.host)
    }

    /// Display rotation used by the last layout.
    #[must_use]
    pub fn display_rotation(&self) -> i32 {
        self.inner.state.lock().display_rotation
    }

    /// Compensation used by the last layout.
    #[must_use]
    pub fn compensation(&self) -> i32 {
        self.inner.state.lock().compensation
    }

    /// Surface-to-content matrix of the last layout.
    #[must_use]
    pub fn compensation_matrix(&self) -> Matrix {
        self.inner.state.lock().compensation_matrix
    }

    /// Surface state.
    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        self.inner.state.lock().lifecycle
    }

    /// Frame counters.
    #[must_use]
    pub fn stats(&self) -> RootStats {
        *self.inner.stats.lock()
    }

    /// Waits until at least `frames` frames were rendered. Returns false on
    /// timeout.
    pub fn wait_for_frames(&self, frames: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stats = self.inner.stats.lock();
        while stats.frames < frames {
            if self
                .inner
                .frame_done
                .wait_until(&mut stats, deadline)
                .timed_out()
            {
                break;
            }
        }
        stats.frames >= frames
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &RootConfig {
        &self.inner.config
    }
}

impl Drop for GlRoot {
    fn drop(&mut self) {
        self.inner.unfreeze();
        self.inner.send(RenderEvent::Shutdown).ok();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("render thread panicked");
            }
        }
        if let Some(mut content) = self.inner.state.lock().content.take() {
            content.detach();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quarter_turn_swaps_center() {
        let matrix = compensation_matrix(90, 200, 100);
        let (x, y) = matrix.map_point(100.0, 50.0);
        assert!((x - 50.0).abs() < 1e-4 && (y - 100.0).abs() < 1e-4);
        let (x, y) = matrix.map_point(10.0, 20.0);
        assert!((x - 80.0).abs() < 1e-4 && (y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_half_turn_about_center() {
        let matrix = compensation_matrix(180, 200, 100);
        let (x, y) = matrix.map_point(0.0, 0.0);
        assert!((x - 200.0).abs() < 1e-4 && (y - 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_zero_is_identity() {
        assert!(compensation_matrix(0, 640, 480).approx_eq(&Matrix::IDENTITY, 1e-6));
    }

    #[test]
    fn test_canvas_rotation_inverts_touch_mapping() {
        use glview_render::SoftwareCanvas;

        let mut canvas = SoftwareCanvas::new(200, 100);
        rotate_canvas(&mut canvas, -90, 200, 100);
        let to_screen = canvas.matrix();
        let to_content = compensation_matrix(90, 200, 100);
        assert!(to_content.concat(&to_screen).approx_eq(&Matrix::IDENTITY, 1e-4));
    }
}
