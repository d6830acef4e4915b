//! Time-boxed background tile upload.

use std::collections::VecDeque;
use std::sync::Arc;

use glview_core::FrameClock;
use parking_lot::Mutex;
use tracing::trace;

use super::texture::ImageTexture;
use crate::canvas::Canvas;
use crate::host::{IdleListener, RenderHost};

struct Queue {
    textures: VecDeque<Arc<ImageTexture>>,
    /// An upload pass sits in the host's idle queue.
    queued: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    host: Arc<dyn RenderHost>,
    clock: Arc<dyn FrameClock>,
    budget_ms: u64,
}

/// FIFO of image textures whose tiles upload between frames.
///
/// Each idle pass uploads tiles of the head texture one at a time until the
/// texture is complete (it is dropped from the queue and a frame requested)
/// or the time budget is spent. The pass stays queued while work remains.
#[derive(Clone)]
pub struct Uploader {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let queue = self.shared.queue.lock();
        f.debug_struct("Uploader")
            .field("pending", &queue.textures.len())
            .field("queued", &queue.queued)
            .field("budget_ms", &self.shared.budget_ms)
            .finish_non_exhaustive()
    }
}

impl Uploader {
    /// Creates an uploader spending at most `budget_ms` per idle pass.
    #[must_use]
    pub fn new(host: Arc<dyn RenderHost>, clock: Arc<dyn FrameClock>, budget_ms: u64) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    textures: VecDeque::with_capacity(8),
                    queued: false,
                }),
                host,
                clock,
                budget_ms,
            }),
        }
    }

    /// Queues a texture unless it is already fully uploaded.
    pub fn add_texture(&self, texture: Arc<ImageTexture>) {
        if texture.is_ready() {
            return;
        }
        let mut queue = self.shared.queue.lock();
        queue.textures.push_back(texture);
        if queue.queued {
            return;
        }
        queue.queued = true;
        self.shared
            .host
            .add_idle_listener(Box::new(UploadPass(Arc::clone(&self.shared))));
    }

    /// Drops every queued texture.
    pub fn clear(&self) {
        self.shared.queue.lock().textures.clear();
    }

    /// Textures waiting for upload.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().textures.len()
    }
}

struct UploadPass(Arc<Shared>);

impl IdleListener for UploadPass {
    fn on_idle(&mut self, canvas: &mut dyn Canvas, _render_requested: bool) -> bool {
        let shared = &self.0;
        let mut queue = shared.queue.lock();
        let mut now = shared.clock.now_ms();
        let due = now + shared.budget_ms;
        let mut uploaded = 0_u32;

        while now < due {
            let Some(head) = queue.textures.front() else {
                break;
            };
            if head.upload_next_tile(canvas) {
                queue.textures.pop_front();
                shared.host.request_render();
            }
            uploaded += 1;
            now = shared.clock.now_ms();
        }

        queue.queued = !queue.textures.is_empty();
        trace!(uploaded, remaining = queue.textures.len(), "upload pass");
        queue.queued
    }
}
