//! Streaming engine: the owner of the tile pool and the animation workers.

use std::sync::Arc;
use std::time::Duration;

use glview_core::sync::WorkerStats;
use glview_core::{AdmissionGate, FrameClock, MonotonicClock, WorkerPool};

use super::pool::TilePool;
use super::texture::ImageTexture;
use super::uploader::Uploader;
use super::ImageSource;
use crate::config::StreamingConfig;
use crate::host::RenderHost;

pub(crate) struct EngineShared {
    pub(crate) pool: TilePool,
    pub(crate) workers: WorkerPool,
    pub(crate) gate: AdmissionGate,
    pub(crate) clock: Arc<dyn FrameClock>,
    pub(crate) config: StreamingConfig,
}

/// Factory of [`ImageTexture`]s sharing one tile pool, one worker pool and
/// one decode admission gate.
///
/// Cheap to clone. Independent engines share nothing, so several render
/// loops can run side by side.
#[derive(Clone)]
pub struct StreamingEngine {
    shared: Arc<EngineShared>,
}

impl std::fmt::Debug for StreamingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingEngine")
            .field("config", &self.shared.config)
            .field("pool", &self.shared.pool.stats())
            .field("workers", &self.shared.workers.stats())
            .finish_non_exhaustive()
    }
}

impl StreamingEngine {
    /// Creates an engine on the wall clock.
    #[must_use]
    pub fn new(config: StreamingConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Creates an engine on a given clock.
    #[must_use]
    pub fn with_clock(config: StreamingConfig, clock: Arc<dyn FrameClock>) -> Self {
        let workers = WorkerPool::new(
            "glview-decode",
            config.max_decode_threads.max(1),
            Duration::from_millis(config.decode_keep_alive_ms),
        );
        let gate = AdmissionGate::new(config.decode_permits.max(1));
        Self {
            shared: Arc::new(EngineShared {
                pool: TilePool::new(),
                workers,
                gate,
                clock,
                config,
            }),
        }
    }

    /// Cuts `image` into pooled tiles. Starts the decode task right away
    /// if the image is not fully decoded.
    #[must_use]
    pub fn create_texture(&self, image: Arc<dyn ImageSource>) -> Arc<ImageTexture> {
        Arc::new(ImageTexture::new(image, Arc::clone(&self.shared)))
    }

    /// Creates an uploader feeding `host`'s idle queue.
    #[must_use]
    pub fn uploader(&self, host: Arc<dyn RenderHost>) -> Uploader {
        Uploader::new(
            host,
            Arc::clone(&self.shared.clock),
            self.shared.config.upload_budget_ms,
        )
    }

    /// The tile pool.
    #[must_use]
    pub fn pool(&self) -> &TilePool {
        &self.shared.pool
    }

    /// The clock used for pacing and upload budgets.
    #[must_use]
    pub fn clock(&self) -> &Arc<dyn FrameClock> {
        &self.shared.clock
    }

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &StreamingConfig {
        &self.shared.config
    }

    /// The decode admission gate.
    #[must_use]
    pub fn gate(&self) -> &AdmissionGate {
        &self.shared.gate
    }

    /// Animation worker counters.
    #[must_use]
    pub fn worker_stats(&self) -> WorkerStats {
        self.shared.workers.stats()
    }

    /// Stops accepting animation tasks and waits up to `timeout` for
    /// running ones. Returns true if every worker exited.
    pub fn shutdown(&self, timeout: Duration) -> bool {
        self.shared.workers.shutdown();
        self.shared.workers.join(timeout)
    }
}
