//! # Worker Pool
//!
//! A bounded pool of background threads fed through a crossbeam channel.
//!
//! Threads are spawned lazily: a job submitted while no worker is idle
//! starts a new thread, up to `max_threads`. A worker that stays idle for
//! `keep_alive` exits, so a quiet pool costs no threads.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

use crate::error::{PoolError, PoolResult};

type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Default)]
struct Counters {
    live: usize,
    idle: usize,
    spawned: usize,
}

struct Shared {
    name: String,
    max_threads: usize,
    keep_alive: Duration,
    counters: Mutex<Counters>,
    exited: Condvar,
    jobs: Receiver<Job>,
}

/// Decrements the live count when a worker leaves, even by panic.
struct WorkerExit(Arc<Shared>);

impl Drop for WorkerExit {
    fn drop(&mut self) {
        let mut counters = self.0.counters.lock();
        counters.live -= 1;
        drop(counters);
        self.0.exited.notify_all();
    }
}

/// Pool snapshot for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Threads currently alive.
    pub live: usize,
    /// Threads waiting for work.
    pub idle: usize,
    /// Threads started over the pool lifetime.
    pub spawned: usize,
    /// Jobs waiting in the queue.
    pub queued: usize,
}

/// Bounded background thread pool.
pub struct WorkerPool {
    sender: Mutex<Option<Sender<Job>>>,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.shared.name)
            .field("max_threads", &self.shared.max_threads)
            .field("stats", &self.stats())
            .finish()
    }
}

impl WorkerPool {
    /// Creates an empty pool. Threads are named `{name}-{n}`.
    ///
    /// # Panics
    ///
    /// Panics if `max_threads` is zero.
    #[must_use]
    pub fn new(name: impl Into<String>, max_threads: usize, keep_alive: Duration) -> Self {
        assert!(max_threads > 0, "worker pool needs at least one thread");
        let (sender, jobs) = unbounded();
        Self {
            sender: Mutex::new(Some(sender)),
            shared: Arc::new(Shared {
                name: name.into(),
                max_threads,
                keep_alive,
                counters: Mutex::new(Counters::default()),
                exited: Condvar::new(),
                jobs,
            }),
        }
    }

    /// Queues a job.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] after [`shutdown`](Self::shutdown), or
    /// [`PoolError::Spawn`] if no worker is alive and none could be started.
    pub fn execute<F>(&self, job: F) -> PoolResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(PoolError::Closed)?;

        let spawn_id = {
            let mut counters = self.shared.counters.lock();
            if counters.idle == 0 && counters.live < self.shared.max_threads {
                counters.live += 1;
                counters.spawned += 1;
                Some(counters.spawned)
            } else {
                None
            }
        };

        if let Some(id) = spawn_id {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("{}-{id}", self.shared.name))
                .spawn(move || worker_loop(&shared));
            if let Err(error) = spawned {
                let live = {
                    let mut counters = self.shared.counters.lock();
                    counters.live -= 1;
                    counters.live
                };
                if live == 0 {
                    return Err(PoolError::Spawn(error));
                }
                warn!(
                    pool = %self.shared.name,
                    %error,
                    "worker spawn failed, queueing on existing workers"
                );
            }
        }

        sender.send(Box::new(job)).map_err(|_| PoolError::Closed)
    }

    /// Stops accepting jobs. Queued jobs still run.
    pub fn shutdown(&self) {
        self.sender.lock().take();
    }

    /// Waits until every worker has exited. Returns false on timeout.
    ///
    /// Workers exit once the pool is shut down and the queue is drained, or
    /// after the keep-alive interval with nothing to do.
    pub fn join(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut counters = self.shared.counters.lock();
        while counters.live > 0 {
            if self
                .shared
                .exited
                .wait_until(&mut counters, deadline)
                .timed_out()
            {
                return counters.live == 0;
            }
        }
        true
    }

    /// Returns a snapshot of the pool.
    #[must_use]
    pub fn stats(&self) -> WorkerStats {
        let counters = self.shared.counters.lock();
        WorkerStats {
            live: counters.live,
            idle: counters.idle,
            spawned: counters.spawned,
            queued: self.shared.jobs.len(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(shared: &Arc<Shared>) {
    let _exit = WorkerExit(Arc::clone(shared));
    loop {
        shared.counters.lock().idle += 1;
        let next = shared.jobs.recv_timeout(shared.keep_alive);
        shared.counters.lock().idle -= 1;

        match next {
            Ok(job) => job(),
            Err(RecvTimeoutError::Timeout) => {
                if shared.jobs.is_empty() {
                    debug!(pool = %shared.name, "worker idle, exiting");
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_runs_all_jobs() {
        let pool = WorkerPool::new("test-pool", 4, Duration::from_secs(5));
        let done = Arc::new(AtomicUsize::new(0));
        for _ in 0..32 {
            let done = Arc::clone(&done);
            pool.execute(move || {
                done.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
        pool.shutdown();
        assert!(pool.join(Duration::from_secs(5)));
        assert_eq!(done.load(Ordering::SeqCst), 32);
        assert!(pool.stats().spawned <= 4);
    }

    #[test]
    fn test_closed_pool_rejects_jobs() {
        let pool = WorkerPool::new("test-closed", 1, Duration::from_secs(1));
        pool.shutdown();
        assert!(matches!(pool.execute(|| {}), Err(PoolError::Closed)));
    }

    #[test]
    fn test_idle_workers_exit_after_keep_alive() {
        let pool = WorkerPool::new("test-keepalive", 2, Duration::from_millis(20));
        pool.execute(|| {}).unwrap();
        assert!(pool.join(Duration::from_secs(5)));
        assert_eq!(pool.stats().live, 0);
    }

    #[test]
    fn test_threads_are_named() {
        let pool = WorkerPool::new("named", 1, Duration::from_secs(1));
        let (tx, rx) = crossbeam_channel::bounded(1);
        pool.execute(move || {
            let _ = tx.send(thread::current().name().map(str::to_owned));
        })
        .unwrap();
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name.as_deref(), Some("named-1"));
    }
}
