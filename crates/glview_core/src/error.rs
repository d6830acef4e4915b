//! # Core Error Types
//!
//! Errors raised by the background worker pool.

use thiserror::Error;

/// Errors that can occur when scheduling background work.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The OS refused to start another worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The pool was shut down.
    #[error("worker pool is closed")]
    Closed,
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;
