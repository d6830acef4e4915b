//! # UI Error Types
//!
//! Failures of the render loop and of configuration loading.

use thiserror::Error;

/// Errors raised by [`GlRoot`](crate::GlRoot).
#[derive(Error, Debug)]
pub enum RootError {
    /// The OS refused to start the render thread.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The render thread has exited.
    #[error("render thread is gone")]
    RenderThreadGone,
}

/// Result type for render loop operations.
pub type RootResult<T> = Result<T, RootError>;

/// Errors raised while loading a [`GlviewConfig`](crate::GlviewConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;
