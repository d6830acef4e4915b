//! # Configuration
//!
//! Loaded once at startup from TOML. Every table and key is optional:
//!
//! ```toml
//! [root]
//! slow_frame_ms = 12
//! clear_color = [0.1, 0.1, 0.1, 1.0]
//!
//! [streaming]
//! upload_budget_ms = 4
//! decode_permits = 2
//! ```

use std::path::Path;

use glview_render::{Color, StreamingConfig};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Render loop settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RootConfig {
    /// Frames slower than this are logged (ms).
    pub slow_frame_ms: u64,
    /// RGBA color the surface is cleared to before each frame.
    pub clear_color: [f32; 4],
    /// Name of the render thread.
    pub thread_name: String,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            // Half a 60fps frame.
            slow_frame_ms: 8,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            thread_name: "glview-render".to_string(),
        }
    }
}

impl RootConfig {
    /// The clear color.
    #[must_use]
    pub fn clear_color(&self) -> Color {
        let [r, g, b, a] = self.clear_color;
        Color::rgba(r, g, b, a)
    }
}

/// Complete configuration file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlviewConfig {
    /// Render loop.
    pub root: RootConfig,
    /// Tile streaming.
    pub streaming: StreamingConfig,
}

impl GlviewConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed input and
    /// [`ConfigError::Invalid`] on out-of-range values.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> ConfigResult<()> {
        let streaming = &self.streaming;
        if streaming.decode_permits == 0 {
            return Err(ConfigError::Invalid("streaming.decode_permits must be > 0".into()));
        }
        if streaming.max_decode_threads == 0 {
            return Err(ConfigError::Invalid(
                "streaming.max_decode_threads must be > 0".into(),
            ));
        }
        if streaming.uploads_per_frame == 0 {
            return Err(ConfigError::Invalid(
                "streaming.uploads_per_frame must be > 0".into(),
            ));
        }
        if self.root.thread_name.is_empty() {
            return Err(ConfigError::Invalid("root.thread_name must not be empty".into()));
        }
        if self.root.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(ConfigError::Invalid(
                "root.clear_color components must be within 0..=1".into(),
            ));
        }
        Ok(())
    }
}
