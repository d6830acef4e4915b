//! Streaming engine configuration.

use serde::{Deserialize, Serialize};

use crate::canvas::DEFAULT_UPLOADS_PER_FRAME;

/// Tuning knobs of the tile streaming engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Time one uploader pass may spend uploading tiles (ms).
    pub upload_budget_ms: u64,
    /// Decodes allowed to run at the same time.
    pub decode_permits: usize,
    /// Upper bound on animation worker threads.
    pub max_decode_threads: usize,
    /// How long an idle worker thread waits for work before exiting (ms).
    pub decode_keep_alive_ms: u64,
    /// Throttled texture uploads allowed per frame.
    pub uploads_per_frame: u32,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            // A 60fps frame has 16ms, a quarter of it goes to uploads.
            upload_budget_ms: 4,
            decode_permits: 3,
            max_decode_threads: 16,
            decode_keep_alive_ms: 10_000,
            uploads_per_frame: DEFAULT_UPLOADS_PER_FRAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: StreamingConfig = toml::from_str("upload_budget_ms = 8").unwrap();
        assert_eq!(config.upload_budget_ms, 8);
        assert_eq!(config.decode_permits, 3);
        assert_eq!(config.uploads_per_frame, DEFAULT_UPLOADS_PER_FRAME);
    }
}
