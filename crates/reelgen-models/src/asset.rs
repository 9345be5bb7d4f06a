//! Resolved media asset references.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Minimum acceptable stock fragment duration (seconds).
pub const MIN_FRAGMENT_SECS: f64 = 8.0;

/// Maximum acceptable stock fragment duration (seconds).
pub const MAX_FRAGMENT_SECS: f64 = 40.0;

/// A resolved stock video fragment.
///
/// Created by the asset resolver with the duration window already validated,
/// consumed exactly once by the composition planner. Deduplication across
/// primary and fallback queries is by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AssetReference {
    /// Provider-side identity of the source video.
    pub id: u64,
    /// Direct download URL for the selected encoding.
    pub url: String,
    /// Source duration in seconds (within the validated window).
    pub duration_secs: f64,
    /// Encoding width in pixels.
    pub width: u32,
    /// Encoding height in pixels.
    pub height: u32,
}

impl AssetReference {
    /// Whether the selected encoding is taller than wide.
    pub fn is_portrait(&self) -> bool {
        self.height > self.width
    }
}

/// A rendered narration audio artifact.
///
/// Owned exclusively by one pipeline run; the file is deleted after the
/// render completes and on error cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NarrationAsset {
    /// Path of the audio file in the run's work directory.
    pub path: PathBuf,
    /// Provider voice identifier used for synthesis.
    pub voice_id: String,
}

impl NarrationAsset {
    pub fn new(path: impl Into<PathBuf>, voice_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            voice_id: voice_id.into(),
        }
    }
}
