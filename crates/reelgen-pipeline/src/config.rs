//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Pipeline configuration.
///
/// Per-stage timeouts are explicit; expiry is treated the same as the
/// stage failing outright.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Work directory for per-run temporary files
    pub work_dir: PathBuf,
    /// Directory rendered artifacts are written to
    pub output_dir: PathBuf,
    /// Base URL artifacts are served under
    pub public_base_url: String,
    /// Shared background-music pool directory
    pub music_dir: PathBuf,
    /// Timeout for a single stock video search call
    pub search_timeout: Duration,
    /// Timeout for a single cue text generation call
    pub textgen_timeout: Duration,
    /// Timeout for narration synthesis
    pub speech_timeout: Duration,
    /// Timeout for a single fragment download
    pub download_timeout: Duration,
    /// Timeout for the render
    pub render_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/reelgen"),
            output_dir: PathBuf::from("./output"),
            public_base_url: "/videos".to_string(),
            music_dir: PathBuf::from("./music"),
            search_timeout: Duration::from_secs(20),
            textgen_timeout: Duration::from_secs(20),
            speech_timeout: Duration::from_secs(60),
            download_timeout: Duration::from_secs(60),
            render_timeout: Duration::from_secs(300),
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("REELGEN_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/reelgen")),
            output_dir: std::env::var("REELGEN_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./output")),
            public_base_url: std::env::var("REELGEN_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "/videos".to_string()),
            music_dir: std::env::var("REELGEN_MUSIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./music")),
            search_timeout: duration_from_env("REELGEN_SEARCH_TIMEOUT_SECS", 20),
            textgen_timeout: duration_from_env("REELGEN_TEXTGEN_TIMEOUT_SECS", 20),
            speech_timeout: duration_from_env("REELGEN_SPEECH_TIMEOUT_SECS", 60),
            download_timeout: duration_from_env("REELGEN_DOWNLOAD_TIMEOUT_SECS", 60),
            render_timeout: duration_from_env("REELGEN_RENDER_TIMEOUT_SECS", 300),
        }
    }
}

fn duration_from_env(var: &str, default_secs: u64) -> Duration {
    Duration::from_secs(
        std::env::var(var)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(default_secs),
    )
}
