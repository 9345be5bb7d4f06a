//! Run request, result and metadata models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::script::Mood;

/// A request to generate one promo video.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunRequest {
    /// Product name the video is about.
    pub subject: String,

    /// Optional product page URL (metadata only; not fetched by the pipeline).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_url: Option<String>,

    /// Narration mood.
    #[serde(default)]
    pub mood: Mood,

    /// Whether to synthesize narration. Narration failure is fatal only
    /// when this is set.
    #[serde(default = "default_true")]
    pub include_narration: bool,

    /// Whether to lay a background music track under the video.
    #[serde(default = "default_true")]
    pub include_music: bool,

    /// Locale hint for script templates and narration.
    #[serde(default = "default_locale")]
    pub locale: String,
}

fn default_true() -> bool {
    true
}

fn default_locale() -> String {
    "en".to_string()
}

impl RunRequest {
    pub fn new(subject: impl Into<String>, mood: Mood) -> Self {
        Self {
            subject: subject.into(),
            product_url: None,
            mood,
            include_narration: true,
            include_music: true,
            locale: default_locale(),
        }
    }
}

/// Wall-clock timing breakdown of a run's stages, in milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct StageTimings {
    pub script_ms: u64,
    pub assets_ms: u64,
    pub audio_ms: u64,
    pub render_ms: u64,
    pub total_ms: u64,
}

/// Metadata block attached to a successful run result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunMetadata {
    /// Duration label (e.g., "25s")
    pub duration: String,
    /// Format label (e.g., "9:16 vertical")
    pub format: String,
    /// Quality label (e.g., "1080p")
    pub quality: String,
    /// Voice identifier used for narration, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    /// Requested mood
    pub mood: Mood,
    /// Whether subtitles were burned in
    pub subtitles: bool,
    /// Narration timing window per line in seconds
    pub seconds_per_line: f64,
    /// Total script line count
    pub line_count: usize,
    /// Number of fragments composed into the output
    pub clip_count: usize,
}

/// Final result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunResult {
    /// Whether the run produced an output artifact.
    pub success: bool,

    /// Path of the rendered artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Public URL the artifact is served at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_url: Option<String>,

    /// Full script text (lines joined with newlines).
    pub script_text: String,

    /// Per-line script array.
    pub script_lines: Vec<String>,

    /// Per-line search terms actually issued to the video search provider.
    pub search_terms: Vec<String>,

    /// Error category on failure (e.g., "no_assets_found").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_category: Option<String>,

    /// Human-readable error message on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Metadata block (present on success).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RunMetadata>,

    /// Stage timing breakdown.
    #[serde(default)]
    pub timings: StageTimings,

    /// Completion timestamp.
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    /// Build a failure result with the given category and message.
    pub fn failure(
        category: impl Into<String>,
        message: impl Into<String>,
        script_lines: Vec<String>,
        search_terms: Vec<String>,
        timings: StageTimings,
    ) -> Self {
        Self {
            success: false,
            output_path: None,
            output_url: None,
            script_text: script_lines.join("\n"),
            script_lines,
            search_terms,
            error_category: Some(category.into()),
            error_message: Some(message.into()),
            metadata: None,
            timings,
            finished_at: Utc::now(),
        }
    }
}

/// Sanitize a subject for use in output filenames.
///
/// Strips everything but ASCII alphanumerics and collapses the rest to
/// underscores, so the artifact path never needs URL escaping.
pub fn sanitize_subject(subject: &str) -> String {
    let cleaned: String = subject
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
        .chars()
        .take(50)
        .collect()
}

/// Generate the output artifact filename for a run.
///
/// Format: `promo_{timestamp}_{sanitized_subject}.mp4`. The timestamp keeps
/// concurrent runs from colliding.
pub fn output_filename(subject: &str, timestamp_millis: i64) -> String {
    format!("promo_{}_{}.mp4", timestamp_millis, sanitize_subject(subject))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_subject() {
        assert_eq!(sanitize_subject("Magic Glow Serum"), "magic_glow_serum");
        assert_eq!(sanitize_subject("Wire-less! (2024)"), "wire_less_2024");
        assert_eq!(sanitize_subject("Café résumé"), "caf_r_sum");
    }

    #[test]
    fn test_output_filename() {
        let name = output_filename("Magic Glow Serum", 1700000000000);
        assert_eq!(name, "promo_1700000000000_magic_glow_serum.mp4");
    }

    #[test]
    fn test_failure_result() {
        let result = RunResult::failure(
            "no_assets_found",
            "no stock footage matched",
            vec!["line one".to_string()],
            vec!["term".to_string()],
            StageTimings::default(),
        );
        assert!(!result.success);
        assert_eq!(result.error_category.as_deref(), Some("no_assets_found"));
        assert_eq!(result.script_text, "line one");
    }
}
