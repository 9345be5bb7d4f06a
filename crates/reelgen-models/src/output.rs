//! Output encoding profile.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Output frame width in pixels (portrait 9:16).
pub const FRAME_WIDTH: u32 = 1080;
/// Output frame height in pixels.
pub const FRAME_HEIGHT: u32 = 1920;
/// Fixed output duration in seconds.
pub const TOTAL_DURATION_SECS: f64 = 25.0;

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "fast";
/// Default CRF (Constant Rate Factor)
pub const DEFAULT_CRF: u8 = 23;
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";
/// Pixel format required for broad player compatibility.
pub const DEFAULT_PIXEL_FORMAT: &str = "yuv420p";

/// Output encoding profile.
///
/// Frame size and duration are fixed regardless of how the composition was
/// planned; the duration acts as a hard clamp absorbing per-slice rounding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutputProfile {
    /// Frame width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Frame height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Output duration in seconds (hard clamp)
    #[serde(default = "default_duration")]
    pub duration_secs: f64,

    /// Video codec (e.g., "libx264")
    #[serde(default = "default_video_codec")]
    pub codec: String,

    /// Encoding preset (e.g., "fast", "medium")
    #[serde(default = "default_preset")]
    pub preset: String,

    /// Constant Rate Factor (quality, 0-51, lower is better)
    #[serde(default = "default_crf")]
    pub crf: u8,

    /// Audio codec
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Audio bitrate
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,

    /// Pixel format
    #[serde(default = "default_pixel_format")]
    pub pixel_format: String,

    /// Write the moov atom up front for progressive playback
    #[serde(default = "default_faststart")]
    pub faststart: bool,
}

fn default_width() -> u32 {
    FRAME_WIDTH
}
fn default_height() -> u32 {
    FRAME_HEIGHT
}
fn default_duration() -> f64 {
    TOTAL_DURATION_SECS
}
fn default_video_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}
fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}
fn default_crf() -> u8 {
    DEFAULT_CRF
}
fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}
fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}
fn default_pixel_format() -> String {
    DEFAULT_PIXEL_FORMAT.to_string()
}
fn default_faststart() -> bool {
    true
}

impl Default for OutputProfile {
    fn default() -> Self {
        Self {
            width: FRAME_WIDTH,
            height: FRAME_HEIGHT,
            duration_secs: TOTAL_DURATION_SECS,
            codec: DEFAULT_VIDEO_CODEC.to_string(),
            preset: DEFAULT_PRESET.to_string(),
            crf: DEFAULT_CRF,
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
            audio_bitrate: DEFAULT_AUDIO_BITRATE.to_string(),
            pixel_format: DEFAULT_PIXEL_FORMAT.to_string(),
            faststart: true,
        }
    }
}

impl OutputProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Human-readable duration label (e.g., "25s").
    pub fn duration_label(&self) -> String {
        format!("{}s", self.duration_secs.round() as u64)
    }

    /// Human-readable format label (e.g., "9:16 vertical").
    pub fn format_label(&self) -> String {
        "9:16 vertical".to_string()
    }

    /// Human-readable quality label (e.g., "1080p").
    pub fn quality_label(&self) -> String {
        format!("{}p", self.width)
    }

    /// Convert to FFmpeg output arguments (codecs, clamp, container flags).
    pub fn to_ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
            "-pix_fmt".to_string(),
            self.pixel_format.clone(),
            "-t".to_string(),
            format!("{:.3}", self.duration_secs),
        ];

        if self.faststart {
            args.extend_from_slice(&["-movflags".to_string(), "+faststart".to_string()]);
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = OutputProfile::default();
        assert_eq!(profile.width, 1080);
        assert_eq!(profile.height, 1920);
        assert!((profile.duration_secs - 25.0).abs() < f64::EPSILON);
        assert_eq!(profile.codec, "libx264");
    }

    #[test]
    fn test_ffmpeg_args_include_clamp_and_faststart() {
        let args = OutputProfile::default().to_ffmpeg_args();
        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"25.000".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
        assert!(args.contains(&"yuv420p".to_string()));
    }

    #[test]
    fn test_labels() {
        let profile = OutputProfile::default();
        assert_eq!(profile.duration_label(), "25s");
        assert_eq!(profile.quality_label(), "1080p");
    }
}
