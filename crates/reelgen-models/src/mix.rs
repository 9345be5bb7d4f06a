//! Audio mix plan selection.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Narration gain when mixed with background music.
pub const NARRATION_GAIN_MIXED: f64 = 1.2;
/// Music gain when mixed under narration.
pub const MUSIC_GAIN_MIXED: f64 = 0.15;
/// Narration gain when it is the only audio track.
pub const NARRATION_GAIN_SOLO: f64 = 1.1;
/// Music gain when it is the only audio track.
pub const MUSIC_GAIN_SOLO: f64 = 0.4;

/// The audio chain of a composition, selected purely by which optional
/// audio tracks are present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AudioMixPlan {
    /// Narration over ducked background music, mixed with shortest-stream
    /// termination. Both tracks are pre-trimmed to the output duration, so
    /// the shortest-stream rule only guards against encoder drift.
    NarrationAndMusic { narration_gain: f64, music_gain: f64 },
    /// Narration as the only track.
    NarrationOnly { gain: f64 },
    /// Background music as the only track.
    MusicOnly { gain: f64 },
    /// No audio stream in the output.
    Silent,
}

impl AudioMixPlan {
    /// Select the mix variant for the given track presence.
    ///
    /// This is a pure function of its two inputs; no other state affects
    /// the choice.
    pub fn select(narration_present: bool, music_present: bool) -> Self {
        match (narration_present, music_present) {
            (true, true) => AudioMixPlan::NarrationAndMusic {
                narration_gain: NARRATION_GAIN_MIXED,
                music_gain: MUSIC_GAIN_MIXED,
            },
            (true, false) => AudioMixPlan::NarrationOnly {
                gain: NARRATION_GAIN_SOLO,
            },
            (false, true) => AudioMixPlan::MusicOnly {
                gain: MUSIC_GAIN_SOLO,
            },
            (false, false) => AudioMixPlan::Silent,
        }
    }

    /// Whether the plan produces an audio stream at all.
    pub fn has_audio(&self) -> bool {
        !matches!(self, AudioMixPlan::Silent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioMixPlan::NarrationAndMusic { .. } => "narration_and_music",
            AudioMixPlan::NarrationOnly { .. } => "narration_only",
            AudioMixPlan::MusicOnly { .. } => "music_only",
            AudioMixPlan::Silent => "silent",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_covers_all_four_variants() {
        assert_eq!(
            AudioMixPlan::select(true, true),
            AudioMixPlan::NarrationAndMusic {
                narration_gain: NARRATION_GAIN_MIXED,
                music_gain: MUSIC_GAIN_MIXED,
            }
        );
        assert_eq!(
            AudioMixPlan::select(true, false),
            AudioMixPlan::NarrationOnly {
                gain: NARRATION_GAIN_SOLO
            }
        );
        assert_eq!(
            AudioMixPlan::select(false, true),
            AudioMixPlan::MusicOnly {
                gain: MUSIC_GAIN_SOLO
            }
        );
        assert_eq!(AudioMixPlan::select(false, false), AudioMixPlan::Silent);
    }

    #[test]
    fn test_mixed_gains() {
        if let AudioMixPlan::NarrationAndMusic {
            narration_gain,
            music_gain,
        } = AudioMixPlan::select(true, true)
        {
            assert!((narration_gain - 1.2).abs() < f64::EPSILON);
            assert!((music_gain - 0.15).abs() < f64::EPSILON);
        } else {
            panic!("expected NarrationAndMusic");
        }
    }

    #[test]
    fn test_has_audio() {
        assert!(AudioMixPlan::select(true, true).has_audio());
        assert!(AudioMixPlan::select(false, true).has_audio());
        assert!(!AudioMixPlan::select(false, false).has_audio());
    }
}
