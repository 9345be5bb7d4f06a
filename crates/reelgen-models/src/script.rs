//! Script lines, moods and visual cues.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of lines every synthesized script must contain.
///
/// The per-line timing window is `TOTAL_DURATION_SECS / SCRIPT_LINE_COUNT`,
/// so this count is load-bearing for narration pacing.
pub const SCRIPT_LINE_COUNT: usize = 10;

/// Minimum acceptable line count; fewer is a hard failure.
pub const MIN_SCRIPT_LINES: usize = 8;

/// Narration mood requested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Upbeat, high-tempo delivery. The generic fallback mood.
    #[default]
    Energetic,
    Funny,
    Luxurious,
    Professional,
}

impl Mood {
    /// Parse a mood string leniently. Unrecognized values fall back to
    /// [`Mood::Energetic`].
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "funny" | "humorous" => Mood::Funny,
            "luxurious" | "luxury" | "elegant" => Mood::Luxurious,
            "professional" | "serious" => Mood::Professional,
            _ => Mood::Energetic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Energetic => "energetic",
            Mood::Funny => "funny",
            Mood::Luxurious => "luxurious",
            Mood::Professional => "professional",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of a synthesized promo script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ScriptLine {
    /// 0-based position within the script.
    pub index: usize,
    /// Spoken text for this line.
    pub text: String,
}

impl ScriptLine {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
        }
    }
}

/// Free-text stock-footage search hint derived from one script line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VisualCue {
    /// Index of the script line this cue was derived from.
    pub line_index: usize,
    /// Search phrase handed to the video search provider.
    pub query: String,
}

impl VisualCue {
    pub fn new(line_index: usize, query: impl Into<String>) -> Self {
        Self {
            line_index,
            query: query.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mood_parse_known() {
        assert_eq!(Mood::parse("funny"), Mood::Funny);
        assert_eq!(Mood::parse("LUXURIOUS"), Mood::Luxurious);
        assert_eq!(Mood::parse("professional"), Mood::Professional);
        assert_eq!(Mood::parse("energetic"), Mood::Energetic);
    }

    #[test]
    fn test_mood_parse_unrecognized_falls_back() {
        assert_eq!(Mood::parse("melancholic"), Mood::Energetic);
        assert_eq!(Mood::parse(""), Mood::Energetic);
    }
}
