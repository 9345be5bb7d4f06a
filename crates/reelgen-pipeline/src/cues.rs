//! Visual cue generation.
//!
//! One stock-footage search hint per script line, phrased by the text
//! generation provider. A provider failure (or timeout) skips that cue;
//! cue generation never fails the run.

use std::time::Duration;
use tracing::{debug, warn};

use reelgen_models::{Mood, ScriptLine, VisualCue};
use reelgen_providers::TextGenerator;

/// Maximum words kept from a generated cue phrase.
const MAX_CUE_WORDS: usize = 6;

/// Build the cue prompt for one script line.
fn cue_prompt(line: &ScriptLine, subject: &str, mood: Mood) -> String {
    format!(
        "Give a short stock footage search phrase (3 words) for this {} promo line \
         about \"{}\": \"{}\". Reply with the phrase only.",
        mood, subject, line.text
    )
}

/// Normalize a generated phrase into a usable search cue.
///
/// Takes the first line, strips wrapping quotes and trailing punctuation,
/// and caps the word count. Returns `None` for unusable output.
fn normalize_cue(raw: &str) -> Option<String> {
    let first_line = raw.lines().next()?.trim();
    let stripped = first_line
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '.' || c == ',')
        .trim();

    if stripped.is_empty() {
        return None;
    }

    let words: Vec<&str> = stripped.split_whitespace().take(MAX_CUE_WORDS).collect();
    Some(words.join(" ").to_lowercase())
}

/// Generate visual cues for the script, one per line, sequentially.
///
/// Resolution order must match script line order (the composition planner
/// is order-sensitive), so cues carry their line index.
pub async fn build_cues(
    textgen: &dyn TextGenerator,
    script: &[ScriptLine],
    subject: &str,
    mood: Mood,
    timeout: Duration,
) -> Vec<VisualCue> {
    let mut cues = Vec::with_capacity(script.len());

    for line in script {
        let prompt = cue_prompt(line, subject, mood);
        let generated = tokio::time::timeout(timeout, textgen.generate(&prompt)).await;

        match generated {
            Ok(Ok(raw)) => match normalize_cue(&raw) {
                Some(query) => {
                    debug!("Cue for line {}: {:?}", line.index, query);
                    cues.push(VisualCue::new(line.index, query));
                }
                None => warn!("Unusable cue for line {}, skipping", line.index),
            },
            Ok(Err(e)) => {
                warn!("Cue generation failed for line {}, skipping: {}", line.index, e);
            }
            Err(_) => {
                warn!(
                    "Cue generation timed out for line {} after {:?}, skipping",
                    line.index, timeout
                );
            }
        }
    }

    cues
}
