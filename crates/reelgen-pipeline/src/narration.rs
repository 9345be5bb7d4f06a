//! Narration synthesis.
//!
//! Joins the script into one narration text, picks a voice from the
//! subject, and renders it through the speech provider into a per-run
//! audio file.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use reelgen_models::{NarrationAsset, ScriptLine};
use reelgen_providers::{SpeechSettings, SpeechSynthesizer};

use crate::error::{PipelineError, PipelineResult};

/// Ordered subject-keyword → voice table. First substring match wins;
/// overlapping keywords make the ordering observable, so keep it stable.
const VOICE_KEYWORDS: &[(&str, &str)] = &[
    ("serum", "EXAVITQu4vr4xnSDxMaL"),
    ("glow", "EXAVITQu4vr4xnSDxMaL"),
    ("skin", "EXAVITQu4vr4xnSDxMaL"),
    ("beauty", "EXAVITQu4vr4xnSDxMaL"),
    ("tech", "ErXwobaYiN019PkySvjV"),
    ("gadget", "ErXwobaYiN019PkySvjV"),
    ("smart", "ErXwobaYiN019PkySvjV"),
    ("watch", "TxGEqnHWrfWFTfGW9XjX"),
    ("fashion", "TxGEqnHWrfWFTfGW9XjX"),
];

/// Voice used when no keyword matches.
const DEFAULT_VOICE: &str = "21m00Tcm4TlvDq8ikWAM";

/// Select the narration voice for a subject. First match wins.
pub fn select_voice(subject: &str) -> &'static str {
    let subject = subject.to_lowercase();
    VOICE_KEYWORDS
        .iter()
        .find(|(keyword, _)| subject.contains(keyword))
        .map(|(_, voice)| *voice)
        .unwrap_or(DEFAULT_VOICE)
}

/// Join script lines into one narration text with sentence-terminal
/// punctuation, preserving punctuation the templates already carry.
pub fn narration_text(script: &[ScriptLine]) -> String {
    script
        .iter()
        .map(|line| {
            let text = line.text.trim();
            if text.ends_with(['.', '!', '?']) {
                text.to_string()
            } else {
                format!("{text}.")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders narration audio through the speech provider.
pub struct NarrationSynthesizer {
    speech: Arc<dyn SpeechSynthesizer>,
    timeout: Duration,
}

impl NarrationSynthesizer {
    pub fn new(speech: Arc<dyn SpeechSynthesizer>, timeout: Duration) -> Self {
        Self { speech, timeout }
    }

    /// Synthesize narration for the script and persist it under `work_dir`.
    ///
    /// Provider rejection and timeout both surface as
    /// [`PipelineError::VoiceGenerationFailed`]; the caller decides whether
    /// narration was required.
    pub async fn synthesize(
        &self,
        script: &[ScriptLine],
        subject: &str,
        work_dir: &Path,
        run_ts: i64,
    ) -> PipelineResult<NarrationAsset> {
        let voice_id = select_voice(subject);
        let text = narration_text(script);
        debug!(
            "Synthesizing narration: voice={}, {} chars",
            voice_id,
            text.len()
        );

        let synthesis = tokio::time::timeout(
            self.timeout,
            self.speech
                .synthesize(&text, voice_id, &SpeechSettings::default()),
        )
        .await;

        let bytes = match synthesis {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => return Err(PipelineError::voice_generation_failed(e.to_string())),
            Err(_) => {
                return Err(PipelineError::voice_generation_failed(format!(
                    "speech provider timed out after {:?}",
                    self.timeout
                )))
            }
        };

        tokio::fs::create_dir_all(work_dir).await?;
        let path = work_dir.join(format!("narration_{run_ts}.mp3"));
        tokio::fs::write(&path, &bytes).await?;

        info!(
            "Narration written: {} ({} bytes)",
            path.display(),
            bytes.len()
        );
        Ok(NarrationAsset::new(path, voice_id))
    }
}
