//! Pipeline error taxonomy.
//!
//! Stage-local expected failures (a single cue's search failing, one
//! fragment download aborting) are absorbed where they happen and never
//! appear here. These variants are the fatal outcomes a run can end with.

use thiserror::Error;

use reelgen_media::MediaError;
use reelgen_models::MIN_SCRIPT_LINES;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Script too short: got {got} lines, need at least {min}")]
    ScriptTooShort { got: usize, min: usize },

    #[error("No stock footage found after fallback escalation")]
    NoAssetsFound,

    #[error("Voice generation failed: {0}")]
    VoiceGenerationFailed(String),

    #[error("Render failed: {0}")]
    Render(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    pub fn script_too_short(got: usize) -> Self {
        Self::ScriptTooShort {
            got,
            min: MIN_SCRIPT_LINES,
        }
    }

    pub fn voice_generation_failed(msg: impl Into<String>) -> Self {
        Self::VoiceGenerationFailed(msg.into())
    }

    /// Stable category slug reported to the caller.
    pub fn category(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_) => "invalid_request",
            PipelineError::ScriptTooShort { .. } => "script_too_short",
            PipelineError::NoAssetsFound => "no_assets_found",
            PipelineError::VoiceGenerationFailed(_) => "voice_generation_failed",
            PipelineError::Render(_) => "render_error",
            PipelineError::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_are_stable() {
        assert_eq!(PipelineError::NoAssetsFound.category(), "no_assets_found");
        assert_eq!(
            PipelineError::script_too_short(4).category(),
            "script_too_short"
        );
        assert_eq!(
            PipelineError::voice_generation_failed("x").category(),
            "voice_generation_failed"
        );
    }
}
