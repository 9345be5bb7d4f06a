//! Provider error types.

use thiserror::Error;

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Text generation failed: {0}")]
    TextGeneration(String),

    #[error("All text generation tiers failed: {0}")]
    FallbackExhausted(String),

    #[error("Video search failed: {0}")]
    Search(String),

    #[error("Speech synthesis failed: {0}")]
    Speech(String),
}

impl ProviderError {
    pub fn missing_config(msg: impl Into<String>) -> Self {
        Self::MissingConfig(msg.into())
    }

    pub fn text_generation(msg: impl Into<String>) -> Self {
        Self::TextGeneration(msg.into())
    }

    pub fn search(msg: impl Into<String>) -> Self {
        Self::Search(msg.into())
    }

    pub fn speech(msg: impl Into<String>) -> Self {
        Self::Speech(msg.into())
    }
}
