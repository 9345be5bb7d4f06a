//! External provider clients for the ReelGen pipeline.
//!
//! Long-lived, injectable service handles constructed once at startup and
//! passed into each run:
//! - Text generation (visual cue phrasing) with a two-tier fallback
//! - Stock video search
//! - Speech synthesis for narration
//! - Local background-music library

pub mod error;
pub mod music;
pub mod search;
pub mod speech;
pub mod text;

pub use error::{ProviderError, ProviderResult};
pub use music::MusicLibrary;
pub use search::{
    Orientation, PexelsClient, SearchConstraints, VideoCandidate, VideoEncoding,
    VideoSearchProvider,
};
pub use speech::{ElevenLabsClient, SpeechSettings, SpeechSynthesizer};
pub use text::{FallbackTextGenerator, OpenAiClient, TextGenerator};
