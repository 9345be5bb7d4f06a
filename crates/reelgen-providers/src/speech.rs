//! Speech synthesis provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Default ElevenLabs API base URL.
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default synthesis model.
const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

/// Voice rendering settings.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechSettings {
    /// Synthesis model identifier.
    #[serde(skip)]
    pub model_id: String,
    /// Voice stability (0.0..=1.0).
    pub stability: f64,
    /// Similarity boost (0.0..=1.0).
    pub similarity_boost: f64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            stability: 0.5,
            similarity_boost: 0.75,
        }
    }
}

/// Synthesis request wire format.
#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a SpeechSettings,
}

/// A speech synthesis provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with the given voice, returning playable audio
    /// bytes (MP3). Failure carries the provider's diagnostic.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &SpeechSettings,
    ) -> ProviderResult<Vec<u8>>;
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl ElevenLabsClient {
    /// Create a new client with a shared HTTP client.
    pub fn new(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Create a client from `ELEVENLABS_API_KEY`.
    pub fn from_env(client: Client) -> ProviderResult<Self> {
        let api_key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| ProviderError::missing_config("ELEVENLABS_API_KEY not set"))?;
        Ok(Self::new(api_key, client))
    }

    /// Override the endpoint base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        settings: &SpeechSettings,
    ) -> ProviderResult<Vec<u8>> {
        let request = SynthesisRequest {
            text,
            model_id: &settings.model_id,
            voice_settings: settings,
        };

        let response = self
            .client
            .post(format!("{}/v1/text-to-speech/{}", self.base_url, voice_id))
            .header("xi-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::speech(format!(
                "voice {voice_id} returned {status}: {body}"
            )));
        }

        let bytes = response.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(ProviderError::speech("provider returned empty audio"));
        }

        debug!("Synthesized {} bytes with voice {}", bytes.len(), voice_id);
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_synthesize_returns_audio_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-a"))
            .and(header("xi-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xFB, 0x90]))
            .mount(&server)
            .await;

        let client = ElevenLabsClient::new("test-key", Client::new()).with_base_url(server.uri());
        let bytes = client
            .synthesize("Hello there.", "voice-a", &SpeechSettings::default())
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xFB, 0x90]);
    }

    #[tokio::test]
    async fn test_synthesize_rejection_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-a"))
            .respond_with(ResponseTemplate::new(422).set_body_string("text too long"))
            .mount(&server)
            .await;

        let client = ElevenLabsClient::new("test-key", Client::new()).with_base_url(server.uri());
        let err = client
            .synthesize("Hello.", "voice-a", &SpeechSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Speech(_)));
    }

    #[tokio::test]
    async fn test_empty_audio_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-a"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(Vec::<u8>::new()))
            .mount(&server)
            .await;

        let client = ElevenLabsClient::new("test-key", Client::new()).with_base_url(server.uri());
        let err = client
            .synthesize("Hello.", "voice-a", &SpeechSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Speech(_)));
    }
}
