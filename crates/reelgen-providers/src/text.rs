//! Text generation provider.
//!
//! Used for visual cue phrasing. The pipeline tolerates per-call failure by
//! skipping the affected cue, so these clients report errors rather than
//! retrying internally.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

/// Default chat completions endpoint.
const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default generation model.
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// A text generation provider.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`. May fail; callers decide whether
    /// the failure is fatal.
    async fn generate(&self, prompt: &str) -> ProviderResult<String>;
}

/// Chat-completions request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat-completions response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// OpenAI-compatible chat completions client.
pub struct OpenAiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client with a shared HTTP client.
    pub fn new(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Create a client from `OPENAI_API_KEY`.
    pub fn from_env(client: Client) -> ProviderResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::missing_config("OPENAI_API_KEY not set"))?;
        Ok(Self::new(api_key, client))
    }

    /// Override the generation model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the endpoint base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            max_tokens: 60,
            temperature: 0.7,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::text_generation(format!(
                "{} returned {}: {}",
                self.model, status, body
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ProviderError::text_generation("response contained no choices"))?;

        debug!("Generated {} chars with {}", text.len(), self.model);
        Ok(text.trim().to_string())
    }
}

/// Ordered list of text generation tiers, tried in sequence.
///
/// Stops at the first success; when every tier fails, the final error
/// aggregates all underlying errors.
pub struct FallbackTextGenerator {
    tiers: Vec<Arc<dyn TextGenerator>>,
}

impl FallbackTextGenerator {
    pub fn new(tiers: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self { tiers }
    }
}

#[async_trait]
impl TextGenerator for FallbackTextGenerator {
    async fn generate(&self, prompt: &str) -> ProviderResult<String> {
        let mut failures: Vec<String> = Vec::new();

        for (tier, generator) in self.tiers.iter().enumerate() {
            match generator.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Text generation tier {} failed: {}", tier, e);
                    failures.push(format!("tier {tier}: {e}"));
                }
            }
        }

        Err(ProviderError::FallbackExhausted(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedGenerator(ProviderResult<String>);

    #[async_trait]
    impl TextGenerator for FixedGenerator {
        async fn generate(&self, _prompt: &str) -> ProviderResult<String> {
            match &self.0 {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(ProviderError::text_generation("boom")),
            }
        }
    }

    #[tokio::test]
    async fn test_generate_parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  sleek gadget closeup \n"}}
                ]
            })))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key", Client::new()).with_base_url(server.uri());
        let text = client.generate("cue please").await.unwrap();
        assert_eq!(text, "sleek gadget closeup");
    }

    #[tokio::test]
    async fn test_generate_surfaces_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let client = OpenAiClient::new("test-key", Client::new()).with_base_url(server.uri());
        let err = client.generate("cue please").await.unwrap_err();
        assert!(matches!(err, ProviderError::TextGeneration(_)));
    }

    #[tokio::test]
    async fn test_fallback_stops_at_first_success() {
        let fallback = FallbackTextGenerator::new(vec![
            Arc::new(FixedGenerator(Ok("primary".to_string()))),
            Arc::new(FixedGenerator(Ok("secondary".to_string()))),
        ]);
        assert_eq!(fallback.generate("p").await.unwrap(), "primary");
    }

    #[tokio::test]
    async fn test_fallback_uses_second_tier() {
        let fallback = FallbackTextGenerator::new(vec![
            Arc::new(FixedGenerator(Err(ProviderError::text_generation("x")))),
            Arc::new(FixedGenerator(Ok("secondary".to_string()))),
        ]);
        assert_eq!(fallback.generate("p").await.unwrap(), "secondary");
    }

    #[tokio::test]
    async fn test_fallback_aggregates_all_errors() {
        let fallback = FallbackTextGenerator::new(vec![
            Arc::new(FixedGenerator(Err(ProviderError::text_generation("x")))),
            Arc::new(FixedGenerator(Err(ProviderError::text_generation("y")))),
        ]);
        let err = fallback.generate("p").await.unwrap_err();
        match err {
            ProviderError::FallbackExhausted(details) => {
                assert!(details.contains("tier 0"));
                assert!(details.contains("tier 1"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
