//! Stock video search provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// Default Pexels API base URL.
const DEFAULT_BASE_URL: &str = "https://api.pexels.com";

/// Results requested per search page.
const PER_PAGE: u32 = 10;

/// Target orientation for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Portrait,
    Landscape,
    Square,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
            Orientation::Square => "square",
        }
    }
}

/// Constraints applied to a stock video search.
#[derive(Debug, Clone)]
pub struct SearchConstraints {
    /// Minimum candidate duration in seconds.
    pub min_duration_secs: f64,
    /// Maximum candidate duration in seconds.
    pub max_duration_secs: f64,
    /// Target orientation.
    pub orientation: Orientation,
}

/// One downloadable encoding of a candidate video.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoEncoding {
    /// Provider quality tag ("hd", "sd", ...).
    pub quality: String,
    pub width: u32,
    pub height: u32,
    /// Direct download link.
    pub link: String,
}

/// A candidate video returned by the search provider.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoCandidate {
    /// Provider-side video identity.
    pub id: u64,
    /// Duration in seconds.
    pub duration: f64,
    /// Available encodings, quality-tagged.
    #[serde(rename = "video_files")]
    pub files: Vec<VideoEncoding>,
}

/// Search response wire format.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    videos: Vec<VideoCandidate>,
}

/// A stock video search provider.
#[async_trait]
pub trait VideoSearchProvider: Send + Sync {
    /// Search for candidates matching `query` under `constraints`.
    ///
    /// Transport and auth failures surface as errors; an empty candidate
    /// list is a normal outcome.
    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> ProviderResult<Vec<VideoCandidate>>;
}

/// Pexels video search client.
pub struct PexelsClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl PexelsClient {
    /// Create a new client with a shared HTTP client.
    pub fn new(api_key: impl Into<String>, client: Client) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        }
    }

    /// Create a client from `PEXELS_API_KEY`.
    pub fn from_env(client: Client) -> ProviderResult<Self> {
        let api_key = std::env::var("PEXELS_API_KEY")
            .map_err(|_| ProviderError::missing_config("PEXELS_API_KEY not set"))?;
        Ok(Self::new(api_key, client))
    }

    /// Override the endpoint base URL (used in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl VideoSearchProvider for PexelsClient {
    async fn search(
        &self,
        query: &str,
        constraints: &SearchConstraints,
    ) -> ProviderResult<Vec<VideoCandidate>> {
        let per_page = PER_PAGE.to_string();
        let response = self
            .client
            .get(format!("{}/videos/search", self.base_url))
            .header("Authorization", &self.api_key)
            .query(&[
                ("query", query),
                ("orientation", constraints.orientation.as_str()),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(ProviderError::search(format!(
                "search for {query:?} returned {status}"
            )));
        }

        let parsed: SearchResponse = response.json().await?;
        debug!(
            "Search {:?} returned {} candidates",
            query,
            parsed.videos.len()
        );
        Ok(parsed.videos)
    }
}
