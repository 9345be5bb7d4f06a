//! Stock asset resolution.
//!
//! Turns one textual cue into at most one usable fragment reference.
//! Resolution failure (no results, no qualifying candidate, transport or
//! auth errors, timeout) is a normal outcome expressed as `None`; only
//! the orchestrator decides whether the accumulated total is fatal.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use reelgen_models::{AssetReference, Mood, MAX_FRAGMENT_SECS, MIN_FRAGMENT_SECS};
use reelgen_providers::{Orientation, SearchConstraints, VideoCandidate, VideoSearchProvider};

/// Minimum fragments the per-line pass must yield before fallback
/// escalation kicks in.
pub const MIN_ASSET_COUNT: usize = 3;

/// Fragment count the fallback escalation tops up to.
pub const TARGET_ASSET_COUNT: usize = 5;

/// Quality tag an encoding must carry to qualify.
const REQUIRED_QUALITY: &str = "hd";

/// Resolves cues against the stock video search provider.
pub struct AssetResolver {
    search: Arc<dyn VideoSearchProvider>,
    timeout: Duration,
}

impl AssetResolver {
    pub fn new(search: Arc<dyn VideoSearchProvider>, timeout: Duration) -> Self {
        Self { search, timeout }
    }

    fn constraints() -> SearchConstraints {
        SearchConstraints {
            min_duration_secs: MIN_FRAGMENT_SECS,
            max_duration_secs: MAX_FRAGMENT_SECS,
            orientation: Orientation::Portrait,
        }
    }

    /// Resolve a cue for a subject: primary query combining both, reissued
    /// with the cue alone when the primary returns zero results. Candidate
    /// selection runs on whichever result set was non-empty.
    pub async fn resolve(&self, cue: &str, subject: &str) -> Option<AssetReference> {
        let primary = format!("{subject} {cue}");
        let mut candidates = self.search_query(&primary).await;
        if candidates.is_empty() {
            debug!("Primary query {:?} empty, broadening to cue alone", primary);
            candidates = self.search_query(cue).await;
        }
        self.select(cue, &candidates)
    }

    /// Resolve a single verbatim query to at most one reference.
    pub async fn resolve_query(&self, query: &str) -> Option<AssetReference> {
        let candidates = self.search_query(query).await;
        self.select(query, &candidates)
    }

    /// Issue one search call. Transport errors and timeouts are normal
    /// outcomes here, logged and collapsed to an empty result set.
    async fn search_query(&self, query: &str) -> Vec<VideoCandidate> {
        let constraints = Self::constraints();
        let searched =
            tokio::time::timeout(self.timeout, self.search.search(query, &constraints)).await;

        match searched {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                warn!("Search for {:?} failed, treating as no result: {}", query, e);
                Vec::new()
            }
            Err(_) => {
                warn!(
                    "Search for {:?} timed out after {:?}, treating as no result",
                    query, self.timeout
                );
                Vec::new()
            }
        }
    }

    fn select(&self, query: &str, candidates: &[VideoCandidate]) -> Option<AssetReference> {
        let asset = select_candidate(candidates, &Self::constraints());
        match &asset {
            Some(a) => debug!("Query {:?} resolved to asset {}", query, a.id),
            None => debug!("Query {:?} yielded no qualifying candidate", query),
        }
        asset
    }
}

/// Pick the first candidate within the duration window that carries an
/// encoding at the required quality tier.
fn select_candidate(
    candidates: &[VideoCandidate],
    constraints: &SearchConstraints,
) -> Option<AssetReference> {
    for candidate in candidates {
        if candidate.duration < constraints.min_duration_secs
            || candidate.duration > constraints.max_duration_secs
        {
            continue;
        }
        if let Some(file) = candidate.files.iter().find(|f| f.quality == REQUIRED_QUALITY) {
            return Some(AssetReference {
                id: candidate.id,
                url: file.link.clone(),
                duration_secs: candidate.duration,
                width: file.width,
                height: file.height,
            });
        }
    }
    None
}

/// The fixed fallback query sequence for subject-level top-up.
///
/// Issued in order until the target count is reached or the sequence is
/// exhausted; deliberately independent of which per-line cues failed.
pub fn fallback_queries(subject: &str, mood: Mood) -> Vec<String> {
    vec![
        format!("{subject} review"),
        format!("{subject} unboxing"),
        format!("{subject} lifestyle"),
        format!("{mood} {subject}"),
        format!("{subject} product"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use reelgen_providers::{ProviderError, ProviderResult, VideoEncoding};
    use std::collections::HashMap;

    fn candidate(id: u64, duration: f64, qualities: &[&str]) -> VideoCandidate {
        VideoCandidate {
            id,
            duration,
            files: qualities
                .iter()
                .map(|q| VideoEncoding {
                    quality: q.to_string(),
                    width: 1080,
                    height: 1920,
                    link: format!("https://cdn.example.com/{id}-{q}.mp4"),
                })
                .collect(),
        }
    }

    struct MapSearch {
        by_query: HashMap<String, Vec<VideoCandidate>>,
        fail: bool,
    }

    #[async_trait]
    impl VideoSearchProvider for MapSearch {
        async fn search(
            &self,
            query: &str,
            _constraints: &SearchConstraints,
        ) -> ProviderResult<Vec<VideoCandidate>> {
            if self.fail {
                return Err(ProviderError::search("boom"));
            }
            Ok(self.by_query.get(query).cloned().unwrap_or_default())
        }
    }

    fn resolver(by_query: HashMap<String, Vec<VideoCandidate>>, fail: bool) -> AssetResolver {
        AssetResolver::new(
            Arc::new(MapSearch { by_query, fail }),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_select_candidate_duration_window() {
        let constraints = AssetResolver::constraints();
        let candidates = vec![
            candidate(1, 5.0, &["hd"]),  // too short
            candidate(2, 50.0, &["hd"]), // too long
            candidate(3, 12.0, &["hd"]),
        ];
        let asset = select_candidate(&candidates, &constraints).unwrap();
        assert_eq!(asset.id, 3);
    }

    #[test]
    fn test_select_candidate_requires_quality_tier() {
        let constraints = AssetResolver::constraints();
        let candidates = vec![
            candidate(1, 12.0, &["sd"]),
            candidate(2, 14.0, &["sd", "hd"]),
        ];
        let asset = select_candidate(&candidates, &constraints).unwrap();
        assert_eq!(asset.id, 2);
        assert!(asset.url.ends_with("2-hd.mp4"));
    }

    #[test]
    fn test_select_candidate_none_qualifies() {
        let constraints = AssetResolver::constraints();
        let candidates = vec![candidate(1, 12.0, &["sd"])];
        assert!(select_candidate(&candidates, &constraints).is_none());
    }

    #[tokio::test]
    async fn test_resolve_prefers_primary_query() {
        let mut by_query = HashMap::new();
        by_query.insert(
            "WidgetX closeup hands".to_string(),
            vec![candidate(10, 12.0, &["hd"])],
        );
        by_query.insert("closeup hands".to_string(), vec![candidate(20, 12.0, &["hd"])]);

        let asset = resolver(by_query, false)
            .resolve("closeup hands", "WidgetX")
            .await
            .unwrap();
        assert_eq!(asset.id, 10);
    }

    #[tokio::test]
    async fn test_resolve_broadens_to_cue_alone() {
        let mut by_query = HashMap::new();
        by_query.insert("closeup hands".to_string(), vec![candidate(20, 12.0, &["hd"])]);

        let asset = resolver(by_query, false)
            .resolve("closeup hands", "WidgetX")
            .await
            .unwrap();
        assert_eq!(asset.id, 20);
    }

    #[tokio::test]
    async fn test_transport_error_becomes_none() {
        let asset = resolver(HashMap::new(), true)
            .resolve("anything", "WidgetX")
            .await;
        assert!(asset.is_none());
    }

    #[test]
    fn test_fallback_queries_shape() {
        let queries = fallback_queries("WidgetX", Mood::Funny);
        assert_eq!(queries.len(), 5);
        assert_eq!(queries[0], "WidgetX review");
        assert_eq!(queries[3], "funny WidgetX");
    }
}
