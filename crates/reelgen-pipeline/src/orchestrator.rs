//! Pipeline orchestration.
//!
//! Sequences the stages of one run as a strictly forward-progressing state
//! machine, applies the fallback/retry policy at the asset-sourcing stage,
//! and packages the final result. Each run owns one instance of its state;
//! runs share nothing but the injected service handles and the read-only
//! music pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use reelgen_media::render::cleanup_transient_inputs;
use reelgen_media::{download_fragment, MediaError, RenderEvent, RenderInputs, Renderer};
use reelgen_models::{
    output_filename, AssetReference, CompositionGraph, NarrationAsset, OutputProfile, RunMetadata,
    RunRequest, RunResult, ScriptLine, StageTimings, MAX_FRAGMENTS, MIN_SCRIPT_LINES,
};
use reelgen_providers::{MusicLibrary, SpeechSynthesizer, TextGenerator, VideoSearchProvider};

use crate::config::PipelineConfig;
use crate::cues::build_cues;
use crate::error::{PipelineError, PipelineResult};
use crate::narration::NarrationSynthesizer;
use crate::planner::plan;
use crate::resolver::{fallback_queries, AssetResolver, MIN_ASSET_COUNT, TARGET_ASSET_COUNT};
use crate::script;

/// States of one pipeline run. Strictly forward-progressing; no state is
/// ever revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    ScriptPending,
    AssetsPending,
    AudioPending,
    Rendering,
    Done,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::ScriptPending => "script_pending",
            RunState::AssetsPending => "assets_pending",
            RunState::AudioPending => "audio_pending",
            RunState::Rendering => "rendering",
            RunState::Done => "done",
            RunState::Failed => "failed",
        }
    }
}

/// Fetches a resolved asset to a local file.
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn fetch(&self, asset: &AssetReference, dest: &Path) -> Result<(), MediaError>;
}

/// HTTP fetcher using the shared reqwest client.
pub struct HttpAssetFetcher {
    client: reqwest::Client,
}

impl HttpAssetFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetFetcher for HttpAssetFetcher {
    async fn fetch(&self, asset: &AssetReference, dest: &Path) -> Result<(), MediaError> {
        download_fragment(&self.client, &asset.url, dest).await
    }
}

/// Executes a composition graph to an output artifact.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    async fn render(
        &self,
        graph: &CompositionGraph,
        inputs: &RenderInputs,
        output: &Path,
    ) -> Result<PathBuf, MediaError>;
}

/// FFmpeg-backed renderer with progress logging.
pub struct FfmpegRenderBackend {
    timeout_secs: u64,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl FfmpegRenderBackend {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout_secs,
            cancel_rx: None,
        }
    }

    /// Wire a shutdown signal so an in-flight render is killed rather than
    /// left as a partial file.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }
}

#[async_trait]
impl RenderBackend for FfmpegRenderBackend {
    async fn render(
        &self,
        graph: &CompositionGraph,
        inputs: &RenderInputs,
        output: &Path,
    ) -> Result<PathBuf, MediaError> {
        let mut renderer = Renderer::new().with_timeout(self.timeout_secs);
        if let Some(rx) = &self.cancel_rx {
            renderer = renderer.with_cancel(rx.clone());
        }

        renderer
            .render(graph, inputs, output, |event| match event {
                RenderEvent::Started { output } => info!("Render started: {}", output.display()),
                RenderEvent::Progress { percent } => debug!("Render progress: {:.1}%", percent),
                RenderEvent::Completed { output } => {
                    info!("Render completed: {}", output.display())
                }
                RenderEvent::Failed { message } => error!("Render failed: {}", message),
            })
            .await
    }
}

/// The injected service handles a pipeline needs. Constructed once at
/// startup; every run borrows the same instances.
pub struct PipelineServices {
    pub text: Arc<dyn TextGenerator>,
    pub search: Arc<dyn VideoSearchProvider>,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub music: MusicLibrary,
    pub fetcher: Arc<dyn AssetFetcher>,
    pub renderer: Arc<dyn RenderBackend>,
}

/// Mutable per-run context carried across stages so failure results can
/// still report the script and search terms produced so far.
struct RunContext {
    run_id: uuid::Uuid,
    state: RunState,
    script_lines: Vec<String>,
    search_terms: Vec<String>,
    timings: StageTimings,
    fragments: Vec<PathBuf>,
    narration_path: Option<PathBuf>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            run_id: uuid::Uuid::new_v4(),
            state: RunState::ScriptPending,
            script_lines: Vec::new(),
            search_terms: Vec::new(),
            timings: StageTimings::default(),
            fragments: Vec::new(),
            narration_path: None,
        }
    }

    fn transition(&mut self, to: RunState) {
        debug!("Run {}: {} -> {}", self.run_id, self.state.as_str(), to.as_str());
        self.state = to;
    }

    /// The transient files this run owns right now.
    fn transient_inputs(&self) -> RenderInputs {
        RenderInputs {
            fragments: self.fragments.clone(),
            narration: self.narration_path.clone(),
            music: None,
        }
    }
}

/// The promo video pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    services: PipelineServices,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, services: PipelineServices) -> Self {
        Self { config, services }
    }

    /// Execute one run to completion.
    ///
    /// Never panics and never returns `Err`: every fatal stage error is
    /// folded into a categorized failure result so concurrent runs and the
    /// calling service are unaffected.
    pub async fn run(&self, request: &RunRequest) -> RunResult {
        let started = Instant::now();
        let mut ctx = RunContext::new();
        info!(
            "Run {}: starting for subject {:?} (mood: {})",
            ctx.run_id, request.subject, request.mood
        );

        let result = self.execute(request, &mut ctx).await;
        let total_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(mut success) => {
                ctx.transition(RunState::Done);
                success.timings.total_ms = total_ms;
                info!(
                    "Run {}: done in {}ms -> {:?}",
                    ctx.run_id, total_ms, success.output_path
                );
                success
            }
            Err(e) => {
                ctx.transition(RunState::Failed);
                error!("Run {}: failed ({}): {}", ctx.run_id, e.category(), e);
                // Release anything the run still owns; the renderer already
                // cleaned up if the failure happened there.
                cleanup_transient_inputs(&ctx.transient_inputs()).await;

                let mut timings = ctx.timings;
                timings.total_ms = total_ms;
                RunResult::failure(
                    e.category(),
                    e.to_string(),
                    ctx.script_lines,
                    ctx.search_terms,
                    timings,
                )
            }
        }
    }

    async fn execute(
        &self,
        request: &RunRequest,
        ctx: &mut RunContext,
    ) -> PipelineResult<RunResult> {
        let run_ts = Utc::now().timestamp_millis();
        let profile = OutputProfile::default();

        // Stage: script synthesis
        let stage = Instant::now();
        let script = script::synthesize(&request.subject, request.mood, &request.locale)?;
        if script.len() < MIN_SCRIPT_LINES {
            return Err(PipelineError::script_too_short(script.len()));
        }
        ctx.script_lines = script.iter().map(|l| l.text.clone()).collect();
        ctx.timings.script_ms = stage.elapsed().as_millis() as u64;
        ctx.transition(RunState::AssetsPending);

        // Stage: asset accumulation (per-line cues, then fallback top-up),
        // downloading each accepted reference into the run's work dir.
        let stage = Instant::now();
        let assets = self.accumulate_assets(request, &script, ctx, run_ts).await;
        ctx.timings.assets_ms = stage.elapsed().as_millis() as u64;
        if assets.is_empty() {
            return Err(PipelineError::NoAssetsFound);
        }
        ctx.transition(RunState::AudioPending);

        // Stage: audio
        let stage = Instant::now();
        let narration = if request.include_narration {
            let synthesizer =
                NarrationSynthesizer::new(self.services.speech.clone(), self.config.speech_timeout);
            let asset = synthesizer
                .synthesize(&script, &request.subject, &self.config.work_dir, run_ts)
                .await?;
            ctx.narration_path = Some(asset.path.clone());
            Some(asset)
        } else {
            None
        };

        let music = if request.include_music {
            self.services.music.pick().await
        } else {
            None
        };
        ctx.timings.audio_ms = stage.elapsed().as_millis() as u64;

        // Stage: plan and render
        let graph = plan(&assets, narration.is_some(), music.is_some(), profile.clone())?;
        ctx.transition(RunState::Rendering);

        let stage = Instant::now();
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let filename = output_filename(&request.subject, run_ts);
        let output = self.config.output_dir.join(&filename);

        let inputs = RenderInputs {
            fragments: ctx.fragments.clone(),
            narration: ctx.narration_path.clone(),
            music,
        };
        let rendered = self
            .services
            .renderer
            .render(&graph, &inputs, &output)
            .await?;
        ctx.timings.render_ms = stage.elapsed().as_millis() as u64;

        // The renderer released the transient inputs on its way out.
        ctx.fragments.clear();
        ctx.narration_path = None;

        Ok(self.success_result(request, &script, ctx, &graph, narration.as_ref(), rendered, filename))
    }

    /// Resolve per-line cues, escalate with the fixed fallback queries when
    /// the yield is low, and download every accepted reference. Returns the
    /// assets whose fragments actually landed on disk, in resolution order.
    async fn accumulate_assets(
        &self,
        request: &RunRequest,
        script: &[ScriptLine],
        ctx: &mut RunContext,
        run_ts: i64,
    ) -> Vec<AssetReference> {
        let resolver = AssetResolver::new(self.services.search.clone(), self.config.search_timeout);

        let cues = build_cues(
            self.services.text.as_ref(),
            script,
            &request.subject,
            request.mood,
            self.config.textgen_timeout,
        )
        .await;

        let mut references: Vec<AssetReference> = Vec::new();

        for cue in &cues {
            ctx.search_terms
                .push(format!("{} {}", request.subject, cue.query));
            if let Some(asset) = resolver.resolve(&cue.query, &request.subject).await {
                push_unique(&mut references, asset);
            }
        }

        if references.len() < MIN_ASSET_COUNT {
            info!(
                "Only {} fragments from per-line cues, escalating with fallback queries",
                references.len()
            );
            for query in fallback_queries(&request.subject, request.mood) {
                if references.len() >= TARGET_ASSET_COUNT {
                    break;
                }
                ctx.search_terms.push(query.clone());
                if let Some(asset) = resolver.resolve_query(&query).await {
                    push_unique(&mut references, asset);
                }
            }
        }

        self.download_fragments(&references, ctx, run_ts).await
    }

    /// Download up to [`MAX_FRAGMENTS`] references. A failed or timed-out
    /// download skips that fragment; order is preserved.
    async fn download_fragments(
        &self,
        references: &[AssetReference],
        ctx: &mut RunContext,
        run_ts: i64,
    ) -> Vec<AssetReference> {
        let mut downloaded = Vec::new();

        for (i, asset) in references.iter().take(MAX_FRAGMENTS).enumerate() {
            let dest = self
                .config
                .work_dir
                .join(format!("fragment_{run_ts}_{i}.mp4"));

            let fetched = tokio::time::timeout(
                self.config.download_timeout,
                self.services.fetcher.fetch(asset, &dest),
            )
            .await;

            match fetched {
                Ok(Ok(())) => {
                    ctx.fragments.push(dest);
                    downloaded.push(asset.clone());
                }
                Ok(Err(e)) => {
                    warn!("Fragment {} download failed, skipping: {}", asset.id, e);
                }
                Err(_) => {
                    warn!(
                        "Fragment {} download timed out after {:?}, skipping",
                        asset.id, self.config.download_timeout
                    );
                }
            }
        }

        downloaded
    }

    #[allow(clippy::too_many_arguments)]
    fn success_result(
        &self,
        request: &RunRequest,
        script: &[ScriptLine],
        ctx: &RunContext,
        graph: &CompositionGraph,
        narration: Option<&NarrationAsset>,
        output_path: PathBuf,
        filename: String,
    ) -> RunResult {
        let profile = &graph.profile;
        let metadata = RunMetadata {
            duration: profile.duration_label(),
            format: profile.format_label(),
            quality: profile.quality_label(),
            voice_id: narration.map(|n| n.voice_id.clone()),
            mood: request.mood,
            subtitles: false,
            seconds_per_line: profile.duration_secs / script.len() as f64,
            line_count: script.len(),
            clip_count: graph.slices.len(),
        };

        let output_url = format!(
            "{}/{}",
            self.config.public_base_url.trim_end_matches('/'),
            filename
        );

        RunResult {
            success: true,
            output_path: Some(output_path),
            output_url: Some(output_url),
            script_text: ctx.script_lines.join("\n"),
            script_lines: ctx.script_lines.clone(),
            search_terms: ctx.search_terms.clone(),
            error_category: None,
            error_message: None,
            metadata: Some(metadata),
            timings: ctx.timings.clone(),
            finished_at: Utc::now(),
        }
    }
}

/// Append `asset` unless a reference with the same identity is already
/// accumulated. Fallback queries may overlap with primary queries, so this
/// runs on every accepted reference.
fn push_unique(references: &mut Vec<AssetReference>, asset: AssetReference) -> bool {
    if references.iter().any(|a| a.id == asset.id) {
        debug!("Skipping duplicate asset {}", asset.id);
        false
    } else {
        references.push(asset);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: u64) -> AssetReference {
        AssetReference {
            id,
            url: format!("https://cdn.example.com/{id}.mp4"),
            duration_secs: 12.0,
            width: 1080,
            height: 1920,
        }
    }

    #[test]
    fn test_push_unique_dedups_by_identity() {
        let mut references = Vec::new();
        assert!(push_unique(&mut references, asset(1)));
        assert!(push_unique(&mut references, asset(2)));
        assert!(!push_unique(&mut references, asset(1)));
        assert_eq!(references.len(), 2);
    }

    #[test]
    fn test_run_state_labels() {
        assert_eq!(RunState::ScriptPending.as_str(), "script_pending");
        assert_eq!(RunState::Failed.as_str(), "failed");
    }
}
