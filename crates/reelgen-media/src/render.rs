//! Graph execution against FFmpeg.
//!
//! One external-process invocation per run. The renderer surfaces start,
//! progress and terminal events, and owns cleanup of the run's transient
//! input files. It never retries; retry policy belongs to the caller.

use std::path::{Path, PathBuf};
use tokio::sync::watch;
use tracing::{info, warn};

use reelgen_models::CompositionGraph;

use crate::command::FfmpegRunner;
use crate::compose::build_render_command;
use crate::error::MediaResult;

/// Concrete input files for one render.
#[derive(Debug, Clone, Default)]
pub struct RenderInputs {
    /// Downloaded fragment files, in slice order. Owned by the run;
    /// deleted after the render.
    pub fragments: Vec<PathBuf>,
    /// Rendered narration audio, when the mix plan uses one. Owned by the
    /// run; deleted after the render.
    pub narration: Option<PathBuf>,
    /// Background music track, when the mix plan uses one. Comes from the
    /// shared music pool and is NOT deleted.
    pub music: Option<PathBuf>,
}

/// Events emitted over the course of one render.
#[derive(Debug, Clone)]
pub enum RenderEvent {
    /// The FFmpeg process is about to start.
    Started { output: PathBuf },
    /// Best-effort progress report; not guaranteed monotonic.
    Progress { percent: f64 },
    /// The render finished and the artifact exists at `output`.
    Completed { output: PathBuf },
    /// The render failed; `message` carries the engine diagnostic.
    Failed { message: String },
}

/// Executes composition graphs against FFmpeg.
pub struct Renderer {
    cancel_rx: Option<watch::Receiver<bool>>,
    timeout_secs: Option<u64>,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            cancel_rx: None,
            timeout_secs: None,
        }
    }

    /// Set cancellation signal, checked when the process exits and on
    /// shutdown. A cancelled render never leaves a partial file mounted
    /// as done.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    /// Set render timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Render a composition graph to `output`.
    ///
    /// On success the run's transient inputs (fragments, narration) are
    /// deleted; on failure the same cleanup runs best-effort and the
    /// partial output is discarded.
    pub async fn render<F>(
        &self,
        graph: &CompositionGraph,
        inputs: &RenderInputs,
        output: impl AsRef<Path>,
        on_event: F,
    ) -> MediaResult<PathBuf>
    where
        F: Fn(RenderEvent) + Send + Sync + 'static,
    {
        let output = output.as_ref().to_path_buf();

        let cmd = build_render_command(graph, inputs, &output)?;

        info!(
            "Rendering {} fragments (mix: {}) -> {}",
            graph.slices.len(),
            graph.mix.as_str(),
            output.display()
        );
        on_event(RenderEvent::Started {
            output: output.clone(),
        });

        let total_ms = (graph.profile.duration_secs * 1000.0) as i64;
        let mut runner = FfmpegRunner::new();
        if let Some(rx) = &self.cancel_rx {
            runner = runner.with_cancel(rx.clone());
        }
        if let Some(secs) = self.timeout_secs {
            runner = runner.with_timeout(secs);
        }

        let on_event = std::sync::Arc::new(on_event);
        let progress_emitter = on_event.clone();
        let result = runner
            .run_with_progress(&cmd, move |p| {
                (*progress_emitter)(RenderEvent::Progress {
                    percent: p.percentage(total_ms),
                });
            })
            .await;

        match result {
            Ok(()) => {
                cleanup_transient_inputs(inputs).await;
                info!("Render complete: {}", output.display());
                (*on_event)(RenderEvent::Completed {
                    output: output.clone(),
                });
                Ok(output)
            }
            Err(e) => {
                // Discard any partial artifact, then best-effort cleanup
                if let Err(rm) = tokio::fs::remove_file(&output).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        warn!("Failed to discard partial output {}: {}", output.display(), rm);
                    }
                }
                cleanup_transient_inputs(inputs).await;
                (*on_event)(RenderEvent::Failed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }
}

/// Delete the run-owned input files; errors are logged and swallowed.
///
/// The music track is excluded: it belongs to the shared pool.
pub async fn cleanup_transient_inputs(inputs: &RenderInputs) {
    for path in inputs
        .fragments
        .iter()
        .chain(inputs.narration.iter())
    {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove transient input {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_cleanup_removes_fragments_and_narration() {
        let dir = TempDir::new().unwrap();
        let frag = dir.path().join("fragment_0.mp4");
        let narration = dir.path().join("narration.mp3");
        let music = dir.path().join("music.mp3");
        for p in [&frag, &narration, &music] {
            tokio::fs::write(p, b"x").await.unwrap();
        }

        let inputs = RenderInputs {
            fragments: vec![frag.clone()],
            narration: Some(narration.clone()),
            music: Some(music.clone()),
        };
        cleanup_transient_inputs(&inputs).await;

        assert!(!frag.exists());
        assert!(!narration.exists());
        assert!(music.exists(), "shared music pool file must survive");
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_files() {
        let inputs = RenderInputs {
            fragments: vec![PathBuf::from("/nonexistent/fragment.mp4")],
            narration: Some(PathBuf::from("/nonexistent/narration.mp3")),
            music: None,
        };
        // Must not panic or error
        cleanup_transient_inputs(&inputs).await;
    }
}
