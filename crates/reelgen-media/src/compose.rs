//! Filter-graph rendering of a composition graph.
//!
//! Translates a [`CompositionGraph`] plus concrete input paths into one
//! FFmpeg invocation: per-fragment transform chains, video-only
//! concatenation, and the conditional audio chain selected by the mix plan.

use std::path::Path;

use reelgen_models::{AudioMixPlan, CompositionGraph, TransformOp};

use crate::command::FfmpegCommand;
use crate::error::{MediaError, MediaResult};
use crate::render::RenderInputs;

/// Render one transform op to its FFmpeg filter expression.
fn filter_for_op(op: &TransformOp) -> String {
    match op {
        TransformOp::ScaleToCover { width, height } => {
            format!("scale={width}:{height}:force_original_aspect_ratio=increase")
        }
        TransformOp::CenterCrop { width, height } => format!("crop={width}:{height}"),
        TransformOp::ResetPts => "setpts=PTS-STARTPTS".to_string(),
        TransformOp::Trim { secs } => format!("trim=duration={secs:.3}"),
    }
}

/// Build the `-filter_complex` expression for a graph.
///
/// Fragment inputs occupy indices `0..n`; the narration input (when the mix
/// uses one) follows at index `n`, and the music input after it. Input
/// presence must match the mix plan; the command builder enforces this.
pub fn build_filter_complex(graph: &CompositionGraph) -> String {
    let n = graph.slices.len();
    let mut parts: Vec<String> = Vec::new();

    // Per-fragment transform chains
    for slice in &graph.slices {
        let chain: Vec<String> = slice
            .transform_chain(&graph.profile)
            .iter()
            .map(filter_for_op)
            .collect();
        parts.push(format!("[{}:v]{}[v{}]", slice.index, chain.join(","), slice.index));
    }

    // Video-only concatenation
    let labels: String = (0..n).map(|i| format!("[v{i}]")).collect();
    parts.push(format!("{labels}concat=n={n}:v=1:a=0[vout]"));

    // Conditional audio chain
    let total = graph.profile.duration_secs;
    match graph.mix {
        AudioMixPlan::NarrationAndMusic {
            narration_gain,
            music_gain,
        } => {
            parts.push(format!(
                "[{n}:a]volume={narration_gain},atrim=duration={total:.3}[narr]"
            ));
            parts.push(format!(
                "[{}:a]volume={music_gain},atrim=duration={total:.3}[mus]",
                n + 1
            ));
            parts.push("[narr][mus]amix=inputs=2:duration=shortest[aout]".to_string());
        }
        AudioMixPlan::NarrationOnly { gain } | AudioMixPlan::MusicOnly { gain } => {
            parts.push(format!(
                "[{n}:a]volume={gain},atrim=duration={total:.3}[aout]"
            ));
        }
        AudioMixPlan::Silent => {}
    }

    parts.join(";")
}

/// Build the complete render command for a graph and its input files.
///
/// Validates that the supplied inputs match the graph shape: one file per
/// fragment slice, and narration/music files exactly when the mix plan
/// consumes them.
pub fn build_render_command(
    graph: &CompositionGraph,
    inputs: &RenderInputs,
    output: impl AsRef<Path>,
) -> MediaResult<FfmpegCommand> {
    if graph.slices.is_empty() {
        return Err(MediaError::graph_mismatch("graph has no fragment slices"));
    }
    if inputs.fragments.len() != graph.slices.len() {
        return Err(MediaError::graph_mismatch(format!(
            "graph has {} slices but {} fragment files were supplied",
            graph.slices.len(),
            inputs.fragments.len()
        )));
    }

    let (wants_narration, wants_music) = match graph.mix {
        AudioMixPlan::NarrationAndMusic { .. } => (true, true),
        AudioMixPlan::NarrationOnly { .. } => (true, false),
        AudioMixPlan::MusicOnly { .. } => (false, true),
        AudioMixPlan::Silent => (false, false),
    };
    if wants_narration && inputs.narration.is_none() {
        return Err(MediaError::graph_mismatch(
            "mix plan requires narration but no narration file was supplied",
        ));
    }
    if wants_music && inputs.music.is_none() {
        return Err(MediaError::graph_mismatch(
            "mix plan requires music but no music file was supplied",
        ));
    }

    let mut cmd = FfmpegCommand::new(output.as_ref());
    for fragment in &inputs.fragments {
        cmd = cmd.input(fragment);
    }
    if wants_narration {
        // Narration always precedes music in input order
        cmd = cmd.input(inputs.narration.as_ref().expect("checked above"));
    }
    if wants_music {
        cmd = cmd.input(inputs.music.as_ref().expect("checked above"));
    }

    cmd = cmd.filter_complex(build_filter_complex(graph)).map("[vout]");

    cmd = if graph.mix.has_audio() {
        cmd.map("[aout]")
    } else {
        cmd.no_audio()
    };

    Ok(cmd.output_args(graph.profile.to_ffmpeg_args()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_models::{AssetReference, FragmentSlice, OutputProfile};
    use std::path::PathBuf;

    fn graph(n: usize, mix: AudioMixPlan) -> CompositionGraph {
        let slices = (0..n)
            .map(|i| FragmentSlice {
                index: i,
                source: AssetReference {
                    id: i as u64,
                    url: format!("https://example.com/{i}.mp4"),
                    duration_secs: 12.0,
                    width: 1080,
                    height: 1920,
                },
                slice_secs: 25.0 / n as f64,
            })
            .collect();

        CompositionGraph {
            slices,
            mix,
            profile: OutputProfile::default(),
        }
    }

    fn inputs(n: usize, narration: bool, music: bool) -> RenderInputs {
        RenderInputs {
            fragments: (0..n).map(|i| PathBuf::from(format!("/tmp/f{i}.mp4"))).collect(),
            narration: narration.then(|| PathBuf::from("/tmp/narration.mp3")),
            music: music.then(|| PathBuf::from("/tmp/music.mp3")),
        }
    }

    #[test]
    fn test_filter_has_one_chain_per_fragment() {
        for n in 1..=5 {
            let filter = build_filter_complex(&graph(n, AudioMixPlan::Silent));
            assert_eq!(
                filter.matches("force_original_aspect_ratio=increase").count(),
                n,
                "n={n}"
            );
            assert_eq!(filter.matches("crop=1080:1920").count(), n, "n={n}");
            assert_eq!(filter.matches("setpts=PTS-STARTPTS").count(), n, "n={n}");
            assert!(filter.contains(&format!("concat=n={n}:v=1:a=0[vout]")), "n={n}");
        }
    }

    #[test]
    fn test_filter_slice_trims() {
        let filter = build_filter_complex(&graph(5, AudioMixPlan::Silent));
        // 25s over 5 fragments
        assert_eq!(filter.matches("trim=duration=5.000").count(), 5);
    }

    #[test]
    fn test_filter_mix_both_tracks() {
        let filter = build_filter_complex(&graph(
            5,
            AudioMixPlan::select(true, true),
        ));
        assert!(filter.contains("[5:a]volume=1.2,atrim=duration=25.000[narr]"));
        assert!(filter.contains("[6:a]volume=0.15,atrim=duration=25.000[mus]"));
        assert!(filter.contains("amix=inputs=2:duration=shortest[aout]"));
    }

    #[test]
    fn test_filter_narration_only() {
        let filter = build_filter_complex(&graph(2, AudioMixPlan::select(true, false)));
        assert!(filter.contains("[2:a]volume=1.1,atrim=duration=25.000[aout]"));
        assert!(!filter.contains("amix"));
    }

    #[test]
    fn test_filter_music_only() {
        let filter = build_filter_complex(&graph(3, AudioMixPlan::select(false, true)));
        assert!(filter.contains("[3:a]volume=0.4,atrim=duration=25.000[aout]"));
    }

    #[test]
    fn test_filter_silent_has_no_audio_chain() {
        let filter = build_filter_complex(&graph(2, AudioMixPlan::Silent));
        assert!(!filter.contains("[aout]"));
        assert!(!filter.contains("volume="));
    }

    #[test]
    fn test_command_silent_disables_audio() {
        let cmd = build_render_command(
            &graph(2, AudioMixPlan::Silent),
            &inputs(2, false, false),
            "/tmp/out.mp4",
        )
        .unwrap();
        let args = cmd.build_args();
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"[aout]".to_string()));
    }

    #[test]
    fn test_command_input_order() {
        let cmd = build_render_command(
            &graph(2, AudioMixPlan::select(true, true)),
            &inputs(2, true, true),
            "/tmp/out.mp4",
        )
        .unwrap();
        // 2 fragments + narration + music
        assert_eq!(cmd.input_count(), 4);
    }

    #[test]
    fn test_command_rejects_fragment_mismatch() {
        let result = build_render_command(
            &graph(3, AudioMixPlan::Silent),
            &inputs(2, false, false),
            "/tmp/out.mp4",
        );
        assert!(matches!(result, Err(MediaError::GraphMismatch(_))));
    }

    #[test]
    fn test_command_rejects_missing_narration() {
        let result = build_render_command(
            &graph(2, AudioMixPlan::select(true, false)),
            &inputs(2, false, false),
            "/tmp/out.mp4",
        );
        assert!(matches!(result, Err(MediaError::GraphMismatch(_))));
    }

    #[test]
    fn test_command_carries_output_profile() {
        let cmd = build_render_command(
            &graph(1, AudioMixPlan::Silent),
            &inputs(1, false, false),
            "/tmp/out.mp4",
        )
        .unwrap();
        let args = cmd.build_args();
        assert!(args.contains(&"-t".to_string()));
        assert!(args.contains(&"25.000".to_string()));
        assert!(args.contains(&"+faststart".to_string()));
    }
}
