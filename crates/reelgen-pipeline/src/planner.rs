//! Composition planning.
//!
//! Pure translation of resolved assets into a [`CompositionGraph`]: equal
//! slice assignment, the per-fragment transform chain, one concatenation,
//! and the audio mix selected by track presence. No I/O; deterministic
//! given its inputs.

use tracing::debug;

use reelgen_models::{
    AssetReference, AudioMixPlan, CompositionGraph, FragmentSlice, OutputProfile, MAX_FRAGMENTS,
};

use crate::error::{PipelineError, PipelineResult};

/// Build the composition graph for a run.
///
/// Fragment count is capped at [`MAX_FRAGMENTS`]; excess assets are
/// dropped, keeping the first in resolution order. Each kept fragment gets
/// an equal slice of the profile duration; the rounding remainder is
/// absorbed by the profile's hard output clamp, not redistributed.
pub fn plan(
    fragments: &[AssetReference],
    narration_present: bool,
    music_present: bool,
    profile: OutputProfile,
) -> PipelineResult<CompositionGraph> {
    if fragments.is_empty() {
        return Err(PipelineError::NoAssetsFound);
    }

    let kept = &fragments[..fragments.len().min(MAX_FRAGMENTS)];
    let slice_secs = profile.duration_secs / kept.len() as f64;

    let slices = kept
        .iter()
        .enumerate()
        .map(|(index, source)| FragmentSlice {
            index,
            source: source.clone(),
            slice_secs,
        })
        .collect();

    let mix = AudioMixPlan::select(narration_present, music_present);
    debug!(
        "Planned composition: {} fragments x {:.3}s, mix={}",
        kept.len(),
        slice_secs,
        mix.as_str()
    );

    Ok(CompositionGraph {
        slices,
        mix,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelgen_models::TransformOp;

    fn assets(n: usize) -> Vec<AssetReference> {
        (0..n)
            .map(|i| AssetReference {
                id: i as u64,
                url: format!("https://cdn.example.com/{i}.mp4"),
                duration_secs: 12.0,
                width: 1080,
                height: 1920,
            })
            .collect()
    }

    #[test]
    fn test_slices_sum_to_total_duration() {
        for n in 1..=5 {
            let graph = plan(&assets(n), false, false, OutputProfile::default()).unwrap();
            assert_eq!(graph.slices.len(), n);
            assert_eq!(graph.concat_joins(), n - 1);
            // Within one-frame tolerance at 30fps
            assert!(
                (graph.total_slice_secs() - 25.0).abs() < 1.0 / 30.0,
                "n={n}: {}",
                graph.total_slice_secs()
            );
        }
    }

    #[test]
    fn test_slices_are_equal() {
        let graph = plan(&assets(4), false, false, OutputProfile::default()).unwrap();
        for slice in &graph.slices {
            assert!((slice.slice_secs - 6.25).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_excess_fragments_dropped_in_order() {
        let graph = plan(&assets(8), false, false, OutputProfile::default()).unwrap();
        assert_eq!(graph.slices.len(), MAX_FRAGMENTS);
        // First five in resolution order are kept
        let ids: Vec<u64> = graph.slices.iter().map(|s| s.source.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mix_follows_track_presence() {
        let a = assets(2);
        let profile = OutputProfile::default;

        assert!(matches!(
            plan(&a, true, true, profile()).unwrap().mix,
            AudioMixPlan::NarrationAndMusic { .. }
        ));
        assert!(matches!(
            plan(&a, true, false, profile()).unwrap().mix,
            AudioMixPlan::NarrationOnly { .. }
        ));
        assert!(matches!(
            plan(&a, false, true, profile()).unwrap().mix,
            AudioMixPlan::MusicOnly { .. }
        ));
        assert!(matches!(
            plan(&a, false, false, profile()).unwrap().mix,
            AudioMixPlan::Silent
        ));
    }

    #[test]
    fn test_five_fragments_both_tracks_scenario() {
        let graph = plan(&assets(5), true, true, OutputProfile::default()).unwrap();

        assert_eq!(graph.slices.len(), 5);
        assert_eq!(graph.concat_joins(), 4);
        assert!((graph.profile.duration_secs - 25.0).abs() < f64::EPSILON);

        match graph.mix {
            AudioMixPlan::NarrationAndMusic {
                narration_gain,
                music_gain,
            } => {
                assert!((narration_gain - 1.2).abs() < f64::EPSILON);
                assert!((music_gain - 0.15).abs() < f64::EPSILON);
            }
            other => panic!("unexpected mix: {other:?}"),
        }

        // Every fragment carries the full transform chain
        for slice in &graph.slices {
            let chain = slice.transform_chain(&graph.profile);
            assert_eq!(chain.len(), 4);
            assert!(matches!(chain[3], TransformOp::Trim { secs } if (secs - 5.0).abs() < 1e-9));
        }
    }

    #[test]
    fn test_zero_fragments_is_error() {
        let err = plan(&[], true, true, OutputProfile::default()).unwrap_err();
        assert!(matches!(err, PipelineError::NoAssetsFound));
    }
}
