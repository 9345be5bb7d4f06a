//! Composition graph: the declarative processing plan for one render.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::asset::AssetReference;
use crate::mix::AudioMixPlan;
use crate::output::OutputProfile;

/// Maximum number of fragments composed into one output. Excess resolved
/// assets are dropped in resolution order.
pub const MAX_FRAGMENTS: usize = 5;

/// A single transform applied to one fragment before concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformOp {
    /// Scale so the frame is fully covered, preserving aspect ratio.
    ScaleToCover { width: u32, height: u32 },
    /// Center-crop to the exact frame dimensions.
    CenterCrop { width: u32, height: u32 },
    /// Reset presentation timestamps so trimmed streams concatenate cleanly.
    ResetPts,
    /// Trim to the assigned slice length.
    Trim { secs: f64 },
}

/// One fragment's place in the composition: its source and assigned slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FragmentSlice {
    /// Position in concatenation order (0-based).
    pub index: usize,
    /// The resolved source fragment.
    pub source: AssetReference,
    /// Assigned slice length in seconds (total duration / fragment count).
    pub slice_secs: f64,
}

impl FragmentSlice {
    /// The ordered transform chain for this fragment.
    pub fn transform_chain(&self, profile: &OutputProfile) -> Vec<TransformOp> {
        vec![
            TransformOp::ScaleToCover {
                width: profile.width,
                height: profile.height,
            },
            TransformOp::CenterCrop {
                width: profile.width,
                height: profile.height,
            },
            TransformOp::ResetPts,
            TransformOp::Trim {
                secs: self.slice_secs,
            },
        ]
    }
}

/// The full processing plan for one render.
///
/// Built once per run by the composition planner, never mutated, consumed by
/// the renderer. The graph shape is fully determined by the count and kind
/// of resolved assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CompositionGraph {
    /// Fragments in concatenation order.
    pub slices: Vec<FragmentSlice>,
    /// Selected audio chain.
    pub mix: AudioMixPlan,
    /// Output encoding constraints.
    pub profile: OutputProfile,
}

impl CompositionGraph {
    /// Number of concatenation joins (`n - 1` for `n` fragments).
    pub fn concat_joins(&self) -> usize {
        self.slices.len().saturating_sub(1)
    }

    /// Sum of assigned slice lengths in seconds.
    ///
    /// Equals the profile duration up to per-slice rounding; the remainder
    /// is absorbed by the output duration clamp, not redistributed.
    pub fn total_slice_secs(&self) -> f64 {
        self.slices.iter().map(|s| s.slice_secs).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: u64) -> AssetReference {
        AssetReference {
            id,
            url: format!("https://example.com/{id}.mp4"),
            duration_secs: 15.0,
            width: 1080,
            height: 1920,
        }
    }

    #[test]
    fn test_transform_chain_shape() {
        let slice = FragmentSlice {
            index: 0,
            source: asset(1),
            slice_secs: 5.0,
        };
        let chain = slice.transform_chain(&OutputProfile::default());

        assert_eq!(chain.len(), 4);
        assert!(matches!(
            chain[0],
            TransformOp::ScaleToCover {
                width: 1080,
                height: 1920
            }
        ));
        assert!(matches!(
            chain[1],
            TransformOp::CenterCrop {
                width: 1080,
                height: 1920
            }
        ));
        assert!(matches!(chain[2], TransformOp::ResetPts));
        assert!(matches!(chain[3], TransformOp::Trim { .. }));
    }

    #[test]
    fn test_concat_joins() {
        let graph = CompositionGraph {
            slices: (0..3)
                .map(|i| FragmentSlice {
                    index: i,
                    source: asset(i as u64),
                    slice_secs: 25.0 / 3.0,
                })
                .collect(),
            mix: AudioMixPlan::Silent,
            profile: OutputProfile::default(),
        };

        assert_eq!(graph.concat_joins(), 2);
        assert!((graph.total_slice_secs() - 25.0).abs() < 0.001);
    }
}
