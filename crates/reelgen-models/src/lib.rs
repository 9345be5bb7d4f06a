//! Shared data models for the ReelGen pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Script lines, moods and visual cues
//! - Resolved stock-footage asset references
//! - Audio mix plans and the composition graph
//! - Output encoding profile
//! - Run requests, results and metadata

pub mod asset;
pub mod graph;
pub mod mix;
pub mod output;
pub mod run;
pub mod script;

// Re-export common types
pub use asset::{AssetReference, NarrationAsset, MAX_FRAGMENT_SECS, MIN_FRAGMENT_SECS};
pub use graph::{CompositionGraph, FragmentSlice, TransformOp, MAX_FRAGMENTS};
pub use mix::AudioMixPlan;
pub use output::{OutputProfile, FRAME_HEIGHT, FRAME_WIDTH, TOTAL_DURATION_SECS};
pub use run::{output_filename, sanitize_subject, RunMetadata, RunRequest, RunResult, StageTimings};
pub use script::{Mood, ScriptLine, VisualCue, MIN_SCRIPT_LINES, SCRIPT_LINE_COUNT};
