//! Promo video synthesis pipeline.
//!
//! This crate provides:
//! - Script synthesis from mood/category template sets
//! - Visual cue generation and stock asset resolution with fallback
//!   escalation
//! - Narration synthesis
//! - Composition planning and render orchestration
//! - A strictly forward-progressing per-run state machine

pub mod config;
pub mod cues;
pub mod error;
pub mod narration;
pub mod orchestrator;
pub mod planner;
pub mod resolver;
pub mod script;

pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{
    AssetFetcher, FfmpegRenderBackend, HttpAssetFetcher, Pipeline, PipelineServices,
    RenderBackend, RunState,
};
