//! FFmpeg CLI wrapper for promo video composition.
//!
//! This crate provides:
//! - Type-safe multi-input FFmpeg command building
//! - Progress parsing from `-progress pipe:2`
//! - Cancellation support via tokio
//! - Filter-graph rendering of a [`reelgen_models::CompositionGraph`]
//! - Stock fragment download over HTTP

pub mod command;
pub mod compose;
pub mod download;
pub mod error;
pub mod progress;
pub mod render;

pub use command::{check_ffmpeg, FfmpegCommand, FfmpegRunner};
pub use compose::{build_filter_complex, build_render_command};
pub use download::download_fragment;
pub use error::{MediaError, MediaResult};
pub use progress::RenderProgress;
pub use render::{RenderEvent, RenderInputs, Renderer};
