//! BeatCut music video cutter library
//!
//! Detects beats in the bass band of an audio track and assembles a video
//! from randomly chosen clips cut exactly on those beats.

pub mod adapters;
pub mod analysis;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use config::CutterConfig;
pub use domain::errors::DomainError;
pub use domain::model::{BeatSequence, CutPlan, JobParameters, RenderReport, Timeline};
pub use error::{CutterError, CutterResult};

/// Initialize BeatCut library
pub fn init() -> CutterResult<()> {
    #[cfg(feature = "libav")]
    ffmpeg_next::init()?;

    Ok(())
}
