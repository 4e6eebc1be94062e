// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::CutterConfig;
use crate::domain::errors::*;
use crate::domain::model::*;

/// Port for decoding audio into mono samples
pub trait AudioDecodePort: Send + Sync {
    /// Load `duration` seconds (to end of file when `None`) starting at
    /// `offset`, resampled to `sample_rate`
    fn load(
        &self,
        file_path: &Path,
        sample_rate: u32,
        offset: f64,
        duration: Option<f64>,
    ) -> Result<Vec<f32>, DomainError>;
}

/// Port for media file probing
pub trait ProbePort: Send + Sync {
    /// Duration, frame size and frame rate of the primary video stream
    fn probe_video(&self, file_path: &Path) -> Result<VideoInfo, DomainError>;

    /// Total duration of an audio file in seconds
    fn probe_audio_duration(&self, file_path: &Path) -> Result<f64, DomainError>;
}

/// Error reported by a beat tracker
#[derive(Debug, Clone, PartialEq)]
pub enum TrackError {
    /// The tracker cannot work with the supplied input shape
    IncompatibleInput(String),
    /// Tracking ran but failed
    Failed(String),
}

impl fmt::Display for TrackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackError::IncompatibleInput(msg) => write!(f, "Incompatible tracker input: {}", msg),
            TrackError::Failed(msg) => write!(f, "Beat tracking failed: {}", msg),
        }
    }
}

impl std::error::Error for TrackError {}

impl From<TrackError> for DomainError {
    fn from(err: TrackError) -> Self {
        DomainError::AnalysisError(err.to_string())
    }
}

/// Port for tempo estimation and beat tracking
pub trait BeatTrackPort: Send + Sync {
    /// Track beats on a precomputed onset-strength envelope
    fn track_envelope(
        &self,
        onset_envelope: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatTrack, TrackError>;

    /// Track beats on the raw signal using full-spectrum onset strength
    fn track_signal(
        &self,
        samples: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatTrack, TrackError>;
}

/// Port for rendering a timeline into a muxed video file
pub trait CompositorPort: Send + Sync {
    /// Concatenate the timeline, attach the soundtrack and encode to `output`
    fn compose(
        &self,
        timeline: &Timeline,
        soundtrack: &Soundtrack,
        output: &Path,
    ) -> Result<RenderReport, DomainError>;
}

/// Port for file system operations
pub trait FsPort: Send + Sync {
    /// Check if file exists
    fn file_exists(&self, file_path: &Path) -> bool;

    /// Check if directory exists
    fn directory_exists(&self, dir_path: &Path) -> bool;

    /// List `*.mp4`/`*.MP4` files directly inside a directory
    fn list_videos(&self, dir_path: &Path) -> Result<Vec<PathBuf>, DomainError>;

    /// Create directory (including parent directories)
    fn create_directory(&self, dir_path: &Path) -> Result<(), DomainError>;

    /// Copy file
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;

    /// Move file, falling back to copy and delete across devices
    fn move_file(&self, from: &Path, to: &Path) -> Result<(), DomainError>;
}

/// Port for configuration management
pub trait ConfigPort: Send + Sync {
    /// Load configuration from `file_path`, or from the default search path
    fn load_config(&self, file_path: Option<&Path>) -> Result<CutterConfig, DomainError>;
}

/// Port for logging and observability
pub trait LogPort: Send + Sync {
    /// Log info message
    fn info(&self, message: &str);

    /// Log warning message
    fn warn(&self, message: &str);

    /// Log error message
    fn error(&self, message: &str);

    /// Log debug message
    fn debug(&self, message: &str);
}

/// Source of randomness for clip selection.
///
/// Injected so callers can run jobs from a seeded generator.
pub trait RandomSource {
    /// Uniform index in `0..len`; `len` must be non-zero
    fn pick_index(&mut self, len: usize) -> usize;

    /// Uniform value in `[low, high]`
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Fair coin flip
    fn coin_flip(&mut self) -> bool;
}

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse log level from string
    pub fn parse(level_str: &str) -> Result<Self, DomainError> {
        match level_str.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(DomainError::ConfigError(format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
