//! Error handling module for BeatCut

use thiserror::Error;

use crate::domain::errors::DomainError;

/// Main error type for BeatCut operations
#[derive(Error, Debug)]
pub enum CutterError {
    /// Failure raised by the beat/timeline core
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration could not be read or parsed
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Logging subsystem could not be installed
    #[error("Failed to initialize logging: {message}")]
    LoggingInit { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// FFmpeg error
    #[cfg(feature = "libav")]
    #[error("FFmpeg error: {0}")]
    FFmpeg(#[from] ffmpeg_next::Error),
}

/// Result type alias for BeatCut operations
pub type CutterResult<T> = std::result::Result<T, CutterError>;
