// Domain errors - Error types for the domain layer

use std::fmt;

/// Domain-specific error types
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing or invalid input file or directory
    InputError(String),
    /// Audio could not be loaded or decoded
    AudioLoadError(String),
    /// Decoded audio could not be analysed for beats
    AnalysisError(String),
    /// Beat analysis produced zero beats
    NoBeatsError,
    /// Cut plan degenerated to fewer than two boundary points
    EmptyTimelineError,
    /// No segment could be constructed
    NoValidClipsError,
    /// Decode/encode failure reported by the media tools
    MediaIoError(String),
    /// Invalid or unreadable configuration
    ConfigError(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::InputError(msg) => write!(f, "Input error: {}", msg),
            DomainError::AudioLoadError(msg) => write!(f, "Failed to load audio: {}", msg),
            DomainError::AnalysisError(msg) => write!(f, "Beat analysis failed: {}", msg),
            DomainError::NoBeatsError => {
                write!(f, "No beats were detected. Cannot create video.")
            }
            DomainError::EmptyTimelineError => {
                write!(f, "Cut plan has fewer than two boundary points")
            }
            DomainError::NoValidClipsError => {
                write!(f, "No valid video clips could be created")
            }
            DomainError::MediaIoError(msg) => write!(f, "Media I/O error: {}", msg),
            DomainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::MediaIoError(err.to_string())
    }
}
