//! Runtime configuration for BeatCut
//!
//! Values are layered: built-in defaults, then a TOML or YAML file, then
//! `BEATCUT_*` environment variables, then command-line flags.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::ports::LogLevel;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CutterConfig {
    pub log_level: String,
    pub analysis: AnalysisConfig,
    pub encoding: EncodingConfig,
    pub tools: ToolsConfig,
    pub output: OutputConfig,
}

/// Beat analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub sample_rate: u32,
    pub n_fft: usize,
    pub hop_length: usize,
    pub bass_low_hz: f32,
    pub bass_high_hz: f32,
    /// Tempo prior centre for the beat tracker
    pub start_bpm: f64,
    /// How strongly the tracker sticks to the estimated tempo
    pub tightness: f64,
}

/// Output encoding settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub pixel_format: String,
    /// Name of the trimmed-audio intermediate inside the staging directory
    pub temp_audio_file: String,
    pub threads: usize,
}

/// External tool locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg: String,
    pub ffprobe: String,
}

/// Where finished videos land
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: String,
}

impl Default for CutterConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            analysis: AnalysisConfig::default(),
            encoding: EncodingConfig::default(),
            tools: ToolsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22_050,
            n_fft: 2048,
            hop_length: 512,
            bass_low_hz: 20.0,
            bass_high_hz: 200.0,
            start_bpm: 120.0,
            tightness: 100.0,
        }
    }
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "medium".to_string(),
            pixel_format: "yuv420p".to_string(),
            temp_audio_file: "temp-audio.m4a".to_string(),
            threads: num_cpus::get(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
        }
    }
}

/// Environment variables and the setting each one overrides
const ENV_OVERRIDES: &[&str] = &[
    "BEATCUT_LOG_LEVEL",
    "BEATCUT_FFMPEG",
    "BEATCUT_FFPROBE",
    "BEATCUT_OUTPUT_DIR",
    "BEATCUT_THREADS",
];

impl CutterConfig {
    /// Apply `BEATCUT_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ENV_OVERRIDES {
            let Some(value) = lookup(key) else { continue };
            match *key {
                "BEATCUT_LOG_LEVEL" => self.log_level = value,
                "BEATCUT_FFMPEG" => self.tools.ffmpeg = value,
                "BEATCUT_FFPROBE" => self.tools.ffprobe = value,
                "BEATCUT_OUTPUT_DIR" => self.output.directory = value,
                "BEATCUT_THREADS" => {
                    self.encoding.threads = value.parse().map_err(|e| {
                        DomainError::ConfigError(format!("Invalid BEATCUT_THREADS value: {}", e))
                    })?
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        LogLevel::parse(&self.log_level)?;

        let analysis = &self.analysis;
        if analysis.sample_rate == 0 {
            return Err(DomainError::ConfigError(
                "analysis.sample_rate must be positive".to_string(),
            ));
        }
        if analysis.n_fft < 2 {
            return Err(DomainError::ConfigError(
                "analysis.n_fft must be at least 2".to_string(),
            ));
        }
        if analysis.hop_length == 0 {
            return Err(DomainError::ConfigError(
                "analysis.hop_length must be at least 1".to_string(),
            ));
        }
        if analysis.bass_low_hz < 0.0 || analysis.bass_low_hz > analysis.bass_high_hz {
            return Err(DomainError::ConfigError(format!(
                "Invalid bass band {}-{} Hz",
                analysis.bass_low_hz, analysis.bass_high_hz
            )));
        }
        if analysis.start_bpm <= 0.0 {
            return Err(DomainError::ConfigError(
                "analysis.start_bpm must be positive".to_string(),
            ));
        }
        if self.encoding.threads == 0 {
            return Err(DomainError::ConfigError(
                "encoding.threads must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
