//! FFprobe adapter for media file probing
//!
//! This module provides FFprobe-based media file analysis capabilities.

use std::ffi::OsString;
use std::path::Path;

use serde::Deserialize;

use crate::adapters::process::run_tool;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// FFprobe-based probe adapter
pub struct FFprobeAdapter {
    ffprobe: String,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    side_data_list: Vec<ProbeSideData>,
    tags: Option<ProbeTags>,
}

#[derive(Debug, Deserialize)]
struct ProbeSideData {
    rotation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ProbeTags {
    rotate: Option<String>,
}

impl ProbeStream {
    /// Display rotation in degrees, from the display matrix or the legacy tag
    fn rotation(&self) -> f64 {
        self.side_data_list
            .iter()
            .find_map(|side| side.rotation)
            .or_else(|| {
                self.tags
                    .as_ref()
                    .and_then(|tags| tags.rotate.as_deref())
                    .and_then(|r| r.trim().parse::<f64>().ok())
            })
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl FFprobeAdapter {
    /// Create new FFprobe adapter
    pub fn new(ffprobe: impl Into<String>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    fn probe_json(&self, file_path: &Path) -> Result<ProbeOutput, DomainError> {
        if !file_path.is_file() {
            return Err(DomainError::InputError(format!(
                "File does not exist: {}",
                file_path.display()
            )));
        }

        let args: Vec<OsString> = vec![
            "-v".into(),
            "error".into(),
            "-print_format".into(),
            "json".into(),
            "-show_format".into(),
            "-show_streams".into(),
            file_path.as_os_str().to_owned(),
        ];
        let stdout = run_tool(&self.ffprobe, &args).map_err(|e| {
            DomainError::MediaIoError(format!("{}: ffprobe {}", file_path.display(), e))
        })?;

        parse_probe_output(&stdout, file_path)
    }
}

fn parse_probe_output(json: &[u8], file_path: &Path) -> Result<ProbeOutput, DomainError> {
    serde_json::from_slice(json).map_err(|e| {
        DomainError::MediaIoError(format!(
            "Unreadable ffprobe output for {}: {}",
            file_path.display(),
            e
        ))
    })
}

/// Parse ffprobe rationals such as `30000/1001`; `0/0` yields `None`
fn parse_rate(rate: &str) -> Option<f64> {
    let (num, den) = match rate.split_once('/') {
        Some((num, den)) => (num.parse::<f64>().ok()?, den.parse::<f64>().ok()?),
        None => (rate.parse::<f64>().ok()?, 1.0),
    };
    if den == 0.0 || num <= 0.0 {
        return None;
    }
    Some(num / den)
}

fn parse_seconds(value: Option<&String>) -> Option<f64> {
    value
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn video_info_from(probe: &ProbeOutput, file_path: &Path) -> Result<VideoInfo, DomainError> {
    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            DomainError::MediaIoError(format!("No video stream in {}", file_path.display()))
        })?;

    let size = FrameSize::new(stream.width.unwrap_or(0), stream.height.unwrap_or(0))
        .rotated(stream.rotation());
    let frame_rate = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rate))
        .unwrap_or(0.0);
    let duration = parse_seconds(stream.duration.as_ref())
        .or_else(|| parse_seconds(probe.format.as_ref().and_then(|f| f.duration.as_ref())))
        .unwrap_or(0.0);

    VideoInfo::new(file_path.to_path_buf(), duration, size, frame_rate)
}

fn audio_duration_from(probe: &ProbeOutput, file_path: &Path) -> Result<f64, DomainError> {
    parse_seconds(probe.format.as_ref().and_then(|f| f.duration.as_ref()))
        .or_else(|| {
            probe
                .streams
                .iter()
                .filter(|s| s.codec_type.as_deref() == Some("audio"))
                .find_map(|s| parse_seconds(s.duration.as_ref()))
        })
        .ok_or_else(|| {
            DomainError::MediaIoError(format!(
                "Could not determine audio duration of {}",
                file_path.display()
            ))
        })
}

impl ProbePort for FFprobeAdapter {
    fn probe_video(&self, file_path: &Path) -> Result<VideoInfo, DomainError> {
        let probe = self.probe_json(file_path)?;
        video_info_from(&probe, file_path)
    }

    fn probe_audio_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        let probe = self.probe_json(file_path)?;
        audio_duration_from(&probe, file_path)
    }
}
