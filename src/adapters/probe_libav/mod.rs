//! Probe adapter backed by the linked libav libraries
//!
//! Available with the `libav` feature. Answers the same questions as the
//! ffprobe adapter without spawning a process per file.

use std::path::Path;

use ffmpeg_next as ffmpeg;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// LibAV-based media probing adapter
pub struct ProbeLibavAdapter;

impl ProbeLibavAdapter {
    /// Initialise libav and create the adapter
    pub fn new() -> Result<Self, DomainError> {
        ffmpeg::init().map_err(|e| {
            DomainError::MediaIoError(format!("Failed to initialize FFmpeg: {}", e))
        })?;
        Ok(Self)
    }

    fn open(file_path: &Path) -> Result<ffmpeg::format::context::Input, DomainError> {
        if !file_path.is_file() {
            return Err(DomainError::InputError(format!(
                "File does not exist: {}",
                file_path.display()
            )));
        }
        ffmpeg::format::input(&file_path).map_err(|e| {
            DomainError::MediaIoError(format!(
                "Failed to open {}: {}",
                file_path.display(),
                e
            ))
        })
    }
}

fn rational_to_f64(rate: ffmpeg::Rational) -> Option<f64> {
    if rate.denominator() == 0 || rate.numerator() <= 0 {
        None
    } else {
        Some(rate.numerator() as f64 / rate.denominator() as f64)
    }
}

fn stream_seconds(stream: &ffmpeg::Stream) -> Option<f64> {
    let duration = stream.duration();
    if duration <= 0 || duration == ffmpeg::ffi::AV_NOPTS_VALUE {
        return None;
    }
    rational_to_f64(stream.time_base()).map(|tb| duration as f64 * tb)
}

/// Rotation carried in the stream's `rotate` tag, in degrees
fn rotate_tag(stream: &ffmpeg::Stream) -> f64 {
    stream
        .metadata()
        .get("rotate")
        .and_then(|r| r.trim().parse::<f64>().ok())
        .unwrap_or(0.0)
}

fn container_seconds(input: &ffmpeg::format::context::Input) -> Option<f64> {
    let duration = input.duration();
    if duration <= 0 || duration == ffmpeg::ffi::AV_NOPTS_VALUE {
        None
    } else {
        Some(duration as f64 / ffmpeg::ffi::AV_TIME_BASE as f64)
    }
}

impl ProbePort for ProbeLibavAdapter {
    fn probe_video(&self, file_path: &Path) -> Result<VideoInfo, DomainError> {
        let input = Self::open(file_path)?;
        let stream = input
            .streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or_else(|| {
                DomainError::MediaIoError(format!("No video stream in {}", file_path.display()))
            })?;

        let decoder = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .and_then(|ctx| ctx.decoder().video())
            .map_err(|e| {
                DomainError::MediaIoError(format!(
                    "Unsupported video stream in {}: {}",
                    file_path.display(),
                    e
                ))
            })?;

        let frame_rate = rational_to_f64(stream.avg_frame_rate())
            .or_else(|| rational_to_f64(stream.rate()))
            .unwrap_or(0.0);
        let duration = stream_seconds(&stream)
            .or_else(|| container_seconds(&input))
            .unwrap_or(0.0);

        VideoInfo::new(
            file_path.to_path_buf(),
            duration,
            FrameSize::new(decoder.width(), decoder.height()).rotated(rotate_tag(&stream)),
            frame_rate,
        )
    }

    fn probe_audio_duration(&self, file_path: &Path) -> Result<f64, DomainError> {
        let input = Self::open(file_path)?;
        container_seconds(&input)
            .or_else(|| {
                input
                    .streams()
                    .best(ffmpeg::media::Type::Audio)
                    .and_then(|s| stream_seconds(&s))
            })
            .ok_or_else(|| {
                DomainError::MediaIoError(format!(
                    "Could not determine audio duration of {}",
                    file_path.display()
                ))
            })
    }
}
