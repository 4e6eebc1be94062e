//! FFmpeg audio decode adapter
//!
//! Decodes any audio ffmpeg understands into mono 32-bit float PCM at the
//! requested sample rate.

use std::ffi::OsString;
use std::path::Path;

use crate::adapters::process::{run_tool, seconds_arg};
use crate::domain::errors::*;
use crate::ports::*;

/// FFmpeg-based audio decoder
pub struct FFmpegDecodeAdapter {
    ffmpeg: String,
}

impl FFmpegDecodeAdapter {
    /// Create new decoder using the given ffmpeg binary
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn decode_args(
        file_path: &Path,
        sample_rate: u32,
        offset: f64,
        duration: Option<f64>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-v".into(), "error".into(), "-nostdin".into()];
        if offset > 0.0 {
            args.push("-ss".into());
            args.push(seconds_arg(offset));
        }
        if let Some(duration) = duration {
            args.push("-t".into());
            args.push(seconds_arg(duration));
        }
        args.push("-i".into());
        args.push(file_path.as_os_str().to_owned());
        args.extend(
            ["-vn", "-ac", "1", "-ar"]
                .into_iter()
                .map(OsString::from),
        );
        args.push(sample_rate.to_string().into());
        args.extend(["-f", "f32le", "-"].into_iter().map(OsString::from));
        args
    }
}

/// Reinterpret little-endian f32 PCM bytes; a trailing partial sample is dropped
fn decode_f32le(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

impl AudioDecodePort for FFmpegDecodeAdapter {
    fn load(
        &self,
        file_path: &Path,
        sample_rate: u32,
        offset: f64,
        duration: Option<f64>,
    ) -> Result<Vec<f32>, DomainError> {
        if !file_path.is_file() {
            return Err(DomainError::AudioLoadError(format!(
                "Audio file not found: {}",
                file_path.display()
            )));
        }

        let args = Self::decode_args(file_path, sample_rate, offset, duration);
        let pcm = run_tool(&self.ffmpeg, &args).map_err(|e| {
            DomainError::AudioLoadError(format!("{}: ffmpeg {}", file_path.display(), e))
        })?;

        Ok(decode_f32le(&pcm))
    }
}
