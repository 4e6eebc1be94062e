//! FFmpeg compositor adapter
//!
//! Renders every timeline segment into the staging directory, stitches them
//! with the concat demuxer and muxes the trimmed soundtrack on top. The
//! staging directory is removed whether or not the render succeeds.
//!
//! The concat demuxer needs identical stream parameters in every input, so
//! each segment is resampled to the timeline's canonical rate and written
//! with the same track timescale.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::adapters::process::{run_tool, seconds_arg};
use crate::config::EncodingConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const CONCAT_LIST: &str = "segments.txt";
const STAGING_PREFIX: &str = "beatcut-";
const TRACK_TIMESCALE: u32 = 90_000;

/// FFmpeg-based compositor
pub struct FFmpegCompositor {
    ffmpeg: String,
    encoding: EncodingConfig,
    staging_root: PathBuf,
}

impl FFmpegCompositor {
    /// Create new compositor staging its work under the system temp dir
    pub fn new(ffmpeg: impl Into<String>, encoding: EncodingConfig) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            encoding,
            staging_root: std::env::temp_dir(),
        }
    }

    /// Stage intermediate files under `root` instead
    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    fn run(&self, args: Vec<OsString>, step: &str) -> Result<(), DomainError> {
        run_tool(&self.ffmpeg, &args)
            .map(|_| ())
            .map_err(|e| DomainError::MediaIoError(format!("{} failed: ffmpeg {}", step, e)))
    }

    fn base_args() -> Vec<OsString> {
        ["-y", "-v", "error", "-nostdin"]
            .into_iter()
            .map(OsString::from)
            .collect()
    }

    /// Arguments rendering one segment into `target`
    fn segment_args(
        &self,
        segment: &SegmentPlan,
        frame_rate: f64,
        target: &Path,
    ) -> Vec<OsString> {
        let mut args = Self::base_args();
        if let Some(trim) = segment.trim {
            args.push("-ss".into());
            args.push(seconds_arg(trim.start));
            args.push("-t".into());
            args.push(seconds_arg(trim.len()));
        }
        args.push("-i".into());
        args.push(segment.source.as_os_str().to_owned());
        args.push("-vf".into());
        args.push(
            segment_filters(segment, frame_rate, &self.encoding.pixel_format)
                .join(",")
                .into(),
        );
        args.push("-an".into());
        self.push_video_codec(&mut args);
        args.push("-video_track_timescale".into());
        args.push(TRACK_TIMESCALE.to_string().into());
        args.push(target.as_os_str().to_owned());
        args
    }

    fn push_video_codec(&self, args: &mut Vec<OsString>) {
        args.push("-c:v".into());
        args.push(self.encoding.video_codec.clone().into());
        args.push("-preset".into());
        args.push(self.encoding.preset.clone().into());
        args.push("-pix_fmt".into());
        args.push(self.encoding.pixel_format.clone().into());
        args.push("-threads".into());
        args.push(self.encoding.threads.to_string().into());
    }

    /// Arguments cutting the analysed audio window into `target`
    fn audio_args(&self, soundtrack: &Soundtrack, target: &Path) -> Vec<OsString> {
        let mut args = Self::base_args();
        if soundtrack.window.start > 0.0 {
            args.push("-ss".into());
            args.push(seconds_arg(soundtrack.window.start));
        }
        args.push("-t".into());
        args.push(seconds_arg(soundtrack.window.duration()));
        args.push("-i".into());
        args.push(soundtrack.path.as_os_str().to_owned());
        args.push("-vn".into());
        args.push("-c:a".into());
        args.push(self.encoding.audio_codec.clone().into());
        args.push(target.as_os_str().to_owned());
        args
    }

    /// Arguments for the final concat and mux
    fn mux_args(
        &self,
        concat_list: &Path,
        audio: &Path,
        duration: f64,
        output: &Path,
    ) -> Vec<OsString> {
        let mut args = Self::base_args();
        args.extend(["-f", "concat", "-safe", "0", "-i"].into_iter().map(OsString::from));
        args.push(concat_list.as_os_str().to_owned());
        args.push("-i".into());
        args.push(audio.as_os_str().to_owned());
        args.extend(["-map", "0:v:0", "-map", "1:a:0"].into_iter().map(OsString::from));
        self.push_video_codec(&mut args);
        args.push("-c:a".into());
        args.push(self.encoding.audio_codec.clone().into());
        args.push("-t".into());
        args.push(seconds_arg(duration));
        args.push(output.as_os_str().to_owned());
        args
    }
}

/// Video filter chain applying a segment's speed, direction, rate and size
fn segment_filters(segment: &SegmentPlan, frame_rate: f64, pixel_format: &str) -> Vec<String> {
    let mut filters = Vec::new();
    let output_duration = segment.output_duration();

    if let Some(change) = segment.speed {
        filters.push(format!("setpts=PTS/{}", change.factor));
        // Pad with the last frame, then cut back onto the beat grid
        filters.push(format!(
            "tpad=stop_mode=clone:stop_duration={:.6}",
            change.snap_duration
        ));
        filters.push(format!("trim=duration={:.6}", change.snap_duration));
        filters.push("setpts=PTS-STARTPTS".to_string());
    }

    if let Some(reversal) = segment.reversal {
        filters.push("reverse".to_string());
        filters.push(format!("trim=duration={:.6}", reversal.duration));
        filters.push("setpts=PTS-STARTPTS".to_string());
    }

    filters.push(format!("fps={}", frame_rate));

    if let Some(size) = segment.resize {
        filters.push(format!("scale={}:{}", size.width, size.height));
    }
    filters.push("setsar=1".to_string());
    filters.push(format!("format={}", pixel_format));

    debug!(
        segment = segment.index,
        duration = output_duration,
        filters = %filters.join(","),
        "segment filter chain"
    );
    filters
}

/// Concat demuxer listing with single quotes escaped
fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            let escaped = p.to_string_lossy().replace('\'', "'\\''");
            format!("file '{}'\n", escaped)
        })
        .collect()
}

impl CompositorPort for FFmpegCompositor {
    fn compose(
        &self,
        timeline: &Timeline,
        soundtrack: &Soundtrack,
        output: &Path,
    ) -> Result<RenderReport, DomainError> {
        if timeline.segments.is_empty() {
            return Err(DomainError::NoValidClipsError);
        }

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.staging_root)?;
        debug!("Staging directory: {}", staging.path().display());

        let mut rendered = Vec::with_capacity(timeline.segments.len());
        for segment in &timeline.segments {
            let target = staging
                .path()
                .join(format!("segment_{:04}.mp4", segment.index));
            info!(
                "Rendering segment {} from {} ({:.3}s)",
                segment.index + 1,
                segment.source.display(),
                segment.output_duration()
            );
            self.run(
                self.segment_args(segment, timeline.canonical_rate, &target),
                "Segment render",
            )?;
            rendered.push(target);
        }

        let list_path = staging.path().join(CONCAT_LIST);
        fs::write(&list_path, concat_list(&rendered))?;

        let audio_path = staging.path().join(&self.encoding.temp_audio_file);
        self.run(self.audio_args(soundtrack, &audio_path), "Audio extraction")?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let clamped = timeline.clamped_duration();
        info!(
            "Encoding {} segments ({:.3}s, clamped to {:.3}s) to {}",
            timeline.segments.len(),
            timeline.duration(),
            clamped,
            output.display()
        );
        self.run(
            self.mux_args(&list_path, &audio_path, clamped, output),
            "Final encode",
        )?;

        staging.close()?;

        Ok(RenderReport {
            output_path: output.to_path_buf(),
            segment_count: timeline.segments.len(),
            timeline_duration: timeline.duration(),
            clamped_duration: clamped,
            rendered_at: Utc::now(),
        })
    }
}
