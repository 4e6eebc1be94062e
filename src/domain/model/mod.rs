// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::errors::DomainError;

/// First cut point is anchored at zero unless a beat already lies this close to it
pub const START_ANCHOR_TOLERANCE: f64 = 0.1;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> f64 {
        self.seconds
    }

    /// Parse time string in various formats
    pub fn parse(time_str: &str) -> Result<Self, DomainError> {
        let trimmed = time_str.trim();

        // Try parsing as seconds (float)
        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(DomainError::InputError(
                    "Time must be a non-negative number of seconds".to_string(),
                ));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds_part) = match parts.as_slice() {
            [m, s] => (0, parse_component(m, "minutes")?, *s),
            [h, m, s] => {
                let minutes = parse_component(m, "minutes")?;
                if minutes >= 60 {
                    return Err(DomainError::InputError(
                        "Minutes must be less than 60".to_string(),
                    ));
                }
                (parse_component(h, "hours")?, minutes, *s)
            }
            _ => {
                return Err(DomainError::InputError(format!(
                    "Invalid time format '{}'. Supported formats: seconds (e.g., 12.5), MM:SS.ms, HH:MM:SS.ms",
                    time_str
                )))
            }
        };

        let seconds = seconds_part
            .parse::<f64>()
            .map_err(|_| DomainError::InputError("Invalid seconds format".to_string()))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(DomainError::InputError(
                "Seconds must be less than 60".to_string(),
            ));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_millis = (self.seconds * 1000.0).round() as u64;
        let hours = total_millis / 3_600_000;
        let minutes = (total_millis % 3_600_000) / 60_000;
        let seconds = (total_millis % 60_000) / 1000;
        let milliseconds = total_millis % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

fn parse_component(value: &str, name: &str) -> Result<u32, DomainError> {
    value
        .parse::<u32>()
        .map_err(|_| DomainError::InputError(format!("Invalid {} format", name)))
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

impl FromStr for TimeSpec {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Portion of the audio track a job works on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioWindow {
    pub start: f64,
    pub end: f64,
}

impl AudioWindow {
    /// Resolve the requested window against the full track length.
    ///
    /// An end time at or before the start (or unset) selects everything from
    /// the start to the end of the track.
    pub fn resolve(
        start_time: f64,
        end_time: Option<f64>,
        full_duration: f64,
    ) -> Result<Self, DomainError> {
        if start_time < 0.0 || !start_time.is_finite() {
            return Err(DomainError::InputError(format!(
                "Start time must be non-negative, got {}",
                start_time
            )));
        }
        if start_time >= full_duration {
            return Err(DomainError::InputError(format!(
                "Start time {:.2}s is beyond the end of the audio ({:.2}s)",
                start_time, full_duration
            )));
        }

        let end = match end_time {
            Some(end) if end > start_time => end.min(full_duration),
            _ => full_duration,
        };

        Ok(Self {
            start: start_time,
            end,
        })
    }

    /// Length handed to the decoder, `None` meaning "to the end of file"
    pub fn analysis_duration(start_time: f64, end_time: Option<f64>) -> Option<f64> {
        match end_time {
            Some(end) if end > start_time => Some(end - start_time),
            _ => None,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Ascending, deduplicated beat timestamps in seconds relative to the analysis window
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeatSequence {
    times: Vec<f64>,
}

impl BeatSequence {
    /// Build a sequence from raw timestamps, dropping invalid values and duplicates
    pub fn from_times<I>(times: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut times: Vec<f64> = times
            .into_iter()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();
        Self { times }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Every `stride`-th beat starting with the first one
    pub fn stride(&self, stride: usize) -> Vec<f64> {
        self.times.iter().copied().step_by(stride.max(1)).collect()
    }
}

/// Output of one beat-tracking run, in analysis frames
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    pub tempo_bpm: f64,
    pub frames: Vec<usize>,
}

/// Everything the extractor hands back for one audio window
#[derive(Debug, Clone)]
pub struct BeatAnalysis {
    pub beats: BeatSequence,
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub tempo_bpm: Option<f64>,
}

/// Span between two consecutive cut points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatInterval {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl BeatInterval {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Cut points derived from the beat sequence, anchored at 0 and the audio length
#[derive(Debug, Clone, PartialEq)]
pub struct CutPlan {
    points: Vec<f64>,
}

impl CutPlan {
    pub(crate) fn from_points(points: Vec<f64>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len().saturating_sub(1)
    }

    /// Consecutive intervals; zero-length spans are skipped
    pub fn intervals(&self) -> impl Iterator<Item = BeatInterval> + '_ {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, pair)| BeatInterval {
                index,
                start: pair[0],
                end: pair[1],
            })
            .filter(|interval| interval.duration() > 0.0)
    }

    pub fn total_duration(&self) -> f64 {
        self.intervals().map(|interval| interval.duration()).sum()
    }
}

/// Job-level playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Forward,
    Backward,
    #[default]
    Random,
}

impl Direction {
    pub fn parse(direction_str: &str) -> Result<Self, DomainError> {
        match direction_str.trim().to_lowercase().as_str() {
            "forward" => Ok(Direction::Forward),
            "backward" => Ok(Direction::Backward),
            "random" => Ok(Direction::Random),
            _ => Err(DomainError::InputError(format!(
                "Invalid direction: {}. Valid directions: forward, backward, random",
                direction_str
            ))),
        }
    }

    /// Whether a per-segment coin flip is needed to decide the orientation
    pub fn needs_coin(&self) -> bool {
        matches!(self, Direction::Random)
    }

    /// Orientation for one segment; `coin` is only consulted in random mode
    pub fn resolve(&self, coin: bool) -> Orientation {
        match self {
            Direction::Forward => Orientation::Forward,
            Direction::Backward => Orientation::Backward,
            Direction::Random if coin => Orientation::Backward,
            Direction::Random => Orientation::Forward,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Forward => "forward",
            Direction::Backward => "backward",
            Direction::Random => "random",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Playback direction resolved for a single segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Forward,
    Backward,
}

/// Job-wide playback speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackSpeed {
    Half,
    #[default]
    Normal,
    Double,
}

impl PlaybackSpeed {
    pub fn factor(&self) -> f64 {
        match self {
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
        }
    }

    /// Accepts CLI names, form labels ("Half Speed") and numeric factors
    pub fn parse(speed_str: &str) -> Result<Self, DomainError> {
        let normalized = speed_str.trim().to_lowercase();
        let label = normalized.strip_suffix(" speed").unwrap_or(&normalized);
        match label {
            "half" | "0.5" => Ok(PlaybackSpeed::Half),
            "normal" | "1" | "1.0" => Ok(PlaybackSpeed::Normal),
            "double" | "2" | "2.0" => Ok(PlaybackSpeed::Double),
            _ => Err(DomainError::InputError(format!(
                "Invalid playback speed: {}. Valid speeds: normal, half, double",
                speed_str
            ))),
        }
    }
}

impl FromStr for PlaybackSpeed {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Frame dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Displayed size of a frame stored with `degrees` of rotation metadata
    pub fn rotated(self, degrees: f64) -> Self {
        let quarter_turns = (degrees / 90.0).round() as i64;
        if quarter_turns.rem_euclid(2) == 1 {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Probed properties of a candidate source video
#[derive(Debug, Clone, PartialEq)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub duration: f64,
    pub size: FrameSize,
    pub frame_rate: f64,
}

impl VideoInfo {
    pub fn new(
        path: PathBuf,
        duration: f64,
        size: FrameSize,
        frame_rate: f64,
    ) -> Result<Self, DomainError> {
        if size.width == 0 || size.height == 0 {
            return Err(DomainError::MediaIoError(format!(
                "Video dimensions cannot be zero: {}",
                path.display()
            )));
        }
        if frame_rate <= 0.0 || !frame_rate.is_finite() {
            return Err(DomainError::MediaIoError(format!(
                "Frame rate must be positive: {}",
                path.display()
            )));
        }
        if duration <= 0.0 || !duration.is_finite() {
            return Err(DomainError::MediaIoError(format!(
                "Could not determine media duration: {}",
                path.display()
            )));
        }

        Ok(Self {
            path,
            duration,
            size,
            frame_rate,
        })
    }

    /// Duration of one frame in seconds
    pub fn frame_period(&self) -> f64 {
        1.0 / self.frame_rate
    }
}

/// Window cut out of a source clip, in source seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimWindow {
    pub start: f64,
    pub end: f64,
}

impl TrimWindow {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }
}

/// Time-scale transform followed by a snap back onto the beat grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedChange {
    pub factor: f64,
    pub snap_duration: f64,
}

/// Time reversal of a clip that lasts `duration` seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reversal {
    pub duration: f64,
    pub frame_period: f64,
}

/// Everything the compositor needs to render one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentPlan {
    pub index: usize,
    pub source: PathBuf,
    /// Time this segment occupies on the beat grid
    pub target_duration: f64,
    /// Intrinsic length of the source file
    pub source_duration: f64,
    /// `None` when the whole source is used
    pub trim: Option<TrimWindow>,
    pub speed: Option<SpeedChange>,
    pub reversal: Option<Reversal>,
    /// Set when the source must be stretched to the canonical size
    pub resize: Option<FrameSize>,
    pub source_size: FrameSize,
    pub frame_rate: f64,
}

impl SegmentPlan {
    /// Length of the clip cut from the source, before any transform
    pub fn cut_duration(&self) -> f64 {
        self.trim.map(|t| t.len()).unwrap_or(self.source_duration)
    }

    /// Length on the output timeline after speed and direction transforms
    pub fn output_duration(&self) -> f64 {
        let scaled = match self.speed {
            Some(change) => change.snap_duration,
            None => self.cut_duration(),
        };
        match self.reversal {
            Some(reversal) => reversal.duration,
            None => scaled,
        }
    }

    /// Frame size as it appears on the timeline
    pub fn frame_size(&self) -> FrameSize {
        self.resize.unwrap_or(self.source_size)
    }

    pub fn is_reversed(&self) -> bool {
        self.reversal.is_some()
    }
}

/// Ordered, size-normalized segments bounded by the trimmed audio
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub segments: Vec<SegmentPlan>,
    pub canonical_size: FrameSize,
    /// Frame rate of the first segment; every segment is rendered at it
    pub canonical_rate: f64,
    pub audio_bound: f64,
}

impl Timeline {
    /// Sum of segment durations before clamping
    pub fn duration(&self) -> f64 {
        self.segments.iter().map(SegmentPlan::output_duration).sum()
    }

    /// Final length, never longer than the audio
    pub fn clamped_duration(&self) -> f64 {
        self.duration().min(self.audio_bound)
    }
}

/// Audio attached to the rendered timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Soundtrack {
    pub path: PathBuf,
    pub window: AudioWindow,
}

/// Immutable parameters for one assembly job
#[derive(Debug, Clone)]
pub struct JobParameters {
    pub mp3_path: PathBuf,
    pub video_pool: Vec<PathBuf>,
    pub cut_intensity: usize,
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub output_path: PathBuf,
    pub direction: Direction,
    pub speed: PlaybackSpeed,
}

/// Summary of an encoded music video
#[derive(Debug, Clone, Serialize)]
pub struct RenderReport {
    pub output_path: PathBuf,
    pub segment_count: usize,
    pub timeline_duration: f64,
    pub clamped_duration: f64,
    pub rendered_at: DateTime<Utc>,
}
