//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{Direction, PlaybackSpeed, TimeSpec};

/// Accepted range for the positional cut intensity
fn cut_intensity_range(s: &str) -> Result<usize, String> {
    clap_num::number_range(s, 1, 3)
}

/// Arguments for building a music video
#[derive(Args, Debug, Clone)]
pub struct CutArgs {
    /// Audio track to cut to
    pub mp3_file: PathBuf,

    /// Directory containing the MP4 source clips
    pub video_directory: PathBuf,

    /// Use every Nth detected beat as a cut (1 = every beat)
    #[arg(value_parser = cut_intensity_range)]
    pub cut_intensity: usize,

    /// Output video file
    #[arg(short, long, default_value = "output_music_video.mp4")]
    pub output: PathBuf,

    /// Nominal clip duration in seconds (accepted for compatibility, not used)
    #[arg(short, long, default_value_t = 2.0)]
    pub duration: f64,

    /// Start of the audio window (seconds, MM:SS or HH:MM:SS)
    #[arg(short = 's', long, default_value = "0", value_parser = TimeSpec::parse)]
    pub start_time: TimeSpec,

    /// End of the audio window (default: end of track)
    #[arg(short = 'e', long, value_parser = TimeSpec::parse)]
    pub end_time: Option<TimeSpec>,

    /// Clip playback direction: forward, backward or random
    #[arg(long, default_value = "random", value_parser = Direction::parse)]
    pub direction: Direction,

    /// Clip playback speed: normal, half or double
    #[arg(long, default_value = "normal", value_parser = PlaybackSpeed::parse)]
    pub speed: PlaybackSpeed,

    /// Seed for clip selection, trims and direction flips
    #[arg(long)]
    pub seed: Option<u64>,
}
