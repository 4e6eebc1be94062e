//! Command implementations

use std::path::PathBuf;

use tracing::{debug, info};

use crate::adapters::RngRandomSource;
use crate::app::{AppContainer, DefaultAppContainer};
use crate::cli::CutArgs;
use crate::config::CutterConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{JobParameters, RenderReport};
use crate::error::CutterResult;
use crate::ports::RandomSource;

/// Find the source clips and validate the inputs of a cut job
pub fn collect_inputs(container: &dyn AppContainer, args: &CutArgs) -> CutterResult<Vec<PathBuf>> {
    let fs = container.fs_port();

    if !fs.file_exists(&args.mp3_file) {
        return Err(DomainError::InputError(format!(
            "MP3 file not found: {}",
            args.mp3_file.display()
        ))
        .into());
    }
    if !fs.directory_exists(&args.video_directory) {
        return Err(DomainError::InputError(format!(
            "Video directory not found: {}",
            args.video_directory.display()
        ))
        .into());
    }

    let videos = fs.list_videos(&args.video_directory)?;
    if videos.is_empty() {
        return Err(DomainError::InputError(format!(
            "No MP4 files found in {}",
            args.video_directory.display()
        ))
        .into());
    }

    info!(
        "Found {} video clips in {}",
        videos.len(),
        args.video_directory.display()
    );
    Ok(videos)
}

/// Execute the cut command
pub fn cut(args: &CutArgs, config: &CutterConfig) -> CutterResult<RenderReport> {
    let container = DefaultAppContainer::new(config)?;
    let video_pool = collect_inputs(&container, args)?;

    debug!("Nominal clip duration {:.2}s is not used by the scheduler", args.duration);

    let start_time = args.start_time.as_seconds();
    let end_time = args.end_time.map(|t| t.as_seconds());

    let analysis = container
        .beat_interactor()
        .analyze(&args.mp3_file, start_time, end_time)?;

    let job = JobParameters {
        mp3_path: args.mp3_file.clone(),
        video_pool,
        cut_intensity: args.cut_intensity,
        start_time,
        end_time,
        output_path: args.output.clone(),
        direction: args.direction,
        speed: args.speed,
    };

    let mut random: Box<dyn RandomSource> = match args.seed {
        Some(seed) => {
            info!("Using random seed {}", seed);
            Box::new(RngRandomSource::seeded(seed))
        }
        None => Box::new(RngRandomSource::from_thread()),
    };

    let report = container
        .assembly_interactor()
        .build(&job, &analysis.beats, random.as_mut())?;
    Ok(report)
}
