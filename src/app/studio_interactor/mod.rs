// Studio interactor - Form-driven music video job
//
// Takes the loosely typed values an upload form produces, stages the uploads
// and runs extraction plus assembly for them.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;

use crate::app::{AssemblyInteractor, BeatInteractor};
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;
use crate::utils::timestamped_file_name;

/// Slider bounds for the cut intensity control
pub const MIN_FORM_INTENSITY: usize = 1;
pub const MAX_FORM_INTENSITY: usize = 16;

const NO_VIDEOS_STATUS: &str = "Error: No valid video files uploaded";

/// Values submitted by the form
#[derive(Debug, Clone)]
pub struct StudioRequest {
    pub mp3_file: PathBuf,
    pub video_files: Vec<PathBuf>,
    pub cut_intensity: usize,
    pub start_time: f64,
    /// Zero means "until the end of the track"
    pub end_time: f64,
    pub output_filename: String,
    pub direction: String,
    /// `Normal`, `Half` or `Double`, optionally suffixed with ` Speed`
    pub playback_speed: String,
}

/// What the form shows after a run
#[derive(Debug, Clone, PartialEq)]
pub struct StudioResponse {
    pub output_path: Option<PathBuf>,
    pub status: String,
}

/// Interactor behind the interactive form
pub struct StudioInteractor {
    beat_interactor: Arc<BeatInteractor>,
    assembly_interactor: Arc<AssemblyInteractor>,
    fs_port: Arc<dyn FsPort>,
    log_port: Arc<dyn LogPort>,
    output_dir: PathBuf,
}

impl StudioInteractor {
    pub fn new(
        beat_interactor: Arc<BeatInteractor>,
        assembly_interactor: Arc<AssemblyInteractor>,
        fs_port: Arc<dyn FsPort>,
        log_port: Arc<dyn LogPort>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            beat_interactor,
            assembly_interactor,
            fs_port,
            log_port,
            output_dir,
        }
    }

    /// Run one form submission.
    ///
    /// A submission without usable videos is answered with a status message
    /// rather than an error.
    pub fn process(
        &self,
        request: &StudioRequest,
        random: &mut dyn RandomSource,
    ) -> Result<StudioResponse, DomainError> {
        let staging = tempfile::Builder::new().prefix("beatcut-upload-").tempdir()?;

        let mut video_pool = Vec::new();
        for upload in &request.video_files {
            if !self.fs_port.file_exists(upload) {
                self.log_port
                    .warn(&format!("Skipping missing upload {}", upload.display()));
                continue;
            }
            let Some(name) = upload.file_name() else {
                continue;
            };
            let staged = staging.path().join(name);
            self.fs_port.copy_file(upload, &staged)?;
            video_pool.push(staged);
        }

        if video_pool.is_empty() {
            return Ok(StudioResponse {
                output_path: None,
                status: NO_VIDEOS_STATUS.to_string(),
            });
        }

        if !(MIN_FORM_INTENSITY..=MAX_FORM_INTENSITY).contains(&request.cut_intensity) {
            return Err(DomainError::InputError(format!(
                "Cut intensity must be between {} and {}, got {}",
                MIN_FORM_INTENSITY, MAX_FORM_INTENSITY, request.cut_intensity
            )));
        }
        let direction = Direction::parse(&request.direction)?;
        let speed = PlaybackSpeed::parse(&request.playback_speed)?;
        let end_time = (request.end_time > 0.0).then_some(request.end_time);

        self.fs_port.create_directory(&self.output_dir)?;
        let file_name = timestamped_file_name(&request.output_filename, &Local::now());
        let output_path = self.output_dir.join(&file_name);
        let staged_output = staging.path().join(&file_name);

        let analysis = self
            .beat_interactor
            .analyze(&request.mp3_file, request.start_time, end_time)?;

        let job = JobParameters {
            mp3_path: request.mp3_file.clone(),
            video_pool,
            cut_intensity: request.cut_intensity,
            start_time: request.start_time,
            end_time,
            output_path: staged_output,
            direction,
            speed,
        };
        let report = self
            .assembly_interactor
            .build(&job, &analysis.beats, random)?;

        self.fs_port.move_file(&report.output_path, &output_path)?;

        let cuts = analysis.beats.stride(request.cut_intensity).len();
        let status = format!(
            "Successfully created video with {} cuts from {} detected beats.",
            cuts,
            analysis.beats.len()
        );
        self.log_port.info(&status);

        staging.close()?;

        Ok(StudioResponse {
            output_path: Some(output_path),
            status,
        })
    }
}
