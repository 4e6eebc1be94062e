use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use beatcut_cli::adapters::RngRandomSource;
use beatcut_cli::analysis::DynamicBeatTracker;
use beatcut_cli::app::{AssemblyInteractor, BeatInteractor, StudioInteractor, StudioRequest};
use beatcut_cli::config::AnalysisConfig;
use beatcut_cli::domain::model::*;
use beatcut_cli::ports::*;
use beatcut_cli::DomainError;
use tempfile::TempDir;

/// In-memory collaborators standing in for ffmpeg
mod test_utils {
    use super::*;

    /// Duration, frame size and frame rate of a fake clip
    pub type ClipShape = (f64, FrameSize, f64);

    pub struct FakeProbe {
        pub audio_duration: f64,
        pub videos: HashMap<PathBuf, ClipShape>,
        pub default_video: Option<ClipShape>,
        pub probed: Mutex<Vec<PathBuf>>,
    }

    impl FakeProbe {
        pub fn uniform(audio_duration: f64, video_duration: f64) -> Self {
            Self {
                audio_duration,
                videos: HashMap::new(),
                default_video: Some((video_duration, FrameSize::new(640, 360), 30.0)),
                probed: Mutex::new(Vec::new()),
            }
        }

        pub fn with_clips(audio_duration: f64, clips: &[(&str, ClipShape)]) -> Self {
            Self {
                audio_duration,
                videos: clips
                    .iter()
                    .map(|(path, shape)| (PathBuf::from(path), *shape))
                    .collect(),
                default_video: None,
                probed: Mutex::new(Vec::new()),
            }
        }

        pub fn probed(&self) -> Vec<PathBuf> {
            self.probed.lock().unwrap().clone()
        }
    }

    impl ProbePort for FakeProbe {
        fn probe_video(&self, file_path: &Path) -> Result<VideoInfo, DomainError> {
            self.probed.lock().unwrap().push(file_path.to_path_buf());
            let (duration, size, rate) = self
                .videos
                .get(file_path)
                .copied()
                .or(self.default_video)
                .ok_or_else(|| DomainError::MediaIoError("unknown clip".to_string()))?;
            VideoInfo::new(file_path.to_path_buf(), duration, size, rate)
        }

        fn probe_audio_duration(&self, _: &Path) -> Result<f64, DomainError> {
            Ok(self.audio_duration)
        }
    }

    /// Captures the timeline and writes a placeholder output file
    #[derive(Default)]
    pub struct RecordingCompositor {
        pub timeline: Mutex<Option<Timeline>>,
        pub soundtrack: Mutex<Option<Soundtrack>>,
    }

    impl RecordingCompositor {
        pub fn timeline(&self) -> Timeline {
            self.timeline.lock().unwrap().clone().unwrap()
        }
    }

    impl CompositorPort for RecordingCompositor {
        fn compose(
            &self,
            timeline: &Timeline,
            soundtrack: &Soundtrack,
            output: &Path,
        ) -> Result<RenderReport, DomainError> {
            if timeline.segments.is_empty() {
                return Err(DomainError::NoValidClipsError);
            }
            std::fs::write(output, b"rendered")?;
            *self.timeline.lock().unwrap() = Some(timeline.clone());
            *self.soundtrack.lock().unwrap() = Some(soundtrack.clone());
            Ok(RenderReport {
                output_path: output.to_path_buf(),
                segment_count: timeline.segments.len(),
                timeline_duration: timeline.duration(),
                clamped_duration: timeline.clamped_duration(),
                rendered_at: chrono::Utc::now(),
            })
        }
    }

    /// Fails like an encoder crash
    pub struct FailingCompositor;

    impl CompositorPort for FailingCompositor {
        fn compose(&self, _: &Timeline, _: &Soundtrack, _: &Path) -> Result<RenderReport, DomainError> {
            Err(DomainError::MediaIoError("encoder exited with status 1".to_string()))
        }
    }

    /// Mono 60 Hz bursts of `burst` seconds every `period` seconds
    pub struct BassPulseDecoder {
        pub seconds: f64,
        pub period: f64,
        pub burst: f64,
    }

    impl AudioDecodePort for BassPulseDecoder {
        fn load(
            &self,
            _: &Path,
            sample_rate: u32,
            _offset: f64,
            duration: Option<f64>,
        ) -> Result<Vec<f32>, DomainError> {
            let seconds = duration.unwrap_or(self.seconds).min(self.seconds);
            let sr = sample_rate as f64;
            Ok((0..(seconds * sr) as usize)
                .map(|n| {
                    let t = n as f64 / sr;
                    if t % self.period < self.burst {
                        (2.0 * std::f64::consts::PI * 60.0 * t).sin() as f32
                    } else {
                        0.0
                    }
                })
                .collect())
        }
    }

    #[derive(Default)]
    pub struct MemoryLog {
        pub lines: Mutex<Vec<String>>,
    }

    impl LogPort for MemoryLog {
        fn info(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("INFO {}", message));
        }
        fn warn(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("WARN {}", message));
        }
        fn error(&self, message: &str) {
            self.lines.lock().unwrap().push(format!("ERROR {}", message));
        }
        fn debug(&self, _: &str) {}
    }

    pub fn job(
        pool: &[&str],
        direction: Direction,
        speed: PlaybackSpeed,
        output_dir: &Path,
    ) -> JobParameters {
        JobParameters {
            mp3_path: PathBuf::from("song.mp3"),
            video_pool: pool.iter().map(PathBuf::from).collect(),
            cut_intensity: 1,
            start_time: 0.0,
            end_time: None,
            output_path: output_dir.join("video.mp4"),
            direction,
            speed,
        }
    }

    pub fn assembler(probe: FakeProbe) -> (AssemblyInteractor, Arc<RecordingCompositor>) {
        let compositor = Arc::new(RecordingCompositor::default());
        let interactor = AssemblyInteractor::new(
            Arc::new(probe),
            compositor.clone(),
            Arc::new(MemoryLog::default()),
        );
        (interactor, compositor)
    }
}

use test_utils::*;

#[test]
fn test_five_beat_forward_scenario() {
    let (assembler, compositor) = assembler(FakeProbe::uniform(5.0, 10.0));
    let beats = BeatSequence::from_times(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let mut random = RngRandomSource::seeded(11);

    let output = TempDir::new().unwrap();
    let params = job(
        &["a.mp4", "b.mp4"],
        Direction::Forward,
        PlaybackSpeed::Normal,
        output.path(),
    );

    let report = assembler.build(&params, &beats, &mut random).unwrap();
    assert_eq!(report.segment_count, 5);
    assert!(report.clamped_duration <= 5.0 + 1e-9);

    let timeline = compositor.timeline();
    for segment in &timeline.segments {
        assert!((segment.output_duration() - 1.0).abs() < 1e-9);
        assert!(!segment.is_reversed());
        assert!(segment.speed.is_none());
        let trim = segment.trim.unwrap();
        assert!(trim.start >= 0.0 && trim.end <= 10.0);
    }
    assert!(timeline.duration() <= 5.0 + 1e-9);
}

#[test]
fn test_soundtrack_window_follows_job_times() {
    let (assembler, compositor) = assembler(FakeProbe::uniform(60.0, 10.0));
    let beats = BeatSequence::from_times(vec![0.5, 1.0, 1.5, 2.0, 2.5]);

    let output = TempDir::new().unwrap();
    let mut params = job(
        &["a.mp4"],
        Direction::Forward,
        PlaybackSpeed::Normal,
        output.path(),
    );
    params.cut_intensity = 2;
    params.start_time = 10.0;
    params.end_time = Some(13.0);

    assembler
        .build(&params, &beats, &mut RngRandomSource::seeded(3))
        .unwrap();

    let soundtrack = compositor.soundtrack.lock().unwrap().clone().unwrap();
    assert_eq!(soundtrack.window, AudioWindow { start: 10.0, end: 13.0 });

    // [0.5, 1.5, 2.5] anchored at 0 and 3.0
    let timeline = compositor.timeline();
    let durations: Vec<f64> = timeline
        .segments
        .iter()
        .map(SegmentPlan::output_duration)
        .collect();
    assert_eq!(durations.len(), 4);
    assert!((durations[0] - 0.5).abs() < 1e-9);
    assert!((durations[3] - 0.5).abs() < 1e-9);
    assert!((timeline.audio_bound - 3.0).abs() < 1e-9);
}

#[test]
fn test_half_speed_uses_scaled_windows() {
    let (assembler, compositor) = assembler(FakeProbe::uniform(5.0, 10.0));
    let beats = BeatSequence::from_times(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let output = TempDir::new().unwrap();
    let params = job(
        &["a.mp4"],
        Direction::Forward,
        PlaybackSpeed::Half,
        output.path(),
    );

    assembler
        .build(&params, &beats, &mut RngRandomSource::seeded(5))
        .unwrap();

    for segment in compositor.timeline().segments {
        assert!((segment.trim.unwrap().len() - 0.5).abs() < 1e-9);
        assert!((segment.output_duration() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_short_sources_are_used_whole() {
    let (assembler, compositor) = assembler(FakeProbe::uniform(5.0, 0.4));
    let beats = BeatSequence::from_times(vec![1.0, 2.0, 3.0, 4.0, 5.0]);

    let output = TempDir::new().unwrap();
    let params = job(
        &["tiny.mp4"],
        Direction::Forward,
        PlaybackSpeed::Normal,
        output.path(),
    );

    let report = assembler
        .build(&params, &beats, &mut RngRandomSource::seeded(5))
        .unwrap();

    let timeline = compositor.timeline();
    assert!(timeline.segments.iter().all(|s| s.trim.is_none()));
    assert!((report.timeline_duration - 2.0).abs() < 1e-9);
}

#[test]
fn test_backward_segments_keep_their_length() {
    let (assembler, compositor) = assembler(FakeProbe::uniform(5.0, 10.0));
    let beats = BeatSequence::from_times(vec![1.0, 2.5, 5.0]);

    let output = TempDir::new().unwrap();
    let params = job(
        &["a.mp4"],
        Direction::Backward,
        PlaybackSpeed::Double,
        output.path(),
    );

    assembler
        .build(&params, &beats, &mut RngRandomSource::seeded(9))
        .unwrap();

    let timeline = compositor.timeline();
    assert_eq!(timeline.segments.len(), 3);
    for segment in &timeline.segments {
        let reversal = segment.reversal.unwrap();
        assert!((reversal.duration - segment.target_duration).abs() < 1e-9);
        assert!((segment.trim.unwrap().len() - 2.0 * segment.target_duration).abs() < 1e-9);
        assert_eq!(reversal.source_time_at(0.0), reversal.duration - reversal.frame_period);
    }
}

#[test]
fn test_seeded_jobs_are_reproducible() {
    let beats = BeatSequence::from_times((1..=12).map(|b| b as f64 * 0.5));
    let pool = ["a.mp4", "b.mp4", "c.mp4"];

    let run = |seed: u64| {
        let (assembler, compositor) = assembler(FakeProbe::uniform(6.0, 10.0));
        let output = TempDir::new().unwrap();
        let params = job(
            &pool,
            Direction::Random,
            PlaybackSpeed::Normal,
            output.path(),
        );
        assembler
            .build(&params, &beats, &mut RngRandomSource::seeded(seed))
            .unwrap();
        compositor.timeline()
    };

    assert_eq!(run(21), run(21));
}

#[test]
fn test_mixed_rates_follow_first_segment() {
    let (assembler, compositor) = assembler(FakeProbe::with_clips(
        5.0,
        &[
            ("pal.mp4", (10.0, FrameSize::new(1280, 720), 25.0)),
            ("ntsc.mp4", (10.0, FrameSize::new(1920, 1080), 30.0)),
        ],
    ));
    let beats = BeatSequence::from_times(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let output = TempDir::new().unwrap();
    let params = job(
        &["pal.mp4", "ntsc.mp4"],
        Direction::Forward,
        PlaybackSpeed::Normal,
        output.path(),
    );

    let mut random = RngRandomSource::seeded(17);
    assembler.build(&params, &beats, &mut random).unwrap();

    let timeline = compositor.timeline();
    let first = &timeline.segments[0];
    assert_eq!(timeline.canonical_rate, first.frame_rate);
    assert_eq!(timeline.canonical_size, first.source_size);
    assert!(timeline
        .segments
        .iter()
        .all(|s| s.frame_size() == timeline.canonical_size));
}

#[test]
fn test_empty_pool_reports_no_valid_clips() {
    let (assembler, _) = assembler(FakeProbe::uniform(5.0, 10.0));
    let beats = BeatSequence::from_times(vec![1.0, 2.0]);
    let output = TempDir::new().unwrap();
    let result = assembler.build(
        &job(&[], Direction::Forward, PlaybackSpeed::Normal, output.path()),
        &beats,
        &mut RngRandomSource::seeded(1),
    );
    assert_eq!(result.unwrap_err(), DomainError::NoValidClipsError);
}

#[test]
fn test_no_beats_is_reported() {
    let (assembler, _) = assembler(FakeProbe::uniform(5.0, 10.0));
    let output = TempDir::new().unwrap();
    let result = assembler.build(
        &job(&["a.mp4"], Direction::Forward, PlaybackSpeed::Normal, output.path()),
        &BeatSequence::empty(),
        &mut RngRandomSource::seeded(1),
    );
    assert_eq!(result.unwrap_err(), DomainError::NoBeatsError);
    assert_eq!(
        DomainError::NoBeatsError.to_string(),
        "No beats were detected. Cannot create video."
    );
}

#[test]
fn test_start_past_audio_end_is_input_error() {
    let (assembler, _) = assembler(FakeProbe::uniform(5.0, 10.0));
    let output = TempDir::new().unwrap();
    let mut params = job(
        &["a.mp4"],
        Direction::Forward,
        PlaybackSpeed::Normal,
        output.path(),
    );
    params.start_time = 8.0;
    let result = assembler.build(
        &params,
        &BeatSequence::from_times(vec![1.0]),
        &mut RngRandomSource::seeded(1),
    );
    assert!(matches!(result, Err(DomainError::InputError(_))));
}

#[test]
fn test_bass_pulses_are_tracked() {
    let log = Arc::new(MemoryLog::default());
    let extractor = BeatInteractor::new(
        Arc::new(BassPulseDecoder {
            seconds: 10.0,
            period: 0.5,
            burst: 0.1,
        }),
        Arc::new(DynamicBeatTracker::default()),
        log.clone(),
        AnalysisConfig::default(),
    );

    let analysis = extractor.analyze(Path::new("pulses.mp3"), 0.0, None).unwrap();
    let times = analysis.beats.times();

    assert!(times.len() >= 10, "only {} beats", times.len());
    assert!(times
        .windows(2)
        .all(|pair| (0.35..=0.65).contains(&(pair[1] - pair[0]))));
    let tempo = analysis.tempo_bpm.unwrap();
    assert!((tempo - 120.0).abs() < 10.0, "tempo {}", tempo);
    assert!(!log
        .lines
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.starts_with("WARN")));
}

/// Studio form wired to fake media collaborators
fn studio(output_dir: &Path) -> (StudioInteractor, Arc<RecordingCompositor>) {
    let compositor = Arc::new(RecordingCompositor::default());
    let (interactor, _) = studio_with(output_dir, compositor.clone());
    (interactor, compositor)
}

fn studio_with(
    output_dir: &Path,
    compositor: Arc<dyn CompositorPort>,
) -> (StudioInteractor, Arc<FakeProbe>) {
    let log: Arc<MemoryLog> = Arc::new(MemoryLog::default());
    let beats = Arc::new(BeatInteractor::new(
        Arc::new(BassPulseDecoder {
            seconds: 5.0,
            period: 0.5,
            burst: 0.1,
        }),
        Arc::new(DynamicBeatTracker::default()),
        log.clone(),
        AnalysisConfig::default(),
    ));
    let probe = Arc::new(FakeProbe::uniform(5.0, 10.0));
    let assembly = Arc::new(AssemblyInteractor::new(probe.clone(), compositor, log.clone()));
    let interactor = StudioInteractor::new(
        beats,
        assembly,
        Arc::new(beatcut_cli::adapters::LocalFsAdapter::new()),
        log,
        output_dir.to_path_buf(),
    );
    (interactor, probe)
}

fn studio_request(videos: Vec<PathBuf>) -> StudioRequest {
    StudioRequest {
        mp3_file: PathBuf::from("song.mp3"),
        video_files: videos,
        cut_intensity: 2,
        start_time: 0.0,
        end_time: 0.0,
        output_filename: "music_video.mp4".to_string(),
        direction: "forward".to_string(),
        playback_speed: "Normal Speed".to_string(),
    }
}

#[test]
fn test_studio_rejects_missing_uploads() {
    let workspace = TempDir::new().unwrap();
    let (studio, _) = studio(&workspace.path().join("output"));

    let response = studio
        .process(
            &studio_request(vec![workspace.path().join("gone.mp4")]),
            &mut RngRandomSource::seeded(1),
        )
        .unwrap();

    assert_eq!(response.output_path, None);
    assert_eq!(response.status, "Error: No valid video files uploaded");
}

#[test]
fn test_studio_writes_timestamped_output() {
    let workspace = TempDir::new().unwrap();
    let uploads: Vec<PathBuf> = ["one.mp4", "two.mp4"]
        .iter()
        .map(|name| {
            let path = workspace.path().join(name);
            std::fs::write(&path, b"clip").unwrap();
            path
        })
        .collect();
    let output_dir = workspace.path().join("output");
    let (studio, compositor) = studio(&output_dir);

    let response = studio
        .process(&studio_request(uploads), &mut RngRandomSource::seeded(4))
        .unwrap();

    let output_path = response.output_path.unwrap();
    assert!(output_path.is_file());
    assert_eq!(output_path.parent(), Some(output_dir.as_path()));
    let name = output_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("music_video_"));
    assert!(name.ends_with(".mp4"));
    assert_eq!(name.len(), "music_video_YYYYMMDD_HHMMSS.mp4".len());

    assert!(response.status.starts_with("Successfully created video with "));
    assert!(response.status.ends_with(" detected beats."));

    // Sources were staged, not used in place
    let timeline = compositor.timeline();
    assert!(timeline
        .segments
        .iter()
        .all(|s| !s.source.starts_with(workspace.path())));
}

#[test]
fn test_studio_rejects_out_of_range_intensity() {
    let workspace = TempDir::new().unwrap();
    let clip = workspace.path().join("one.mp4");
    std::fs::write(&clip, b"clip").unwrap();
    let (studio, _) = studio(&workspace.path().join("output"));

    let mut request = studio_request(vec![clip]);
    request.cut_intensity = 17;
    let result = studio.process(&request, &mut RngRandomSource::seeded(1));
    assert!(matches!(result, Err(DomainError::InputError(_))));
}

#[test]
fn test_studio_failure_removes_staged_uploads() {
    let workspace = TempDir::new().unwrap();
    let clip = workspace.path().join("one.mp4");
    std::fs::write(&clip, b"clip").unwrap();
    let output_dir = workspace.path().join("output");
    let (studio, probe) = studio_with(&output_dir, Arc::new(FailingCompositor));

    let result = studio.process(&studio_request(vec![clip]), &mut RngRandomSource::seeded(2));
    assert!(matches!(result, Err(DomainError::MediaIoError(_))));

    let staged = probe.probed();
    assert!(!staged.is_empty());
    for path in &staged {
        assert!(!path.starts_with(workspace.path()));
        assert!(!path.parent().unwrap().exists());
    }
    assert_eq!(std::fs::read_dir(&output_dir).unwrap().count(), 0);
}
