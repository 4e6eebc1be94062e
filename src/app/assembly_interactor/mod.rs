// Assembly interactor - Orchestrates beat-synchronized timeline assembly

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::*;
use crate::ports::*;

/// Interactor for the timeline assembly use case
pub struct AssemblyInteractor {
    probe_port: Arc<dyn ProbePort>,
    compositor_port: Arc<dyn CompositorPort>,
    log_port: Arc<dyn LogPort>,
}

impl AssemblyInteractor {
    /// Create new assembly interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        compositor_port: Arc<dyn CompositorPort>,
        log_port: Arc<dyn LogPort>,
    ) -> Self {
        Self {
            probe_port,
            compositor_port,
            log_port,
        }
    }

    /// Build and render the music video described by `job`.
    ///
    /// `beats` are relative to the job's start time. All random choices are
    /// drawn from `random`.
    pub fn build(
        &self,
        job: &JobParameters,
        beats: &BeatSequence,
        random: &mut dyn RandomSource,
    ) -> Result<RenderReport, DomainError> {
        if beats.is_empty() {
            return Err(DomainError::NoBeatsError);
        }

        let full_duration = self.probe_port.probe_audio_duration(&job.mp3_path)?;
        let window = AudioWindow::resolve(job.start_time, job.end_time, full_duration)?;
        let audio_duration = window.duration();
        self.log_port.info(&format!(
            "Audio window {:.2}s-{:.2}s ({:.2}s)",
            window.start, window.end, audio_duration
        ));

        let plan = CutPlanner::derive(beats, job.cut_intensity, audio_duration)?;
        self.log_port.info(&format!(
            "Cut plan: {} cuts from {} beats (every {} beat)",
            plan.segment_count(),
            beats.len(),
            job.cut_intensity
        ));

        let timeline = self.assemble(job, &plan, audio_duration, random)?;

        let soundtrack = Soundtrack {
            path: job.mp3_path.clone(),
            window,
        };
        let report = self
            .compositor_port
            .compose(&timeline, &soundtrack, &job.output_path)?;

        self.log_port.info(&format!(
            "Music video written to {} ({} segments, {:.2}s)",
            report.output_path.display(),
            report.segment_count,
            report.clamped_duration
        ));
        Ok(report)
    }

    /// Fold the cut plan into size-normalized segments
    fn assemble(
        &self,
        job: &JobParameters,
        plan: &CutPlan,
        audio_duration: f64,
        random: &mut dyn RandomSource,
    ) -> Result<Timeline, DomainError> {
        if job.video_pool.is_empty() {
            return Err(DomainError::NoValidClipsError);
        }

        let scheduler = SegmentScheduler::new(job.speed);
        let mut probes: HashMap<PathBuf, VideoInfo> = HashMap::new();
        let mut canonical: Option<FrameSize> = None;
        let mut canonical_rate: Option<f64> = None;
        let mut segments = Vec::with_capacity(plan.segment_count());

        for interval in plan.intervals() {
            let source_path = &job.video_pool[random.pick_index(job.video_pool.len())];
            let source = match probes.get(source_path) {
                Some(info) => info.clone(),
                None => {
                    let info = self.probe_port.probe_video(source_path)?;
                    probes.insert(source_path.clone(), info.clone());
                    info
                }
            };

            let required = required_source_duration(interval.duration(), scheduler.speed());
            let trim_start = max_trim_offset(source.duration, required)
                .map(|max_start| random.uniform(0.0, max_start));
            if trim_start.is_none() {
                self.log_port.debug(&format!(
                    "{} ({:.2}s) is shorter than {:.2}s, using the whole clip",
                    source_path.display(),
                    source.duration,
                    required
                ));
            }

            let coin = job.direction.needs_coin() && random.coin_flip();
            let orientation = job.direction.resolve(coin);

            let segment = scheduler.plan(&interval, &source, trim_start, orientation);
            if let Some(change) = segment.speed {
                self.log_port.info(&format!(
                    "Applying speed factor {} to clip {}",
                    change.factor,
                    interval.index + 1
                ));
            }

            canonical_rate.get_or_insert(segment.frame_rate);
            let (size, segment) = normalize_frame_size(canonical, segment);
            canonical = Some(size);
            segments.push(segment);
        }

        let (Some(canonical_size), Some(canonical_rate)) = (canonical, canonical_rate) else {
            return Err(DomainError::NoValidClipsError);
        };

        Ok(Timeline {
            segments,
            canonical_size,
            canonical_rate,
            audio_bound: audio_duration,
        })
    }
}
