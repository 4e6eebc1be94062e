// Domain rules - Beat scheduling policies

use crate::domain::errors::*;
use crate::domain::model::*;

/// Derives cut points from a beat sequence
pub struct CutPlanner;

impl CutPlanner {
    /// Take every `cut_intensity`-th beat, then anchor the plan at 0 and at
    /// `audio_duration`.
    ///
    /// Points past the audio end are dropped so the plan always finishes
    /// exactly on the audio length.
    pub fn derive(
        beats: &BeatSequence,
        cut_intensity: usize,
        audio_duration: f64,
    ) -> Result<CutPlan, DomainError> {
        if beats.is_empty() {
            return Err(DomainError::NoBeatsError);
        }
        if cut_intensity == 0 {
            return Err(DomainError::InputError(
                "Cut intensity must be at least 1".to_string(),
            ));
        }

        let mut points: Vec<f64> = beats
            .stride(cut_intensity)
            .into_iter()
            .filter(|t| *t <= audio_duration)
            .collect();

        if points.first().map_or(true, |first| *first > START_ANCHOR_TOLERANCE) {
            points.insert(0, 0.0);
        }
        if points.last().map_or(false, |last| *last < audio_duration) {
            points.push(audio_duration);
        }

        if points.len() < 2 {
            return Err(DomainError::EmptyTimelineError);
        }

        Ok(CutPlan::from_points(points))
    }
}

/// Source time sampled at playback time `t` of a reversed clip.
///
/// Reflects around the clip midpoint, clamped so the last frame is never
/// overshot.
pub fn reverse_source_time(original_duration: f64, frame_period: f64, t: f64) -> f64 {
    let last_frame = original_duration - frame_period;
    (original_duration - t - frame_period).min(last_frame).max(0.0)
}

impl Reversal {
    /// Source time shown at playback time `t`
    pub fn source_time_at(&self, t: f64) -> f64 {
        reverse_source_time(self.duration, self.frame_period, t)
    }
}

/// Length of source footage a beat interval consumes at the given speed
pub fn required_source_duration(final_duration: f64, speed: PlaybackSpeed) -> f64 {
    final_duration * speed.factor()
}

/// Latest start offset for a trim window of `required` seconds, or `None`
/// when the source is too short and must be used whole
pub fn max_trim_offset(source_duration: f64, required: f64) -> Option<f64> {
    if source_duration >= required {
        Some(source_duration - required)
    } else {
        None
    }
}

/// Per-interval segment construction
pub struct SegmentScheduler {
    speed: PlaybackSpeed,
}

impl SegmentScheduler {
    pub fn new(speed: PlaybackSpeed) -> Self {
        Self { speed }
    }

    pub fn speed(&self) -> PlaybackSpeed {
        self.speed
    }

    /// Build the segment for `interval` out of `source`.
    ///
    /// `trim_start` must lie in `[0, max_trim_offset]` when the source is long
    /// enough; it is ignored otherwise. A source shorter than the required
    /// window is used whole, so its segment can drift off the beat grid.
    pub fn plan(
        &self,
        interval: &BeatInterval,
        source: &VideoInfo,
        trim_start: Option<f64>,
        orientation: Orientation,
    ) -> SegmentPlan {
        let final_duration = interval.duration();
        let required = required_source_duration(final_duration, self.speed);

        let trim = max_trim_offset(source.duration, required).map(|max_start| {
            let start = trim_start.unwrap_or(0.0).clamp(0.0, max_start);
            TrimWindow {
                start,
                end: start + required,
            }
        });

        let mut segment = SegmentPlan {
            index: interval.index,
            source: source.path.clone(),
            target_duration: final_duration,
            source_duration: source.duration,
            trim,
            speed: None,
            reversal: None,
            resize: None,
            source_size: source.size,
            frame_rate: source.frame_rate,
        };

        if self.speed != PlaybackSpeed::Normal {
            segment.speed = Some(SpeedChange {
                factor: self.speed.factor(),
                snap_duration: final_duration,
            });
        }

        if orientation == Orientation::Backward {
            segment.reversal = Some(Reversal {
                duration: segment.output_duration(),
                frame_period: source.frame_period(),
            });
        }

        segment
    }
}

/// One step of the frame-size fold.
///
/// The first segment fixes the canonical size; later segments of a different
/// size are stretched onto it.
pub fn normalize_frame_size(
    canonical: Option<FrameSize>,
    mut segment: SegmentPlan,
) -> (FrameSize, SegmentPlan) {
    match canonical {
        None => (segment.source_size, segment),
        Some(size) => {
            if segment.source_size != size {
                segment.resize = Some(size);
            }
            (size, segment)
        }
    }
}

#[cfg(test)]
mod tests;
