// Unit tests for domain rules

use super::*;

fn beats(times: &[f64]) -> BeatSequence {
    BeatSequence::from_times(times.iter().copied())
}

fn source(path: &str, duration: f64, width: u32, height: u32) -> VideoInfo {
    VideoInfo::new(path.into(), duration, FrameSize::new(width, height), 25.0).unwrap()
}

fn interval(start: f64, end: f64) -> BeatInterval {
    BeatInterval {
        index: 0,
        start,
        end,
    }
}

#[test]
fn test_cut_plan_stride_two_example() {
    let plan = CutPlanner::derive(&beats(&[0.5, 1.0, 1.5, 2.0, 2.5]), 2, 3.0).unwrap();
    assert_eq!(plan.points(), &[0.0, 0.5, 1.5, 2.5, 3.0]);
    assert_eq!(plan.segment_count(), 4);
}

#[test]
fn test_cut_plan_keeps_beat_near_zero() {
    let plan = CutPlanner::derive(&beats(&[0.05, 1.0, 2.0]), 1, 2.0).unwrap();
    assert_eq!(plan.points(), &[0.05, 1.0, 2.0]);
}

#[test]
fn test_cut_plan_end_already_present() {
    let plan = CutPlanner::derive(&beats(&[1.0, 2.0, 3.0, 4.0, 5.0]), 1, 5.0).unwrap();
    assert_eq!(plan.points(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    assert_eq!(plan.segment_count(), 5);
}

#[test]
fn test_cut_plan_drops_points_past_audio_end() {
    let plan = CutPlanner::derive(&beats(&[1.0, 2.0, 3.5]), 1, 3.0).unwrap();
    assert_eq!(plan.points(), &[0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_cut_plan_properties_hold_for_strides() {
    let times: Vec<f64> = (1..40).map(|i| i as f64 * 0.37).collect();
    let sequence = beats(&times);
    let audio_duration = 15.0;

    for stride in 1..=16 {
        let plan = CutPlanner::derive(&sequence, stride, audio_duration).unwrap();
        let points = plan.points();

        assert!(points[0] <= START_ANCHOR_TOLERANCE);
        assert_eq!(*points.last().unwrap(), audio_duration);
        assert!(points.windows(2).all(|w| w[1] > w[0]));
        assert!((plan.total_duration() - audio_duration).abs() < 1e-9);
    }
}

#[test]
fn test_cut_plan_no_beats() {
    assert_eq!(
        CutPlanner::derive(&BeatSequence::empty(), 1, 10.0),
        Err(DomainError::NoBeatsError)
    );
}

#[test]
fn test_cut_plan_degenerate() {
    assert_eq!(
        CutPlanner::derive(&beats(&[0.0]), 1, 0.0),
        Err(DomainError::EmptyTimelineError)
    );
}

#[test]
fn test_cut_plan_zero_intensity_rejected() {
    assert!(matches!(
        CutPlanner::derive(&beats(&[1.0]), 0, 2.0),
        Err(DomainError::InputError(_))
    ));
}

#[test]
fn test_reverse_source_time() {
    let period = 0.04;
    assert!((reverse_source_time(2.0, period, 0.0) - 1.96).abs() < 1e-12);
    assert!((reverse_source_time(2.0, period, 1.0) - 0.96).abs() < 1e-12);
    assert_eq!(reverse_source_time(2.0, period, 2.0), 0.0);
    // Negative playback times never overshoot the last frame
    assert!((reverse_source_time(2.0, period, -1.0) - 1.96).abs() < 1e-12);
}

#[test]
fn test_max_trim_offset() {
    assert_eq!(max_trim_offset(10.0, 4.0), Some(6.0));
    assert_eq!(max_trim_offset(4.0, 4.0), Some(0.0));
    assert_eq!(max_trim_offset(3.0, 4.0), None);
}

#[test]
fn test_plan_forward_normal_speed() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Normal);
    let segment = scheduler.plan(
        &interval(1.0, 2.5),
        &source("a.mp4", 10.0, 1280, 720),
        Some(3.0),
        Orientation::Forward,
    );

    assert_eq!(segment.trim, Some(TrimWindow { start: 3.0, end: 4.5 }));
    assert!(segment.speed.is_none());
    assert!(segment.reversal.is_none());
    assert!((segment.output_duration() - 1.5).abs() < 1e-12);
}

#[test]
fn test_plan_half_speed_scales_source_window() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Half);
    let segment = scheduler.plan(
        &interval(0.0, 1.5),
        &source("a.mp4", 10.0, 1280, 720),
        Some(0.0),
        Orientation::Forward,
    );

    let trim = segment.trim.unwrap();
    assert!((trim.len() - 0.75).abs() < 1e-12);
    assert_eq!(
        segment.speed,
        Some(SpeedChange {
            factor: 0.5,
            snap_duration: 1.5
        })
    );
    assert!((segment.output_duration() - 1.5).abs() < 1e-12);
}

#[test]
fn test_plan_double_speed_needs_twice_the_footage() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Double);
    let segment = scheduler.plan(
        &interval(0.0, 2.0),
        &source("a.mp4", 10.0, 1280, 720),
        Some(1.0),
        Orientation::Forward,
    );

    assert!((segment.cut_duration() - 4.0).abs() < 1e-12);
    assert!((segment.output_duration() - 2.0).abs() < 1e-12);
}

#[test]
fn test_plan_short_source_used_whole() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Normal);
    let segment = scheduler.plan(
        &interval(0.0, 4.0),
        &source("short.mp4", 1.5, 1280, 720),
        Some(2.0),
        Orientation::Forward,
    );

    assert!(segment.trim.is_none());
    assert!((segment.output_duration() - 1.5).abs() < 1e-12);
}

#[test]
fn test_plan_trim_offset_is_clamped() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Normal);
    let segment = scheduler.plan(
        &interval(0.0, 2.0),
        &source("a.mp4", 5.0, 1280, 720),
        Some(9.0),
        Orientation::Forward,
    );

    assert_eq!(segment.trim, Some(TrimWindow { start: 3.0, end: 5.0 }));
}

#[test]
fn test_reversal_keeps_duration() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Double);
    let src = source("a.mp4", 10.0, 1280, 720);
    let forward = scheduler.plan(&interval(0.0, 1.2), &src, Some(2.0), Orientation::Forward);
    let backward = scheduler.plan(&interval(0.0, 1.2), &src, Some(2.0), Orientation::Backward);

    let reversal = backward.reversal.unwrap();
    assert!((backward.output_duration() - forward.output_duration()).abs() < 1e-12);

    // Reflecting twice lands back on the original frame
    let t = 0.5;
    let once = reversal.source_time_at(t);
    let twice = reversal.source_time_at(once);
    assert!((twice - t).abs() <= reversal.frame_period + 1e-12);
}

#[test]
fn test_frame_size_fold() {
    let scheduler = SegmentScheduler::new(PlaybackSpeed::Normal);
    let first = scheduler.plan(
        &interval(0.0, 1.0),
        &source("a.mp4", 10.0, 1920, 1080),
        None,
        Orientation::Forward,
    );
    let second = scheduler.plan(
        &interval(1.0, 2.0),
        &source("b.mp4", 10.0, 640, 480),
        None,
        Orientation::Forward,
    );
    let third = scheduler.plan(
        &interval(2.0, 3.0),
        &source("c.mp4", 10.0, 1920, 1080),
        None,
        Orientation::Forward,
    );

    let (canonical, first) = normalize_frame_size(None, first);
    assert_eq!(canonical, FrameSize::new(1920, 1080));
    assert!(first.resize.is_none());

    let (canonical, second) = normalize_frame_size(Some(canonical), second);
    assert_eq!(second.resize, Some(FrameSize::new(1920, 1080)));
    assert_eq!(second.frame_size(), canonical);

    let (_, third) = normalize_frame_size(Some(canonical), third);
    assert!(third.resize.is_none());
}
