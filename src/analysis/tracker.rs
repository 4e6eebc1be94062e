//! Tempo estimation and dynamic-programming beat tracking
//!
//! Tempo comes from the onset autocorrelation weighted by a log-normal prior
//! around `start_bpm`. Beats are then placed by maximising onset strength
//! along a path whose spacing stays close to that tempo.

use crate::analysis::spectrum::{onset_strength, Spectrogram};
use crate::config::AnalysisConfig;
use crate::domain::model::BeatTrack;
use crate::ports::{BeatTrackPort, TrackError};

const MAX_TEMPO_BPM: f64 = 320.0;
const TEMPO_PRIOR_OCTAVES: f64 = 1.0;
const AUTOCORRELATION_SECONDS: f64 = 8.0;

/// Beat tracker over onset envelopes
#[derive(Debug, Clone)]
pub struct DynamicBeatTracker {
    start_bpm: f64,
    tightness: f64,
    n_fft: usize,
}

impl DynamicBeatTracker {
    pub fn new(start_bpm: f64, tightness: f64, n_fft: usize) -> Self {
        Self {
            start_bpm,
            tightness,
            n_fft,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.start_bpm, config.tightness, config.n_fft)
    }

    fn track(
        &self,
        envelope: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatTrack, TrackError> {
        if envelope.is_empty() {
            return Err(TrackError::IncompatibleInput(
                "onset envelope is empty".to_string(),
            ));
        }
        if envelope.iter().any(|v| !v.is_finite()) {
            return Err(TrackError::IncompatibleInput(
                "onset envelope contains non-finite values".to_string(),
            ));
        }
        if sample_rate == 0 || hop_length == 0 {
            return Err(TrackError::IncompatibleInput(format!(
                "invalid frame geometry: sample_rate={}, hop_length={}",
                sample_rate, hop_length
            )));
        }

        let envelope: Vec<f64> = envelope.iter().map(|v| *v as f64).collect();
        if envelope.iter().all(|v| *v == 0.0) {
            return Ok(no_beats());
        }

        let frame_rate = sample_rate as f64 / hop_length as f64;
        let Some(tempo) = self.estimate_tempo(&envelope, frame_rate) else {
            return Ok(no_beats());
        };

        let period = (60.0 * frame_rate / tempo).round().max(1.0);
        let local = local_score(&envelope, period);
        let frames = self.dynamic_program(&local, period);

        Ok(BeatTrack {
            tempo_bpm: tempo,
            frames: trim_weak_edges(frames, &local),
        })
    }

    /// Global tempo in BPM, or `None` when the envelope has no periodicity
    fn estimate_tempo(&self, envelope: &[f64], frame_rate: f64) -> Option<f64> {
        let max_lag = ((AUTOCORRELATION_SECONDS * frame_rate).round() as usize).min(envelope.len());
        if max_lag < 2 {
            return None;
        }

        let autocorrelation: Vec<f64> = (0..max_lag)
            .map(|lag| {
                envelope[..envelope.len() - lag]
                    .iter()
                    .zip(&envelope[lag..])
                    .map(|(a, b)| a * b)
                    .sum()
            })
            .collect();

        let energy = autocorrelation[0];
        if energy <= 0.0 {
            return None;
        }

        let log_start = self.start_bpm.log2();
        let mut best: Option<(f64, f64)> = None;
        for (lag, value) in autocorrelation.iter().enumerate().skip(1) {
            let bpm = 60.0 * frame_rate / lag as f64;
            if bpm > MAX_TEMPO_BPM {
                continue;
            }
            let prior = -0.5 * ((bpm.log2() - log_start) / TEMPO_PRIOR_OCTAVES).powi(2);
            let score = (1e6 * value.max(0.0) / energy).ln_1p() + prior;
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((bpm, score));
            }
        }

        best.map(|(bpm, _)| bpm)
    }

    fn dynamic_program(&self, local: &[f64], period: f64) -> Vec<usize> {
        let n = local.len();
        let window_min = (period / 2.0).round().max(1.0) as usize;
        let window_max = (2.0 * period).round().max(1.0) as usize;
        let score_threshold = 0.01 * local.iter().cloned().fold(f64::MIN, f64::max);

        let mut cumulative = vec![0.0f64; n];
        let mut backlink: Vec<Option<usize>> = vec![None; n];
        let mut first_beat = true;

        for i in 0..n {
            let mut best: Option<(usize, f64)> = None;
            let lo = i.saturating_sub(window_max);
            let hi = i.saturating_sub(window_min);
            if i >= window_min {
                for loc in lo..=hi {
                    let gap = (i - loc) as f64;
                    let penalty = self.tightness * (gap.ln() - period.ln()).powi(2);
                    let score = cumulative[loc] - penalty;
                    if best.map_or(true, |(_, s)| score > s) {
                        best = Some((loc, score));
                    }
                }
            }

            cumulative[i] = local[i] + best.map_or(0.0, |(_, s)| s);

            if first_beat && local[i] < score_threshold {
                backlink[i] = None;
            } else {
                backlink[i] = best.map(|(loc, _)| loc);
                first_beat = false;
            }
        }

        let mut beats = vec![last_beat(&cumulative)];
        while let Some(previous) = backlink[beats[beats.len() - 1]] {
            beats.push(previous);
        }
        beats.reverse();
        beats
    }
}

impl Default for DynamicBeatTracker {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl BeatTrackPort for DynamicBeatTracker {
    fn track_envelope(
        &self,
        onset_envelope: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatTrack, TrackError> {
        self.track(onset_envelope, sample_rate, hop_length)
    }

    fn track_signal(
        &self,
        samples: &[f32],
        sample_rate: u32,
        hop_length: usize,
    ) -> Result<BeatTrack, TrackError> {
        let spectrogram = Spectrogram::compute(samples, self.n_fft, hop_length)
            .map_err(|e| TrackError::Failed(e.to_string()))?;
        self.track(&onset_strength(&spectrogram), sample_rate, hop_length)
    }
}

fn no_beats() -> BeatTrack {
    BeatTrack {
        tempo_bpm: 0.0,
        frames: Vec::new(),
    }
}

/// Onset envelope scaled to unit deviation and smoothed with a Gaussian one
/// beat period wide
fn local_score(envelope: &[f64], period: f64) -> Vec<f64> {
    let n = envelope.len() as f64;
    let mean = envelope.iter().sum::<f64>() / n;
    let variance = envelope.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0).max(1.0);
    let std = variance.sqrt();
    let scale = if std > 0.0 { 1.0 / std } else { 1.0 };

    let half = period as i64;
    let kernel: Vec<f64> = (-half..=half)
        .map(|k| (-0.5 * (k as f64 * 32.0 / period).powi(2)).exp())
        .collect();

    (0..envelope.len() as i64)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let j = i + k as i64 - half;
                    envelope.get(usize::try_from(j).ok()?).map(|v| v * scale * w)
                })
                .sum()
        })
        .collect()
}

/// Last local maximum of the cumulative score that is still reasonably strong
fn last_beat(cumulative: &[f64]) -> usize {
    let n = cumulative.len();
    let maxima: Vec<usize> = (0..n)
        .filter(|&i| {
            let above_left = i == 0 || cumulative[i] > cumulative[i - 1];
            let not_below_right = i + 1 == n || cumulative[i] >= cumulative[i + 1];
            above_left && not_below_right
        })
        .collect();

    if maxima.is_empty() {
        return n.saturating_sub(1);
    }

    let mut values: Vec<f64> = maxima.iter().map(|&i| cumulative[i]).collect();
    values.sort_by(f64::total_cmp);
    let median = values[values.len() / 2];

    maxima
        .iter()
        .rev()
        .copied()
        .find(|&i| cumulative[i] >= 0.5 * median)
        .unwrap_or(n - 1)
}

/// Drop leading and trailing beats whose onset support is weak
fn trim_weak_edges(beats: Vec<usize>, local: &[f64]) -> Vec<usize> {
    if beats.is_empty() {
        return beats;
    }

    let strengths: Vec<f64> = beats.iter().map(|&b| local[b]).collect();
    let rms = (strengths.iter().map(|s| s * s).sum::<f64>() / strengths.len() as f64).sqrt();
    let threshold = 0.5 * rms;

    let first = strengths.iter().position(|s| *s >= threshold);
    let last = strengths.iter().rposition(|s| *s >= threshold);
    match (first, last) {
        (Some(first), Some(last)) => beats[first..=last].to_vec(),
        _ => Vec::new(),
    }
}
