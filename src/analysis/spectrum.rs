//! Short-time Fourier analysis and onset envelopes

use std::f32::consts::PI;

use realfft::RealFftPlanner;

use crate::domain::errors::DomainError;

/// Magnitude spectrogram laid out as `frames[time][bin]`
#[derive(Debug, Clone)]
pub struct Spectrogram {
    pub frames: Vec<Vec<f32>>,
    pub n_fft: usize,
    pub hop_length: usize,
}

impl Spectrogram {
    /// Centered STFT magnitude with a periodic Hann window.
    ///
    /// The signal is zero-padded by `n_fft / 2` on both sides so frame `k` is
    /// centred on sample `k * hop_length`.
    pub fn compute(samples: &[f32], n_fft: usize, hop_length: usize) -> Result<Self, DomainError> {
        if n_fft < 2 || hop_length == 0 {
            return Err(DomainError::AnalysisError(format!(
                "Invalid STFT geometry: n_fft={}, hop_length={}",
                n_fft, hop_length
            )));
        }

        let pad = n_fft / 2;
        let mut padded = vec![0.0f32; samples.len() + 2 * pad];
        padded[pad..pad + samples.len()].copy_from_slice(samples);

        let window = hann_window(n_fft);
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(n_fft);
        let mut input = fft.make_input_vec();
        let mut spectrum = fft.make_output_vec();
        let mut scratch = fft.make_scratch_vec();

        let frame_count = match padded.len().checked_sub(n_fft) {
            Some(span) => 1 + span / hop_length,
            None => 0,
        };
        let mut frames: Vec<Vec<f32>> = Vec::with_capacity(frame_count);

        for frame in 0..frame_count {
            let offset = frame * hop_length;
            for (i, slot) in input.iter_mut().enumerate() {
                *slot = padded[offset + i] * window[i];
            }
            fft.process_with_scratch(&mut input, &mut spectrum, &mut scratch)
                .map_err(|e| DomainError::AnalysisError(format!("FFT failed: {}", e)))?;
            frames.push(spectrum.iter().map(|bin| bin.norm()).collect());
        }

        Ok(Self {
            frames,
            n_fft,
            hop_length,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / len as f32).cos())
        .collect()
}

/// Centre frequency of every STFT bin
pub fn frequency_bins(sample_rate: u32, n_fft: usize) -> Vec<f32> {
    (0..=n_fft / 2)
        .map(|k| k as f32 * sample_rate as f32 / n_fft as f32)
        .collect()
}

/// Per-frame magnitude summed over bins inside `[low_hz, high_hz]`
pub fn band_onset_envelope(
    spectrogram: &Spectrogram,
    frequencies: &[f32],
    low_hz: f32,
    high_hz: f32,
) -> Vec<f32> {
    let band: Vec<usize> = frequencies
        .iter()
        .enumerate()
        .filter(|(_, f)| **f >= low_hz && **f <= high_hz)
        .map(|(i, _)| i)
        .collect();

    spectrogram
        .frames
        .iter()
        .map(|frame| band.iter().filter_map(|&i| frame.get(i)).sum())
        .collect()
}

/// Full-spectrum onset strength: mean positive log-magnitude flux per frame
pub fn onset_strength(spectrogram: &Spectrogram) -> Vec<f32> {
    const FLOOR_DB: f32 = -80.0;

    let peak = spectrogram
        .frames
        .iter()
        .flatten()
        .fold(f32::EPSILON, |acc, m| acc.max(*m));

    let db: Vec<Vec<f32>> = spectrogram
        .frames
        .iter()
        .map(|frame| {
            frame
                .iter()
                .map(|m| (20.0 * (m.max(1e-10) / peak).log10()).max(FLOOR_DB))
                .collect()
        })
        .collect();

    let mut envelope = vec![0.0f32; db.len()];
    for t in 1..db.len() {
        let bins = db[t].len().max(1) as f32;
        let flux: f32 = db[t]
            .iter()
            .zip(&db[t - 1])
            .map(|(now, before)| (now - before).max(0.0))
            .sum();
        envelope[t] = flux / bins;
    }
    envelope
}

/// Convert analysis frame indices to seconds
pub fn frames_to_time(frames: &[usize], sample_rate: u32, hop_length: usize) -> Vec<f64> {
    frames
        .iter()
        .map(|&frame| (frame * hop_length) as f64 / sample_rate as f64)
        .collect()
}
