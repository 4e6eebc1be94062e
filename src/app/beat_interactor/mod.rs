// Beat interactor - Orchestrates bass-band beat extraction

use std::path::Path;
use std::sync::Arc;

use crate::analysis::{band_onset_envelope, frames_to_time, frequency_bins, Spectrogram};
use crate::config::AnalysisConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Interactor for the beat extraction use case
pub struct BeatInteractor {
    decode_port: Arc<dyn AudioDecodePort>,
    track_port: Arc<dyn BeatTrackPort>,
    log_port: Arc<dyn LogPort>,
    settings: AnalysisConfig,
}

impl BeatInteractor {
    /// Create new beat interactor with injected ports
    pub fn new(
        decode_port: Arc<dyn AudioDecodePort>,
        track_port: Arc<dyn BeatTrackPort>,
        log_port: Arc<dyn LogPort>,
        settings: AnalysisConfig,
    ) -> Self {
        Self {
            decode_port,
            track_port,
            log_port,
            settings,
        }
    }

    /// Detect beats in `[start_time, end_time)` of the audio file.
    ///
    /// Beat times are relative to `start_time`. An empty sequence is a valid
    /// result; callers decide whether that is fatal.
    pub fn analyze(
        &self,
        audio_path: &Path,
        start_time: f64,
        end_time: Option<f64>,
    ) -> Result<BeatAnalysis, DomainError> {
        let sample_rate = self.settings.sample_rate;
        let hop_length = self.settings.hop_length;
        let duration = AudioWindow::analysis_duration(start_time, end_time);

        self.log_port.info(&format!(
            "Loading audio {} from {:.2}s{}",
            audio_path.display(),
            start_time,
            duration.map_or_else(String::new, |d| format!(" for {:.2}s", d))
        ));
        let samples = self
            .decode_port
            .load(audio_path, sample_rate, start_time, duration)?;

        let spectrogram = Spectrogram::compute(&samples, self.settings.n_fft, hop_length)?;
        let frequencies = frequency_bins(sample_rate, self.settings.n_fft);
        let envelope = band_onset_envelope(
            &spectrogram,
            &frequencies,
            self.settings.bass_low_hz,
            self.settings.bass_high_hz,
        );
        self.log_port.debug(&format!(
            "Bass envelope: {} frames over {:.0}-{:.0} Hz",
            envelope.len(),
            self.settings.bass_low_hz,
            self.settings.bass_high_hz
        ));

        let track = match self
            .track_port
            .track_envelope(&envelope, sample_rate, hop_length)
        {
            Ok(track) => track,
            Err(TrackError::IncompatibleInput(reason)) => {
                self.log_port.warn(&format!(
                    "Bass onset tracking unavailable ({}); falling back to full-signal beat tracking",
                    reason
                ));
                self.track_port
                    .track_signal(&samples, sample_rate, hop_length)?
            }
            Err(err) => return Err(err.into()),
        };

        let beats = BeatSequence::from_times(frames_to_time(&track.frames, sample_rate, hop_length));
        let tempo_bpm = (track.tempo_bpm > 0.0).then_some(track.tempo_bpm);

        match tempo_bpm {
            Some(tempo) => self.log_port.info(&format!("Detected tempo: {:.1} BPM", tempo)),
            None => self.log_port.info("No stable tempo detected"),
        }
        self.log_port
            .info(&format!("Detected {} bass beats", beats.len()));

        Ok(BeatAnalysis {
            beats,
            samples,
            sample_rate,
            tempo_bpm,
        })
    }
}
