//! Audio analysis collaborators
//!
//! Spectral helpers used by the beat extractor and the default
//! [`BeatTrackPort`](crate::ports::BeatTrackPort) implementation.

pub mod spectrum;
pub mod tracker;

pub use spectrum::{band_onset_envelope, frames_to_time, frequency_bins, onset_strength, Spectrogram};
pub use tracker::DynamicBeatTracker;
