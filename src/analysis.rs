//! Tempo estimation
//!
//! Runs once per track before a session starts. Far too heavy for the tick
//! loop, so the result is a plain `TempoTrack` the scroll controller indexes.

use std::f32::consts::PI;
use std::sync::Arc;

use realfft::{RealFftPlanner, RealToComplex, num_complex::Complex32};
use serde::{Deserialize, Serialize};

use crate::consts::FALLBACK_TEMPO;

/// Onset envelope frames per second
const ENVELOPE_RATE: f32 = 200.0;
const MIN_BPM: f32 = 60.0;
const MAX_BPM: f32 = 240.0;
/// Segments quieter than this RMS count as silent
const SILENCE_RMS: f32 = 1.0e-4;

/// Per-segment tempo estimates for one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TempoTrack {
    segment_duration: f64,
    tempos: Vec<f32>,
}

impl TempoTrack {
    pub fn new(segment_duration: f64, tempos: Vec<f32>) -> Self {
        Self {
            segment_duration,
            tempos,
        }
    }

    pub fn segment_duration(&self) -> f64 {
        self.segment_duration
    }

    pub fn tempos(&self) -> &[f32] {
        &self.tempos
    }

    pub fn len(&self) -> usize {
        self.tempos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tempos.is_empty()
    }

    /// Tempo of the segment with the given index, if in range
    pub fn get(&self, index: usize) -> Option<f32> {
        self.tempos.get(index).copied()
    }
}

/// Estimates a tempo per fixed-duration segment of a mono waveform
#[derive(Debug, Clone)]
pub struct TempoEstimator {
    fallback_tempo: f32,
    min_bpm: f32,
    max_bpm: f32,
}

impl Default for TempoEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempoEstimator {
    pub fn new() -> Self {
        Self::with_fallback(FALLBACK_TEMPO)
    }

    /// Estimator that reports `fallback_tempo` for segments it cannot analyse
    pub fn with_fallback(fallback_tempo: f32) -> Self {
        Self {
            fallback_tempo,
            min_bpm: MIN_BPM,
            max_bpm: MAX_BPM,
        }
    }

    /// Split `waveform` into `segment_duration`-second segments and estimate
    /// each one. A trailing partial segment gets the fallback tempo.
    ///
    /// # Panics
    /// If `sample_rate` is zero or `segment_duration` is not positive.
    pub fn estimate(
        &self,
        waveform: &[f32],
        sample_rate: u32,
        segment_duration: f64,
    ) -> TempoTrack {
        assert!(sample_rate > 0, "sample rate must be positive");
        assert!(segment_duration > 0.0, "segment duration must be positive");

        let segment_len = ((segment_duration * sample_rate as f64).round() as usize).max(1);
        let mut onsets = OnsetDetector::new(sample_rate);

        let tempos: Vec<f32> = waveform
            .chunks(segment_len)
            .map(|segment| {
                if segment.len() < segment_len {
                    self.fallback_tempo
                } else {
                    self.estimate_segment(segment, &mut onsets)
                }
            })
            .collect();

        log::info!(
            "Estimated {} tempo segments of {:.2}s ({:.1}s of audio)",
            tempos.len(),
            segment_duration,
            duration_seconds(waveform, sample_rate)
        );

        TempoTrack::new(segment_duration, tempos)
    }

    fn estimate_segment(&self, segment: &[f32], onsets: &mut OnsetDetector) -> f32 {
        if rms(segment) <= SILENCE_RMS {
            return self.fallback_tempo;
        }

        let envelope = onsets.envelope(segment);
        let candidates = self.tempo_candidates(&envelope, onsets.frame_rate());

        // Several periodicities can fit; the strongest wins
        candidates.first().copied().unwrap_or(self.fallback_tempo)
    }

    /// Autocorrelation peaks of the onset envelope within the BPM range,
    /// strongest first
    fn tempo_candidates(&self, envelope: &[f32], frame_rate: f32) -> Vec<f32> {
        let n = envelope.len();
        if n < 4 {
            return Vec::new();
        }

        let mean = envelope.iter().sum::<f32>() / n as f32;
        let centered: Vec<f32> = envelope.iter().map(|v| v - mean).collect();

        let min_lag = ((60.0 * frame_rate / self.max_bpm).floor() as usize).max(1);
        let max_lag = ((60.0 * frame_rate / self.min_bpm).ceil() as usize).min(n * 3 / 4);
        if min_lag + 1 >= max_lag {
            return Vec::new();
        }

        let acf: Vec<f32> = (0..=max_lag + 1)
            .map(|lag| {
                if lag >= n {
                    return 0.0;
                }
                let sum: f32 = centered[..n - lag]
                    .iter()
                    .zip(&centered[lag..])
                    .map(|(a, b)| a * b)
                    .sum();
                sum / n as f32
            })
            .collect();

        let mut peaks: Vec<(usize, f32)> = (min_lag..=max_lag)
            .filter(|&lag| acf[lag] > 0.0 && acf[lag] >= acf[lag - 1] && acf[lag] > acf[lag + 1])
            .map(|lag| (lag, acf[lag]))
            .collect();

        // Stable: equal strengths keep the shorter lag first
        peaks.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        peaks
            .into_iter()
            .map(|(lag, _)| 60.0 * frame_rate / lag as f32)
            .collect()
    }
}

/// Spectral-flux onset strength over Hann-windowed frames
struct OnsetDetector {
    hop: usize,
    frame_rate: f32,
    window: Vec<f32>,
    plan: Arc<dyn RealToComplex<f32>>,
    input: Vec<f32>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl OnsetDetector {
    fn new(sample_rate: u32) -> Self {
        let hop = ((sample_rate as f32 / ENVELOPE_RATE).round() as usize).max(1);
        let frame_size = (2 * hop).next_power_of_two().max(64);
        let plan = RealFftPlanner::<f32>::new().plan_fft_forward(frame_size);
        Self {
            hop,
            frame_rate: sample_rate as f32 / hop as f32,
            window: (0..frame_size).map(|i| hann_value(i, frame_size)).collect(),
            input: plan.make_input_vec(),
            spectrum: plan.make_output_vec(),
            scratch: plan.make_scratch_vec(),
            plan,
        }
    }

    fn frame_rate(&self) -> f32 {
        self.frame_rate
    }

    fn envelope(&mut self, samples: &[f32]) -> Vec<f32> {
        let frame_size = self.window.len();
        if samples.len() < frame_size {
            return Vec::new();
        }

        let frames = (samples.len() - frame_size) / self.hop + 1;
        let mut previous = vec![0.0f32; self.spectrum.len()];
        let mut envelope = Vec::with_capacity(frames);

        for frame in 0..frames {
            let start = frame * self.hop;
            for (i, (dst, w)) in self.input.iter_mut().zip(&self.window).enumerate() {
                *dst = samples[start + i] * w;
            }

            if let Err(e) =
                self.plan
                    .process_with_scratch(&mut self.input, &mut self.spectrum, &mut self.scratch)
            {
                log::warn!("FFT failed on onset frame {}: {}", frame, e);
                return Vec::new();
            }

            let mut flux = 0.0;
            for (bin, prev) in self.spectrum.iter().zip(previous.iter_mut()) {
                let magnitude = bin.norm();
                flux += (magnitude - *prev).max(0.0);
                *prev = magnitude;
            }
            envelope.push(flux);
        }

        envelope
    }
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

fn hann_value(index: usize, len: usize) -> f32 {
    if len <= 1 {
        return 1.0;
    }
    0.5 - 0.5 * ((2.0 * PI * index as f32) / (len as f32 - 1.0)).cos()
}

/// Length of a waveform in seconds
pub fn duration_seconds(waveform: &[f32], sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    waveform.len() as f64 / sample_rate as f64
}

/// Metronome-style waveform: a short decaying 1 kHz blip on every beat
pub fn click_track(bpm: f32, seconds: f32, sample_rate: u32) -> Vec<f32> {
    let rate = sample_rate as f32;
    let len = (seconds * rate).round() as usize;
    let mut samples = vec![0.0f32; len];
    if bpm <= 0.0 || len == 0 {
        return samples;
    }

    let interval = 60.0 / bpm * rate;
    let click_len = ((0.02 * rate) as usize).max(1);
    let mut beat = 0usize;
    loop {
        let start = (beat as f32 * interval).round() as usize;
        if start >= len {
            break;
        }
        for (i, sample) in samples[start..(start + click_len).min(len)].iter_mut().enumerate() {
            let t = i as f32 / rate;
            let decay = 1.0 - i as f32 / click_len as f32;
            *sample = (2.0 * PI * 1000.0 * t).sin() * decay;
        }
        beat += 1;
    }

    samples
}
