//! Spectral and temporal feature extraction.
//!
//! Frames the signal with a Hann window, runs an FFT per frame, and
//! derives the summary features the classification and sentiment steps
//! consume. Frame size and hop are fixed by the caller's settings.

use std::sync::Mutex;

use rustfft::{num_complex::Complex, FftPlanner};

use super::windows::hann_window;

/// Per-frame summary features.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameFeatures {
    /// Root-mean-square level of the frame.
    pub rms: f64,
    /// Zero-crossing rate in [0, 1].
    pub zcr: f64,
    /// Spectral centroid in Hz.
    pub centroid_hz: f64,
    /// Frequency below which 85% of spectral energy lies, in Hz.
    pub rolloff_hz: f64,
    /// Spectral flatness in [0, 1] (1 = white noise, 0 = pure tone).
    pub flatness: f64,
}

/// Frame-based feature extractor with a cached FFT plan.
pub struct FeatureExtractor {
    frame_size: usize,
    hop_size: usize,
    planner: Mutex<FftPlanner<f64>>,
}

impl FeatureExtractor {
    /// Create an extractor for the given frame geometry.
    pub fn new(frame_size: usize, hop_size: usize) -> Self {
        Self {
            frame_size: frame_size.max(2),
            hop_size: hop_size.max(1),
            planner: Mutex::new(FftPlanner::new()),
        }
    }

    /// Frame size in samples.
    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Hop between consecutive frames in samples.
    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    /// Extract features for every full frame of `samples`.
    ///
    /// Returns an empty vector when the signal is shorter than one frame.
    pub fn analyze(&self, samples: &[f64], sample_rate: u32) -> Vec<FrameFeatures> {
        if samples.len() < self.frame_size || sample_rate == 0 {
            return Vec::new();
        }

        let window = hann_window(self.frame_size);
        let num_bins = self.frame_size / 2 + 1;
        let bin_hz = sample_rate as f64 / self.frame_size as f64;

        let fft = {
            let mut planner = match self.planner.lock() {
                Ok(p) => p,
                Err(poisoned) => poisoned.into_inner(),
            };
            planner.plan_fft_forward(self.frame_size)
        };

        let mut features = Vec::new();
        let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); self.frame_size];

        let mut start = 0;
        while start + self.frame_size <= samples.len() {
            let frame = &samples[start..start + self.frame_size];

            for (i, (&s, &w)) in frame.iter().zip(window.iter()).enumerate() {
                buffer[i] = Complex::new(s * w, 0.0);
            }
            fft.process(&mut buffer);

            let power: Vec<f64> = buffer[..num_bins].iter().map(|c| c.norm_sqr()).collect();

            features.push(FrameFeatures {
                rms: frame_rms(frame),
                zcr: zero_crossing_rate(frame),
                centroid_hz: spectral_centroid(&power, bin_hz),
                rolloff_hz: spectral_rolloff(&power, bin_hz, 0.85),
                flatness: spectral_flatness(&power),
            });

            start += self.hop_size;
        }

        features
    }
}

/// RMS of a single frame.
pub fn frame_rms(frame: &[f64]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = frame.iter().map(|s| s * s).sum();
    (sum_sq / frame.len() as f64).sqrt()
}

/// Fraction of adjacent sample pairs that change sign.
pub fn zero_crossing_rate(frame: &[f64]) -> f64 {
    if frame.len() < 2 {
        return 0.0;
    }
    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();
    crossings as f64 / (frame.len() - 1) as f64
}

/// Power-weighted mean frequency.
fn spectral_centroid(power: &[f64], bin_hz: f64) -> f64 {
    let total: f64 = power.iter().sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    let weighted: f64 = power
        .iter()
        .enumerate()
        .map(|(i, &p)| i as f64 * bin_hz * p)
        .sum();
    weighted / total
}

/// Frequency below which `fraction` of the total spectral energy lies.
fn spectral_rolloff(power: &[f64], bin_hz: f64, fraction: f64) -> f64 {
    let total: f64 = power.iter().sum();
    if total <= f64::EPSILON {
        return 0.0;
    }
    let threshold = total * fraction;
    let mut cumulative = 0.0;
    for (i, &p) in power.iter().enumerate() {
        cumulative += p;
        if cumulative >= threshold {
            return i as f64 * bin_hz;
        }
    }
    (power.len().saturating_sub(1)) as f64 * bin_hz
}

/// Geometric mean over arithmetic mean of the power spectrum.
fn spectral_flatness(power: &[f64]) -> f64 {
    if power.is_empty() {
        return 0.0;
    }
    let arithmetic: f64 = power.iter().sum::<f64>() / power.len() as f64;
    if arithmetic <= f64::EPSILON {
        return 0.0;
    }
    // Geometric mean via log domain to avoid underflow on long spectra.
    let log_sum: f64 = power.iter().map(|&p| (p + 1e-12).ln()).sum();
    let geometric = (log_sum / power.len() as f64).exp();
    (geometric / arithmetic).clamp(0.0, 1.0)
}
