//! Audio buffer model shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Mono audio held as f64 samples with an associated sample rate.
///
/// This is the unit the pipeline operates on: the loader mixes whatever
/// it reads down to this shape, and every step consumes or produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    /// Mono samples, nominally in [-1.0, 1.0].
    pub samples: Vec<f64>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl AudioBuffer {
    /// Create a buffer from samples and a sample rate.
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Root-mean-square level of the whole buffer.
    pub fn rms(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = self.samples.iter().map(|s| s * s).sum();
        (sum_sq / self.samples.len() as f64).sqrt()
    }

    /// Absolute peak level of the whole buffer.
    pub fn peak(&self) -> f64 {
        self.samples.iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_from_rate() {
        let buf = AudioBuffer::new(vec![0.0; 16000], 16000);
        assert!((buf.duration_secs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rms_of_constant_signal() {
        let buf = AudioBuffer::new(vec![0.5; 100], 8000);
        assert!((buf.rms() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn peak_ignores_sign() {
        let buf = AudioBuffer::new(vec![0.2, -0.9, 0.4], 8000);
        assert!((buf.peak() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn empty_buffer_is_safe() {
        let buf = AudioBuffer::new(Vec::new(), 44100);
        assert!(buf.is_empty());
        assert_eq!(buf.rms(), 0.0);
        assert_eq!(buf.duration_secs(), 0.0);
    }
}
