//! Window functions for frame-based analysis.

use std::f64::consts::PI;

/// Create a Hann window of the given size.
pub fn hann_window(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_starts_at_zero() {
        let window = hann_window(2048);
        assert!(window[0].abs() < 1e-12);
    }

    #[test]
    fn hann_peaks_at_center() {
        let window = hann_window(2048);
        let center = window[1024];
        assert!((center - 1.0).abs() < 1e-6);
        for &w in &window {
            assert!(w <= center + 1e-12);
        }
    }

    #[test]
    fn hann_has_requested_size() {
        assert_eq!(hann_window(512).len(), 512);
    }
}
