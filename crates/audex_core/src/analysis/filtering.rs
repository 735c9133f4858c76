//! IIR Butterworth filters for the denoise and enhance steps.
//!
//! Filters are built from cascaded second-order sections via the biquad
//! crate. Band-pass is realized as a high-pass followed by a low-pass,
//! each taking half the requested order.

use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type, Q_BUTTERWORTH_F64};

/// Apply a Butterworth low-pass filter.
pub fn low_pass(samples: &[f64], sample_rate: u32, cutoff_hz: f64, order: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let fs = sample_rate.hz();
    let f0 = cutoff_hz.hz();

    let coeffs = match Coefficients::<f64>::from_params(Type::LowPass, fs, f0, Q_BUTTERWORTH_F64) {
        Ok(c) => c,
        Err(_) => return samples.to_vec(),
    };

    cascaded(samples, &coeffs, order)
}

/// Apply a Butterworth high-pass filter.
pub fn high_pass(samples: &[f64], sample_rate: u32, cutoff_hz: f64, order: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let fs = sample_rate.hz();
    let f0 = cutoff_hz.hz();

    let coeffs = match Coefficients::<f64>::from_params(Type::HighPass, fs, f0, Q_BUTTERWORTH_F64) {
        Ok(c) => c,
        Err(_) => return samples.to_vec(),
    };

    cascaded(samples, &coeffs, order)
}

/// Apply a Butterworth band-pass filter as a high-pass into a low-pass.
pub fn band_pass(
    samples: &[f64],
    sample_rate: u32,
    low_hz: f64,
    high_hz: f64,
    order: usize,
) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let half_order = (order + 1) / 2;
    let high_passed = high_pass(samples, sample_rate, low_hz, half_order);
    low_pass(&high_passed, sample_rate, high_hz, half_order)
}

/// Run the same second-order section repeatedly for a steeper rolloff.
fn cascaded(samples: &[f64], coeffs: &Coefficients<f64>, order: usize) -> Vec<f64> {
    let num_sections = ((order + 1) / 2).max(1);

    let mut result = samples.to_vec();

    for _ in 0..num_sections {
        let mut filter = DirectForm2Transposed::<f64>::new(*coeffs);
        for sample in &mut result {
            *sample = filter.run(*sample);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
            .collect()
    }

    fn tail_energy(samples: &[f64]) -> f64 {
        let start = samples.len() / 2;
        samples[start..].iter().map(|x| x * x).sum()
    }

    #[test]
    fn high_pass_removes_rumble() {
        let sample_rate = 16000;
        let samples = sine(40.0, sample_rate, 8000);

        let filtered = high_pass(&samples, sample_rate, 200.0, 4);

        assert!(
            tail_energy(&filtered) < tail_energy(&samples) * 0.5,
            "high-pass left too much 40 Hz energy"
        );
    }

    #[test]
    fn low_pass_removes_hiss() {
        let sample_rate = 16000;
        let n = 8000;
        let samples: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                (2.0 * PI * 200.0 * t).sin() + (2.0 * PI * 6000.0 * t).sin()
            })
            .collect();

        let filtered = low_pass(&samples, sample_rate, 500.0, 4);

        assert!(tail_energy(&filtered) < tail_energy(&samples));
    }

    #[test]
    fn band_pass_keeps_speech_band() {
        let sample_rate = 16000;
        let samples = sine(1000.0, sample_rate, 16000);

        let filtered = band_pass(&samples, sample_rate, 300.0, 3400.0, 2);

        // In-band tone should retain most of its energy once settled.
        let start = (samples.len() * 3) / 4;
        let original: f64 = samples[start..].iter().map(|x| x * x).sum();
        let kept: f64 = filtered[start..].iter().map(|x| x * x).sum();
        assert!(kept > original * 0.1, "in-band energy dropped too far");
    }

    #[test]
    fn band_pass_preserves_length() {
        let samples = vec![0.1; 4096];
        let filtered = band_pass(&samples, 16000, 300.0, 3400.0, 5);
        assert_eq!(filtered.len(), samples.len());
    }

    #[test]
    fn empty_input_handled() {
        assert!(low_pass(&[], 16000, 1000.0, 4).is_empty());
        assert!(high_pass(&[], 16000, 1000.0, 4).is_empty());
        assert!(band_pass(&[], 16000, 300.0, 3400.0, 4).is_empty());
    }
}
