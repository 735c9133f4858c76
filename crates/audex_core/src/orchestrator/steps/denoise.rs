//! Noise reduction step.
//!
//! Removes low-frequency rumble with a Butterworth high-pass, then
//! applies an RMS noise gate derived from the quietest analysis blocks.

use crate::analysis::features::frame_rms;
use crate::analysis::filtering;
use crate::config::AnalysisSettings;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, DenoiseOutput, StepOutcome, StepValue};
use crate::models::AudioBuffer;

/// Attenuation applied to gated blocks.
const GATE_ATTENUATION: f64 = 0.1;

/// High-pass filter order.
const HIGHPASS_ORDER: usize = 4;

/// Rumble removal plus RMS noise gating.
pub struct NoiseReducer {
    highpass_hz: f64,
    gate_db: f64,
    block_size: usize,
}

impl NoiseReducer {
    /// Create the step from analysis settings.
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            highpass_hz: settings.denoise_highpass_hz,
            gate_db: settings.denoise_gate_db,
            block_size: settings.hop_size.max(1),
        }
    }

    /// Gate blocks whose RMS sits below the threshold derived from the
    /// quietest decile of blocks.
    fn gate(&self, samples: &[f64]) -> Vec<f64> {
        let mut block_levels: Vec<f64> = samples
            .chunks(self.block_size)
            .map(frame_rms)
            .collect();

        if block_levels.len() < 4 {
            // Too short for a meaningful floor estimate.
            return samples.to_vec();
        }

        block_levels.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let floor_index = (block_levels.len() / 10).max(1);
        let noise_floor =
            block_levels[..floor_index].iter().sum::<f64>() / floor_index as f64;

        let threshold = noise_floor * 10f64.powf(self.gate_db / 20.0);

        let mut gated = Vec::with_capacity(samples.len());
        for block in samples.chunks(self.block_size) {
            let level = frame_rms(block);
            if level < threshold {
                gated.extend(block.iter().map(|s| s * GATE_ATTENUATION));
            } else {
                gated.extend_from_slice(block);
            }
        }
        gated
    }
}

impl Default for NoiseReducer {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl PipelineStep for NoiseReducer {
    fn name(&self) -> &str {
        "noise_reducer"
    }

    fn description(&self) -> &str {
        "High-pass rumble removal and RMS noise gating"
    }

    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
        let raw = ctx.raw_audio();
        let sample_rate = raw.sample_rate;
        let rms_before = raw.rms();

        let filtered = filtering::high_pass(
            &raw.samples,
            sample_rate,
            self.highpass_hz,
            HIGHPASS_ORDER,
        );
        let gated = self.gate(&filtered);

        let denoised = AudioBuffer::new(gated, sample_rate);
        let rms_after = denoised.rms();

        let reduction_db = if rms_after > 0.0 && rms_before > 0.0 {
            (20.0 * (rms_before / rms_after).log10()).max(0.0)
        } else {
            0.0
        };

        ctx.logger.info(&format!(
            "Noise reduction: {:.2} dB over {:.2}s of audio",
            reduction_db,
            denoised.duration_secs()
        ));

        ctx.record(
            self.name(),
            StepValue::Denoised(DenoiseOutput {
                audio: denoised,
                reduction_db,
            }),
        );

        Ok(StepOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RunLogger;
    use std::f64::consts::PI;
    use std::sync::Arc;

    fn context_with(samples: Vec<f64>, sample_rate: u32) -> Context {
        let logger = Arc::new(RunLogger::null("test"));
        Context::new(samples, sample_rate, None, logger).unwrap()
    }

    #[test]
    fn records_output_under_own_name() {
        let mut ctx = context_with(vec![0.1; 4096], 16000);
        let step = NoiseReducer::default();

        let outcome = step.run(&mut ctx).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        let value = ctx.get("noise_reducer").unwrap();
        let out = value.as_denoised().unwrap();
        assert_eq!(out.audio.len(), 4096);
        assert!(out.reduction_db >= 0.0);
    }

    #[test]
    fn reduces_rumble_energy() {
        let sample_rate = 16000;
        let n = 16000;
        // Speech-band tone plus strong 30 Hz rumble.
        let samples: Vec<f64> = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                0.3 * (2.0 * PI * 1000.0 * t).sin() + 0.7 * (2.0 * PI * 30.0 * t).sin()
            })
            .collect();

        let mut ctx = context_with(samples, sample_rate);
        let step = NoiseReducer::default();
        step.run(&mut ctx).unwrap();

        let out = ctx.get("noise_reducer").unwrap().as_denoised().unwrap();
        assert!(
            out.reduction_db > 1.0,
            "expected measurable reduction, got {:.3} dB",
            out.reduction_db
        );
    }

    #[test]
    fn short_audio_still_succeeds() {
        let mut ctx = context_with(vec![0.5; 64], 8000);
        let step = NoiseReducer::default();

        let outcome = step.run(&mut ctx).unwrap();
        assert_eq!(outcome, StepOutcome::Success);
        assert!(ctx.has_result("noise_reducer"));
    }

    #[test]
    fn gate_attenuates_quiet_blocks() {
        let step = NoiseReducer::default();
        // Loud first half, near-silent second half.
        let mut samples = vec![0.5; 2048];
        samples.extend(vec![0.001; 2048]);

        let gated = step.gate(&samples);

        let quiet_rms = frame_rms(&gated[2048..]);
        assert!(quiet_rms < 0.001, "quiet half not gated: {}", quiet_rms);
        let loud_rms = frame_rms(&gated[..2048]);
        assert!((loud_rms - 0.5).abs() < 1e-9, "loud half altered");
    }
}
