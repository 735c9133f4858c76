//! Audio enhancement step.
//!
//! Emphasizes the speech band with a band-pass blend, then normalizes
//! the peak toward a configured headroom. Prefers the denoiser's output
//! and degrades to the raw audio when it is absent.

use crate::analysis::filtering;
use crate::config::AnalysisSettings;
use crate::models::AudioBuffer;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, EnhanceOutput, StepOutcome, StepValue};

/// Band-pass filter order.
const BANDPASS_ORDER: usize = 4;

/// Maximum normalization gain (20 dB) to keep noise from exploding.
const MAX_GAIN: f64 = 10.0;

/// Speech-band emphasis and peak normalization.
pub struct AudioEnhancer {
    low_hz: f64,
    high_hz: f64,
    mix: f64,
    target_peak: f64,
}

impl AudioEnhancer {
    /// Create the step from analysis settings.
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            low_hz: settings.enhance_low_hz,
            high_hz: settings.enhance_high_hz,
            mix: settings.enhance_mix.clamp(0.0, 1.0),
            target_peak: settings.enhance_target_peak.clamp(0.0, 1.0),
        }
    }
}

impl Default for AudioEnhancer {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl PipelineStep for AudioEnhancer {
    fn name(&self) -> &str {
        "audio_enhancer"
    }

    fn description(&self) -> &str {
        "Speech-band emphasis and peak normalization"
    }

    fn dependencies(&self) -> &[&str] {
        &["noise_reducer"]
    }

    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
        let (source, sample_rate) = match ctx
            .get("noise_reducer")
            .ok()
            .and_then(|v| v.as_denoised())
        {
            Some(denoised) => (denoised.audio.samples.clone(), denoised.audio.sample_rate),
            None => {
                ctx.logger
                    .info("No denoised audio available, enhancing raw input");
                (ctx.raw_audio().samples.clone(), ctx.sample_rate())
            }
        };

        let emphasized =
            filtering::band_pass(&source, sample_rate, self.low_hz, self.high_hz, BANDPASS_ORDER);

        let blended: Vec<f64> = source
            .iter()
            .zip(emphasized.iter())
            .map(|(dry, wet)| dry * (1.0 - self.mix) + wet * self.mix)
            .collect();

        let peak = blended.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
        let gain = if peak > 0.0 {
            (self.target_peak / peak).min(MAX_GAIN)
        } else {
            1.0
        };
        let gain_db = 20.0 * gain.log10();

        let normalized: Vec<f64> = blended.iter().map(|s| s * gain).collect();

        ctx.logger.info(&format!(
            "Enhancement: band {:.0}-{:.0} Hz, normalization gain {:+.2} dB",
            self.low_hz, self.high_hz, gain_db
        ));

        ctx.record(
            self.name(),
            StepValue::Enhanced(EnhanceOutput {
                audio: AudioBuffer::new(normalized, sample_rate),
                gain_db,
            }),
        );

        Ok(StepOutcome::Success)
    }
}
