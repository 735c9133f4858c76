//! Sound classification step.
//!
//! Assigns labels from a closed class set using spectral feature
//! heuristics. Confidences are normalized over the class set and labels
//! below the configured floor are dropped. Prefers enhanced audio and
//! degrades to the raw input.

use crate::analysis::{FeatureExtractor, FrameFeatures};
use crate::config::AnalysisSettings;
use crate::models::{Label, SoundClass};
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{ClassifyOutput, Context, StepOutcome, StepValue};

/// RMS below which a clip reads as silence.
const SILENCE_RMS: f64 = 0.02;

/// Center and half-width of the speech centroid band (Hz).
const SPEECH_CENTROID_CENTER_HZ: f64 = 1650.0;
const SPEECH_CENTROID_HALF_WIDTH_HZ: f64 = 1350.0;

/// Feature summary averaged over all frames.
struct ClipFeatures {
    rms: f64,
    dynamics: f64,
    centroid_hz: f64,
    rolloff_hz: f64,
    flatness: f64,
    zcr: f64,
}

impl ClipFeatures {
    fn from_frames(frames: &[FrameFeatures]) -> Self {
        let n = frames.len() as f64;
        let rms = frames.iter().map(|f| f.rms).sum::<f64>() / n;
        let rms_var = frames.iter().map(|f| (f.rms - rms).powi(2)).sum::<f64>() / n;
        let dynamics = if rms > 0.0 {
            (rms_var.sqrt() / rms).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            rms,
            dynamics,
            centroid_hz: frames.iter().map(|f| f.centroid_hz).sum::<f64>() / n,
            rolloff_hz: frames.iter().map(|f| f.rolloff_hz).sum::<f64>() / n,
            flatness: frames.iter().map(|f| f.flatness).sum::<f64>() / n,
            zcr: frames.iter().map(|f| f.zcr).sum::<f64>() / n,
        }
    }
}

/// Heuristic spectral classifier over {speech, music, tone, noise, silence}.
pub struct Classifier {
    extractor: FeatureExtractor,
    label_floor: f64,
}

impl Classifier {
    /// Create the step from analysis settings.
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            extractor: FeatureExtractor::new(settings.frame_size, settings.hop_size),
            label_floor: settings.classify_label_floor.clamp(0.0, 1.0),
        }
    }

    /// Raw (unnormalized) evidence score for each class.
    fn class_scores(clip: &ClipFeatures) -> Vec<(SoundClass, f64)> {
        let silence = (1.0 - clip.rms / SILENCE_RMS).clamp(0.0, 1.0);
        let audible = 1.0 - silence;

        let noise = audible * clip.flatness.clamp(0.0, 1.0);

        // Stationary narrowband content: very low flatness, little modulation.
        let tone = audible
            * (1.0 - clip.flatness * 5.0).clamp(0.0, 1.0)
            * (1.0 - clip.dynamics).clamp(0.0, 1.0)
            * (1.0 - clip.zcr).clamp(0.0, 1.0);

        // Modulated energy with a centroid in the voice band.
        let band_fit = 1.0
            - ((clip.centroid_hz - SPEECH_CENTROID_CENTER_HZ).abs()
                / SPEECH_CENTROID_HALF_WIDTH_HZ)
                .min(1.0);
        let speech = audible * band_fit * clip.dynamics.clamp(0.0, 1.0);

        // Broadband harmonic content with moderate modulation.
        let spread = (clip.rolloff_hz / 4000.0).clamp(0.0, 1.0);
        let music = audible
            * spread
            * (1.0 - clip.flatness * 2.0).clamp(0.0, 1.0)
            * (0.3 + 0.7 * clip.dynamics).clamp(0.0, 1.0);

        vec![
            (SoundClass::Speech, speech),
            (SoundClass::Music, music),
            (SoundClass::Tone, tone),
            (SoundClass::Noise, noise),
            (SoundClass::Silence, silence),
        ]
    }

    /// Normalize scores into confidences, drop those below the floor,
    /// and sort best first.
    fn to_labels(&self, scores: Vec<(SoundClass, f64)>) -> Vec<Label> {
        let total: f64 = scores.iter().map(|(_, s)| s.max(0.0)).sum();
        if total <= f64::EPSILON {
            // Nothing scored: the clip is indistinct, call it noise with
            // minimal confidence.
            return vec![Label::new(SoundClass::Noise, self.label_floor)];
        }

        let mut labels: Vec<Label> = scores
            .into_iter()
            .map(|(class, score)| Label::new(class, score.max(0.0) / total))
            .filter(|l| l.confidence >= self.label_floor)
            .collect();

        labels.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        labels
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl PipelineStep for Classifier {
    fn name(&self) -> &str {
        "audio_classifier"
    }

    fn description(&self) -> &str {
        "Sound-event tagging from spectral features"
    }

    fn dependencies(&self) -> &[&str] {
        &["audio_enhancer"]
    }

    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
        let (samples, sample_rate) = match ctx
            .get("audio_enhancer")
            .ok()
            .and_then(|v| v.as_enhanced())
        {
            Some(enhanced) => (enhanced.audio.samples.clone(), enhanced.audio.sample_rate),
            None => {
                ctx.logger
                    .info("No enhanced audio available, classifying raw input");
                (ctx.raw_audio().samples.clone(), ctx.sample_rate())
            }
        };

        if samples.len() < self.extractor.frame_size() {
            return Ok(StepOutcome::Skipped(format!(
                "audio shorter than one analysis frame ({} < {} samples)",
                samples.len(),
                self.extractor.frame_size()
            )));
        }

        let frames = self.extractor.analyze(&samples, sample_rate);
        if frames.is_empty() {
            return Ok(StepOutcome::Skipped(
                "no analysis frames available".to_string(),
            ));
        }

        let clip = ClipFeatures::from_frames(&frames);
        let labels = self.to_labels(Self::class_scores(&clip));

        let summary: Vec<String> = labels
            .iter()
            .map(|l| format!("{} {:.2}", l.class, l.confidence))
            .collect();
        ctx.logger
            .info(&format!("Classification: {}", summary.join(", ")));

        ctx.record(
            self.name(),
            StepValue::Classification(ClassifyOutput { labels }),
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

    fn top_class(ctx: &Context) -> SoundClass {
        ctx.get("audio_classifier")
            .unwrap()
            .as_classification()
            .unwrap()
            .labels
            .first()
            .expect("at least one label")
            .class
    }

    #[test]
    fn skips_on_short_audio() {
        let mut ctx = context_with(vec![0.1; 512], 16000);
        let step = Classifier::default();

        match step.run(&mut ctx).unwrap() {
            StepOutcome::Skipped(_) => {}
            StepOutcome::Success => panic!("expected skip"),
        }
    }

    #[test]
    fn silence_is_labelled_silence() {
        let mut ctx = context_with(vec![0.0005; 8192], 16000);
        let step = Classifier::default();
        step.run(&mut ctx).unwrap();

        assert_eq!(top_class(&ctx), SoundClass::Silence);
    }

    #[test]
    fn steady_sine_is_labelled_tone() {
        let sample_rate = 16000;
        let samples: Vec<f64> = (0..16384)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f64 / sample_rate as f64).sin())
            .collect();

        let mut ctx = context_with(samples, sample_rate);
        let step = Classifier::default();
        step.run(&mut ctx).unwrap();

        assert_eq!(top_class(&ctx), SoundClass::Tone);
    }

    #[test]
    fn labels_are_sorted_and_floored() {
        let sample_rate = 16000;
        let samples: Vec<f64> = (0..16384)
            .map(|i| 0.5 * (2.0 * PI * 440.0 * i as f64 / sample_rate as f64).sin())
            .collect();

        let mut ctx = context_with(samples, sample_rate);
        let step = Classifier::default();
        step.run(&mut ctx).unwrap();

        let out = ctx
            .get("audio_classifier")
            .unwrap()
            .as_classification()
            .unwrap();
        for pair in out.labels.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        for label in &out.labels {
            assert!(label.confidence >= 0.15 - 1e-12);
        }
    }

    #[test]
    fn confidences_stay_in_unit_range() {
        let sample_rate = 16000;
        // Pseudo-random broadband signal.
        let mut state = 0x2545F4914F6CDD1Du64;
        let samples: Vec<f64> = (0..16384)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                (state as f64 / u64::MAX as f64) - 0.5
            })
            .collect();

        let mut ctx = context_with(samples, sample_rate);
        let step = Classifier::default();
        step.run(&mut ctx).unwrap();

        let out = ctx
            .get("audio_classifier")
            .unwrap()
            .as_classification()
            .unwrap();
        assert!(!out.labels.is_empty());
        for label in &out.labels {
            assert!(label.confidence >= 0.0 && label.confidence <= 1.0);
        }
    }
}
