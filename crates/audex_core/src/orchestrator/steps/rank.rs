//! Ranking step.
//!
//! Terminal step of the indexing pipeline. Fuses upstream signals into
//! a single retrieval score, renormalizing the configured weights over
//! the signals actually present. Never fails: missing signals are
//! listed in the entry rather than treated as errors.

use crate::config::RankingSettings;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, IndexEntry, ScoreComponents, StepOutcome, StepValue};

/// Duration (seconds) at which the identity component saturates.
const IDENTITY_DURATION_CEILING_SECS: f64 = 30.0;

/// Sample rate (Hz) at which the identity component saturates.
const IDENTITY_RATE_CEILING_HZ: f64 = 16000.0;

/// Reduction (dB) treated as maximal denoise quality.
const QUALITY_REDUCTION_CEILING_DB: f64 = 20.0;

/// Gain magnitude (dB) treated as zero enhancement quality.
const QUALITY_GAIN_CEILING_DB: f64 = 20.0;

/// Weighted fusion of upstream signals into an index entry.
pub struct Ranker {
    weights: RankingSettings,
}

impl Ranker {
    /// Create the step from ranking settings.
    pub fn new(weights: &RankingSettings) -> Self {
        Self {
            weights: weights.clone(),
        }
    }

    /// Identity component from intrinsic audio properties.
    ///
    /// Longer clips and higher sample rates carry more retrievable
    /// content, saturating at 30 s and 16 kHz.
    fn identity_component(duration_secs: f64, sample_rate: u32) -> f64 {
        let duration = (duration_secs / IDENTITY_DURATION_CEILING_SECS).clamp(0.0, 1.0);
        let rate = (sample_rate as f64 / IDENTITY_RATE_CEILING_HZ).clamp(0.0, 1.0);
        0.5 * duration + 0.5 * rate
    }

    /// Quality component from the processing steps that ran.
    ///
    /// Denoise quality rewards achieved reduction; enhance quality
    /// rewards inputs that needed little correction. Returns `None`
    /// when neither processing step recorded output.
    fn quality_component(ctx: &Context) -> Option<f64> {
        let denoise_q = ctx
            .get("noise_reducer")
            .ok()
            .and_then(|v| v.as_denoised())
            .map(|d| (d.reduction_db / QUALITY_REDUCTION_CEILING_DB).clamp(0.0, 1.0));

        let enhance_q = ctx
            .get("audio_enhancer")
            .ok()
            .and_then(|v| v.as_enhanced())
            .map(|e| 1.0 - (e.gain_db.abs() / QUALITY_GAIN_CEILING_DB).clamp(0.0, 1.0));

        match (denoise_q, enhance_q) {
            (Some(d), Some(e)) => Some(0.5 * (d + e)),
            (Some(d), None) => Some(d),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }

    /// Fuse components into a score, renormalizing weights over the
    /// components that are present.
    fn fuse(&self, components: &ScoreComponents) -> f64 {
        let mut weighted = 0.0;
        let mut weight_sum = 0.0;

        if let Some(c) = components.classification {
            weighted += self.weights.weight_classification.max(0.0) * c;
            weight_sum += self.weights.weight_classification.max(0.0);
        }
        if let Some(s) = components.sentiment {
            weighted += self.weights.weight_sentiment.max(0.0) * s;
            weight_sum += self.weights.weight_sentiment.max(0.0);
        }
        if let Some(q) = components.quality {
            weighted += self.weights.weight_quality.max(0.0) * q;
            weight_sum += self.weights.weight_quality.max(0.0);
        }
        weighted += self.weights.weight_identity.max(0.0) * components.identity;
        weight_sum += self.weights.weight_identity.max(0.0);

        if weight_sum <= f64::EPSILON {
            // All weights zeroed out: fall back to the identity signal.
            return components.identity.clamp(0.0, 1.0);
        }
        (weighted / weight_sum).clamp(0.0, 1.0)
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(&RankingSettings::default())
    }
}

impl PipelineStep for Ranker {
    fn name(&self) -> &str {
        "ranker"
    }

    fn description(&self) -> &str {
        "Weighted fusion of upstream signals into an index entry"
    }

    fn dependencies(&self) -> &[&str] {
        &[
            "audio_classifier",
            "sentiment_analyzer",
            "noise_reducer",
            "audio_enhancer",
        ]
    }

    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
        let duration_secs = ctx.raw_audio().duration_secs();
        let sample_rate = ctx.sample_rate();

        let classification = ctx
            .get("audio_classifier")
            .ok()
            .and_then(|v| v.as_classification())
            .cloned();
        let sentiment = ctx
            .get("sentiment_analyzer")
            .ok()
            .and_then(|v| v.as_sentiment())
            .cloned();

        let components = ScoreComponents {
            classification: classification.as_ref().map(|c| c.top_confidence()),
            sentiment: sentiment
                .as_ref()
                .map(|s| 0.5 * s.score.abs() + 0.5 * s.arousal),
            quality: Self::quality_component(ctx),
            identity: Self::identity_component(duration_secs, sample_rate),
        };

        let mut missing_signals = Vec::new();
        if components.classification.is_none() {
            missing_signals.push("classification".to_string());
        }
        if components.sentiment.is_none() {
            missing_signals.push("sentiment".to_string());
        }
        if components.quality.is_none() {
            missing_signals.push("quality".to_string());
        }
        for signal in &missing_signals {
            ctx.logger
                .warn(&format!("Ranking without {} signal", signal));
        }

        let score = self.fuse(&components);

        let labels = classification.map(|c| c.labels).unwrap_or_default();
        let sentiment_score = sentiment.map(|s| s.score);

        ctx.logger.info(&format!(
            "Index entry: score {:.3} ({} of 3 optional signals present)",
            score,
            3 - missing_signals.len()
        ));

        ctx.record(
            self.name(),
            StepValue::Index(IndexEntry {
                score,
                components,
                labels,
                sentiment: sentiment_score,
                missing_signals,
                duration_secs,
                sample_rate,
                indexed_at: chrono::Local::now().to_rfc3339(),
            }),
        );

        Ok(StepOutcome::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RunLogger;
    use crate::models::{AudioBuffer, Label, SoundClass};
    use crate::orchestrator::types::{
        ClassifyOutput, DenoiseOutput, EnhanceOutput, SentimentOutput,
    };
    use std::sync::Arc;

    fn context_with(samples: Vec<f64>, sample_rate: u32) -> Context {
        let logger = Arc::new(RunLogger::null("test"));
        Context::new(samples, sample_rate, None, logger).unwrap()
    }

    fn record_classification(ctx: &mut Context, confidence: f64) {
        ctx.record(
            "audio_classifier",
            StepValue::Classification(ClassifyOutput {
                labels: vec![Label::new(SoundClass::Speech, confidence)],
            }),
        );
    }

    fn record_sentiment(ctx: &mut Context, score: f64, arousal: f64) {
        ctx.record(
            "sentiment_analyzer",
            StepValue::Sentiment(SentimentOutput {
                valence: score,
                arousal,
                score,
                confidence: 0.7,
                transcript_used: true,
            }),
        );
    }

    #[test]
    fn produces_entry_with_all_signals() {
        let mut ctx = context_with(vec![0.1; 16000], 16000);
        record_classification(&mut ctx, 0.8);
        record_sentiment(&mut ctx, 0.6, 0.4);
        ctx.record(
            "noise_reducer",
            StepValue::Denoised(DenoiseOutput {
                audio: AudioBuffer::new(vec![0.1; 16000], 16000),
                reduction_db: 4.0,
            }),
        );
        ctx.record(
            "audio_enhancer",
            StepValue::Enhanced(EnhanceOutput {
                audio: AudioBuffer::new(vec![0.1; 16000], 16000),
                gain_db: 2.0,
            }),
        );

        let step = Ranker::default();
        step.run(&mut ctx).unwrap();

        let entry = ctx.get("ranker").unwrap().as_index().unwrap();
        assert!(entry.missing_signals.is_empty());
        assert!(entry.score > 0.0 && entry.score <= 1.0);
        assert_eq!(entry.labels.len(), 1);
        assert_eq!(entry.sentiment, Some(0.6));
        assert_eq!(entry.sample_rate, 16000);
        assert!((entry.duration_secs - 1.0).abs() < 1e-9);
    }

    #[test]
    fn succeeds_with_no_upstream_results() {
        let mut ctx = context_with(vec![0.1; 16000], 16000);

        let step = Ranker::default();
        let outcome = step.run(&mut ctx).unwrap();

        assert_eq!(outcome, StepOutcome::Success);
        let entry = ctx.get("ranker").unwrap().as_index().unwrap();
        assert_eq!(
            entry.missing_signals,
            vec!["classification", "sentiment", "quality"]
        );
        assert!(entry.labels.is_empty());
        assert_eq!(entry.sentiment, None);
        // Only the identity component remains, so the score equals it.
        assert!((entry.score - entry.components.identity).abs() < 1e-12);
    }

    #[test]
    fn weights_renormalize_over_present_signals() {
        let mut ctx = context_with(vec![0.1; 16000], 16000);
        record_classification(&mut ctx, 1.0);

        let weights = RankingSettings {
            weight_classification: 0.4,
            weight_sentiment: 0.2,
            weight_quality: 0.2,
            weight_identity: 0.2,
        };
        let step = Ranker::new(&weights);
        step.run(&mut ctx).unwrap();

        let entry = ctx.get("ranker").unwrap().as_index().unwrap();
        let identity = entry.components.identity;
        // Present weights: classification 0.4 and identity 0.2.
        let expected = (0.4 * 1.0 + 0.2 * identity) / 0.6;
        assert!((entry.score - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_weights_fall_back_to_identity() {
        let mut ctx = context_with(vec![0.1; 16000], 16000);
        record_classification(&mut ctx, 0.9);

        let weights = RankingSettings {
            weight_classification: 0.0,
            weight_sentiment: 0.0,
            weight_quality: 0.0,
            weight_identity: 0.0,
        };
        let step = Ranker::new(&weights);
        step.run(&mut ctx).unwrap();

        let entry = ctx.get("ranker").unwrap().as_index().unwrap();
        assert!((entry.score - entry.components.identity).abs() < 1e-12);
    }

    #[test]
    fn identity_saturates_at_ceilings() {
        let long = Ranker::identity_component(120.0, 48000);
        assert!((long - 1.0).abs() < 1e-12);

        let short = Ranker::identity_component(3.0, 8000);
        assert!((short - (0.5 * 0.1 + 0.5 * 0.5)).abs() < 1e-12);
    }

    #[test]
    fn quality_uses_single_available_indicator() {
        let mut ctx = context_with(vec![0.1; 16000], 16000);
        ctx.record(
            "noise_reducer",
            StepValue::Denoised(DenoiseOutput {
                audio: AudioBuffer::new(vec![0.1; 16000], 16000),
                reduction_db: 10.0,
            }),
        );

        let quality = Ranker::quality_component(&ctx).unwrap();
        assert!((quality - 0.5).abs() < 1e-12);
    }
}
