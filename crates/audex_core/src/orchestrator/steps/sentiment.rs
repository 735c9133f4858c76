//! Sentiment analysis step.
//!
//! Estimates valence/arousal for the clip. When the metadata carries a
//! `transcript` string a lexicon scorer contributes valence; without it
//! the step degrades to purely acoustic arousal. Skips on audio shorter
//! than one analysis frame.

use crate::analysis::FeatureExtractor;
use crate::config::AnalysisSettings;
use crate::orchestrator::errors::StepResult;
use crate::orchestrator::step::PipelineStep;
use crate::orchestrator::types::{Context, SentimentOutput, StepOutcome, StepValue};

/// Words counted toward positive valence.
const POSITIVE_WORDS: &[&str] = &[
    "good", "great", "happy", "love", "excellent", "wonderful", "amazing", "best", "joy",
    "beautiful", "fantastic", "calm", "pleasant", "perfect", "win", "delight", "bright",
];

/// Words counted toward negative valence.
const NEGATIVE_WORDS: &[&str] = &[
    "bad", "terrible", "sad", "hate", "awful", "horrible", "worst", "angry", "fear", "ugly",
    "pain", "broken", "fail", "lost", "dark", "cry", "wrong",
];

/// Centroid (Hz) treated as maximally arousing.
const AROUSAL_CENTROID_CEILING_HZ: f64 = 4000.0;

/// Lexicon valence plus acoustic arousal estimation.
pub struct SentimentAnalyzer {
    extractor: FeatureExtractor,
}

impl SentimentAnalyzer {
    /// Create the step from analysis settings.
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            extractor: FeatureExtractor::new(settings.frame_size, settings.hop_size),
        }
    }

    /// Lexicon valence over a transcript: (score in [-1, 1], hit count).
    fn lexicon_valence(transcript: &str) -> (f64, usize) {
        let mut positive = 0usize;
        let mut negative = 0usize;

        for word in transcript
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let lower = word.to_lowercase();
            if POSITIVE_WORDS.contains(&lower.as_str()) {
                positive += 1;
            } else if NEGATIVE_WORDS.contains(&lower.as_str()) {
                negative += 1;
            }
        }

        let hits = positive + negative;
        if hits == 0 {
            return (0.0, 0);
        }
        let valence = (positive as f64 - negative as f64) / hits as f64;
        (valence, hits)
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(&AnalysisSettings::default())
    }
}

impl PipelineStep for SentimentAnalyzer {
    fn name(&self) -> &str {
        "sentiment_analyzer"
    }

    fn description(&self) -> &str {
        "Valence/arousal estimation from transcript and acoustics"
    }

    fn dependencies(&self) -> &[&str] {
        &["noise_reducer"]
    }

    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
        let (samples, sample_rate) = match ctx
            .get("noise_reducer")
            .ok()
            .and_then(|v| v.as_denoised())
        {
            Some(denoised) => (denoised.audio.samples.clone(), denoised.audio.sample_rate),
            None => (ctx.raw_audio().samples.clone(), ctx.sample_rate()),
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

        // Acoustic arousal: energy modulation plus spectral brightness.
        let mean_rms = frames.iter().map(|f| f.rms).sum::<f64>() / frames.len() as f64;
        let rms_var = frames
            .iter()
            .map(|f| (f.rms - mean_rms).powi(2))
            .sum::<f64>()
            / frames.len() as f64;
        let dynamics = if mean_rms > 0.0 {
            (rms_var.sqrt() / mean_rms).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mean_centroid =
            frames.iter().map(|f| f.centroid_hz).sum::<f64>() / frames.len() as f64;
        let brightness = (mean_centroid / AROUSAL_CENTROID_CEILING_HZ).clamp(0.0, 1.0);

        let arousal = (0.5 * dynamics + 0.5 * brightness).clamp(0.0, 1.0);

        // Valence from the transcript, when one is present.
        let transcript = ctx.metadata_str("transcript").map(str::to_owned);
        let (valence, hits, transcript_used) = match transcript {
            Some(text) => {
                let (valence, hits) = Self::lexicon_valence(&text);
                (valence, hits, true)
            }
            None => {
                ctx.logger
                    .info("No transcript in metadata, using acoustic arousal only");
                (0.0, 0, false)
            }
        };

        // Expressed valence is amplified by arousal; without a transcript
        // the score stays neutral and only arousal is reported.
        let score = (valence * (0.5 + 0.5 * arousal)).clamp(-1.0, 1.0);

        let frame_coverage = (frames.len() as f64 / 10.0).min(1.0);
        let lexicon_coverage = (hits as f64 / 5.0).min(1.0);
        let confidence = if transcript_used {
            (0.3 + 0.4 * lexicon_coverage + 0.3 * frame_coverage).clamp(0.0, 1.0)
        } else {
            (0.2 + 0.3 * frame_coverage).clamp(0.0, 1.0)
        };

        ctx.logger.info(&format!(
            "Sentiment: score {:+.2}, arousal {:.2}, confidence {:.2}{}",
            score,
            arousal,
            confidence,
            if transcript_used {
                " (transcript)"
            } else {
                " (acoustic only)"
            }
        ));

        ctx.record(
            self.name(),
            StepValue::Sentiment(SentimentOutput {
                valence,
                arousal,
                score,
                confidence,
                transcript_used,
            }),
        );

        Ok(StepOutcome::Success)
    }
}
