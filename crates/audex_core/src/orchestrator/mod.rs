//! Pipeline orchestrator for coordinating indexing runs.
//!
//! This module provides the infrastructure for running multi-step
//! audio processing pipelines. Each invocation carries one audio input
//! through a sequence of steps that read earlier results, record their
//! own, and log what they did.
//!
//! # Architecture
//!
//! ```text
//! Pipeline "audio_indexer"
//!     ├── Step: NoiseReducer
//!     ├── Step: AudioEnhancer
//!     ├── Step: SentimentAnalyzer
//!     ├── Step: Classifier
//!     └── Step: Ranker   (terminal, produces the index entry)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use audex_core::config::Settings;
//! use audex_core::orchestrator::create_standard_pipeline;
//!
//! let pipeline = create_standard_pipeline(&Settings::default())?;
//! let report = pipeline.invoke(samples, 16000, metadata)?;
//! println!("score: {:?}", report.entry.map(|e| e.score));
//! ```

mod errors;
mod pipeline;
mod step;
pub mod steps;
mod types;

pub use errors::{PipelineError, PipelineResult, StepError, StepResult};
pub use pipeline::{Pipeline, RunReport, SkipNote};
pub use step::PipelineStep;
pub use steps::{AudioEnhancer, Classifier, NoiseReducer, Ranker, SentimentAnalyzer};
pub use types::{
    ClassifyOutput, Context, DenoiseOutput, EnhanceOutput, IndexEntry, ProgressCallback,
    ScoreComponents, SentimentOutput, StepFault, StepOutcome, StepValue,
};

/// Create the standard indexing pipeline with all steps in order.
///
/// The standard pipeline executes these steps:
/// 1. NoiseReducer - high-pass rumble removal and RMS noise gating
/// 2. AudioEnhancer - speech-band emphasis and peak normalization
/// 3. SentimentAnalyzer - valence/arousal from transcript and acoustics
/// 4. Classifier - sound-event tagging from spectral features
/// 5. Ranker - weighted fusion into the terminal index entry
pub fn create_standard_pipeline(
    settings: &crate::config::Settings,
) -> PipelineResult<Pipeline> {
    Pipeline::new("audio_indexer")
        .with_step(NoiseReducer::new(&settings.analysis))?
        .with_step(AudioEnhancer::new(&settings.analysis))?
        .with_step(SentimentAnalyzer::new(&settings.analysis))?
        .with_step(Classifier::new(&settings.analysis))?
        .with_step(Ranker::new(&settings.ranking))
}

#[cfg(test)]
mod mod_tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn standard_pipeline_has_expected_step_order() {
        let pipeline = create_standard_pipeline(&Settings::default()).unwrap();

        assert_eq!(
            pipeline.step_names(),
            vec![
                "noise_reducer",
                "audio_enhancer",
                "sentiment_analyzer",
                "audio_classifier",
                "ranker",
            ]
        );
    }
}
