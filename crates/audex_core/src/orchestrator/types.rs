//! Core types for the orchestrator pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{PipelineError, PipelineResult, StepError, StepResult};
use crate::logging::RunLogger;
use crate::models::{AudioBuffer, Label};

/// Progress callback type for reporting pipeline progress.
///
/// Arguments: (step_name, percent_complete, message)
pub type ProgressCallback = Box<dyn Fn(&str, u32, &str) + Send + Sync>;

/// Outcome of a successfully returning step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The step ran and recorded its result.
    Success,
    /// The step decided not to run, with a reason.
    Skipped(String),
}

/// A recorded in-step fault.
///
/// Faults are data, not control flow: the engine appends one per failed
/// step and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepFault {
    /// Name of the step that failed.
    pub step: String,
    /// Human-readable failure reason.
    pub message: String,
    /// When the fault was recorded (RFC 3339).
    pub at: String,
}

/// Output of the noise reduction step.
#[derive(Debug, Clone, PartialEq)]
pub struct DenoiseOutput {
    /// Denoised audio.
    pub audio: AudioBuffer,
    /// Achieved broadband reduction in dB (>= 0).
    pub reduction_db: f64,
}

/// Output of the enhancement step.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceOutput {
    /// Enhanced audio.
    pub audio: AudioBuffer,
    /// Normalization gain applied in dB.
    pub gain_db: f64,
}

/// Output of the sentiment analysis step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentOutput {
    /// Valence estimate in [-1, 1] (negative to positive).
    pub valence: f64,
    /// Arousal estimate in [0, 1] (calm to excited).
    pub arousal: f64,
    /// Combined sentiment score in [-1, 1].
    pub score: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Whether a metadata transcript contributed to the estimate.
    pub transcript_used: bool,
}

/// Output of the classification step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifyOutput {
    /// Labels above the configured confidence floor, best first.
    pub labels: Vec<Label>,
}

impl ClassifyOutput {
    /// Confidence of the best label, or 0 when no label cleared the floor.
    pub fn top_confidence(&self) -> f64 {
        self.labels.first().map(|l| l.confidence).unwrap_or(0.0)
    }
}

/// Per-component breakdown of the fused retrieval score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Classification confidence component, if classification ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<f64>,
    /// Sentiment strength component, if sentiment ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// Denoise/enhance quality component, if either ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<f64>,
    /// Audio identity component, always present.
    pub identity: f64,
}

/// Terminal index entry produced by the ranking step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Fused retrieval score in [0, 1].
    pub score: f64,
    /// Per-component breakdown of the score.
    pub components: ScoreComponents,
    /// Labels carried over from classification (empty when absent).
    pub labels: Vec<Label>,
    /// Sentiment score carried over when available.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    /// Upstream signals that were missing during fusion.
    pub missing_signals: Vec<String>,
    /// Audio duration in seconds.
    pub duration_secs: f64,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// When the entry was produced (RFC 3339).
    pub indexed_at: String,
}

/// Tagged union of everything a step can record in the context.
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    /// Noise reduction output.
    Denoised(DenoiseOutput),
    /// Enhancement output.
    Enhanced(EnhanceOutput),
    /// Sentiment output.
    Sentiment(SentimentOutput),
    /// Classification output.
    Classification(ClassifyOutput),
    /// Terminal index entry.
    Index(IndexEntry),
}

impl StepValue {
    /// View as denoise output.
    pub fn as_denoised(&self) -> Option<&DenoiseOutput> {
        match self {
            StepValue::Denoised(out) => Some(out),
            _ => None,
        }
    }

    /// View as enhancement output.
    pub fn as_enhanced(&self) -> Option<&EnhanceOutput> {
        match self {
            StepValue::Enhanced(out) => Some(out),
            _ => None,
        }
    }

    /// View as sentiment output.
    pub fn as_sentiment(&self) -> Option<&SentimentOutput> {
        match self {
            StepValue::Sentiment(out) => Some(out),
            _ => None,
        }
    }

    /// View as classification output.
    pub fn as_classification(&self) -> Option<&ClassifyOutput> {
        match self {
            StepValue::Classification(out) => Some(out),
            _ => None,
        }
    }

    /// View as index entry.
    pub fn as_index(&self) -> Option<&IndexEntry> {
        match self {
            StepValue::Index(out) => Some(out),
            _ => None,
        }
    }
}

/// Processing context for a single pipeline invocation.
///
/// Holds the immutable base input (audio + optional metadata), the
/// results recorded by steps so far, and the ordered fault log. One
/// context belongs to exactly one invocation and is never shared
/// across runs.
pub struct Context {
    /// Immutable input audio.
    audio: AudioBuffer,
    /// Optional metadata object (e.g. transcript, title).
    metadata: Option<Map<String, Value>>,
    /// Results keyed by step name. Re-recording a key overwrites it.
    results: HashMap<String, StepValue>,
    /// Ordered fault log.
    faults: Vec<StepFault>,
    /// Per-run logger.
    pub logger: Arc<RunLogger>,
}

impl Context {
    /// Create a context, validating the base input.
    ///
    /// Fails with `PipelineError::InvalidInput` naming the offending
    /// field when the audio is empty or the sample rate is zero.
    pub fn new(
        raw_audio: Vec<f64>,
        sample_rate: u32,
        metadata: Option<Map<String, Value>>,
        logger: Arc<RunLogger>,
    ) -> PipelineResult<Self> {
        if raw_audio.is_empty() {
            return Err(PipelineError::invalid_input(
                "raw_audio",
                "audio must contain at least one sample",
            ));
        }
        if sample_rate == 0 {
            return Err(PipelineError::invalid_input(
                "sample_rate",
                "sample rate must be positive",
            ));
        }

        Ok(Self {
            audio: AudioBuffer::new(raw_audio, sample_rate),
            metadata,
            results: HashMap::new(),
            faults: Vec::new(),
            logger,
        })
    }

    /// The immutable input audio.
    pub fn raw_audio(&self) -> &AudioBuffer {
        &self.audio
    }

    /// Input sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate
    }

    /// The optional metadata object.
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    /// A metadata string field, if present and a string.
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|v| v.as_str())
    }

    /// Record a step result under the given name.
    ///
    /// Recording under an existing name replaces the previous value.
    pub fn record(&mut self, step_name: impl Into<String>, value: StepValue) {
        self.results.insert(step_name.into(), value);
    }

    /// Get the result recorded by a step.
    ///
    /// Signals the absence with `StepError::MissingResult` so callers
    /// can choose between degrading and failing.
    pub fn get(&self, step_name: &str) -> StepResult<&StepValue> {
        self.results
            .get(step_name)
            .ok_or_else(|| StepError::missing_result(step_name))
    }

    /// Whether a step has recorded a result.
    pub fn has_result(&self, step_name: &str) -> bool {
        self.results.contains_key(step_name)
    }

    /// All recorded results.
    pub fn results(&self) -> &HashMap<String, StepValue> {
        &self.results
    }

    /// Append a fault to the error log.
    pub fn record_error(&mut self, step_name: impl Into<String>, message: impl Into<String>) {
        self.faults.push(StepFault {
            step: step_name.into(),
            message: message.into(),
            at: chrono::Local::now().to_rfc3339(),
        });
    }

    /// The ordered fault log.
    pub fn faults(&self) -> &[StepFault] {
        &self.faults
    }

    /// Take ownership of the fault log, leaving it empty.
    pub(crate) fn take_faults(&mut self) -> Vec<StepFault> {
        std::mem::take(&mut self.faults)
    }
}
