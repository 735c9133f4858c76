//! End-to-end pipeline scenarios over synthetic audio.

use std::f64::consts::PI;

use serde_json::{Map, Value};

use audex_core::config::Settings;
use audex_core::orchestrator::{
    create_standard_pipeline, Context, NoiseReducer, Pipeline, PipelineError, PipelineStep,
    Ranker, StepError, StepOutcome, StepResult,
};

fn sine(freq: f64, sample_rate: u32, n: usize, amp: f64) -> Vec<f64> {
    (0..n)
        .map(|i| amp * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin())
        .collect()
}

/// Stand-in for the classifier that always fails.
struct BrokenClassifier;

impl PipelineStep for BrokenClassifier {
    fn name(&self) -> &str {
        "audio_classifier"
    }

    fn run(&self, _ctx: &mut Context) -> StepResult<StepOutcome> {
        Err(StepError::other("model backend unavailable"))
    }
}

#[test]
fn standard_pipeline_produces_entry_without_metadata() {
    let pipeline = create_standard_pipeline(&Settings::default()).unwrap();
    let samples = sine(440.0, 16000, 16384, 0.4);

    let report = pipeline.invoke(samples, 16000, None).unwrap();

    assert!(report.errors.is_empty(), "faults: {:?}", report.errors);
    let entry = report.entry.expect("terminal entry");
    assert!(entry.score > 0.0 && entry.score <= 1.0);
    assert!(!entry.labels.is_empty());
    assert_eq!(entry.sample_rate, 16000);
}

#[test]
fn transcript_metadata_reaches_the_entry() {
    let pipeline = create_standard_pipeline(&Settings::default()).unwrap();
    let samples = sine(440.0, 16000, 16384, 0.4);

    let mut metadata = Map::new();
    metadata.insert(
        "transcript".into(),
        Value::String("what a wonderful happy day".into()),
    );

    let report = pipeline.invoke(samples, 16000, Some(metadata)).unwrap();

    let entry = report.entry.expect("terminal entry");
    let sentiment = entry.sentiment.expect("sentiment score");
    assert!(sentiment > 0.0);
    assert!(!entry.missing_signals.contains(&"sentiment".to_string()));
}

#[test]
fn failed_classifier_degrades_the_ranker() {
    // 1000 samples at 16 kHz, no metadata. The classifier fails, the
    // ranker still produces the terminal entry with a fallback score.
    let pipeline = Pipeline::new("scenario")
        .with_step(NoiseReducer::default())
        .unwrap()
        .with_step(BrokenClassifier)
        .unwrap()
        .with_step(Ranker::default())
        .unwrap();

    let report = pipeline.invoke(vec![0.1; 1000], 16000, None).unwrap();

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].step, "audio_classifier");

    let entry = report.entry.expect("entry despite classifier failure");
    assert!(entry
        .missing_signals
        .contains(&"classification".to_string()));
    assert!(entry.components.classification.is_none());
    // Quality survives via the noise reducer's output.
    assert!(entry.components.quality.is_some());
    assert!(report.steps_completed.contains(&"ranker".to_string()));
}

#[test]
fn lone_ranker_uses_minimal_fallback() {
    let pipeline = Pipeline::new("scenario")
        .with_step(Ranker::default())
        .unwrap();

    let report = pipeline.invoke(vec![0.1; 1000], 16000, None).unwrap();

    assert!(report.errors.is_empty());
    let entry = report.entry.expect("entry from lone ranker");
    assert_eq!(
        entry.missing_signals,
        vec!["classification", "sentiment", "quality"]
    );
    assert!((entry.score - entry.components.identity).abs() < 1e-12);
}

#[test]
fn invalid_input_surfaces_before_any_step() {
    let pipeline = create_standard_pipeline(&Settings::default()).unwrap();

    match pipeline.invoke(Vec::new(), 16000, None) {
        Err(PipelineError::InvalidInput { field, .. }) => assert_eq!(field, "raw_audio"),
        other => panic!("expected invalid input, got {:?}", other.map(|r| r.pipeline)),
    }

    match pipeline.invoke(vec![0.1; 100], 0, None) {
        Err(PipelineError::InvalidInput { field, .. }) => assert_eq!(field, "sample_rate"),
        other => panic!("expected invalid input, got {:?}", other.map(|r| r.pipeline)),
    }
}

#[test]
fn short_audio_skips_analysis_but_still_ranks() {
    // Shorter than one analysis frame: sentiment and classification
    // skip themselves, the ranker still emits an entry.
    let pipeline = create_standard_pipeline(&Settings::default()).unwrap();

    let report = pipeline.invoke(vec![0.2; 1000], 16000, None).unwrap();

    assert!(report.errors.is_empty());
    let skipped: Vec<&str> = report.steps_skipped.iter().map(|s| s.step.as_str()).collect();
    assert!(skipped.contains(&"sentiment_analyzer"));
    assert!(skipped.contains(&"audio_classifier"));

    let entry = report.entry.expect("entry from degraded run");
    assert!(entry.missing_signals.contains(&"classification".to_string()));
    assert!(entry.missing_signals.contains(&"sentiment".to_string()));
    assert!(entry.components.quality.is_some());
}
