//! Pipeline runner that executes steps in sequence.
//!
//! The run policy is fail-soft: a failing (or panicking) step becomes a
//! fault in the run's error log and execution continues with the next
//! step. Only base input validation aborts an invocation.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{PipelineError, PipelineResult};
use super::step::PipelineStep;
use super::types::{Context, IndexEntry, ProgressCallback, StepFault, StepOutcome};
use crate::logging::RunLogger;

/// A skipped step with its reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipNote {
    /// Name of the skipped step.
    pub step: String,
    /// Why the step skipped itself.
    pub reason: String,
}

/// Result of a single pipeline invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Name of the pipeline that produced this report.
    pub pipeline: String,
    /// Terminal index entry, if the last step produced one.
    pub entry: Option<IndexEntry>,
    /// Faults recorded during the run, in order.
    pub errors: Vec<StepFault>,
    /// Steps that completed successfully.
    pub steps_completed: Vec<String>,
    /// Steps that skipped themselves.
    pub steps_skipped: Vec<SkipNote>,
    /// When the invocation finished (RFC 3339).
    pub finished_at: String,
}

impl RunReport {
    /// Whether every step completed (none failed or skipped).
    pub fn all_completed(&self) -> bool {
        self.errors.is_empty() && self.steps_skipped.is_empty()
    }
}

/// Pipeline that runs a named sequence of steps over one audio input.
///
/// Steps execute in registration order. Each step runs inside a failure
/// boundary: an `Err` return or a panic is recorded as a fault and the
/// remaining steps still run, reading whatever results exist.
pub struct Pipeline {
    /// Pipeline name (used in logs and duplicate-name errors).
    name: String,
    /// Steps to execute in order.
    steps: Vec<Box<dyn PipelineStep>>,
    /// Logger handed to each invocation's context.
    logger: Arc<RunLogger>,
    /// Optional progress callback.
    progress: Option<ProgressCallback>,
}

impl Pipeline {
    /// Create a new empty pipeline.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let logger = Arc::new(RunLogger::null(&name));
        Self {
            name,
            steps: Vec::new(),
            logger,
            progress: None,
        }
    }

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the logger used for invocations.
    pub fn with_logger(mut self, logger: Arc<RunLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set the progress callback.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Add a step to the pipeline.
    ///
    /// Fails when a step with the same name is already registered.
    pub fn add_step<S: PipelineStep + 'static>(&mut self, step: S) -> PipelineResult<&mut Self> {
        if self.steps.iter().any(|s| s.name() == step.name()) {
            return Err(PipelineError::duplicate_step_name(&self.name, step.name()));
        }
        self.steps.push(Box::new(step));
        Ok(self)
    }

    /// Add a step (builder pattern).
    pub fn with_step<S: PipelineStep + 'static>(mut self, step: S) -> PipelineResult<Self> {
        self.add_step(step)?;
        Ok(self)
    }

    /// Get the number of steps in the pipeline.
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Get step names in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Get step descriptions in order, paired with names.
    pub fn step_descriptions(&self) -> Vec<(&str, &str)> {
        self.steps
            .iter()
            .map(|s| (s.name(), s.description()))
            .collect()
    }

    /// Run every step over the given input.
    ///
    /// Fails fast only when the base input is invalid. Every other
    /// fault is recorded in the report's error log while execution
    /// continues, so the report always reflects a full pass over the
    /// step list.
    pub fn invoke(
        &self,
        raw_audio: Vec<f64>,
        sample_rate: u32,
        metadata: Option<Map<String, Value>>,
    ) -> PipelineResult<RunReport> {
        let mut ctx = Context::new(raw_audio, sample_rate, metadata, Arc::clone(&self.logger))?;

        let mut steps_completed = Vec::new();
        let mut steps_skipped = Vec::new();

        let total_steps = self.steps.len();

        for (i, step) in self.steps.iter().enumerate() {
            let step_name = step.name();
            ctx.logger.phase(step_name);

            let percent = if total_steps == 0 {
                100
            } else {
                ((i as f64 / total_steps as f64) * 100.0) as u32
            };
            self.report_progress(step_name, percent, &format!("Starting {}", step_name));

            for dep in step.dependencies() {
                if !ctx.has_result(dep) {
                    ctx.logger.debug(&format!(
                        "'{}' has no '{}' result to read; continuing degraded",
                        step_name, dep
                    ));
                }
            }

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| step.run(&mut ctx)));

            match outcome {
                Ok(Ok(StepOutcome::Success)) => {
                    ctx.logger.success(&format!("{} completed", step_name));
                    steps_completed.push(step_name.to_string());
                }
                Ok(Ok(StepOutcome::Skipped(reason))) => {
                    ctx.logger
                        .info(&format!("{} skipped: {}", step_name, reason));
                    steps_skipped.push(SkipNote {
                        step: step_name.to_string(),
                        reason,
                    });
                }
                Ok(Err(e)) => {
                    let message = e.to_string();
                    ctx.logger
                        .error(&format!("{} failed: {}", step_name, message));
                    ctx.record_error(step_name, message);
                }
                Err(payload) => {
                    let message = panic_message(payload);
                    ctx.logger
                        .error(&format!("{} panicked: {}", step_name, message));
                    ctx.record_error(step_name, format!("panic: {}", message));
                }
            }
        }

        self.report_progress("complete", 100, "Pipeline finished");

        let entry = self.terminal_entry(&ctx);
        let errors = ctx.take_faults();

        if errors.is_empty() {
            ctx.logger.success("Pipeline completed without faults");
        } else {
            ctx.logger
                .warn(&format!("Pipeline completed with {} fault(s)", errors.len()));
        }

        Ok(RunReport {
            pipeline: self.name.clone(),
            entry,
            errors,
            steps_completed,
            steps_skipped,
            finished_at: chrono::Local::now().to_rfc3339(),
        })
    }

    /// The index entry recorded by the last registered step, if any.
    fn terminal_entry(&self, ctx: &Context) -> Option<IndexEntry> {
        let last = self.steps.last()?;
        ctx.results()
            .get(last.name())
            .and_then(|value| value.as_index())
            .cloned()
    }

    /// Report progress to callback (if set).
    fn report_progress(&self, step_name: &str, percent: u32, message: &str) {
        if let Some(ref callback) = self.progress {
            callback(step_name, percent, message);
        }
    }
}

/// Extract a printable message from a panic payload.
fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
