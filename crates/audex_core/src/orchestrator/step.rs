//! Pipeline step trait definition.
//!
//! All processing steps implement this trait, giving the pipeline a
//! single uniform way to run them.

use super::errors::StepResult;
use super::types::{Context, StepOutcome};

/// Trait for pipeline steps.
///
/// A step reads whatever it needs from the context (the raw audio, the
/// optional metadata, results recorded by earlier steps) and records its
/// own output under its name. Three outcomes are possible:
///
/// - `Ok(StepOutcome::Success)` - the step ran and recorded a result
/// - `Ok(StepOutcome::Skipped(reason))` - the step decided not to run
/// - `Err(StepError)` - the step failed; the engine logs the fault and
///   continues with the remaining steps
///
/// Steps must be stateless between invocations: all per-run data lives
/// in the context, so one step instance can serve concurrent runs.
///
/// # Example
///
/// ```ignore
/// struct NoiseReducer { highpass_hz: f64 }
///
/// impl PipelineStep for NoiseReducer {
///     fn name(&self) -> &str { "noise_reducer" }
///
///     fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome> {
///         let cleaned = reduce(ctx.raw_audio(), self.highpass_hz);
///         ctx.record(self.name(), StepValue::Denoised(cleaned));
///         Ok(StepOutcome::Success)
///     }
/// }
/// ```
pub trait PipelineStep: Send + Sync {
    /// Get the step name (used as the result key and in error context).
    fn name(&self) -> &str;

    /// Names of steps whose results this step prefers to read.
    ///
    /// Declarative only: the engine logs when a listed result is absent
    /// but never reorders steps or blocks execution because of it. A
    /// step must still degrade gracefully when a listed result is
    /// missing at run time.
    fn dependencies(&self) -> &[&str] {
        &[]
    }

    /// Execute the step's work against the context.
    ///
    /// Record results with `ctx.record(...)` before returning
    /// `StepOutcome::Success`. Return `StepOutcome::Skipped` when the
    /// step determines it should not run (not an error).
    fn run(&self, ctx: &mut Context) -> StepResult<StepOutcome>;

    /// Human-readable description of what this step does.
    fn description(&self) -> &str {
        self.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RunLogger;
    use std::sync::Arc;

    struct MockStep {
        name: &'static str,
        should_skip: bool,
    }

    impl PipelineStep for MockStep {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self, _ctx: &mut Context) -> StepResult<StepOutcome> {
            if self.should_skip {
                Ok(StepOutcome::Skipped("Test skip".to_string()))
            } else {
                Ok(StepOutcome::Success)
            }
        }
    }

    #[test]
    fn step_trait_object_works() {
        let step: Box<dyn PipelineStep> = Box::new(MockStep {
            name: "test_step",
            should_skip: false,
        });

        assert_eq!(step.name(), "test_step");
        assert_eq!(step.description(), "test_step");
        assert!(step.dependencies().is_empty());
    }

    #[test]
    fn skip_outcome_carries_reason() {
        let step = MockStep {
            name: "skipper",
            should_skip: true,
        };
        let logger = Arc::new(RunLogger::null("test"));
        let mut ctx = Context::new(vec![0.1; 10], 8000, None, logger).unwrap();

        match step.run(&mut ctx) {
            Ok(StepOutcome::Skipped(reason)) => assert_eq!(reason, "Test skip"),
            other => panic!("expected skip, got {:?}", other),
        }
    }
}
