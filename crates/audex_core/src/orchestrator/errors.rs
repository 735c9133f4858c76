//! Error types for the orchestrator pipeline.
//!
//! Two severities exist:
//! - `PipelineError`: hard failures that abort an invocation before any
//!   step runs (invalid base input) or reject pipeline assembly.
//! - `StepError`: in-step faults. The engine records these in the run's
//!   error log and continues with the remaining steps.

use std::io;

use thiserror::Error;

/// Hard pipeline error. Raised at assembly or context construction time.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Base input validation failed before any step ran.
    #[error("Invalid input '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// A step with the same name is already registered.
    #[error("Pipeline '{pipeline}' already has a step named '{step_name}'")]
    DuplicateStepName { pipeline: String, step_name: String },
}

impl PipelineError {
    /// Create an invalid input error.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a duplicate step name error.
    pub fn duplicate_step_name(pipeline: impl Into<String>, step_name: impl Into<String>) -> Self {
        Self::DuplicateStepName {
            pipeline: pipeline.into(),
            step_name: step_name.into(),
        }
    }
}

/// Error from a pipeline step. Recorded by the engine, never fatal to the run.
#[derive(Error, Debug)]
pub enum StepError {
    /// A result expected from an earlier step is not in the context.
    #[error("No result recorded for step '{step}'")]
    MissingResult { step: String },

    /// Input validation failed inside the step.
    #[error("Input validation failed: {0}")]
    InvalidInput(String),

    /// File I/O error.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },

    /// Parsing error (e.g., JSON metadata).
    #[error("Failed to parse {what}: {message}")]
    ParseError { what: String, message: String },

    /// A precondition was not met.
    #[error("Precondition not met: {0}")]
    PreconditionFailed(String),

    /// Generic step error with message.
    #[error("{0}")]
    Other(String),
}

impl StepError {
    /// Create a missing result error.
    pub fn missing_result(step: impl Into<String>) -> Self {
        Self::MissingResult { step: step.into() }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse_error(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create a precondition failed error.
    pub fn precondition_failed(message: impl Into<String>) -> Self {
        Self::PreconditionFailed(message.into())
    }

    /// Create a generic error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

/// Result type for step operations.
pub type StepResult<T> = Result<T, StepError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_error_names_field() {
        let err = PipelineError::invalid_input("raw_audio", "must not be empty");
        let msg = err.to_string();
        assert!(msg.contains("raw_audio"));
        assert!(msg.contains("must not be empty"));
    }

    #[test]
    fn duplicate_step_error_names_both() {
        let err = PipelineError::duplicate_step_name("audio_indexer", "ranker");
        let msg = err.to_string();
        assert!(msg.contains("audio_indexer"));
        assert!(msg.contains("ranker"));
    }

    #[test]
    fn missing_result_names_step() {
        let err = StepError::missing_result("noise_reducer");
        assert!(err.to_string().contains("noise_reducer"));
    }

    #[test]
    fn io_error_chains_source() {
        let inner = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err = StepError::io_error("read metadata", inner);
        let msg = err.to_string();
        assert!(msg.contains("read metadata"));
    }
}
