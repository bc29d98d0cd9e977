use std::path::PathBuf;
use thiserror::Error;

/// Boxed error type returned by collaborator trait implementations, so each
/// implementation is free to carry its own concrete error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the prediction workflow.
///
/// The first three variants are configuration errors: detected before any
/// external call and fatal to the whole batch. `Stage` and `Storage` are
/// fatal to the current job only. Artifact hand-off failures are deliberately
/// not represented here; they are collected per artifact in the job outcome
/// and never abort a job.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Model configuration set is empty; at least one model is required")]
    EmptyModelSet,

    #[error("Duplicate sequence id '{sequence_id}': input files must have unique basenames")]
    DuplicateSequenceId { sequence_id: String },

    #[error("Input sequence file is not readable: '{path}'", path = path.display())]
    UnreadableInput { path: PathBuf },

    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: BoxError,
    },

    #[error("Storage operation failed at '{path}': {source}", path = path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Model '{model}' produced an invalid prediction: {message}")]
    InvalidPrediction { model: String, message: String },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

impl EngineError {
    pub(crate) fn stage(stage: impl Into<String>, source: BoxError) -> Self {
        EngineError::Stage {
            stage: stage.into(),
            source,
        }
    }

    /// Whether this error should abort the whole batch rather than just the
    /// current job.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            EngineError::EmptyModelSet
                | EngineError::DuplicateSequenceId { .. }
                | EngineError::UnreadableInput { .. }
        )
    }
}
