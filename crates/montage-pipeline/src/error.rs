//! Pipeline error types.
//!
//! Every failure falls into one of four classes:
//! - validation: the trigger payload is unusable, surfaced as-is
//! - transient service: recovered inside the stage with a default or a skip
//! - composition: recovered by the concat fallback
//! - fatal stage: nothing to recover, the stage fails

use std::fmt;

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Trigger payload problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed video key {key:?}: {reason}")]
    MalformedKey { key: String, reason: &'static str },

    #[error("Payload must be a JSON object")]
    NotAnObject,

    #[error("Malformed {stage} input: {message}")]
    MalformedEnvelope { stage: &'static str, message: String },
}

/// Failure class of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    TransientService,
    Composition,
    FatalStage,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::Validation => "validation",
            ErrorKind::TransientService => "transient_service",
            ErrorKind::Composition => "composition",
            ErrorKind::FatalStage => "fatal_stage",
        })
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Service call failed during {step}: {source}")]
    TransientService {
        step: &'static str,
        #[source]
        source: montage_services::ServiceError,
    },

    #[error("Composition failed: {0}")]
    Composition(String),

    #[error("{context}: {message}")]
    FatalStage { context: String, message: String },
}

impl PipelineError {
    pub fn transient(step: &'static str, source: montage_services::ServiceError) -> Self {
        Self::TransientService { step, source }
    }

    pub fn composition(msg: impl fmt::Display) -> Self {
        Self::Composition(msg.to_string())
    }

    /// Fatal error with what the stage was doing when `err` happened.
    pub fn fatal(context: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::FatalStage {
            context: context.into(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Validation(_) => ErrorKind::Validation,
            PipelineError::TransientService { .. } => ErrorKind::TransientService,
            PipelineError::Composition(_) => ErrorKind::Composition,
            PipelineError::FatalStage { .. } => ErrorKind::FatalStage,
        }
    }

    /// Whether running the stage again with the same input could succeed.
    ///
    /// A rejected payload stays rejected; everything else depends on
    /// collaborators that may recover.
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Validation
    }
}
