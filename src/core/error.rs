//! Error types for pipeline definitions and step triggering

use crate::backend::GenerationError;
use thiserror::Error;

/// Malformed pipeline definition or unreadable configuration
///
/// Always fatal: a pipeline that fails validation never gets a controller.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Pipeline '{0}' has no steps")]
    Empty(String),

    #[error("Duplicate step ID: {0}")]
    DuplicateStep(String),

    #[error("Step '{step}' depends on non-existent step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("Step '{step}' depends on '{dependency}', which does not come before it")]
    ForwardDependency { step: String, dependency: String },

    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid setting {key}: {message}")]
    Setting { key: String, message: String },
}

/// Why a trigger was refused before any request was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("step is still waiting for the previous step")]
    NotReady,

    #[error("step is already loading")]
    AlreadyLoading,

    #[error("step {0} of this run is loading")]
    Busy(usize),

    #[error("no step at position {0}")]
    OutOfRange(usize),
}

/// Error returned by `WizardController::trigger`
#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Unknown step: {0}")]
    UnknownStep(String),

    #[error("Step '{step}' rejected: {reason}")]
    Rejected { step: String, reason: Rejection },

    #[error("Step '{0}' result discarded: the run was reset or the step invalidated while it was loading")]
    Superseded(String),

    #[error("Step '{step}' failed: {source}")]
    Generation {
        step: String,
        #[source]
        source: GenerationError,
    },
}

impl TriggerError {
    /// Whether the request reached the backend and failed there
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, TriggerError::Generation { .. })
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            TriggerError::Rejected { reason, .. } => Some(*reason),
            _ => None,
        }
    }
}
