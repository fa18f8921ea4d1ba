//! genconsole - step-wizard console for AI generation pipelines

pub mod backend;
pub mod cli;
pub mod core;
pub mod repo;
pub mod shell;
pub mod wizard;

// Re-export commonly used types
pub use backend::{
    BackendConfig, FragmentSource, GenerationBackend, GenerationError, GenerationRequest,
    GenerationResponse, HttpBackend,
};
pub use crate::core::settings::{ConsoleSettings, WizardOptions};
pub use crate::core::{
    catalog, ConcurrencyPolicy, ConfigError, FieldSet, Pipeline, DEFAULT_PLACEHOLDER,
};
pub use crate::core::{
    PipelineRun, Rejection, RequestTicket, StalenessPolicy, Step, StepInput, StepOutput,
    StepState, TriggerError,
};
pub use shell::{PageInit, Shell, ShellError};
pub use wizard::{RenderEvent, RunSnapshot, WizardController};
