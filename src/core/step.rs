//! Step domain model

use crate::core::config::{InputConfig, StepConfig};

/// Upstream output consumed by a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInput {
    /// Step whose stored output is sent
    pub step_id: String,

    /// Request body field the output is sent under
    pub field: String,
}

impl StepInput {
    /// Input sent under the conventional `<step>_content` field
    pub fn from_step(step_id: impl Into<String>) -> Self {
        let step_id = step_id.into();
        let field = default_input_field(&step_id);
        Self { step_id, field }
    }

    pub fn with_field(step_id: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            field: field.into(),
        }
    }
}

/// Field name used for an upstream output when none is configured
pub fn default_input_field(step_id: &str) -> String {
    format!("{}_content", step_id)
}

/// A single step in a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Unique step identifier
    pub id: String,

    /// Human-readable label shown on the step's control
    pub label: String,

    /// Explicit endpoint path; `None` means `/<route>/generate/<id>`
    pub endpoint: Option<String>,

    /// Upstream outputs sent with the request
    pub inputs: Vec<StepInput>,
}

impl Step {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            label: default_label(&id),
            id,
            endpoint: None,
            inputs: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_input(mut self, input: StepInput) -> Self {
        self.inputs.push(input);
        self
    }

    /// Create a step from a step config
    pub fn from_config(config: &StepConfig) -> Self {
        let inputs = config
            .depends_on
            .iter()
            .map(|input| match input {
                InputConfig::Step(step_id) => StepInput::from_step(step_id.clone()),
                InputConfig::Field { step, field } => {
                    let field = field.clone().unwrap_or_else(|| default_input_field(step));
                    StepInput::with_field(step.clone(), field)
                }
            })
            .collect();

        Step {
            id: config.id.clone(),
            label: config.label.clone().unwrap_or_else(|| default_label(&config.id)),
            endpoint: config.endpoint.clone(),
            inputs,
        }
    }

    /// Endpoint path this step posts to
    pub fn endpoint_path(&self, route: &str) -> String {
        match &self.endpoint {
            Some(path) => path.clone(),
            None => format!("/{}/generate/{}", route.trim_matches('/'), self.id),
        }
    }

    /// Whether this step consumes the output of `step_id`
    pub fn consumes(&self, step_id: &str) -> bool {
        self.inputs.iter().any(|i| i.step_id == step_id)
    }
}

/// "test_plan" -> "Test plan"
fn default_label(id: &str) -> String {
    let spaced = id.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
