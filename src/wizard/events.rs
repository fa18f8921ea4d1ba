//! Render events and run snapshots

use crate::core::{Pipeline, PipelineRun, StepOutput, StepState};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Something the view layer should redraw
#[derive(Debug, Clone, PartialEq)]
pub enum RenderEvent {
    /// A step's affordance state changed
    StateChanged { step_id: String, state: StepState },

    /// A step produced content
    Rendered {
        step_id: String,
        label: String,
        content: String,
        prompt: String,
    },

    /// Blocking notification for a failed step
    Notify { step_id: String, message: String },

    /// The run was reset; results show the placeholder
    Cleared { pipeline: String, placeholder: String },
}

/// Type for render handlers
pub type RenderHandler = Arc<dyn Fn(RenderEvent) + Send + Sync>;

/// One step as seen from outside the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSnapshot {
    pub id: String,
    pub label: String,
    pub state: StepState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<StepOutput>,
    pub attempts: usize,
    pub stale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Point-in-time copy of a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub pipeline: String,
    pub run_id: Uuid,
    pub steps: Vec<StepSnapshot>,
}

impl RunSnapshot {
    pub fn capture(pipeline: &Pipeline, run: &PipelineRun) -> Self {
        let steps = pipeline
            .steps
            .iter()
            .zip(run.records())
            .map(|(step, record)| StepSnapshot {
                id: step.id.clone(),
                label: step.label.clone(),
                state: record.state,
                output: record.output.clone(),
                attempts: record.attempts,
                stale: record.stale,
                last_error: record.last_error.clone(),
            })
            .collect();

        Self {
            pipeline: pipeline.name.clone(),
            run_id: run.run_id(),
            steps,
        }
    }

    pub fn step(&self, id: &str) -> Option<&StepSnapshot> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn states(&self) -> Vec<StepState> {
        self.steps.iter().map(|s| s.state).collect()
    }

    /// Number of steps with output
    pub fn completed(&self) -> usize {
        self.steps.iter().filter(|s| s.output.is_some()).count()
    }
}
