//! Wizard controller - owns one pipeline run and drives it from user triggers

use crate::{
    backend::{GenerationBackend, GenerationRequest},
    core::{
        build_request_body, settings::WizardOptions, ConfigError, FieldSet, Pipeline, PipelineRun,
        StepOutput, StepState, TriggerError,
    },
    wizard::events::{RenderEvent, RenderHandler, RunSnapshot},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Mutable state guarded by one lock
struct WizardState {
    run: PipelineRun,
    fields: FieldSet,
}

/// Controller for one pipeline instance
///
/// The state lock is never held while a generation request is in flight, so
/// other steps (under `PerStep`) and `reset` stay responsive. A result that
/// comes back after a reset, or after an upstream regeneration invalidated
/// its step, is discarded.
pub struct WizardController<B> {
    pipeline: Arc<Pipeline>,
    backend: Arc<B>,
    state: Mutex<WizardState>,
    options: WizardOptions,
    handlers: Vec<RenderHandler>,
}

impl<B: GenerationBackend + 'static> WizardController<B> {
    /// Validate the pipeline and start a fresh run
    pub fn configure(pipeline: Pipeline, backend: B) -> Result<Self, ConfigError> {
        Self::configure_shared(pipeline, Arc::new(backend))
    }

    /// Like `configure`, sharing a backend with other controllers
    pub fn configure_shared(pipeline: Pipeline, backend: Arc<B>) -> Result<Self, ConfigError> {
        pipeline.validate()?;

        let mut fields = FieldSet::new();
        fields.extend(pipeline.fields.iter().map(|(k, v)| (k.clone(), v.clone())));

        info!("Configured pipeline {} ({} steps)", pipeline.name, pipeline.len());

        Ok(Self {
            state: Mutex::new(WizardState {
                run: PipelineRun::new(pipeline.len()),
                fields,
            }),
            pipeline: Arc::new(pipeline),
            backend,
            options: WizardOptions::default(),
            handlers: Vec::new(),
        })
    }

    pub fn with_options(mut self, options: WizardOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a render handler
    pub fn with_render_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(RenderEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
        self
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn options(&self) -> WizardOptions {
        self.options
    }

    fn emit(&self, event: RenderEvent) {
        for handler in &self.handlers {
            handler(event.clone());
        }
    }

    fn emit_states(&self, changed: &[(String, StepState)]) {
        for (step_id, state) in changed {
            self.emit(RenderEvent::StateChanged {
                step_id: step_id.clone(),
                state: *state,
            });
        }
    }

    fn changed_states(&self, run: &PipelineRun, positions: &[usize]) -> Vec<(String, StepState)> {
        positions
            .iter()
            .filter_map(|&i| Some((self.pipeline.steps.get(i)?.id.clone(), run.state(i)?)))
            .collect()
    }

    /// Set a static field sent with every later request
    pub async fn set_field(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        debug!("Setting field {}", key);
        self.state.lock().await.fields.set(key, value);
    }

    /// Fill a static field only if it is unset
    pub async fn set_default_field(&self, key: impl Into<String>, value: impl Into<String>) {
        self.state.lock().await.fields.set_default(key, value);
    }

    /// Edit the static fields in place
    pub async fn update_fields<F: FnOnce(&mut FieldSet)>(&self, update: F) {
        update(&mut self.state.lock().await.fields);
    }

    pub async fn field(&self, key: &str) -> Option<String> {
        self.state.lock().await.fields.get(key).map(str::to_string)
    }

    pub async fn fields(&self) -> FieldSet {
        self.state.lock().await.fields.clone()
    }

    /// Trigger (or regenerate) a step
    ///
    /// Rejected triggers leave the run untouched. Generation failures leave
    /// the step `failed`, keep its previous output and emit a `Notify` event.
    pub async fn trigger(&self, step_id: &str) -> Result<StepOutput, TriggerError> {
        let index = self
            .pipeline
            .position(step_id)
            .ok_or_else(|| TriggerError::UnknownStep(step_id.to_string()))?;
        let step = self
            .pipeline
            .steps
            .get(index)
            .ok_or_else(|| TriggerError::UnknownStep(step_id.to_string()))?;

        let (ticket, attempt, request) = {
            let mut state = self.state.lock().await;
            let ticket = match state.run.begin(index, self.options.concurrency) {
                Ok(ticket) => ticket,
                Err(reason) => {
                    warn!("Rejected trigger of {}: {}", step_id, reason);
                    return Err(TriggerError::Rejected {
                        step: step_id.to_string(),
                        reason,
                    });
                }
            };
            let body = build_request_body(&self.pipeline, &state.run, &state.fields, index);
            let request = GenerationRequest::new(step.endpoint_path(&self.pipeline.route), body);
            let attempt = state.run.record(index).map(|r| r.attempts).unwrap_or_default();
            (ticket, attempt, request)
        };

        info!("Triggering step {} (attempt {})", step_id, attempt);
        debug!("POST {} with {} fields", request.path, request.body.len());
        self.emit(RenderEvent::StateChanged {
            step_id: step_id.to_string(),
            state: StepState::Loading,
        });

        let result = self.backend.generate(&request).await;

        let mut state = self.state.lock().await;
        if !state.run.is_current(&ticket) {
            warn!("Discarding result of {}: run was reset or step invalidated", step_id);
            return Err(TriggerError::Superseded(step_id.to_string()));
        }

        match result {
            Ok(response) => {
                let output = StepOutput::new(response.content, response.prompt);
                let positions =
                    state
                        .run
                        .complete(&self.pipeline, &ticket, output.clone(), self.options.staleness);
                let changed = self.changed_states(&state.run, &positions);
                drop(state);

                info!("Step {} completed ({} chars)", step_id, output.content.len());
                self.emit(RenderEvent::Rendered {
                    step_id: step_id.to_string(),
                    label: step.label.clone(),
                    content: output.content.clone(),
                    prompt: output.prompt.clone(),
                });
                self.emit_states(&changed);
                Ok(output)
            }
            Err(source) => {
                let message = source.to_string();
                let positions = state.run.fail(&ticket, message.clone());
                let changed = self.changed_states(&state.run, &positions);
                drop(state);

                warn!("Step {} failed: {}", step_id, message);
                self.emit_states(&changed);
                self.emit(RenderEvent::Notify {
                    step_id: step_id.to_string(),
                    message,
                });
                Err(TriggerError::Generation {
                    step: step_id.to_string(),
                    source,
                })
            }
        }
    }

    /// Clear every output and make step 0 ready again
    pub async fn reset(&self) {
        self.state.lock().await.run.reset();
        info!("Reset pipeline {}", self.pipeline.name);
        self.emit(RenderEvent::Cleared {
            pipeline: self.pipeline.name.clone(),
            placeholder: self.pipeline.placeholder.clone(),
        });
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        let state = self.state.lock().await;
        RunSnapshot::capture(&self.pipeline, &state.run)
    }

    pub async fn state(&self, step_id: &str) -> Option<StepState> {
        let index = self.pipeline.position(step_id)?;
        self.state.lock().await.run.state(index)
    }

    pub async fn output(&self, step_id: &str) -> Option<StepOutput> {
        let index = self.pipeline.position(step_id)?;
        let state = self.state.lock().await;
        state.run.record(index).and_then(|r| r.output.clone())
    }
}
