//! Test utility functions for genconsole

#![allow(dead_code)]

use async_trait::async_trait;
use genconsole::backend::{GenerationBackend, GenerationError, GenerationRequest, GenerationResponse};
use genconsole::wizard::{RenderEvent, WizardController};
use genconsole::{catalog, Pipeline, StepState};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// One scripted backend reply
#[derive(Debug, Clone)]
pub enum Reply {
    Content { content: String, prompt: String },
    Error(String),
    Status(u16),
}

/// Mock backend that returns scripted replies per step
///
/// Steps without a scripted reply answer `"<step> output"`. Every request is
/// recorded, and a step can be gated so its reply waits for a notification.
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, step_id: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(step_id.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    /// Queue a successful reply for a step
    pub fn reply(self, step_id: &str, content: &str, prompt: &str) -> Self {
        self.push(
            step_id,
            Reply::Content {
                content: content.to_string(),
                prompt: prompt.to_string(),
            },
        )
    }

    /// Queue an `{error}` reply for a step
    pub fn fail(self, step_id: &str, message: &str) -> Self {
        self.push(step_id, Reply::Error(message.to_string()))
    }

    /// Queue a bare non-success status for a step
    pub fn status(self, step_id: &str, status: u16) -> Self {
        self.push(step_id, Reply::Status(status))
    }

    /// Hold every request for `step_id` until the returned gate is notified
    pub fn gate(&self, step_id: &str) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(step_id.to_string(), notify.clone());
        notify
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent for one step, in order
    pub fn requests_for(&self, step_id: &str) -> Vec<GenerationRequest> {
        let suffix = format!("/generate/{}", step_id);
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(&suffix))
            .collect()
    }
}

fn step_of(path: &str) -> String {
    path.rsplit('/').next().unwrap_or_default().to_string()
}

#[async_trait]
impl GenerationBackend for MockBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        self.requests.lock().unwrap().push(request.clone());
        let step_id = step_of(&request.path);

        let gate = self.gates.lock().unwrap().get(&step_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&step_id)
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Content { content, prompt }) => Ok(GenerationResponse::new(content, prompt)),
            Some(Reply::Error(message)) => Err(GenerationError::Backend(message)),
            Some(Reply::Status(status)) => Err(GenerationError::Status {
                status,
                message: "Internal Server Error".to_string(),
            }),
            None => Ok(GenerationResponse::new(format!("{} output", step_id), format!("{} prompt", step_id))),
        }
    }
}

/// Render events collected by a handler
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<RenderEvent>>>,
}

impl EventLog {
    pub fn events(&self) -> Vec<RenderEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Notify { step_id, message } => Some((step_id, message)),
                _ => None,
            })
            .collect()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                RenderEvent::Rendered { step_id, .. } => Some(step_id),
                _ => None,
            })
            .collect()
    }
}

pub fn story_pipeline() -> Pipeline {
    catalog::pipeline("story_to_code").unwrap()
}

/// Controller over `pipeline` with an event log attached
pub fn controller_with_log(
    pipeline: Pipeline,
    backend: Arc<MockBackend>,
) -> (Arc<WizardController<MockBackend>>, EventLog) {
    let log = EventLog::default();
    let sink = log.events.clone();
    let controller = WizardController::configure_shared(pipeline, backend)
        .unwrap()
        .with_render_handler(move |event| sink.lock().unwrap().push(event));
    (Arc::new(controller), log)
}

/// Run the given steps in order, panicking on the first failure
pub async fn run_steps(controller: &WizardController<MockBackend>, steps: &[&str]) {
    for step in steps {
        controller
            .trigger(step)
            .await
            .unwrap_or_else(|e| panic!("step {} failed: {}", step, e));
    }
}

/// Wait until a step reaches `state`
pub async fn wait_for_state(controller: &WizardController<MockBackend>, step_id: &str, state: StepState) {
    for _ in 0..200 {
        if controller.state(step_id).await == Some(state) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("step {} never reached {}", step_id, state);
}

pub async fn assert_states(controller: &WizardController<MockBackend>, expected: &[StepState]) {
    assert_eq!(controller.snapshot().await.states(), expected);
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}
