//! Run state: per-step affordance state, stored outputs and the transitions between them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::error::Rejection;
use crate::core::Pipeline;

/// Affordance state of a single step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepState {
    /// Previous step has not completed yet
    Waiting,
    /// Step can be triggered
    Ready,
    /// A generation request is in flight
    Loading,
    /// Step produced output (can be regenerated)
    Completed,
    /// Last request failed (can be retried)
    Failed,
}

impl StepState {
    /// Whether a user may trigger the step from this state
    pub fn is_triggerable(&self) -> bool {
        matches!(self, StepState::Ready | StepState::Completed | StepState::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Waiting => "waiting",
            StepState::Ready => "ready",
            StepState::Loading => "loading",
            StepState::Completed => "completed",
            StepState::Failed => "failed",
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many steps of one run may be loading at once
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcurrencyPolicy {
    /// At most one step of the run is loading
    #[default]
    Exclusive,
    /// Only the invoking step is locked while its request is in flight
    PerStep,
}

/// What happens to later steps when an upstream step is regenerated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalenessPolicy {
    /// Later steps keep their status and output; consumers are flagged stale
    #[default]
    Keep,
    /// Every later step loses its output and goes back to waiting
    Invalidate,
}

/// Output produced by a successful generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutput {
    pub content: String,
    pub prompt: String,
    pub generated_at: DateTime<Utc>,
}

impl StepOutput {
    pub fn new(content: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt: prompt.into(),
            generated_at: Utc::now(),
        }
    }
}

/// Everything the run remembers about one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub state: StepState,

    /// Last successful output, kept across failed regenerations
    pub output: Option<StepOutput>,

    /// Number of requests issued since the last reset
    pub attempts: usize,

    /// Error message of the last failed request
    pub last_error: Option<String>,

    /// An upstream step changed after this output's request was built
    pub stale: bool,

    /// Bumped whenever `output` changes
    #[serde(default)]
    pub version: u64,

    /// Bumped when the step is invalidated; in-flight results from an older
    /// epoch are discarded
    #[serde(default)]
    pub epoch: u64,
}

impl StepRecord {
    fn new(state: StepState) -> Self {
        Self {
            state,
            output: None,
            attempts: 0,
            last_error: None,
            stale: false,
            version: 0,
            epoch: 0,
        }
    }

    /// Clear the record back to `state`, moving its counters forward
    fn invalidate(&mut self, state: StepState) {
        let version = self.version + u64::from(self.output.is_some());
        let epoch = self.epoch + 1;
        *self = StepRecord {
            version,
            epoch,
            ..StepRecord::new(state)
        };
    }
}

/// Issued by `begin` for one request and handed back with its result
///
/// Records the run, the step's epoch and every step's output version at the
/// time the request body was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    run_id: Uuid,
    index: usize,
    epoch: u64,
    versions: Vec<u64>,
}

impl RequestTicket {
    /// Position of the step the request belongs to
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Live state of one pipeline instance
///
/// Records are indexed by step position. All transition methods are
/// deterministic given the current run and their arguments; they return the
/// positions whose state changed so callers can render them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    run_id: Uuid,
    records: Vec<StepRecord>,
}

impl PipelineRun {
    /// Fresh run: step 0 ready, everything else waiting
    pub fn new(step_count: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            records: Self::initial_records(step_count),
        }
    }

    fn initial_records(step_count: usize) -> Vec<StepRecord> {
        (0..step_count)
            .map(|i| StepRecord::new(if i == 0 { StepState::Ready } else { StepState::Waiting }))
            .collect()
    }

    /// Identifier of the current run; changes on every reset
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<&StepRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn state(&self, index: usize) -> Option<StepState> {
        self.records.get(index).map(|r| r.state)
    }

    /// Stored content of a step, if it has ever completed
    pub fn content(&self, index: usize) -> Option<&str> {
        self.records
            .get(index)
            .and_then(|r| r.output.as_ref())
            .map(|o| o.content.as_str())
    }

    /// Position of the step currently loading, if any
    pub fn loading_step(&self) -> Option<usize> {
        self.records.iter().position(|r| r.state == StepState::Loading)
    }

    /// Move a step to loading, or explain why it cannot be triggered
    pub fn begin(&mut self, index: usize, policy: ConcurrencyPolicy) -> Result<RequestTicket, Rejection> {
        let state = self.state(index).ok_or(Rejection::OutOfRange(index))?;

        match state {
            StepState::Waiting => return Err(Rejection::NotReady),
            StepState::Loading => return Err(Rejection::AlreadyLoading),
            _ => {}
        }

        if policy == ConcurrencyPolicy::Exclusive {
            if let Some(other) = self.loading_step() {
                return Err(Rejection::Busy(other));
            }
        }

        let record = &mut self.records[index];
        record.state = StepState::Loading;
        record.attempts += 1;

        Ok(RequestTicket {
            run_id: self.run_id,
            index,
            epoch: record.epoch,
            versions: self.records.iter().map(|r| r.version).collect(),
        })
    }

    /// Whether a ticket's result may still be applied
    ///
    /// False after a reset, or after the step was invalidated while loading.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.run_id == self.run_id
            && self
                .records
                .get(ticket.index)
                .is_some_and(|r| r.epoch == ticket.epoch && r.state == StepState::Loading)
    }

    /// Store a successful output and unlock the next step
    ///
    /// Results for a ticket that is no longer current change nothing.
    pub fn complete(
        &mut self,
        pipeline: &Pipeline,
        ticket: &RequestTicket,
        output: StepOutput,
        staleness: StalenessPolicy,
    ) -> Vec<usize> {
        if !self.is_current(ticket) {
            return Vec::new();
        }
        let index = ticket.index;

        // Inputs that changed while the request was in flight
        let stale = pipeline.steps.get(index).is_some_and(|step| {
            step.inputs.iter().any(|input| {
                pipeline.position(&input.step_id).is_some_and(|i| {
                    self.records.get(i).map(|r| r.version) != ticket.versions.get(i).copied()
                })
            })
        });

        let record = &mut self.records[index];
        let regenerated = record.output.is_some();
        record.state = StepState::Completed;
        record.output = Some(output);
        record.version += 1;
        record.last_error = None;
        record.stale = stale;

        let mut changed = vec![index];

        if regenerated && staleness == StalenessPolicy::Invalidate {
            for later in (index + 1)..self.records.len() {
                let target = if later == index + 1 { StepState::Ready } else { StepState::Waiting };
                let record = &mut self.records[later];
                if record.state != target || record.output.is_some() {
                    changed.push(later);
                }
                record.invalidate(target);
            }
            return changed;
        }

        if let Some(next) = self.records.get_mut(index + 1) {
            if next.state == StepState::Waiting {
                next.state = StepState::Ready;
                changed.push(index + 1);
            }
        }

        if regenerated {
            for consumer in pipeline.consumers_of(index) {
                if let Some(record) = self.records.get_mut(consumer) {
                    if record.output.is_some() {
                        record.stale = true;
                    }
                }
            }
        }

        changed
    }

    /// Record a failed request; other steps are untouched
    pub fn fail(&mut self, ticket: &RequestTicket, error: impl Into<String>) -> Vec<usize> {
        if !self.is_current(ticket) {
            return Vec::new();
        }
        let record = &mut self.records[ticket.index];
        record.state = StepState::Failed;
        record.last_error = Some(error.into());
        vec![ticket.index]
    }

    /// Clear every output and start over
    pub fn reset(&mut self) {
        self.run_id = Uuid::new_v4();
        self.records = Self::initial_records(self.records.len());
    }
}
