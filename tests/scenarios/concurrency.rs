//! Test: Concurrency - what may be triggered while a request is in flight

use crate::helpers::*;
use genconsole::wizard::WizardController;
use genconsole::{ConcurrencyPolicy, Rejection, StalenessPolicy, StepState, TriggerError, WizardOptions};
use std::sync::Arc;

use StepState::{Completed, Loading, Ready, Waiting};

/// A loading step cannot be triggered again
#[tokio::test]
async fn test_loading_step_is_not_queued() {
    let backend = Arc::new(MockBackend::new());
    let gate = backend.gate("story");
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("story").await })
    };
    wait_for_state(&controller, "story", Loading).await;

    let err = controller.trigger("story").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::AlreadyLoading));

    gate.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(backend.requests_for("story").len(), 1);
    assert_eq!(controller.state("story").await, Some(Completed));
    assert_eq!(controller.state("tasks").await, Some(Ready));
}

/// Under the exclusive policy nothing else runs while a step loads
#[tokio::test]
async fn test_exclusive_policy_rejects_other_steps() {
    let backend = Arc::new(MockBackend::new());
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());
    run_steps(&controller, &["story"]).await;

    let gate = backend.gate("story");
    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("story").await })
    };
    wait_for_state(&controller, "story", Loading).await;

    let err = controller.trigger("tasks").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::Busy(0)));
    assert_eq!(controller.state("tasks").await, Some(Ready));

    gate.notify_one();
    pending.await.unwrap().unwrap();
    controller.trigger("tasks").await.unwrap();
}

/// Under the per-step policy other steps may load at the same time
#[tokio::test]
async fn test_per_step_policy_allows_other_steps() {
    let backend = Arc::new(MockBackend::new().reply("story", "S1", "p").reply("story", "S2", "p"));
    let controller = Arc::new(
        WizardController::configure_shared(story_pipeline(), backend.clone())
            .unwrap()
            .with_options(WizardOptions {
                concurrency: ConcurrencyPolicy::PerStep,
                ..WizardOptions::default()
            }),
    );
    run_steps(&controller, &["story"]).await;

    let gate = backend.gate("story");
    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("story").await })
    };
    wait_for_state(&controller, "story", Loading).await;

    // tasks runs against the last stored story output
    let tasks = controller.trigger("tasks").await.unwrap();
    assert_eq!(tasks.content, "tasks output");
    assert_eq!(backend.requests_for("tasks")[0].field("story_content"), Some("S1"));

    gate.notify_one();
    let story = pending.await.unwrap().unwrap();
    assert_eq!(story.content, "S2");

    let snapshot = controller.snapshot().await;
    assert!(snapshot.step("tasks").unwrap().stale);
}

fn per_step_controller(
    backend: &Arc<MockBackend>,
    staleness: StalenessPolicy,
) -> Arc<WizardController<MockBackend>> {
    Arc::new(
        WizardController::configure_shared(story_pipeline(), backend.clone())
            .unwrap()
            .with_options(WizardOptions {
                concurrency: ConcurrencyPolicy::PerStep,
                staleness,
            }),
    )
}

/// A consumer that was loading while its input was regenerated comes back stale
#[tokio::test]
async fn test_consumer_loading_during_regeneration_is_stale() {
    let backend = Arc::new(MockBackend::new().reply("story", "S1", "p").reply("story", "S2", "p"));
    let controller = per_step_controller(&backend, StalenessPolicy::Keep);
    run_steps(&controller, &["story"]).await;

    let gate = backend.gate("tasks");
    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("tasks").await })
    };
    wait_for_state(&controller, "tasks", Loading).await;

    controller.trigger("story").await.unwrap();
    gate.notify_one();
    pending.await.unwrap().unwrap();

    assert_eq!(backend.requests_for("tasks")[0].field("story_content"), Some("S1"));
    assert_eq!(controller.output("story").await.unwrap().content, "S2");

    let snapshot = controller.snapshot().await;
    let tasks = snapshot.step("tasks").unwrap();
    assert_eq!(tasks.state, Completed);
    assert!(tasks.stale);
}

/// Under the invalidate policy a later step's in-flight result is dropped
#[tokio::test]
async fn test_invalidated_step_result_is_discarded() {
    let backend = Arc::new(MockBackend::new());
    let controller = per_step_controller(&backend, StalenessPolicy::Invalidate);
    run_steps(&controller, &["story", "tasks", "code"]).await;

    let gate = backend.gate("code");
    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("code").await })
    };
    wait_for_state(&controller, "code", Loading).await;

    controller.trigger("story").await.unwrap();
    assert_states(&controller, &[Completed, Ready, Waiting, Waiting]).await;

    gate.notify_one();
    let result = pending.await.unwrap();
    assert!(matches!(result, Err(TriggerError::Superseded(ref id)) if id == "code"));

    assert_states(&controller, &[Completed, Ready, Waiting, Waiting]).await;
    assert!(controller.output("code").await.is_none());
}
