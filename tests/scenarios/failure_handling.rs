//! Test: Failure Handling - failed steps stay retriable and isolated

use crate::helpers::*;
use genconsole::{GenerationError, StepState, TriggerError};
use std::sync::Arc;

use StepState::{Completed, Failed, Ready, Waiting};

/// An `{error}` reply leaves story failed, tasks waiting, and notifies
#[tokio::test]
async fn test_backend_error_marks_step_failed() {
    let backend = Arc::new(MockBackend::new().fail("story", "quota exceeded"));
    let (controller, log) = controller_with_log(story_pipeline(), backend.clone());

    let err = controller.trigger("story").await.unwrap_err();
    match err {
        TriggerError::Generation { step, source } => {
            assert_eq!(step, "story");
            assert!(matches!(source, GenerationError::Backend(ref m) if m == "quota exceeded"));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_states(&controller, &[Failed, Waiting, Waiting, Waiting]).await;
    assert_eq!(
        log.notifications(),
        vec![("story".to_string(), "quota exceeded".to_string())]
    );
    assert!(log.rendered().is_empty());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.steps[0].last_error.as_deref(), Some("quota exceeded"));
    assert!(snapshot.steps[0].output.is_none());
}

/// A failed step can be triggered again
#[tokio::test]
async fn test_failed_step_is_retriable() {
    let backend = Arc::new(MockBackend::new().fail("story", "quota exceeded").reply("story", "S", "P1"));
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    assert!(controller.trigger("story").await.is_err());
    let output = controller.trigger("story").await.unwrap();

    assert_eq!(output.content, "S");
    assert_states(&controller, &[Completed, Ready, Waiting, Waiting]).await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.steps[0].attempts, 2);
    assert!(snapshot.steps[0].last_error.is_none());
}

/// A failure mid-chain does not touch other steps
#[tokio::test]
async fn test_mid_chain_failure_is_isolated() {
    let backend = Arc::new(MockBackend::new().status("code", 500));
    let (controller, log) = controller_with_log(story_pipeline(), backend.clone());

    run_steps(&controller, &["story", "tasks"]).await;
    let err = controller.trigger("code").await.unwrap_err();
    assert!(err.is_generation_failure());
    assert!(err.to_string().contains("500"));

    assert_states(&controller, &[Completed, Completed, Failed, Waiting]).await;
    assert_eq!(log.notifications().len(), 1);
    assert_eq!(controller.output("tasks").await.unwrap().content, "tasks output");
}

/// A failed regeneration keeps the previous output
#[tokio::test]
async fn test_failed_regeneration_keeps_output() {
    let backend = Arc::new(MockBackend::new().reply("story", "S", "P1").fail("story", "model overloaded"));
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    controller.trigger("story").await.unwrap();
    controller.trigger("tasks").await.unwrap();
    assert!(controller.trigger("story").await.is_err());

    assert_states(&controller, &[Failed, Completed, Ready, Waiting]).await;
    assert_eq!(controller.output("story").await.unwrap().content, "S");

    // Downstream still sees the last good output
    controller.trigger("tasks").await.unwrap();
    let tasks = backend.requests_for("tasks");
    assert_eq!(tasks[1].field("story_content"), Some("S"));
}

/// Unknown steps are reported, not panicked on
#[tokio::test]
async fn test_unknown_step() {
    let backend = Arc::new(MockBackend::new());
    let (controller, _log) = controller_with_log(story_pipeline(), backend);

    assert!(matches!(
        controller.trigger("deploy").await,
        Err(TriggerError::UnknownStep(ref id)) if id == "deploy"
    ));
}
