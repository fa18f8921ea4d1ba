//! Test: Reset - clearing a run, including while a request is in flight

use crate::helpers::*;
use genconsole::{RenderEvent, StepState, TriggerError, DEFAULT_PLACEHOLDER};
use std::sync::Arc;

use StepState::{Completed, Loading, Ready, Waiting};

/// Reset clears every output and emits the placeholder
#[tokio::test]
async fn test_reset_clears_run() {
    let backend = Arc::new(MockBackend::new());
    let (controller, log) = controller_with_log(story_pipeline(), backend);

    run_steps(&controller, &["story", "tasks"]).await;
    let before = controller.snapshot().await.run_id;

    controller.reset().await;

    assert_states(&controller, &[Ready, Waiting, Waiting, Waiting]).await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.completed(), 0);
    assert_ne!(snapshot.run_id, before);
    assert_eq!(
        log.events().last(),
        Some(&RenderEvent::Cleared {
            pipeline: "story_to_code".to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
        })
    );
}

/// Reset twice equals reset once; fields survive a reset
#[tokio::test]
async fn test_reset_is_idempotent() {
    let backend = Arc::new(MockBackend::new());
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    controller.set_field("persona_name", "Lucas").await;
    run_steps(&controller, &["story"]).await;

    controller.reset().await;
    let once = controller.snapshot().await;
    controller.reset().await;
    let twice = controller.snapshot().await;

    assert_eq!(once.states(), twice.states());
    assert_eq!(twice.completed(), 0);

    run_steps(&controller, &["story"]).await;
    assert_eq!(backend.requests()[1].field("persona_name"), Some("Lucas"));
}

/// A result that returns after a reset is discarded
#[tokio::test]
async fn test_in_flight_result_is_discarded_after_reset() {
    let backend = Arc::new(MockBackend::new().reply("story", "S", "P1"));
    let gate = backend.gate("story");
    let (controller, log) = controller_with_log(story_pipeline(), backend.clone());

    let pending = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.trigger("story").await })
    };
    wait_for_state(&controller, "story", Loading).await;

    controller.reset().await;
    gate.notify_one();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(TriggerError::Superseded(ref id)) if id == "story"));

    assert_states(&controller, &[Ready, Waiting, Waiting, Waiting]).await;
    assert!(controller.output("story").await.is_none());
    assert!(log.rendered().is_empty());
}

/// The accessibility page uses its own placeholder
#[tokio::test]
async fn test_custom_placeholder() {
    let backend = Arc::new(MockBackend::new());
    let pipeline = genconsole::catalog::pipeline("accessibility").unwrap();
    let (controller, log) = controller_with_log(pipeline, backend);

    run_steps(&controller, &["wcag_analysis"]).await;
    assert_eq!(controller.state("wcag_analysis").await, Some(Completed));
    controller.reset().await;

    match log.events().last() {
        Some(RenderEvent::Cleared { placeholder, .. }) => {
            assert_eq!(placeholder, "Generated accessibility analysis will appear here...")
        }
        other => panic!("unexpected event: {:?}", other),
    }
}
