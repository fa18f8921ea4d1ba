//! Test: Regeneration - re-triggering a completed step overwrites its output

use crate::helpers::*;
use genconsole::{StalenessPolicy, StepState, WizardOptions};
use genconsole::wizard::WizardController;
use std::sync::Arc;

use StepState::{Completed, Ready, Waiting};

/// Regenerating story keeps later steps usable and flags tasks stale
#[tokio::test]
async fn test_regeneration_keeps_downstream_state() {
    let backend = Arc::new(MockBackend::new().reply("story", "S1", "P1").reply("story", "S2", "P2"));
    let (controller, log) = controller_with_log(story_pipeline(), backend.clone());

    run_steps(&controller, &["story", "tasks", "code"]).await;
    let output = controller.trigger("story").await.unwrap();

    assert_eq!(output.content, "S2");
    assert_eq!(output.prompt, "P2");
    assert_states(&controller, &[Completed, Completed, Completed, Ready]).await;

    let snapshot = controller.snapshot().await;
    assert!(snapshot.step("tasks").unwrap().stale);
    assert!(!snapshot.step("code").unwrap().stale);
    assert_eq!(snapshot.step("story").unwrap().attempts, 2);
    assert_eq!(log.rendered(), vec!["story", "tasks", "code", "story"]);
}

/// Regenerating a stale step clears its flag and uses the new upstream output
#[tokio::test]
async fn test_stale_step_regenerates_from_new_output() {
    let backend = Arc::new(MockBackend::new().reply("story", "S1", "P1").reply("story", "S2", "P2"));
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    run_steps(&controller, &["story", "tasks", "story", "tasks"]).await;

    let tasks = backend.requests_for("tasks");
    assert_eq!(tasks[0].field("story_content"), Some("S1"));
    assert_eq!(tasks[1].field("story_content"), Some("S2"));

    let snapshot = controller.snapshot().await;
    assert!(!snapshot.step("tasks").unwrap().stale);
    assert!(snapshot.step("code").unwrap().output.is_none());
}

/// The invalidate policy clears every later step
#[tokio::test]
async fn test_invalidate_policy_clears_downstream() {
    let backend = Arc::new(MockBackend::new());
    let controller = WizardController::configure_shared(story_pipeline(), backend.clone())
        .unwrap()
        .with_options(WizardOptions {
            staleness: StalenessPolicy::Invalidate,
            ..WizardOptions::default()
        });

    run_steps(&controller, &["story", "tasks", "code", "test"]).await;
    controller.trigger("story").await.unwrap();

    assert_states(&controller, &[Completed, Ready, Waiting, Waiting]).await;
    assert!(controller.output("tasks").await.is_none());
    assert!(controller.output("test").await.is_none());
}

/// Regenerating the last step touches nothing else
#[tokio::test]
async fn test_regenerate_last_step() {
    let backend = Arc::new(MockBackend::new().reply("test", "T1", "p").reply("test", "T2", "p"));
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    run_steps(&controller, &["story", "tasks", "code", "test", "test"]).await;

    assert_states(&controller, &[Completed, Completed, Completed, Completed]).await;
    assert_eq!(controller.output("test").await.unwrap().content, "T2");
    assert_eq!(backend.requests_for("test").len(), 2);
    assert_eq!(backend.requests_for("code").len(), 1);

    // Waiting steps never appear after a regeneration
    let snapshot = controller.snapshot().await;
    assert!(snapshot.states().iter().all(|s| *s != Waiting));
}
