//! Test: Success Chain - each completed step unlocks the next and feeds it

use crate::helpers::*;
use genconsole::{catalog, Rejection, StepState};
use std::sync::Arc;

use StepState::{Completed, Ready, Waiting};

/// story -> tasks -> code -> test with scripted story output
#[tokio::test]
async fn test_story_to_code_chain() {
    let backend = Arc::new(MockBackend::new().reply("story", "S", "P1").reply("tasks", "T", "P2"));
    let (controller, log) = controller_with_log(story_pipeline(), backend.clone());

    assert_states(&controller, &[Ready, Waiting, Waiting, Waiting]).await;

    let output = controller.trigger("story").await.unwrap();
    assert_eq!(output.content, "S");
    assert_eq!(output.prompt, "P1");
    assert_states(&controller, &[Completed, Ready, Waiting, Waiting]).await;

    run_steps(&controller, &["tasks", "code", "test"]).await;
    assert_states(&controller, &[Completed, Completed, Completed, Completed]).await;

    // Each request carries the upstream output under its field
    let code = backend.requests_for("code");
    assert_eq!(code.len(), 1);
    assert_eq!(code[0].path, "/story_to_code/generate/code");
    assert_eq!(code[0].field("tasks_content"), Some("T"));

    let test = backend.requests_for("test");
    assert_eq!(test[0].field("code_content"), Some("code output"));

    assert_eq!(log.rendered(), vec!["story", "tasks", "code", "test"]);
    assert!(log.notifications().is_empty());
}

/// Triggering tasks before story completes is rejected without a request
#[tokio::test]
async fn test_waiting_step_is_rejected() {
    let backend = Arc::new(MockBackend::new());
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    let err = controller.trigger("tasks").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::NotReady));

    let err = controller.trigger("test").await.unwrap_err();
    assert_eq!(err.rejection(), Some(Rejection::NotReady));

    assert!(backend.requests().is_empty());
    assert_states(&controller, &[Ready, Waiting, Waiting, Waiting]).await;
}

/// Static fields from the pipeline, settings and the user reach every request
#[tokio::test]
async fn test_static_fields_are_sent() {
    let backend = Arc::new(MockBackend::new());
    let (controller, _log) = controller_with_log(story_pipeline(), backend.clone());

    controller.set_field("persona_name", "Lucas").await;
    controller.set_field("story_lang", "Spanish").await;
    controller
        .update_fields(|fields| genconsole::ConsoleSettings::default().apply_defaults(fields))
        .await;

    run_steps(&controller, &["story", "tasks"]).await;

    for request in backend.requests() {
        assert_eq!(request.field("persona_name"), Some("Lucas"));
        assert_eq!(request.field("story_lang"), Some("Spanish"));
        assert_eq!(request.field("model_name"), Some("gemini-2.5-flash"));
    }
}

/// Deployment receives both backend and frontend outputs
#[tokio::test]
async fn test_image_to_code_deployment_inputs() {
    let backend = Arc::new(
        MockBackend::new()
            .reply("backend", "fn main() {}", "pb")
            .reply("frontend", "<html/>", "pf"),
    );
    let pipeline = catalog::pipeline("image_to_code").unwrap();
    let (controller, _log) = controller_with_log(pipeline, backend.clone());

    run_steps(&controller, &["description", "backend", "frontend", "deployment"]).await;

    let deployment = backend.requests_for("deployment");
    assert_eq!(deployment[0].path, "/image_to_code/generate/deployment");
    assert_eq!(deployment[0].field("backend_content"), Some("fn main() {}"));
    assert_eq!(deployment[0].field("frontend_content"), Some("<html/>"));
}

/// Accessibility steps send outputs under their bare step names
#[tokio::test]
async fn test_accessibility_field_names() {
    let backend = Arc::new(MockBackend::new().reply("wcag_analysis", "W", "p"));
    let pipeline = catalog::pipeline("accessibility").unwrap();
    let (controller, _log) = controller_with_log(pipeline, backend.clone());

    run_steps(&controller, &["wcag_analysis", "user_stories"]).await;

    let user_stories = backend.requests_for("user_stories");
    assert_eq!(user_stories[0].field("wcag_analysis"), Some("W"));
    assert!(user_stories[0].field("wcag_analysis_content").is_none());
}

/// The test-plan workflow posts to the image_to_code routes
#[tokio::test]
async fn test_test_plan_workflow() {
    let backend = Arc::new(MockBackend::new().reply("test_cases", "TC", "p"));
    let pipeline = catalog::image_to_code_for("Test Plan Generation").unwrap();
    let (controller, _log) = controller_with_log(pipeline, backend.clone());

    run_steps(&controller, &["description", "test_cases", "test_script", "selenium"]).await;

    let selenium = backend.requests_for("selenium");
    assert_eq!(selenium[0].path, "/image_to_code/generate/selenium");
    assert_eq!(selenium[0].field("test_cases_content"), Some("TC"));
    assert_eq!(selenium[0].field("use_case"), Some("Test Plan Generation"));
}
