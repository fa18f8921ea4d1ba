//! Built-in pipelines shipped with the console

use crate::core::{config::PipelineConfig, error::ConfigError, Pipeline};

/// (name, YAML source) for every built-in pipeline
const BUILTIN: &[(&str, &str)] = &[
    ("story_to_code", include_str!("../../pipelines/story_to_code.yaml")),
    ("story_to_data", include_str!("../../pipelines/story_to_data.yaml")),
    ("story_to_api", include_str!("../../pipelines/story_to_api.yaml")),
    ("accessibility", include_str!("../../pipelines/accessibility.yaml")),
    ("image_to_code", include_str!("../../pipelines/image_to_code.yaml")),
    (
        "image_to_code_test_plan",
        include_str!("../../pipelines/image_to_code_test_plan.yaml"),
    ),
];

/// Names of the built-in pipelines
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|(name, _)| *name)
}

/// Parsed configuration of a built-in pipeline
pub fn config(name: &str) -> Result<PipelineConfig, ConfigError> {
    let (_, yaml) = BUILTIN
        .iter()
        .find(|(n, _)| *n == name)
        .ok_or_else(|| ConfigError::UnknownPipeline(name.to_string()))?;
    PipelineConfig::from_yaml(yaml)
}

/// Validated built-in pipeline
pub fn pipeline(name: &str) -> Result<Pipeline, ConfigError> {
    config(name)?.to_pipeline()
}

/// The image-to-code workflow for a use case
///
/// "Test Plan Generation" swaps the code steps for test steps; every other
/// use case runs the code workflow.
pub fn image_to_code_for(use_case: &str) -> Result<Pipeline, ConfigError> {
    let name = if use_case == "Test Plan Generation" {
        "image_to_code_test_plan"
    } else {
        "image_to_code"
    };
    let mut pipeline = pipeline(name)?;
    pipeline.fields.insert("use_case".to_string(), use_case.to_string());
    Ok(pipeline)
}
