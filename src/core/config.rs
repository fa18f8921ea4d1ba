//! Pipeline configuration from YAML

use crate::core::{error::ConfigError, Pipeline};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name
    pub name: String,

    /// Route segment for endpoint paths (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Display title (defaults to the name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Results placeholder text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Default static fields sent with every request
    #[serde(default)]
    pub fields: BTreeMap<String, String>,

    /// Pipeline steps, in wizard order
    pub steps: Vec<StepConfig>,
}

/// Step configuration as defined in YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepConfig {
    /// Unique step identifier
    pub id: String,

    /// Label shown on the step's control
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Upstream steps whose outputs this step sends
    #[serde(default)]
    pub depends_on: Vec<InputConfig>,

    /// Explicit endpoint path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// An upstream dependency: either a bare step ID or a step with a field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputConfig {
    /// Sent under `<step>_content`
    Step(String),
    /// Sent under an explicit field
    Field {
        step: String,
        #[serde(default)]
        field: Option<String>,
    },
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Pipeline::from_config(self).map(|_| ())
    }

    /// Convert config to a Pipeline domain model
    pub fn to_pipeline(&self) -> Result<Pipeline, ConfigError> {
        Pipeline::from_config(self)
    }
}
