//! Pipeline domain model

use crate::core::{config::PipelineConfig, error::ConfigError, step::Step};
use std::collections::{BTreeMap, HashSet};

/// Default text shown in the results area of an empty run
pub const DEFAULT_PLACEHOLDER: &str = "Generated content will appear here...";

/// An ordered, dependency-linked set of steps
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Route segment used to build `/<route>/generate/<step>` paths
    pub route: String,

    /// Display title
    pub title: String,

    /// Text shown when the run has no results
    pub placeholder: String,

    /// Default static fields sent with every request
    pub fields: BTreeMap<String, String>,

    /// Steps in wizard order
    pub steps: Vec<Step>,
}

impl Pipeline {
    /// Create an unvalidated pipeline from its steps
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        let name = name.into();
        Self {
            route: name.clone(),
            title: name.clone(),
            name,
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            fields: BTreeMap::new(),
            steps,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = route.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Create a validated pipeline from configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let steps = config.steps.iter().map(Step::from_config).collect();

        let mut pipeline = Pipeline::new(config.name.clone(), steps)
            .with_route(config.route.clone().unwrap_or_else(|| config.name.clone()))
            .with_title(config.title.clone().unwrap_or_else(|| config.name.clone()));
        if let Some(placeholder) = &config.placeholder {
            pipeline.placeholder = placeholder.clone();
        }
        pipeline.fields = config.fields.clone();

        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Check uniqueness and that every input names an earlier step
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::Empty(self.name.clone()));
        }

        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if !seen_ids.insert(step.id.as_str()) {
                return Err(ConfigError::DuplicateStep(step.id.clone()));
            }
        }

        for (position, step) in self.steps.iter().enumerate() {
            for input in &step.inputs {
                match self.position(&input.step_id) {
                    None => {
                        return Err(ConfigError::UnknownDependency {
                            step: step.id.clone(),
                            dependency: input.step_id.clone(),
                        })
                    }
                    Some(dep) if dep >= position => {
                        return Err(ConfigError::ForwardDependency {
                            step: step.id.clone(),
                            dependency: input.step_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(())
    }

    /// Get a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Ordinal position of a step
    pub fn position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Positions of the steps that declare `index` as an input
    pub fn consumers_of(&self, index: usize) -> Vec<usize> {
        let Some(step) = self.steps.get(index) else {
            return Vec::new();
        };
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, s)| s.consumes(&step.id))
            .map(|(i, _)| i)
            .collect()
    }

    /// Step IDs in wizard order
    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }
}
