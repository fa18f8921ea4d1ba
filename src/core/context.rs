//! Request context - static form fields plus upstream outputs

use crate::core::{Pipeline, PipelineRun};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Static form fields shared by every step of a run
///
/// Built from the pipeline defaults, then console settings, then values the
/// user sets; later layers win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: BTreeMap<String, String>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any earlier value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Set a field only if it has no value yet
    pub fn set_default(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    pub fn extend<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in values {
            self.set(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Assemble the JSON body for the step at `index`
///
/// Upstream steps that have not produced output are sent as empty strings;
/// the backend decides what an empty field means.
pub fn build_request_body(
    pipeline: &Pipeline,
    run: &PipelineRun,
    fields: &FieldSet,
    index: usize,
) -> Map<String, Value> {
    let mut body = Map::new();

    for (key, value) in fields.iter() {
        body.insert(key.to_string(), Value::String(value.to_string()));
    }

    if let Some(step) = pipeline.steps.get(index) {
        for input in &step.inputs {
            let content = pipeline
                .position(&input.step_id)
                .and_then(|i| run.content(i))
                .unwrap_or_default();
            body.insert(input.field.clone(), Value::String(content.to_string()));
        }
    }

    body
}
