//! Generation backend: the HTTP service that turns a step's inputs into content

pub mod client;
pub mod http;
pub mod response;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

pub use client::BackendConfig;
pub use http::HttpBackend;
pub use response::{GenerationError, GenerationResponse, UploadedImage};

/// A request for one step's generation endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Endpoint path, e.g. `/story_to_code/generate/tasks`
    pub path: String,

    /// JSON body: static fields plus upstream outputs
    pub body: Map<String, Value>,
}

impl GenerationRequest {
    pub fn new(path: impl Into<String>, body: Map<String, Value>) -> Self {
        Self {
            path: path.into(),
            body,
        }
    }

    /// String value of a body field
    pub fn field(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }
}

/// Trait for generation calls - allows for different implementations
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Send one generation request and decode its result
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError>;
}

/// Source of page fragments for the shell
#[async_trait]
pub trait FragmentSource: Send + Sync {
    /// Fetch the HTML fragment at `path`
    async fn fetch_fragment(&self, path: &str) -> Result<String, GenerationError>;
}

#[async_trait]
impl<T: GenerationBackend + ?Sized> GenerationBackend for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, GenerationError> {
        (**self).generate(request).await
    }
}

#[async_trait]
impl<T: FragmentSource + ?Sized> FragmentSource for Arc<T> {
    async fn fetch_fragment(&self, path: &str) -> Result<String, GenerationError> {
        (**self).fetch_fragment(path).await
    }
}
