//! Backend response types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Longest slice of a non-JSON error body kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Error types for backend calls
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-success status without an error field
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend reported an error in the response body
    #[error("{0}")]
    Backend(String),

    /// The body was not JSON or lacked a required field
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Request(err.to_string())
    }
}

/// Successful result of a generation endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Generated content
    pub content: String,

    /// Prompt the backend sent to the model
    #[serde(default)]
    pub prompt: String,
}

impl GenerationResponse {
    pub fn new(content: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            prompt: prompt.into(),
        }
    }
}

/// Result of an image upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    /// `data:` URL of the stored image
    pub image_data: String,
    pub filename: String,
}

#[derive(Debug, Deserialize)]
struct UploadBody {
    #[serde(default)]
    success: bool,
    image_data: Option<String>,
    filename: Option<String>,
    error: Option<String>,
}

/// Error message carried in an `error` field, if any
pub fn error_field(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn truncate(body: &str) -> String {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

/// Parse a body as JSON, honoring an `error` field and the HTTP status
///
/// The `error` field wins over the status; a non-success status without one
/// becomes `Status`.
pub fn parse_json_body(status: u16, body: &str) -> Result<Value, GenerationError> {
    let success = (200..300).contains(&status);

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) if !success => {
            return Err(GenerationError::Status {
                status,
                message: truncate(body),
            })
        }
        Err(e) => return Err(GenerationError::Decode(e.to_string())),
    };

    if let Some(message) = error_field(&value) {
        return Err(GenerationError::Backend(message));
    }

    if !success {
        return Err(GenerationError::Status {
            status,
            message: truncate(body),
        });
    }

    Ok(value)
}

/// Decode the body of a generation endpoint
pub fn parse_generation_body(status: u16, body: &str) -> Result<GenerationResponse, GenerationError> {
    let value = parse_json_body(status, body)?;

    let content = value
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| GenerationError::Decode("missing 'content' field".to_string()))?;
    let prompt = value.get("prompt").and_then(Value::as_str).unwrap_or_default();

    Ok(GenerationResponse::new(content, prompt))
}

/// Decode the body of the image upload endpoint
pub fn parse_upload_body(status: u16, body: &str) -> Result<UploadedImage, GenerationError> {
    let value = parse_json_body(status, body)?;
    let upload: UploadBody =
        serde_json::from_value(value).map_err(|e| GenerationError::Decode(e.to_string()))?;

    if !upload.success {
        return Err(GenerationError::Backend(
            upload.error.unwrap_or_else(|| "image upload failed".to_string()),
        ));
    }

    let image_data = upload
        .image_data
        .ok_or_else(|| GenerationError::Decode("missing 'image_data' field".to_string()))?;

    Ok(UploadedImage {
        image_data,
        filename: upload.filename.unwrap_or_default(),
    })
}
