//! Generative model capability
//!
//! The query service only needs one thing from an AI backend: turn a prompt
//! (optionally constrained by a response schema) into text. That seam is the
//! [`GenerativeModel`] trait, so the concrete client is constructed by
//! whoever assembles the application and can be swapped for a fake in tests.

pub mod gemini;

use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiClient;

/// Errors from generative model operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("no API key configured (set ai.api_key or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("format error: {0}")]
    Format(String),
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// JSON response schema; `None` asks for free-form text.
    pub response_schema: Option<Value>,
}

impl GenerationRequest {
    /// A request whose answer must be JSON matching `schema`.
    pub fn structured(prompt: impl Into<String>, schema: Value) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: Some(schema),
        }
    }

    /// A plain-text request.
    pub fn free_form(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response_schema: None,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.response_schema.is_some()
    }
}

/// A text generation backend.
///
/// Implementations return the raw response text. An empty string is a valid
/// answer here; deciding whether it is acceptable is up to the caller.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError>;

    /// Model identifier, for logs.
    fn name(&self) -> &str;
}
