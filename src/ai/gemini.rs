//! Raw reqwest client for the Gemini `generateContent` API.
//!
//! Supports plain text prompts and JSON-schema constrained output. No
//! streaming and no chat history: one request, one response.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::{GenerationRequest, GenerativeModel, ModelError};
use crate::config::AiConfig;

// ── Constants ───────────────────────────────────────────────────────

/// Environment variables consulted when no key is configured.
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// MIME type requesting JSON output.
const JSON_MIME_TYPE: &str = "application/json";

/// Responses slower than this are logged as warnings.
const SLOW_RESPONSE: Duration = Duration::from_secs(10);

// ── API request/response ────────────────────────────────────────────

/// Wire format for the generateContent request (not public).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a Value,
}

impl<'a> ApiRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: &request.prompt,
                }],
            }],
            generation_config: request
                .response_schema
                .as_ref()
                .map(|schema| GenerationConfig {
                    response_mime_type: JSON_MIME_TYPE,
                    response_schema: schema,
                }),
        }
    }
}

/// Wire format for the generateContent response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// A response part; only text parts carry anything we use.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl ApiResponse {
    /// Concatenate the text parts of the first candidate.
    ///
    /// A response without candidates (e.g. a blocked prompt) yields an empty
    /// string.
    pub fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ── Client ──────────────────────────────────────────────────────────

/// A minimal Gemini API client.
#[derive(Debug)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a client from explicit settings.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("WeatherGen/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// Create a client from the `ai` config section.
    ///
    /// Falls back to `GEMINI_API_KEY`, then `API_KEY`, when the section has
    /// no key.
    pub fn from_config(config: &AiConfig) -> Result<Self, ModelError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_VARS
                    .iter()
                    .find_map(|var| std::env::var(var).ok().filter(|k| !k.trim().is_empty()))
            })
            .ok_or(ModelError::MissingApiKey)?;

        Self::new(
            api_key,
            config.model.clone(),
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds.into()),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Send one generateContent call and return the parsed response.
    pub async fn send(&self, request: &GenerationRequest) -> Result<ApiResponse, ModelError> {
        let body = ApiRequest::from_request(request);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(ModelError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let api_response: ApiResponse = response.json().await?;
        Ok(api_response)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.model, structured = request.is_structured()))]
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ModelError> {
        let start = Instant::now();
        let response = self.send(request).await?;
        let elapsed = start.elapsed();

        if let Some(reason) = response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            warn!(reason, "Prompt was blocked by the model");
        }

        let text = response.text();
        debug!(
            "Generation finished in {:.3}s ({} chars, finish reason {:?})",
            elapsed.as_secs_f64(),
            text.len(),
            response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
        );

        if elapsed > SLOW_RESPONSE {
            warn!("Slow model response: {:.3}s", elapsed.as_secs_f64());
        }

        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ── Tests ───────────────────────────────────────────────────────────
