//! Gemini `generateContent` client
//!
//! Request: `{"contents":[{"parts":[{"text": prompt}]}]}`
//! Response: `{"candidates":[{"content":{"parts":[{"text": ...}]}}]}`
//!
//! The response is decoded into typed structs with every level optional, then
//! validated: any shape mismatch becomes a [`GenerationError`] instead of a
//! panic on a missing field. Transient failures (transport, 429, 5xx) are
//! retried `retry_attempts` times with exponential backoff.

use super::{GenerationError, TextGenerator};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("podflow/", env!("CARGO_PKG_VERSION"));
const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 8_000;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

/// `generateContent` response body
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, rename = "promptFeedback")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
    #[serde(default, rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PromptFeedback {
    #[serde(default, rename = "blockReason")]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate
    pub fn first_candidate_text(self) -> Result<String, GenerationError> {
        if let Some(error) = self.error {
            return Err(GenerationError::ApiError {
                status: error.code.unwrap_or(0),
                message: error
                    .message
                    .or(error.status)
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }

        let candidate = match self.candidates.and_then(|c| c.into_iter().next()) {
            Some(candidate) => candidate,
            None => {
                let reason = self
                    .prompt_feedback
                    .and_then(|f| f.block_reason)
                    .unwrap_or_else(|| "empty candidate list".to_string());
                return Err(GenerationError::NoCandidates(reason));
            }
        };

        let finish_reason = candidate.finish_reason.clone();
        candidate
            .content
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .and_then(|part| part.text)
            .ok_or_else(|| {
                GenerationError::MalformedResponse(format!(
                    "first candidate has no text part (finishReason: {})",
                    finish_reason.as_deref().unwrap_or("none")
                ))
            })
    }
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
    retry_attempts: u32,
}

impl GeminiClient {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            model: model.into(),
            api_key: api_key.into(),
            retry_attempts: 0,
        })
    }

    /// Extra attempts for transient failures
    pub fn with_retry_attempts(mut self, retry_attempts: u32) -> Self {
        self.retry_attempts = retry_attempts;
        self
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(self.generate_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerationError::NetworkError(e.to_string()))?;

        let parsed: Result<GenerateResponse, _> = serde_json::from_str(&text);

        if !status.is_success() {
            let message = parsed
                .ok()
                .and_then(|r| r.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(GenerationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        parsed
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?
            .first_candidate_text()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let mut attempt = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            attempt += 1;
            tracing::debug!(
                model = %self.model,
                attempt,
                prompt_chars = prompt.chars().count(),
                "Calling Gemini generateContent"
            );

            match self.generate_once(prompt).await {
                Ok(text) => {
                    tracing::info!(model = %self.model, attempt, chars = text.len(), "Gemini generation succeeded");
                    return Ok(text);
                }
                Err(err) if err.is_transient() && attempt <= self.retry_attempts => {
                    tracing::warn!(
                        model = %self.model,
                        attempt,
                        error = %err,
                        backoff_ms,
                        "Transient Gemini failure, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms = (backoff_ms * 2).min(MAX_BACKOFF_MS);
                }
                Err(err) => {
                    tracing::error!(model = %self.model, attempt, error = %err, "Gemini generation failed");
                    return Err(err);
                }
            }
        }
    }
}
