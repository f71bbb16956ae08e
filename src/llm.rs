//! Client for the upstream generative-text API.
//!
//! [`GenerativeClient`] is the seam the advice gateway talks through;
//! [`GeminiClient`] is the production implementation and [`classify`] is the
//! single place upstream failures are sorted into retryable and terminal
//! classes.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

/// Speaker of a chat turn, in the upstream API's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a conversation sent upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Failure reported while calling the upstream API.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// Non-success HTTP status together with the response body.
    #[error("upstream returned {code}: {message}")]
    Status { code: u16, message: String },
    /// Transport-level failure before any status was received.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Success response that carried no candidate text.
    #[error("upstream response contained no text")]
    Empty,
}

/// Common interface for text-generation backends.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Produce a completion for the given turn sequence. The final turn must
    /// carry the instruction block; earlier turns are conversation context.
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, UpstreamError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: Role,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

#[derive(Deserialize)]
struct TextPart {
    text: Option<String>,
}

/// [`GenerativeClient`] backed by the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    /// Create a client for `model` served at `base_url`.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// Configured model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, turns: &[ChatTurn]) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let body = GenerateRequest {
            contents: turns
                .iter()
                .map(|t| Content {
                    role: t.role,
                    parts: vec![Part { text: &t.text }],
                })
                .collect(),
        };
        trace!(%url, turns = turns.len(), "upstream request");

        let resp = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            debug!(code = status.as_u16(), %message, "upstream error response");
            return Err(UpstreamError::Status {
                code: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();
        if text.is_empty() {
            return Err(UpstreamError::Empty);
        }
        trace!(response = %text, "upstream full response");
        Ok(text)
    }
}

/// Retry-relevant classification of an [`UpstreamError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureClass {
    /// Quota or rate-limit condition, the only retryable class. Carries the
    /// server-suggested delay when the failure text named one.
    RateLimited { delay: Option<Duration> },
    /// The requested model does not exist or is not served.
    ModelUnavailable,
    /// Credential rejected upstream.
    AuthFailed,
    /// Anything unrecognized. Never retried.
    Unknown,
}

static RETRY_IN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)retry in (\d+(?:\.\d+)?)\s*s").expect("valid regex"));

/// Pull a server-suggested retry delay out of free-text error detail.
pub fn retry_delay_from(message: &str) -> Option<Duration> {
    RETRY_IN_RE
        .captures(message)
        .and_then(|c| c[1].parse::<f64>().ok())
        .map(Duration::from_secs_f64)
}

/// Classify an upstream failure.
///
/// Structured HTTP status codes are authoritative; keyword matching on the
/// message text is the fallback for transport-level or text-only failures.
pub fn classify(err: &UpstreamError) -> FailureClass {
    match err {
        UpstreamError::Status { code, message } => match code {
            429 => FailureClass::RateLimited {
                delay: retry_delay_from(message),
            },
            404 => FailureClass::ModelUnavailable,
            401 | 403 => FailureClass::AuthFailed,
            _ => classify_text(message),
        },
        UpstreamError::Transport(e) => classify_text(&e.to_string()),
        UpstreamError::Empty => FailureClass::Unknown,
    }
}

fn classify_text(message: &str) -> FailureClass {
    let lower = message.to_ascii_lowercase();
    if lower.contains("429") || lower.contains("quota") || lower.contains("rate") {
        FailureClass::RateLimited {
            delay: retry_delay_from(message),
        }
    } else if lower.contains("not found") || lower.contains("not_found") {
        FailureClass::ModelUnavailable
    } else if lower.contains("api key") || lower.contains("unauthorized") || lower.contains("permission") {
        FailureClass::AuthFailed
    } else {
        FailureClass::Unknown
    }
}
