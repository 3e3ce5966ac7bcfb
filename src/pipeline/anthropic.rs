//! Upstream model call: wire types, the [`MessagesApi`] seam, and the
//! reqwest-backed [`AnthropicClient`].
//!
//! One request, one response. No retry, no backoff and no client-side
//! timeout: whatever the network stack or hosting platform imposes is
//! inherited as-is. A non-success status is turned into
//! [`ExtractError::Upstream`] carrying the provider's own status code so the
//! handler can mirror it to the caller.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pipeline::request::ValidatedRequest;
use crate::prompts::extraction_prompt;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

// ── Wire types ───────────────────────────────────────────────────────────────

/// Body of `POST /v1/messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Document { source: DocumentSource },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSource {
    #[serde(rename = "type")]
    pub kind: String,
    pub media_type: String,
    pub data: String,
}

/// Success envelope. Only the fields the pipeline reads are modelled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ResponseBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl MessagesResponse {
    /// Build a response holding a single text block.
    #[cfg(test)]
    pub(crate) fn from_text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ResponseBlock {
                kind: "text".into(),
                text: Some(text.into()),
            }],
            usage: None,
        }
    }

    /// Text of the first content element, if it has any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.first()?.text.as_deref()
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Assemble the single-turn request: document block first, instruction second.
pub fn build_messages_request(req: &ValidatedRequest, config: &ExtractionConfig) -> MessagesRequest {
    MessagesRequest {
        model: req.model.clone(),
        max_tokens: config.max_tokens,
        messages: vec![Message {
            role: "user".into(),
            content: vec![
                ContentBlock::Document {
                    source: DocumentSource {
                        kind: "base64".into(),
                        media_type: "application/pdf".into(),
                        data: req.pdf_base64.clone(),
                    },
                },
                ContentBlock::Text {
                    text: extraction_prompt().to_string(),
                },
            ],
        }],
    }
}

/// Best-effort message for a failed upstream call.
///
/// Prefers the provider's `error.message`; falls back to the status reason
/// phrase when the body is not JSON, lacks the field, or the field is empty.
pub fn upstream_error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error)
        .and_then(|detail| detail.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or_else(|| status.as_str())
                .to_string()
        })
}

// ── Client seam ──────────────────────────────────────────────────────────────

/// Anything that can answer a messages request.
///
/// The handler depends on this trait rather than on [`AnthropicClient`] so
/// tests can substitute a deterministic stub.
#[async_trait]
pub trait MessagesApi: Send + Sync {
    async fn create_message(
        &self,
        request: &MessagesRequest,
        api_key: &str,
    ) -> Result<MessagesResponse, ExtractError>;
}

/// reqwest-backed client for the provider's messages endpoint.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    api_url: String,
    api_version: String,
}

impl AnthropicClient {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ExtractError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, config))
    }

    /// Use a caller-provided `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, config: &ExtractionConfig) -> Self {
        Self {
            http,
            api_url: config.api_url.clone(),
            api_version: config.api_version.clone(),
        }
    }

    /// Endpoint this client posts to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl MessagesApi for AnthropicClient {
    async fn create_message(
        &self,
        request: &MessagesRequest,
        api_key: &str,
    ) -> Result<MessagesResponse, ExtractError> {
        let response = self
            .http
            .post(&self.api_url)
            .header("anthropic-version", &self.api_version)
            .header("x-api-key", api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| ExtractError::UpstreamUnreachable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.bytes().await {
                Ok(body) => body,
                Err(e) => {
                    debug!("Failed to read error body from model provider: {e}");
                    Default::default()
                }
            };
            let message = upstream_error_message(status, &body);
            error!(status = status.as_u16(), %message, "Anthropic API error");
            return Err(ExtractError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            ExtractError::Internal(format!("Invalid response from model provider: {e}"))
        })?;

        if let Some(usage) = parsed.usage {
            debug!(
                "{} input tokens, {} output tokens",
                usage.input_tokens, usage.output_tokens
            );
        }
        Ok(parsed)
    }
}
