//! Error types for the statement-extract library.
//!
//! Every failure is terminal for the request it belongs to: there is no
//! partial result and no retry. [`ExtractError`] therefore doubles as the
//! HTTP error surface. Each variant knows its status code ([`ExtractError::status`])
//! and renders itself as the JSON error body the endpoint returns:
//!
//! * `{ "error": "<message>" }` for every variant, and
//! * `{ "error": "<message>", "raw": "<model text>" }` for
//!   [`ExtractError::UnparseableResponse`], the one case where the upstream
//!   payload is exposed so prompt/model drift can be diagnosed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the statement-extract library.
#[derive(Debug, Error)]
pub enum ExtractError {
    // ── Routing errors ────────────────────────────────────────────────────
    /// The endpoint only accepts `POST` (and `OPTIONS` pre-flight).
    #[error("Method not allowed")]
    MethodNotAllowed,

    // ── Client input errors ───────────────────────────────────────────────
    /// `pdfBase64` or `apiKey` is absent or empty.
    #[error("Missing pdfBase64 or apiKey")]
    MissingInput,

    /// The model answered, but the statement yielded no expenses.
    #[error("No transactions found in statement")]
    NoTransactions,

    // ── Upstream errors ───────────────────────────────────────────────────
    /// The model provider returned a non-success status. Relayed verbatim.
    #[error("Anthropic API error: {message}")]
    Upstream { status: u16, message: String },

    /// The request never produced an HTTP response (DNS, TLS, reset, …).
    #[error("Failed to reach model provider: {reason}")]
    UpstreamUnreachable { reason: String },

    /// The model's text contained no JSON object we could parse.
    #[error("Could not parse AI response")]
    UnparseableResponse { raw: String },

    // ── Request body errors ───────────────────────────────────────────────
    /// The inbound body is not a JSON object of the expected shape.
    #[error("{0}")]
    InvalidBody(String),

    // ── CLI input errors ──────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Statement file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("{0}")]
    Internal(String),
}

impl ExtractError {
    /// HTTP status the endpoint answers with for this error.
    ///
    /// Upstream failures mirror the provider's own status; an out-of-range
    /// code (which a well-behaved server never sends) degrades to 502.
    pub fn status(&self) -> StatusCode {
        match self {
            ExtractError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ExtractError::MissingInput | ExtractError::NoTransactions => StatusCode::BAD_REQUEST,
            ExtractError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body returned to the caller.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl From<&ExtractError> for ErrorBody {
    fn from(err: &ExtractError) -> Self {
        let raw = match err {
            ExtractError::UnparseableResponse { raw } => Some(raw.clone()),
            _ => None,
        };
        ErrorBody {
            error: err.to_string(),
            raw,
        }
    }
}

impl IntoResponse for ExtractError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::from(&self))).into_response()
    }
}
