//! The statement extraction handler.
//!
//! [`process_statement`] is the whole endpoint: one function from
//! (method, body) to a finished HTTP response, holding no state between
//! calls. Hosting (axum in [`crate::server`], or any other platform) only has
//! to hand it the method and raw body.
//!
//! ```text
//! OPTIONS ─────────────────────────────────────────────────▶ 200 (empty)
//! other non-POST ──────────────────────────────────────────▶ 405
//! POST ─▶ decode ─▶ validate ─▶ model call ─▶ parse ─▶ check ─▶ 200
//!           │          │            │           │        │
//!          500        400      upstream status  500     400
//! ```
//!
//! Every response, errors included, carries the CORS and content-type
//! headers so browser callers always get a readable answer.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use crate::pipeline::anthropic::{build_messages_request, MessagesApi};
use crate::pipeline::parse::{ensure_transactions, parse_model_output};
use crate::pipeline::request::ExtractionRequest;
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::{debug, error, info};

/// Add the fixed CORS and content-type headers to a response.
pub fn apply_cors_headers(response: &mut Response) {
    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
}

/// Handle one inbound request.
pub async fn process_statement(
    method: &Method,
    body: &[u8],
    api: &dyn MessagesApi,
    config: &ExtractionConfig,
) -> Response {
    let mut response = if method == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        match dispatch(method, body, api, config).await {
            Ok(result) => (StatusCode::OK, Json(result)).into_response(),
            Err(err) => {
                log_failure(&err);
                err.into_response()
            }
        }
    };
    apply_cors_headers(&mut response);
    response
}

async fn dispatch(
    method: &Method,
    body: &[u8],
    api: &dyn MessagesApi,
    config: &ExtractionConfig,
) -> Result<Value, ExtractError> {
    if method != Method::POST {
        return Err(ExtractError::MethodNotAllowed);
    }
    let request = ExtractionRequest::from_body(body)?;
    extract_transactions(request, api, config).await
}

/// Run the extraction pipeline for an already-decoded request.
///
/// Returns the model's object verbatim once it is known to hold a non-empty
/// `transactions` list.
pub async fn extract_transactions(
    request: ExtractionRequest,
    api: &dyn MessagesApi,
    config: &ExtractionConfig,
) -> Result<Value, ExtractError> {
    let validated = request.validate(config)?;
    info!("Processing bank statement with model: {}", validated.model);
    debug!("Document payload: {} bytes base64", validated.pdf_base64.len());

    let body = build_messages_request(&validated, config);
    let response = api.create_message(&body, &validated.api_key).await?;
    let text = response.first_text().ok_or_else(|| {
        ExtractError::Internal("Model response contained no text content".into())
    })?;
    info!("AI response received");

    let result = parse_model_output(text)?;
    let count = ensure_transactions(&result)?;
    info!("Extracted {} transactions", count);

    Ok(result)
}

// Client errors are the caller's problem; upstream and parse failures were
// already logged where they happened.
fn log_failure(err: &ExtractError) {
    match err {
        ExtractError::MethodNotAllowed
        | ExtractError::MissingInput
        | ExtractError::NoTransactions => debug!("Rejected request: {}", err),
        ExtractError::Upstream { .. } | ExtractError::UnparseableResponse { .. } => {}
        _ => error!("Function error: {}", err),
    }
}
