//! Inbound payload: decode the JSON body and check required fields.

use crate::config::ExtractionConfig;
use crate::error::ExtractError;
use serde_json::Value;
use std::fmt;

/// The request body as sent by the browser.
///
/// Every field is optional at the decoding layer so that a missing field
/// surfaces as [`ExtractError::MissingInput`] (400) rather than as a decoder
/// error.
#[derive(Clone, Default)]
pub struct ExtractionRequest {
    /// Base64-encoded PDF bytes.
    pub pdf_base64: Option<String>,
    /// Caller's credential for the model provider, forwarded verbatim.
    pub api_key: Option<String>,
    /// Upstream model identifier.
    pub model: Option<String>,
}

// Hand-written so the credential and the document never reach a log line.
impl fmt::Debug for ExtractionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionRequest")
            .field("pdf_base64", &self.pdf_base64.as_ref().map(|d| d.len()))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .finish()
    }
}

/// A field counts only when it is a non-empty string.
fn string_field(object: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

impl ExtractionRequest {
    /// Decode a raw request body.
    ///
    /// Bytes that are not JSON, and a literal `null`, fail the whole request
    /// with [`ExtractError::InvalidBody`]. Any other JSON value decodes: an
    /// array or scalar has no fields at all, and a field that is not a
    /// non-empty string is treated as absent, so both end in
    /// [`ExtractError::MissingInput`] at [`validate`](Self::validate).
    pub fn from_body(body: &[u8]) -> Result<Self, ExtractError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ExtractError::InvalidBody(e.to_string()))?;

        match value {
            Value::Null => Err(ExtractError::InvalidBody(
                "Request body is null".to_string(),
            )),
            Value::Object(object) => Ok(Self {
                pdf_base64: string_field(&object, "pdfBase64"),
                api_key: string_field(&object, "apiKey"),
                model: string_field(&object, "model"),
            }),
            _ => Ok(Self::default()),
        }
    }

    /// Check required fields and resolve the model.
    ///
    /// Empty strings count as missing.
    pub fn validate(self, config: &ExtractionConfig) -> Result<ValidatedRequest, ExtractError> {
        let pdf_base64 = self.pdf_base64.filter(|s| !s.is_empty());
        let api_key = self.api_key.filter(|s| !s.is_empty());

        match (pdf_base64, api_key) {
            (Some(pdf_base64), Some(api_key)) => Ok(ValidatedRequest {
                pdf_base64,
                api_key,
                model: config.resolve_model(self.model.as_deref()),
            }),
            _ => Err(ExtractError::MissingInput),
        }
    }
}

/// A request that passed validation and is ready to go upstream.
#[derive(Clone)]
pub struct ValidatedRequest {
    pub pdf_base64: String,
    pub api_key: String,
    pub model: String,
}

impl fmt::Debug for ValidatedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedRequest")
            .field("pdf_base64_len", &self.pdf_base64.len())
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}
