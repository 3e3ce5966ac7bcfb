//! Recover the JSON result from the model's free text.
//!
//! The prompt asks for bare JSON, but models still wrap answers in prose or
//! ```` ```json ```` fences from time to time. Recovery is a single greedy
//! span match: everything from the first `{` to the last `}`. When no such
//! span exists the whole text is handed to the parser, which then fails
//! with the raw text preserved for the caller.

use crate::error::ExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::error;

static RE_OUTER_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Greedy first-`{`-to-last-`}` span of `text`, if any.
pub fn locate_json_object(text: &str) -> Option<&str> {
    RE_OUTER_OBJECT.find(text).map(|m| m.as_str())
}

/// Parse the model's answer into a JSON value.
pub fn parse_model_output(text: &str) -> Result<Value, ExtractError> {
    let candidate = locate_json_object(text).unwrap_or(text);
    serde_json::from_str(candidate).map_err(|e| {
        error!(error = %e, raw = text, "Could not parse model response");
        ExtractError::UnparseableResponse {
            raw: text.to_string(),
        }
    })
}

/// Count the transactions in a parsed result.
///
/// Anything other than a non-empty `transactions` array is reported as
/// [`ExtractError::NoTransactions`]. Individual entries are not inspected.
pub fn ensure_transactions(value: &Value) -> Result<usize, ExtractError> {
    match value.get("transactions").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => Ok(list.len()),
        _ => Err(ExtractError::NoTransactions),
    }
}
