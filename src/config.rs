//! Configuration for the extraction endpoint.
//!
//! All upstream-facing knobs live in [`ExtractionConfig`], built via its
//! [`ExtractionConfigBuilder`]. None of them are caller-controlled: the
//! request body may only pick a model, and only when it names one. The
//! prompt itself is fixed (see [`crate::prompts`]) and not configurable.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Messages endpoint of the upstream model provider.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Value sent in the `anthropic-version` header.
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Model used when the request body omits `model`.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Upper bound on generated tokens per statement.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

/// Configuration shared by every extraction request.
///
/// # Example
/// ```rust
/// use statement_extract::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .default_model("claude-sonnet-4-20250514")
///     .max_tokens(4000)
///     .build()
///     .unwrap();
/// assert_eq!(config.max_tokens, 4000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Full URL of the upstream messages endpoint.
    ///
    /// Overridable so tests and self-hosted gateways can stand in for the
    /// provider. Default: [`DEFAULT_API_URL`].
    pub api_url: String,

    /// Provider protocol version header value. Default: [`DEFAULT_API_VERSION`].
    pub api_version: String,

    /// Model identifier used when the caller does not supply one.
    /// Default: [`DEFAULT_MODEL`].
    pub default_model: String,

    /// Maximum output tokens requested from the model. Default: 4000.
    ///
    /// A busy month of card activity runs to a few hundred transactions at
    /// roughly 25 tokens each; 4000 keeps the whole list inside one reply.
    pub max_tokens: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Pick the model for one request: the caller's choice when non-empty,
    /// otherwise the configured default.
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&self.default_model)
            .to_string()
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.config.default_model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, ExtractError> {
        let c = &self.config;
        if !(c.api_url.starts_with("http://") || c.api_url.starts_with("https://")) {
            return Err(ExtractError::InvalidConfig(format!(
                "API URL must be http:// or https://, got '{}'",
                c.api_url
            )));
        }
        if c.api_version.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "API version must not be empty".into(),
            ));
        }
        if c.default_model.trim().is_empty() {
            return Err(ExtractError::InvalidConfig(
                "Default model must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(ExtractError::InvalidConfig(
                "Max tokens must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
