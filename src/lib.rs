//! # statement-extract
//!
//! Turn a PDF bank statement into a categorised list of business expenses
//! by handing it to a large language model.
//!
//! The crate is one stateless HTTP endpoint plus the pieces it is made of.
//! A browser posts `{ pdfBase64, apiKey, model? }`. The statement goes
//! upstream with a fixed extraction instruction, and the model's JSON comes
//! back as `{ "transactions": [ … ] }`.
//!
//! ## Pipeline Overview
//!
//! ```text
//! HTTP request
//!  │
//!  ├─ 1. Gate      OPTIONS → 200, non-POST → 405
//!  ├─ 2. Validate  pdfBase64 + apiKey present, model defaulted
//!  ├─ 3. Prompt    fixed instruction with the 19-label category taxonomy
//!  ├─ 4. Model     one POST to /v1/messages, document + text blocks
//!  ├─ 5. Recover   greedy first-{ to last-} span, JSON parse
//!  ├─ 6. Check     non-empty transactions list
//!  └─ 7. Respond   model object verbatim, CORS headers on everything
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use statement_extract::{router, AnthropicClient, AppState, ExtractionConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractionConfig::default();
//!     let api = Arc::new(AnthropicClient::new(&config)?);
//!     let app = router(AppState::new(api, config));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8888").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `stmt-extract` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod handler;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod server;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExtractionConfig, ExtractionConfigBuilder};
pub use error::ExtractError;
pub use handler::{extract_transactions, process_statement};
pub use output::{Category, ExtractionOutput, Transaction};
pub use pipeline::anthropic::{AnthropicClient, MessagesApi, MessagesRequest, MessagesResponse};
pub use pipeline::request::ExtractionRequest;
pub use server::{router, serve, AppState};
