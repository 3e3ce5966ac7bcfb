//! Pipeline stages for statement extraction.
//!
//! Each submodule implements exactly one step and is testable on its own.
//!
//! ## Data Flow
//!
//! ```text
//! request ──▶ anthropic ──▶ parse
//! (validate)  (model call)  (recover JSON, check list)
//! ```
//!
//! 1. [`request`]   — decode the inbound body, require `pdfBase64` + `apiKey`,
//!    resolve the model
//! 2. [`anthropic`] — build the two-block message and make the single upstream
//!    call; the only stage with network I/O
//! 3. [`parse`]     — greedy `{…}` recovery from the model's text, then the
//!    non-empty `transactions` check
//!
//! [`input`] sits outside the request path: it turns a local file or URL
//! into the base64 document the CLI feeds into stage 1.

pub mod anthropic;
pub mod input;
pub mod parse;
pub mod request;
