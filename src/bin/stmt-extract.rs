//! CLI binary for statement-extract.
//!
//! `serve` hosts the extraction endpoint; `extract` runs one statement from
//! disk or a URL through the same pipeline and prints the result.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use statement_extract::pipeline::input::load_document;
use statement_extract::server::DEFAULT_MAX_BODY_BYTES;
use statement_extract::{
    extract_transactions, serve, AnthropicClient, AppState, ExtractError, ExtractionConfig,
    ExtractionOutput, ExtractionRequest,
};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Host the endpoint (browser posts { pdfBase64, apiKey, model? })
  stmt-extract serve --bind 0.0.0.0:8888

  # Extract one statement and print a table
  ANTHROPIC_API_KEY=sk-ant-... stmt-extract extract february.pdf

  # Raw JSON, exactly what the endpoint would return
  stmt-extract extract february.pdf --json > february.json

  # Statement behind a link, cheaper model
  stmt-extract extract https://bank.example.com/stmt/2026-02.pdf --model claude-haiku-4-20250514

ENVIRONMENT VARIABLES:
  ANTHROPIC_API_KEY   API key for `extract`
  STMT_BIND           Listen address for `serve`
  STMT_API_URL        Upstream messages endpoint
  STMT_API_VERSION    anthropic-version header value
  STMT_MODEL          Default model when requests omit one
  STMT_MAX_TOKENS     Max output tokens per statement
  RUST_LOG            Log filter (overrides --verbose / --quiet)
"#;

/// Extract business expenses from PDF bank statements with an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "stmt-extract",
    version,
    about = "Extract categorised business expenses from PDF bank statements",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    upstream: UpstreamArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "STMT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "STMT_QUIET")]
    quiet: bool,
}

#[derive(Args, Debug)]
struct UpstreamArgs {
    /// Upstream messages endpoint.
    #[arg(long, global = true, env = "STMT_API_URL", default_value = statement_extract::config::DEFAULT_API_URL)]
    api_url: String,

    /// Provider protocol version header.
    #[arg(long, global = true, env = "STMT_API_VERSION", default_value = statement_extract::config::DEFAULT_API_VERSION)]
    api_version: String,

    /// Model used when a request does not name one.
    #[arg(long, global = true, env = "STMT_MODEL", default_value = statement_extract::config::DEFAULT_MODEL)]
    default_model: String,

    /// Max output tokens per statement.
    #[arg(long, global = true, env = "STMT_MAX_TOKENS", default_value_t = statement_extract::config::DEFAULT_MAX_TOKENS)]
    max_tokens: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Host the extraction endpoint over HTTP.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "STMT_BIND", default_value = "127.0.0.1:8888")]
        bind: SocketAddr,

        /// Largest accepted request body in bytes.
        #[arg(long, env = "STMT_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
        max_body_bytes: usize,
    },

    /// Extract transactions from one statement and print them.
    Extract {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,

        /// API key for the model provider.
        #[arg(long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
        api_key: String,

        /// Model for this run (defaults to --default-model).
        #[arg(long)]
        model: Option<String>,

        /// Print the relayed JSON instead of a table.
        #[arg(long)]
        json: bool,

        /// HTTP download timeout in seconds for URL inputs.
        #[arg(long, env = "STMT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
        download_timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.upstream)?;

    match cli.command {
        Command::Serve {
            bind,
            max_body_bytes,
        } => {
            let api = AnthropicClient::new(&config).context("Failed to create model client")?;
            info!(
                upstream = api.api_url(),
                default_model = %config.default_model,
                "Forwarding statements to model provider"
            );
            let state = AppState::new(Arc::new(api), config).with_max_body_bytes(max_body_bytes);
            serve(bind, state)
                .await
                .with_context(|| format!("Server on {bind} failed"))?;
        }
        Command::Extract {
            input,
            api_key,
            model,
            json,
            download_timeout,
        } => {
            let pdf_base64 = load_document(&input, download_timeout)
                .await
                .with_context(|| format!("Failed to load statement '{input}'"))?;

            let api = AnthropicClient::new(&config).context("Failed to create model client")?;
            let request = ExtractionRequest {
                pdf_base64: Some(pdf_base64),
                api_key: Some(api_key),
                model,
            };

            let result = match extract_transactions(request, &api, &config).await {
                Ok(result) => result,
                Err(ExtractError::UnparseableResponse { raw }) => {
                    eprintln!("{}", red("Model reply was not JSON:"));
                    eprintln!("{raw}");
                    anyhow::bail!("Could not parse AI response");
                }
                Err(e) => return Err(e).context("Extraction failed"),
            };

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&result).context("Failed to serialise result")?
                );
            } else {
                match ExtractionOutput::from_value(&result) {
                    Ok(output) => print_table(&output, cli.quiet),
                    // The model strayed from the requested shape; show what it sent.
                    Err(_) => println!(
                        "{}",
                        serde_json::to_string_pretty(&result)
                            .context("Failed to serialise result")?
                    ),
                }
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(args: &UpstreamArgs) -> Result<ExtractionConfig> {
    ExtractionConfig::builder()
        .api_url(&args.api_url)
        .api_version(&args.api_version)
        .default_model(&args.default_model)
        .max_tokens(args.max_tokens)
        .build()
        .context("Invalid configuration")
}

fn print_table(output: &ExtractionOutput, quiet: bool) {
    let merchant_width = output
        .transactions
        .iter()
        .map(|t| t.merchant.chars().count())
        .max()
        .unwrap_or(8)
        .clamp(8, 40);

    println!(
        "{}",
        bold(&format!(
            "{:<10}  {:<merchant_width$}  {:>12}  {}",
            "Date", "Merchant", "Amount", "Category"
        ))
    );
    for t in &output.transactions {
        let merchant: String = t.merchant.chars().take(merchant_width).collect();
        println!(
            "{:<10}  {:<merchant_width$}  {:>12.2}  {}",
            t.date, merchant, t.amount, t.category_label
        );
    }

    if quiet {
        return;
    }
    eprintln!();
    for (category, total) in output.totals_by_category() {
        eprintln!("  {:<24} {}", category.label(), dim(&format!("{total:>12.2}")));
    }
    eprintln!(
        "{} {} transactions, {} total",
        green("✔"),
        bold(&output.transactions.len().to_string()),
        bold(&format!("{:.2}", output.total()))
    );
}
