//! # bpkit - Blueprint Toolbox
//!
//! The main binary for decoding, editing and building factory blueprints.
//!
//! This application provides:
//! - CLI commands for exchange strings and documents
//! - HTTP REST API server (axum-based)
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/bpkit (THE BINARY)          │
//! │                                               │
//! │   ┌─────────────┐          ┌─────────────┐    │
//! │   │    CLI      │          │  HTTP API   │    │
//! │   │   (clap)    │          │   (axum)    │    │
//! │   └──────┬──────┘          └──────┬──────┘    │
//! │          └──────────┬─────────────┘           │
//! │                     ▼                         │
//! │             ┌───────────────┐                 │
//! │             │  bpkit-core   │                 │
//! │             │  (THE CODEC)  │                 │
//! │             └───────────────┘                 │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Decode and re-encode
//! bpkit decode -i blueprint.txt -o blueprint.json
//! bpkit encode -i blueprint.json
//!
//! # Build and wire
//! bpkit pack -C signals.json -i values.txt -o rom.txt
//! bpkit wire -i rom.txt --from 1 --to 2 --code oi --colors rg
//!
//! # Start the HTTP server
//! bpkit server --host 0.0.0.0 --port 8080
//! ```

use bpkit::cli;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // BPKIT_LOG_FORMAT=json enables machine-parseable output. Logs go to
    // stderr so stdout stays clean for exchange strings.
    let log_format = std::env::var("BPKIT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bpkit=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
