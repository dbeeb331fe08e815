//! # Graveyard - Mandataris Archive Service
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   apps/graveyard (THE SERVICE)                  │
//! │                                                                 │
//! │  ┌─────────────┐    ┌─────────────┐    ┌──────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │   Orchestrator   │    │
//! │  │  (clap)     │    │   (axum)    │    │  (archive runs)  │    │
//! │  └──────┬──────┘    └──────┬──────┘    └────────┬─────────┘    │
//! │         │                  │                    │              │
//! │         └──────────────────┼────────────────────┘              │
//! │                            ▼                                   │
//! │          ┌──────────────────┐    ┌──────────────────┐          │
//! │          │  graveyard-core  │    │  SPARQL endpoint │          │
//! │          │   (THE MODEL)    │    │   or local store │          │
//! │          └──────────────────┘    └──────────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Serve against the stack's SPARQL endpoint
//! MU_SPARQL_ENDPOINT=http://database:8890/sparql graveyard serve --host 0.0.0.0 --port 80
//!
//! # Try it locally
//! graveyard --backend redb load quads.json
//! graveyard --backend redb archive abc-123
//! graveyard --backend redb dump
//! ```

use clap::Parser;
use graveyard::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // GRAVEYARD_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GRAVEYARD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "graveyard=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  graveyard v{}
  mandataris archive service
"#,
        env!("CARGO_PKG_VERSION")
    );
}
