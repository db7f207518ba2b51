//! # experience - Executive Experience Registration
//!
//! The binary for the Transform 2026 executive-track registration system.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI interface for registration and staff operations
//! - Best-effort CRM contact sync
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                 apps/experience (THE BINARY)                 │
//! │                                                              │
//! │  ┌─────────────┐    ┌─────────────┐    ┌────────────────┐    │
//! │  │   CLI       │    │   HTTP API  │    │   CRM sync     │    │
//! │  │  (clap)     │    │   (axum)    │    │   (reqwest)    │    │
//! │  └──────┬──────┘    └──────┬──────┘    └───────┬────────┘    │
//! │         └──────────────────┼───────────────────┘             │
//! │                            ▼                                 │
//! │                  ┌──────────────────┐                        │
//! │                  │ experience-core  │                        │
//! │                  │   (THE LOGIC)    │                        │
//! │                  └──────────────────┘                        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! experience server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! experience register
//! experience eligibility --chro true --company-size under_5000
//! experience list
//! experience import -i legacy.json
//! ```

use clap::Parser;
use experience::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // EXPERIENCE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("EXPERIENCE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "experience=info,tower_http=debug".into());

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
  TRANSFORM 2026 · Executive Experience v{}

  Wynn Las Vegas · March 23-25
"#,
        env!("CARGO_PKG_VERSION")
    );
}
