//! # Stagecraft
//!
//! The command-line host for the Stagecraft session engine.
//!
//! This application provides:
//! - CLI interface standing in for the planning screens
//! - Portable document export and import
//! - Backup and restore through a redb store
//!
//! ## Usage
//!
//! ```bash
//! stagecraft init
//! stagecraft export -o ./exports
//! stagecraft import -i stagecraft-session-2024-06-01.json
//! stagecraft restore --key nightly
//! ```

use clap::Parser;
use stagecraft::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // STAGECRAFT_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("STAGECRAFT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stagecraft=info,stagecraft_core=info".into());

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

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Stagecraft startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌┬┐┌─┐┌─┐┌─┐┌─┐┬─┐┌─┐┌─┐┌┬┐
  └─┐ │ ├─┤│ ┬├┤ │  ├┬┘├─┤├┤  │
  └─┘ ┴ ┴ ┴└─┘└─┘└─┘┴└─┴ ┴└   ┴

  Session Engine v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
