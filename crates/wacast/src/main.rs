// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wacast - bulk WhatsApp template campaigns with delivery tracking.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod preview;
mod report;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Wacast - bulk WhatsApp template campaigns with delivery tracking.
#[derive(Parser, Debug)]
#[command(name = "wacast", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the operator gateway and webhook receiver.
    Serve,
    /// Show which numbers a submission would reach, without sending.
    Preview {
        /// Pasted recipients (comma, semicolon, or newline separated).
        #[arg(long)]
        text: Option<String>,
        /// CSV file with `country_code,phone` or `phone` rows.
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Spreadsheet (xlsx/xls/ods); the first sheet is read.
        #[arg(long)]
        sheet: Option<PathBuf>,
        /// Country code for rows that carry none, e.g. `+91`.
        #[arg(long = "default-cc")]
        default_cc: Option<String>,
    },
    /// Print the delivery report of a stored campaign.
    Report {
        /// Campaign id.
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match wacast_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            wacast_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Preview {
            text,
            csv,
            sheet,
            default_cc,
        }) => preview::run_preview(preview::PreviewArgs {
            text,
            csv,
            sheet,
            default_cc,
        }),
        Some(Commands::Report { id }) => report::run_report(&config, id).await,
        None => {
            println!("wacast: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wacast={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
