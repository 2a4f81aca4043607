//! settings-check — load Base Project settings the way a service does at
//! startup and print a redacted summary.
//!
//! # Usage
//!
//! ```bash
//! # Default .env at the workspace root, overlaid by the process environment
//! cargo run -p settings-check
//!
//! # Explicit env file, JSON output
//! cargo run -p settings-check -- --env-file deploy/staging.env --json
//! ```
//!
//! Exits non-zero when the configuration is incomplete or invalid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use base_api_client::UserClient;
use base_core::Settings;

mod summary;

use summary::SettingsSummary;

#[derive(Parser)]
#[command(about = "Validate Base Project settings and print a redacted summary")]
struct Args {
    /// Env file to read instead of the workspace-root `.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Tracing directive used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    base_core::tracing::init_tracing(&args.log);

    let settings = match &args.env_file {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .context("failed to load settings")?;

    let session = reqwest::Client::new();
    let users = UserClient::new(settings.base_url(), session);
    tracing::debug!(users = %users.resource_url(), "user client ready");

    let summary = SettingsSummary::new(&settings, &users);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{summary}");
    }
    Ok(())
}
