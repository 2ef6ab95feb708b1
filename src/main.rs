//! # UEC News Bot
//!
//! Scrapes the UEC announcements page, detects items published since the
//! last run, and posts them to a Slack channel in oldest-first order.
//!
//! ## Usage
//!
//! ```sh
//! uec_news_bot --init   # once: write placeholder config.yaml + state.json
//! uec_news_bot          # each scheduled run: check and notify
//! ```
//!
//! ## Architecture
//!
//! One run is a straight pipeline:
//! 1. **Fetch**: download the announcements listing page
//! 2. **Extract**: heuristically parse anchors into dated news items
//! 3. **Diff**: cut the list at the persisted last-notified URL
//! 4. **Notify**: post each new item to Slack, oldest first, rate-limited
//! 5. **Persist**: record the newest item's URL for the next run
//!
//! Scheduling is external (cron or similar); the process runs to completion
//! and exits. Run failures are posted to the channel as a single error
//! notice and never crash the process.

use clap::Parser;
use std::error::Error;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod notifier;
mod scrapers;
mod slack;
mod state;

use cli::Cli;
use config::Config;
use fetch::HttpFetcher;
use notifier::Notifier;
use slack::SlackSink;
use state::FileStateStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let args = Cli::parse();
    debug!(?args.config, ?args.state, args.init, "Parsed CLI arguments");

    if args.init {
        Config::write_placeholder(&args.config)?;
        FileStateStore::new(&args.state).initialize().await?;
        info!("Initialization complete; set slack_token and slack_channel_id before the first run");
        return Ok(());
    }

    let config = Config::load(&args.config)?;
    info!(config_path = %args.config, page_url = %config.page_url, "Loaded configuration");

    let notifier = Notifier::new(
        &config,
        HttpFetcher::new(),
        SlackSink::new(&config),
        FileStateStore::new(&args.state),
    )?;
    notifier.run().await;

    Ok(())
}
