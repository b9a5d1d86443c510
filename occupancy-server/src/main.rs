//! Occupancy breakdown server
//!
//! Reads the gym occupancy log from Google Sheets and serves per-area people
//! counts as JSON alongside the single-page frontend.

mod api;
mod breakdown;
mod config;
mod server;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use log::info;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        "Starting occupancy-server (range {}, mode {}, frontend {})",
        config.sheet_range,
        config.strategy,
        config.frontend_dir.display()
    );
    if config.spreadsheet_id.is_none() {
        log::warn!("SPREADSHEET_ID is not set; /api/hourly_breakdown will return errors");
    }

    server::serve(config).await
}
