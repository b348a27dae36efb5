// ABOUTME: Daemon entry point: config, database, provider registry, scheduler
// ABOUTME: Runs scheduled syncs until SIGINT, then stops the scheduler cooperatively
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reviewsyncd` — the review sync daemon.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use reviewsync::config::ServiceConfig;
use reviewsync::database_plugins::factory::Database;
use reviewsync::database_plugins::DatabaseProvider;
use reviewsync::providers::{ProviderRegistry, SyntheticProvider};
use reviewsync::sync::{SyncScheduler, SyncService};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "reviewsyncd", about = "Review synchronization daemon", version)]
struct Args {
    /// Database URL, overriding DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Register the in-memory synthetic provider (local demo runs)
    #[arg(long)]
    synthetic: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    reviewsync::logging::init_from_env()?;

    let mut config = ServiceConfig::from_env();
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    info!("Starting reviewsyncd: {}", config.summary());

    let encryptor = reviewsync::crypto::load_or_generate()?;
    let db = Database::new(&config.database_url).await?;

    let mut registry = ProviderRegistry::new();
    if args.synthetic {
        registry.register(Arc::new(SyntheticProvider::new()));
    }
    if registry.is_empty() {
        warn!("No review providers registered; scheduled syncs will fail for every platform");
    } else {
        info!(platforms = ?registry.supported_platforms(), "Review providers ready");
    }

    let service = SyncService::new(db.clone(), Arc::new(registry), encryptor);
    let scheduler = Arc::new(SyncScheduler::new(service, db, config.scheduler));
    scheduler.start();

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping scheduler");
    scheduler.stop();

    Ok(())
}
