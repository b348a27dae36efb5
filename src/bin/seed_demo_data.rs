// ABOUTME: Seeds a demo merchant connection plus synthetic reviews and runs one sync
// ABOUTME: Gives local runs of reviewsyncd something to show without real platform credentials
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `seed-demo-data` — populate a database for local demo runs.

use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;
use reviewsync::crypto::TokenEncryptor;
use reviewsync::database_plugins::factory::Database;
use reviewsync::database_plugins::DatabaseProvider;
use reviewsync::models::{ApiConnection, Review, SyncStatus, SyncType};
use reviewsync::providers::{ProviderRegistry, SyntheticProvider};
use reviewsync::sync::SyncService;
use tracing::info;

#[derive(Parser)]
#[command(name = "seed-demo-data", about = "Seed demo data for reviewsync", version)]
struct Args {
    /// Database URL, overriding DATABASE_URL
    #[arg(long)]
    database_url: Option<String>,

    /// Merchant to seed the connection under
    #[arg(long, default_value_t = 1)]
    merchant_id: i64,
}

fn demo_reviews() -> Vec<Review> {
    let now = Utc::now();
    [
        ("demo-1", "Mei Chen", Some(5.0), "Best dumplings in the city.", 9),
        ("demo-2", "Jordan Park", Some(4.0), "Solid lunch spot, gets busy.", 5),
        ("demo-3", "Ana Silva", None, "The new menu looks great!", 1),
    ]
    .into_iter()
    .map(|(id, author, rating, text, days_ago)| Review {
        platform_review_id: id.to_owned(),
        author_name: author.to_owned(),
        author_photo_url: String::new(),
        rating,
        review_text: text.to_owned(),
        review_reply: String::new(),
        reviewed_at: now - Duration::days(days_ago),
        metadata: serde_json::json!({ "source": "seed" }),
    })
    .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    reviewsync::logging::init_from_env()?;

    let database_url = args.database_url.unwrap_or_else(|| {
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/reviewsync.db".into())
    });
    let encryptor: TokenEncryptor = reviewsync::crypto::load_or_generate()?;
    let db = Database::new(&database_url).await?;

    let provider = Arc::new(SyntheticProvider::new());
    provider.set_reviews(demo_reviews());
    let mut registry = ProviderRegistry::new();
    registry.register(provider);

    let now = Utc::now();
    let connection = db
        .create_connection(&ApiConnection {
            id: 0,
            merchant_id: args.merchant_id,
            platform: reviewsync::platforms::SYNTHETIC.to_owned(),
            platform_account_id: "synthetic-account-1".to_owned(),
            platform_account_name: "Synthetic Demo Account".to_owned(),
            access_token: encryptor.encrypt("synthetic-token")?,
            refresh_token: encryptor.encrypt("synthetic-refresh")?,
            token_expires_at: now + Duration::hours(1),
            is_active: true,
            last_sync_at: None,
            sync_status: SyncStatus::Pending,
            error_message: None,
            created_at: now,
            updated_at: now,
        })
        .await?;
    info!(
        connection_id = connection.id,
        merchant_id = args.merchant_id,
        "Seeded demo connection"
    );

    let service = SyncService::new(db.clone(), Arc::new(registry), encryptor);
    let stats = service
        .sync_connection(connection.id, SyncType::Manual)
        .await?;
    info!(
        fetched = stats.total_fetched,
        added = stats.total_added,
        "Initial sync: {}",
        stats.summary()
    );

    let review_stats = db.get_merchant_review_stats(args.merchant_id).await?;
    println!(
        "Merchant {} now has {} reviews across {} platform(s), average rating {:.1}",
        args.merchant_id,
        review_stats.total_reviews,
        review_stats.platforms_connected,
        review_stats.average_rating
    );

    Ok(())
}
