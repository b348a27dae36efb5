// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides database, encryption, and synthetic-provider harness helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
#![allow(
    dead_code,
    missing_docs,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `reviewsync`
//!
//! Common setup functions to reduce duplication across integration tests.

use std::sync::{Arc, Once};

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use reviewsync::{
    crypto::TokenEncryptor,
    database_plugins::{factory::Database, DatabaseProvider},
    models::{ApiConnection, Review, SyncStatus},
    platforms,
    providers::{ProviderRegistry, SyntheticProvider},
    sync::SyncService,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Standard in-memory test database
pub async fn create_test_database() -> Result<Database> {
    init_test_logging();
    Database::new("sqlite::memory:").await
}

/// File-backed test database for tests that exercise concurrent pool access.
/// The returned `TempDir` must stay alive for the database's lifetime.
pub async fn create_file_database() -> Result<(Database, tempfile::TempDir)> {
    init_test_logging();
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite:{}/test.db", dir.path().display());
    let db = Database::new(&url).await?;
    Ok((db, dir))
}

/// Encryptor with a fixed key so tokens survive across helpers
pub fn test_encryptor() -> TokenEncryptor {
    TokenEncryptor::new(&[7u8; 32]).expect("32-byte key")
}

/// Seed an active synthetic-platform connection whose tokens decrypt to
/// `synthetic-token` / `synthetic-refresh`, matching a fresh `SyntheticProvider`
pub async fn seed_connection(
    db: &Database,
    encryptor: &TokenEncryptor,
    merchant_id: i64,
) -> Result<ApiConnection> {
    seed_connection_on(db, encryptor, merchant_id, platforms::SYNTHETIC).await
}

/// Seed an active connection on an arbitrary platform name
pub async fn seed_connection_on(
    db: &Database,
    encryptor: &TokenEncryptor,
    merchant_id: i64,
    platform: &str,
) -> Result<ApiConnection> {
    let now = Utc::now();
    let connection = db
        .create_connection(&ApiConnection {
            id: 0,
            merchant_id,
            platform: platform.to_owned(),
            platform_account_id: format!("account-{merchant_id}"),
            platform_account_name: "Test Account".to_owned(),
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
    Ok(connection)
}

/// Build a normalized review DTO for scripting the synthetic provider
pub fn make_review(platform_review_id: &str, reviewed_at: DateTime<Utc>) -> Review {
    Review {
        platform_review_id: platform_review_id.to_owned(),
        author_name: format!("Author of {platform_review_id}"),
        author_photo_url: String::new(),
        rating: Some(4.0),
        review_text: format!("Review text for {platform_review_id}"),
        review_reply: String::new(),
        reviewed_at,
        metadata: serde_json::json!({}),
    }
}

/// Build a sync service over one synthetic provider
pub fn build_service(db: Database, provider: Arc<SyntheticProvider>) -> SyncService {
    let mut registry = ProviderRegistry::new();
    registry.register(provider);
    SyncService::new(db, Arc::new(registry), test_encryptor())
}
