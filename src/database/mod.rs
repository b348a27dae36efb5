// ABOUTME: SQLite persistence for connections, synced reviews, and sync logs
// ABOUTME: Pool setup and in-code schema migrations; operations live in submodules
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! SQLite persistence for the sync engine: API connections, synced reviews,
//! and sync logs. The schema is migrated in code with idempotent
//! `CREATE TABLE IF NOT EXISTS` statements, so pointing the service at an
//! empty file is all the setup required.

mod connections;
mod reviews;
mod sync_logs;

use anyhow::Result;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for connection, review, and sync-log storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or any migration fails.
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:") {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any schema statement fails.
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_connections().await?;
        self.migrate_reviews().await?;
        self.migrate_sync_logs().await?;
        Ok(())
    }

    async fn migrate_connections(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS api_connections (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                merchant_id INTEGER NOT NULL,
                platform TEXT NOT NULL,
                platform_account_id TEXT NOT NULL DEFAULT '',
                platform_account_name TEXT NOT NULL DEFAULT '',
                access_token TEXT NOT NULL DEFAULT '',
                refresh_token TEXT NOT NULL DEFAULT '',
                token_expires_at DATETIME NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT true,
                last_sync_at DATETIME,
                sync_status TEXT NOT NULL DEFAULT 'pending',
                error_message TEXT,
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                UNIQUE(merchant_id, platform, platform_account_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_api_connections_merchant \
             ON api_connections(merchant_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_api_connections_active \
             ON api_connections(is_active, last_sync_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_reviews(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS synced_reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                merchant_id INTEGER NOT NULL,
                api_connection_id INTEGER
                    REFERENCES api_connections(id) ON DELETE SET NULL,
                platform TEXT NOT NULL,
                platform_review_id TEXT NOT NULL,
                author_name TEXT NOT NULL DEFAULT '',
                author_photo_url TEXT NOT NULL DEFAULT '',
                rating REAL,
                review_text TEXT NOT NULL DEFAULT '',
                review_reply TEXT NOT NULL DEFAULT '',
                reviewed_at DATETIME NOT NULL,
                synced_at DATETIME NOT NULL,
                is_visible BOOLEAN NOT NULL DEFAULT true,
                metadata TEXT NOT NULL DEFAULT '{}',
                created_at DATETIME NOT NULL,
                updated_at DATETIME NOT NULL,
                UNIQUE(platform, platform_review_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_synced_reviews_merchant \
             ON synced_reviews(merchant_id, reviewed_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn migrate_sync_logs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sync_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                api_connection_id INTEGER NOT NULL
                    REFERENCES api_connections(id) ON DELETE CASCADE,
                sync_type TEXT NOT NULL,
                status TEXT NOT NULL,
                reviews_fetched INTEGER NOT NULL DEFAULT 0,
                reviews_added INTEGER NOT NULL DEFAULT 0,
                reviews_updated INTEGER NOT NULL DEFAULT 0,
                error_message TEXT NOT NULL DEFAULT '',
                started_at DATETIME NOT NULL,
                completed_at DATETIME
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sync_logs_connection \
             ON sync_logs(api_connection_id, started_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
