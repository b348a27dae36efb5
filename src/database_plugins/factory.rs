// ABOUTME: Database factory that selects a backend from the connection URL scheme
// ABOUTME: Wraps backend implementations in an enum so callers stay backend-agnostic
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database factory for selecting a backend implementation at runtime.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reviewsync_core::models::{ApiConnection, ReviewStats, SyncLog, SyncType, SyncedReview};
use tracing::info;

use super::sqlite::SqliteDatabase;
use super::DatabaseProvider;

/// Database backend selected from the connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite file or in-memory database
    Sqlite,
}

/// Detect the backend a database URL refers to.
///
/// # Errors
///
/// Returns an error for `postgresql://` URLs (backend not enabled in this
/// build) and for any unrecognized scheme.
pub fn detect_database_type(database_url: &str) -> Result<DatabaseType> {
    if database_url.starts_with("sqlite:") {
        return Ok(DatabaseType::Sqlite);
    }
    if database_url.starts_with("postgresql://") || database_url.starts_with("postgres://") {
        return Err(anyhow!(
            "PostgreSQL backend is not enabled in this build (database_url: {database_url})"
        ));
    }
    Err(anyhow!("Unsupported database URL: {database_url}"))
}

/// Runtime-selected database backend.
///
/// Every [`DatabaseProvider`] call delegates to the wrapped implementation.
#[derive(Clone)]
pub enum Database {
    /// SQLite backend
    Sqlite(SqliteDatabase),
}

impl Database {
    /// Human-readable backend description for startup logging.
    #[must_use]
    pub const fn backend_info(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "SQLite (file or in-memory)",
        }
    }
}

#[async_trait]
impl DatabaseProvider for Database {
    async fn new(database_url: &str) -> Result<Self> {
        let db = match detect_database_type(database_url)? {
            DatabaseType::Sqlite => Self::Sqlite(SqliteDatabase::new(database_url).await?),
        };
        info!("Database backend selected: {}", db.backend_info());
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.migrate().await,
        }
    }

    async fn create_connection(&self, conn: &ApiConnection) -> Result<ApiConnection> {
        match self {
            Self::Sqlite(db) => db.create_connection(conn).await,
        }
    }

    async fn get_connection(&self, id: i64) -> Result<Option<ApiConnection>> {
        match self {
            Self::Sqlite(db) => db.get_connection(id).await,
        }
    }

    async fn get_connections_by_merchant(&self, merchant_id: i64) -> Result<Vec<ApiConnection>> {
        match self {
            Self::Sqlite(db) => db.get_connections_by_merchant(merchant_id).await,
        }
    }

    async fn get_connection_by_platform(
        &self,
        merchant_id: i64,
        platform: &str,
    ) -> Result<Option<ApiConnection>> {
        match self {
            Self::Sqlite(db) => db.get_connection_by_platform(merchant_id, platform).await,
        }
    }

    async fn update_connection(&self, conn: &ApiConnection) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.update_connection(conn).await,
        }
    }

    async fn delete_connection(&self, id: i64) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.delete_connection(id).await,
        }
    }

    async fn get_active_connections(&self) -> Result<Vec<ApiConnection>> {
        match self {
            Self::Sqlite(db) => db.get_active_connections().await,
        }
    }

    async fn create_synced_review(&self, review: &SyncedReview) -> Result<SyncedReview> {
        match self {
            Self::Sqlite(db) => db.create_synced_review(review).await,
        }
    }

    async fn get_synced_review(&self, id: i64) -> Result<Option<SyncedReview>> {
        match self {
            Self::Sqlite(db) => db.get_synced_review(id).await,
        }
    }

    async fn get_synced_review_by_platform_id(
        &self,
        platform: &str,
        platform_review_id: &str,
    ) -> Result<Option<SyncedReview>> {
        match self {
            Self::Sqlite(db) => {
                db.get_synced_review_by_platform_id(platform, platform_review_id)
                    .await
            }
        }
    }

    async fn get_synced_reviews_by_merchant(
        &self,
        merchant_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SyncedReview>> {
        match self {
            Self::Sqlite(db) => {
                db.get_synced_reviews_by_merchant(merchant_id, limit, offset)
                    .await
            }
        }
    }

    async fn update_synced_review(&self, review: &SyncedReview) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.update_synced_review(review).await,
        }
    }

    async fn delete_synced_review(&self, id: i64) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.delete_synced_review(id).await,
        }
    }

    async fn get_merchant_review_stats(&self, merchant_id: i64) -> Result<ReviewStats> {
        match self {
            Self::Sqlite(db) => db.get_merchant_review_stats(merchant_id).await,
        }
    }

    async fn create_sync_log(
        &self,
        api_connection_id: i64,
        sync_type: SyncType,
    ) -> Result<SyncLog> {
        match self {
            Self::Sqlite(db) => db.create_sync_log(api_connection_id, sync_type).await,
        }
    }

    async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>> {
        match self {
            Self::Sqlite(db) => db.get_sync_log(id).await,
        }
    }

    async fn get_sync_logs_by_connection(
        &self,
        connection_id: i64,
        limit: i64,
    ) -> Result<Vec<SyncLog>> {
        match self {
            Self::Sqlite(db) => db.get_sync_logs_by_connection(connection_id, limit).await,
        }
    }

    async fn update_sync_log(&self, log: &SyncLog) -> Result<()> {
        match self {
            Self::Sqlite(db) => db.update_sync_log(log).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlite_urls_detected() {
        assert_eq!(
            detect_database_type("sqlite::memory:").expect("should detect"),
            DatabaseType::Sqlite
        );
        assert_eq!(
            detect_database_type("sqlite:data/reviewsync.db").expect("should detect"),
            DatabaseType::Sqlite
        );
    }

    #[test]
    fn postgres_urls_rejected_as_not_enabled() {
        let err = detect_database_type("postgresql://localhost/reviews").unwrap_err();
        assert!(err.to_string().contains("not enabled"));
    }

    #[test]
    fn unknown_schemes_rejected() {
        let err = detect_database_type("mysql://localhost/reviews").unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }
}
