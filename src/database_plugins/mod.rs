// ABOUTME: Persistence gateway abstraction consumed by the sync service and scheduler
// ABOUTME: Plugin architecture keeping a backend seam for databases beyond SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::Result;
use async_trait::async_trait;
use reviewsync_core::models::{ApiConnection, ReviewStats, SyncLog, SyncType, SyncedReview};

pub mod factory;
pub mod sqlite;

/// Core database abstraction trait.
///
/// The sync service and scheduler consume persistence exclusively through this
/// contract. Calls return an error on failure and never retry internally.
#[async_trait]
pub trait DatabaseProvider: Send + Sync + Clone {
    /// Create a new database connection and run migrations
    async fn new(database_url: &str) -> Result<Self>
    where
        Self: Sized;

    /// Run database migrations to set up schema
    async fn migrate(&self) -> Result<()>;

    // ================================
    // API Connections
    // ================================

    /// Create a new API connection, returning the stored row
    async fn create_connection(&self, conn: &ApiConnection) -> Result<ApiConnection>;

    /// Get a connection by id
    async fn get_connection(&self, id: i64) -> Result<Option<ApiConnection>>;

    /// List a merchant's connections, newest first
    async fn get_connections_by_merchant(&self, merchant_id: i64) -> Result<Vec<ApiConnection>>;

    /// Get a merchant's connection for one platform
    async fn get_connection_by_platform(
        &self,
        merchant_id: i64,
        platform: &str,
    ) -> Result<Option<ApiConnection>>;

    /// Update a connection as a whole-record write
    async fn update_connection(&self, conn: &ApiConnection) -> Result<()>;

    /// Delete a connection
    async fn delete_connection(&self, id: i64) -> Result<()>;

    /// List active connections, oldest-synced first with never-synced first
    async fn get_active_connections(&self) -> Result<Vec<ApiConnection>>;

    // ================================
    // Synced Reviews
    // ================================

    /// Insert a new synced review, returning the stored row
    async fn create_synced_review(&self, review: &SyncedReview) -> Result<SyncedReview>;

    /// Get a synced review by id
    async fn get_synced_review(&self, id: i64) -> Result<Option<SyncedReview>>;

    /// Look up a review by its stable `(platform, platform_review_id)` key
    async fn get_synced_review_by_platform_id(
        &self,
        platform: &str,
        platform_review_id: &str,
    ) -> Result<Option<SyncedReview>>;

    /// List a merchant's visible reviews, most recently authored first
    async fn get_synced_reviews_by_merchant(
        &self,
        merchant_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SyncedReview>>;

    /// Update a review's mutable fields in place
    async fn update_synced_review(&self, review: &SyncedReview) -> Result<()>;

    /// Delete a synced review
    async fn delete_synced_review(&self, id: i64) -> Result<()>;

    /// Aggregate a merchant's visible reviews
    async fn get_merchant_review_stats(&self, merchant_id: i64) -> Result<ReviewStats>;

    // ================================
    // Sync Logs
    // ================================

    /// Create a sync log row with status `started`
    async fn create_sync_log(&self, api_connection_id: i64, sync_type: SyncType)
        -> Result<SyncLog>;

    /// Get a sync log by id
    async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>>;

    /// List a connection's sync logs, newest first, up to `limit`
    async fn get_sync_logs_by_connection(
        &self,
        connection_id: i64,
        limit: i64,
    ) -> Result<Vec<SyncLog>>;

    /// Close or amend a sync log
    async fn update_sync_log(&self, log: &SyncLog) -> Result<()>;
}
