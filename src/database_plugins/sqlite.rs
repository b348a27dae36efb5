// ABOUTME: SQLite implementation of the persistence gateway contract
// ABOUTME: Thin wrapper delegating every trait method to the concrete Database
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite database implementation
//!
//! Wraps the concrete SQLite [`crate::database::Database`] to implement the
//! `DatabaseProvider` trait.

use anyhow::Result;
use async_trait::async_trait;
use reviewsync_core::models::{ApiConnection, ReviewStats, SyncLog, SyncType, SyncedReview};

use super::DatabaseProvider;

/// SQLite database implementation
#[derive(Clone)]
pub struct SqliteDatabase {
    inner: crate::database::Database,
}

impl SqliteDatabase {
    /// Get a reference to the inner database for advanced operations
    #[must_use]
    pub const fn inner(&self) -> &crate::database::Database {
        &self.inner
    }
}

#[async_trait]
impl DatabaseProvider for SqliteDatabase {
    async fn new(database_url: &str) -> Result<Self> {
        let inner = crate::database::Database::new(database_url).await?;
        Ok(Self { inner })
    }

    async fn migrate(&self) -> Result<()> {
        self.inner.migrate().await
    }

    async fn create_connection(&self, conn: &ApiConnection) -> Result<ApiConnection> {
        self.inner.create_connection(conn).await
    }

    async fn get_connection(&self, id: i64) -> Result<Option<ApiConnection>> {
        self.inner.get_connection(id).await
    }

    async fn get_connections_by_merchant(&self, merchant_id: i64) -> Result<Vec<ApiConnection>> {
        self.inner.get_connections_by_merchant(merchant_id).await
    }

    async fn get_connection_by_platform(
        &self,
        merchant_id: i64,
        platform: &str,
    ) -> Result<Option<ApiConnection>> {
        self.inner
            .get_connection_by_platform(merchant_id, platform)
            .await
    }

    async fn update_connection(&self, conn: &ApiConnection) -> Result<()> {
        self.inner.update_connection(conn).await
    }

    async fn delete_connection(&self, id: i64) -> Result<()> {
        self.inner.delete_connection(id).await
    }

    async fn get_active_connections(&self) -> Result<Vec<ApiConnection>> {
        self.inner.get_active_connections().await
    }

    async fn create_synced_review(&self, review: &SyncedReview) -> Result<SyncedReview> {
        self.inner.create_synced_review(review).await
    }

    async fn get_synced_review(&self, id: i64) -> Result<Option<SyncedReview>> {
        self.inner.get_synced_review(id).await
    }

    async fn get_synced_review_by_platform_id(
        &self,
        platform: &str,
        platform_review_id: &str,
    ) -> Result<Option<SyncedReview>> {
        self.inner
            .get_synced_review_by_platform_id(platform, platform_review_id)
            .await
    }

    async fn get_synced_reviews_by_merchant(
        &self,
        merchant_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SyncedReview>> {
        self.inner
            .get_synced_reviews_by_merchant(merchant_id, limit, offset)
            .await
    }

    async fn update_synced_review(&self, review: &SyncedReview) -> Result<()> {
        self.inner.update_synced_review(review).await
    }

    async fn delete_synced_review(&self, id: i64) -> Result<()> {
        self.inner.delete_synced_review(id).await
    }

    async fn get_merchant_review_stats(&self, merchant_id: i64) -> Result<ReviewStats> {
        self.inner.get_merchant_review_stats(merchant_id).await
    }

    async fn create_sync_log(
        &self,
        api_connection_id: i64,
        sync_type: SyncType,
    ) -> Result<SyncLog> {
        self.inner.create_sync_log(api_connection_id, sync_type).await
    }

    async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>> {
        self.inner.get_sync_log(id).await
    }

    async fn get_sync_logs_by_connection(
        &self,
        connection_id: i64,
        limit: i64,
    ) -> Result<Vec<SyncLog>> {
        self.inner
            .get_sync_logs_by_connection(connection_id, limit)
            .await
    }

    async fn update_sync_log(&self, log: &SyncLog) -> Result<()> {
        self.inner.update_sync_log(log).await
    }
}
