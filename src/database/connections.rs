// ABOUTME: API connection CRUD operations for merchant platform credentials
// ABOUTME: Token columns always hold ciphertext; encryption happens in the sync layer
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::{anyhow, Result};
use chrono::Utc;
use reviewsync_core::models::ApiConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Database;

/// Columns selected for every connection read, in `map_connection` order.
const CONNECTION_COLUMNS: &str = "id, merchant_id, platform, platform_account_id, \
     platform_account_name, access_token, refresh_token, token_expires_at, is_active, \
     last_sync_at, sync_status, error_message, created_at, updated_at";

fn map_connection(row: &SqliteRow) -> Result<ApiConnection> {
    let status: String = row.try_get("sync_status")?;
    Ok(ApiConnection {
        id: row.try_get("id")?,
        merchant_id: row.try_get("merchant_id")?,
        platform: row.try_get("platform")?,
        platform_account_id: row.try_get("platform_account_id")?,
        platform_account_name: row.try_get("platform_account_name")?,
        access_token: row.try_get("access_token")?,
        refresh_token: row.try_get("refresh_token")?,
        token_expires_at: row.try_get("token_expires_at")?,
        is_active: row.try_get("is_active")?,
        last_sync_at: row.try_get("last_sync_at")?,
        sync_status: status.parse().map_err(|e: String| anyhow!(e))?,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Database {
    /// Create a new API connection, returning the stored row.
    ///
    /// The `id`, `created_at`, and `updated_at` fields of the input are
    /// ignored and assigned here; `sync_status` starts as `pending`.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including unique-constraint
    /// violations for an already-connected (merchant, platform, account).
    pub async fn create_connection(&self, conn: &ApiConnection) -> Result<ApiConnection> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r"
            INSERT INTO api_connections (
                merchant_id, platform, platform_account_id, platform_account_name,
                access_token, refresh_token, token_expires_at, is_active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CONNECTION_COLUMNS}
            "
        ))
        .bind(conn.merchant_id)
        .bind(&conn.platform)
        .bind(&conn.platform_account_id)
        .bind(&conn.platform_account_name)
        .bind(&conn.access_token)
        .bind(&conn.refresh_token)
        .bind(conn.token_expires_at)
        .bind(conn.is_active)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        map_connection(&row)
    }

    /// Get a connection by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_connection(&self, id: i64) -> Result<Option<ApiConnection>> {
        let row = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM api_connections WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_connection).transpose()
    }

    /// List a merchant's connections, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_connections_by_merchant(&self, merchant_id: i64) -> Result<Vec<ApiConnection>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM api_connections \
             WHERE merchant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_connection).collect()
    }

    /// Get a merchant's connection for one platform.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_connection_by_platform(
        &self,
        merchant_id: i64,
        platform: &str,
    ) -> Result<Option<ApiConnection>> {
        let row = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM api_connections \
             WHERE merchant_id = $1 AND platform = $2 LIMIT 1"
        ))
        .bind(merchant_id)
        .bind(platform)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_connection).transpose()
    }

    /// Update a connection as a whole-record write.
    ///
    /// All mutable columns are rewritten from the passed record, so callers
    /// must read-mutate-write the full record rather than patching fields.
    /// `merchant_id`, `platform`, and `created_at` are immutable.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_connection(&self, conn: &ApiConnection) -> Result<()> {
        sqlx::query(
            r"
            UPDATE api_connections
            SET platform_account_id = $1, platform_account_name = $2, access_token = $3,
                refresh_token = $4, token_expires_at = $5, is_active = $6, last_sync_at = $7,
                sync_status = $8, error_message = $9, updated_at = $10
            WHERE id = $11
            ",
        )
        .bind(&conn.platform_account_id)
        .bind(&conn.platform_account_name)
        .bind(&conn.access_token)
        .bind(&conn.refresh_token)
        .bind(conn.token_expires_at)
        .bind(conn.is_active)
        .bind(conn.last_sync_at)
        .bind(conn.sync_status.as_str())
        .bind(&conn.error_message)
        .bind(Utc::now())
        .bind(conn.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a connection. Reviews synced through it keep their rows with a
    /// cleared connection reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_connection(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM api_connections WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// List active connections ordered oldest-synced-first, with never-synced
    /// connections first. This is the scheduler's work queue order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_active_connections(&self) -> Result<Vec<ApiConnection>> {
        let rows = sqlx::query(&format!(
            "SELECT {CONNECTION_COLUMNS} FROM api_connections \
             WHERE is_active = true ORDER BY last_sync_at ASC NULLS FIRST"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_connection).collect()
    }
}
