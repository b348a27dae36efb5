// ABOUTME: Append-only sync log records, one per sync attempt
// ABOUTME: Created as 'started' before work, closed with counts or an error afterwards
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::{anyhow, Result};
use chrono::Utc;
use reviewsync_core::models::{SyncLog, SyncType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Database;

/// Columns selected for every sync log read, in `map_sync_log` order.
const SYNC_LOG_COLUMNS: &str = "id, api_connection_id, sync_type, status, reviews_fetched, \
     reviews_added, reviews_updated, error_message, started_at, completed_at";

fn map_sync_log(row: &SqliteRow) -> Result<SyncLog> {
    let sync_type: String = row.try_get("sync_type")?;
    let status: String = row.try_get("status")?;
    Ok(SyncLog {
        id: row.try_get("id")?,
        api_connection_id: row.try_get("api_connection_id")?,
        sync_type: sync_type.parse().map_err(|e: String| anyhow!(e))?,
        status: status.parse().map_err(|e: String| anyhow!(e))?,
        reviews_fetched: row.try_get("reviews_fetched")?,
        reviews_added: row.try_get("reviews_added")?,
        reviews_updated: row.try_get("reviews_updated")?,
        error_message: row.try_get("error_message")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
    })
}

impl Database {
    /// Create a sync log row with status `started`, returning the stored row.
    /// This happens before any sync work so a crash still leaves a durable
    /// record of the attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create_sync_log(
        &self,
        api_connection_id: i64,
        sync_type: SyncType,
    ) -> Result<SyncLog> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO sync_logs (api_connection_id, sync_type, status, started_at)
            VALUES ($1, $2, 'started', $3)
            RETURNING {SYNC_LOG_COLUMNS}
            "
        ))
        .bind(api_connection_id)
        .bind(sync_type.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        map_sync_log(&row)
    }

    /// Get a sync log by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_sync_log(&self, id: i64) -> Result<Option<SyncLog>> {
        let row = sqlx::query(&format!(
            "SELECT {SYNC_LOG_COLUMNS} FROM sync_logs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_sync_log).transpose()
    }

    /// List a connection's sync logs, newest first, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_sync_logs_by_connection(
        &self,
        connection_id: i64,
        limit: i64,
    ) -> Result<Vec<SyncLog>> {
        let rows = sqlx::query(&format!(
            "SELECT {SYNC_LOG_COLUMNS} FROM sync_logs \
             WHERE api_connection_id = $1 ORDER BY started_at DESC LIMIT $2"
        ))
        .bind(connection_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_sync_log).collect()
    }

    /// Close or amend a sync log: status, counts, error text, and completion
    /// time are rewritten from the passed record.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_sync_log(&self, log: &SyncLog) -> Result<()> {
        sqlx::query(
            r"
            UPDATE sync_logs
            SET status = $1, reviews_fetched = $2, reviews_added = $3,
                reviews_updated = $4, error_message = $5, completed_at = $6
            WHERE id = $7
            ",
        )
        .bind(log.status.as_str())
        .bind(log.reviews_fetched)
        .bind(log.reviews_added)
        .bind(log.reviews_updated)
        .bind(&log.error_message)
        .bind(log.completed_at)
        .bind(log.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
