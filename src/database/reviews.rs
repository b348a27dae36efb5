// ABOUTME: Synced review CRUD with the unique (platform, platform_review_id) upsert key
// ABOUTME: Merchant listings are visible-only and paginated; stats aggregate over visible rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use anyhow::Result;
use chrono::{DateTime, Utc};
use reviewsync_core::models::{ReviewStats, SyncedReview};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::Database;

/// Columns selected for every review read, in `map_review` order.
const REVIEW_COLUMNS: &str = "id, merchant_id, api_connection_id, platform, platform_review_id, \
     author_name, author_photo_url, rating, review_text, review_reply, reviewed_at, synced_at, \
     is_visible, metadata, created_at, updated_at";

fn map_review(row: &SqliteRow) -> Result<SyncedReview> {
    let metadata_text: String = row.try_get("metadata")?;
    let metadata = serde_json::from_str(&metadata_text)
        .unwrap_or_else(|_| serde_json::Value::Object(serde_json::Map::new()));

    Ok(SyncedReview {
        id: row.try_get("id")?,
        merchant_id: row.try_get("merchant_id")?,
        api_connection_id: row.try_get("api_connection_id")?,
        platform: row.try_get("platform")?,
        platform_review_id: row.try_get("platform_review_id")?,
        author_name: row.try_get("author_name")?,
        author_photo_url: row.try_get("author_photo_url")?,
        rating: row.try_get("rating")?,
        review_text: row.try_get("review_text")?,
        review_reply: row.try_get("review_reply")?,
        reviewed_at: row.try_get("reviewed_at")?,
        synced_at: row.try_get("synced_at")?,
        is_visible: row.try_get("is_visible")?,
        metadata,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn metadata_json(metadata: &serde_json::Value) -> String {
    serde_json::to_string(metadata).unwrap_or_else(|_| "{}".to_owned())
}

impl Database {
    /// Insert a new synced review, returning the stored row.
    ///
    /// The `id`, `synced_at`, `created_at`, and `updated_at` fields of the
    /// input are ignored and assigned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails, including a unique-constraint
    /// violation on `(platform, platform_review_id)`.
    pub async fn create_synced_review(&self, review: &SyncedReview) -> Result<SyncedReview> {
        let now = Utc::now();
        let row = sqlx::query(&format!(
            r"
            INSERT INTO synced_reviews (
                merchant_id, api_connection_id, platform, platform_review_id,
                author_name, author_photo_url, rating, review_text, review_reply,
                reviewed_at, synced_at, is_visible, metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {REVIEW_COLUMNS}
            "
        ))
        .bind(review.merchant_id)
        .bind(review.api_connection_id)
        .bind(&review.platform)
        .bind(&review.platform_review_id)
        .bind(&review.author_name)
        .bind(&review.author_photo_url)
        .bind(review.rating)
        .bind(&review.review_text)
        .bind(&review.review_reply)
        .bind(review.reviewed_at)
        .bind(now)
        .bind(review.is_visible)
        .bind(metadata_json(&review.metadata))
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        map_review(&row)
    }

    /// Get a synced review by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_synced_review(&self, id: i64) -> Result<Option<SyncedReview>> {
        let row = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM synced_reviews WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_review).transpose()
    }

    /// Look up a review by its stable platform key. This is the reconciliation
    /// probe deciding between insert and update.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_synced_review_by_platform_id(
        &self,
        platform: &str,
        platform_review_id: &str,
    ) -> Result<Option<SyncedReview>> {
        let row = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM synced_reviews \
             WHERE platform = $1 AND platform_review_id = $2"
        ))
        .bind(platform)
        .bind(platform_review_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_review).transpose()
    }

    /// List a merchant's visible reviews, most recently authored first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_synced_reviews_by_merchant(
        &self,
        merchant_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SyncedReview>> {
        let rows = sqlx::query(&format!(
            "SELECT {REVIEW_COLUMNS} FROM synced_reviews \
             WHERE merchant_id = $1 AND is_visible = true \
             ORDER BY reviewed_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(merchant_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_review).collect()
    }

    /// Update a review's mutable fields in place.
    ///
    /// Identity (`merchant_id`, `platform`, `platform_review_id`) and the
    /// original `reviewed_at`/`synced_at` are immutable; only author fields,
    /// rating, text, reply, visibility, and metadata are rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_synced_review(&self, review: &SyncedReview) -> Result<()> {
        sqlx::query(
            r"
            UPDATE synced_reviews
            SET author_name = $1, author_photo_url = $2, rating = $3, review_text = $4,
                review_reply = $5, is_visible = $6, metadata = $7, updated_at = $8
            WHERE id = $9
            ",
        )
        .bind(&review.author_name)
        .bind(&review.author_photo_url)
        .bind(review.rating)
        .bind(&review.review_text)
        .bind(&review.review_reply)
        .bind(review.is_visible)
        .bind(metadata_json(&review.metadata))
        .bind(Utc::now())
        .bind(review.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a synced review.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_synced_review(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM synced_reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Aggregate a merchant's visible reviews: count, distinct platforms,
    /// average rating (missing ratings counted as 0), and latest authored
    /// time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_merchant_review_stats(&self, merchant_id: i64) -> Result<ReviewStats> {
        let row = sqlx::query(
            r"
            SELECT
                COUNT(*) AS total_reviews,
                COUNT(DISTINCT platform) AS platforms_connected,
                AVG(CASE WHEN rating IS NOT NULL THEN rating ELSE 0 END) AS avg_rating,
                MAX(reviewed_at) AS latest_review_at
            FROM synced_reviews
            WHERE merchant_id = $1 AND is_visible = true
            ",
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await?;

        let average_rating: Option<f64> = row.try_get("avg_rating")?;
        let latest_review_at: Option<DateTime<Utc>> = row.try_get("latest_review_at")?;

        Ok(ReviewStats {
            total_reviews: row.try_get("total_reviews")?,
            platforms_connected: row.try_get("platforms_connected")?,
            average_rating: average_rating.unwrap_or(0.0),
            latest_review_at,
        })
    }
}
