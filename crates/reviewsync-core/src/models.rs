// ABOUTME: Data models for connections, synced reviews, sync logs, and provider DTOs
// ABOUTME: Shared between the persistence layer, sync service, and platform adapters
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for the sync engine.
//!
//! [`ApiConnection`], [`SyncedReview`], and [`SyncLog`] are the persisted
//! records. [`Review`], [`TokenResponse`], and [`AccountInfo`] are transient
//! DTOs returned by platform adapters and never stored directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;

/// Lifecycle of a connection's most recent sync attempt.
///
/// `Syncing` is an advisory marker: it is set while one sync call is active
/// for the connection and is how a scheduler tick decides to skip a busy
/// connection. It is not a transactional lock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    /// Never synced, or reset
    #[default]
    Pending,
    /// A sync call is currently active
    Syncing,
    /// The last sync finished successfully
    Completed,
    /// The last sync failed; see the connection's error message
    Failed,
}

impl SyncStatus {
    /// Stable string form used in the database and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Syncing => "syncing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "syncing" => Ok(Self::Syncing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown sync status '{other}'")),
        }
    }
}

/// How a sync attempt was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncType {
    /// Merchant-initiated, bypassing the scheduler
    Manual,
    /// Triggered by the background scheduler
    Scheduled,
    /// Triggered by a platform webhook (reserved for HTTP-layer callers)
    Webhook,
}

impl SyncType {
    /// Stable string form used in the database and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Scheduled => "scheduled",
            Self::Webhook => "webhook",
        }
    }
}

impl std::fmt::Display for SyncType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "scheduled" => Ok(Self::Scheduled),
            "webhook" => Ok(Self::Webhook),
            other => Err(format!("unknown sync type '{other}'")),
        }
    }
}

/// Outcome recorded on a [`SyncLog`] row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncLogStatus {
    /// Created before any work happens
    Started,
    /// Closed after a successful run
    Completed,
    /// Closed after a fatal error
    Failed,
}

impl SyncLogStatus {
    /// Stable string form used in the database and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SyncLogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SyncLogStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown sync log status '{other}'")),
        }
    }
}

/// Stored OAuth credential binding one merchant to one external platform
/// account.
///
/// Token fields hold ciphertext produced by the token encryptor and are never
/// serialized to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConnection {
    /// Row id
    pub id: i64,
    /// Owning merchant
    pub merchant_id: i64,
    /// Platform identifier, see [`crate::platforms`]
    pub platform: String,
    /// Account id on the external platform
    pub platform_account_id: String,
    /// Display name of the external account
    pub platform_account_name: String,
    /// Encrypted OAuth access token
    #[serde(skip_serializing, default)]
    pub access_token: String,
    /// Encrypted OAuth refresh token; empty when the platform has none
    #[serde(skip_serializing, default)]
    pub refresh_token: String,
    /// When the access token expires
    pub token_expires_at: DateTime<Utc>,
    /// Inactive connections are ignored by the scheduler
    pub is_active: bool,
    /// When the last successful sync completed; `None` before the first run
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Advisory sync lifecycle marker
    pub sync_status: SyncStatus,
    /// Error text from the last failed sync; `None` after a success
    pub error_message: Option<String>,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

/// Platform-agnostic persisted form of a review authored on an external
/// platform. Unique per `(platform, platform_review_id)`; a resync updates the
/// existing row in place instead of inserting a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedReview {
    /// Row id
    pub id: i64,
    /// Owning merchant
    pub merchant_id: i64,
    /// Connection the review was synced through; `None` once that connection
    /// is deleted
    pub api_connection_id: Option<i64>,
    /// Platform identifier
    pub platform: String,
    /// Stable review id assigned by the platform
    pub platform_review_id: String,
    /// Review author display name
    pub author_name: String,
    /// Author avatar URL; empty when the platform provides none
    pub author_photo_url: String,
    /// Star rating; `None` for platforms without ratings
    pub rating: Option<f64>,
    /// Review body text
    pub review_text: String,
    /// Merchant reply; empty when unanswered
    pub review_reply: String,
    /// When the review was authored on the platform
    pub reviewed_at: DateTime<Utc>,
    /// When the row was first synced; never touched by updates
    pub synced_at: DateTime<Utc>,
    /// Hidden reviews are excluded from merchant listings
    pub is_visible: bool,
    /// Free-form platform-specific extras
    pub metadata: serde_json::Value,
    /// Row creation time
    pub created_at: DateTime<Utc>,
    /// Last row update time
    pub updated_at: DateTime<Utc>,
}

/// One immutable record per sync attempt. Created with status `started`
/// before any work happens, then closed as `completed` or `failed` with
/// exact counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncLog {
    /// Row id
    pub id: i64,
    /// Connection this attempt ran against
    pub api_connection_id: i64,
    /// How the attempt was triggered
    pub sync_type: SyncType,
    /// Attempt outcome
    pub status: SyncLogStatus,
    /// Reviews returned by the provider fetch
    pub reviews_fetched: i64,
    /// Reviews inserted during reconciliation
    pub reviews_added: i64,
    /// Reviews updated in place during reconciliation
    pub reviews_updated: i64,
    /// Error text for failed attempts; empty otherwise
    pub error_message: String,
    /// When the attempt started
    pub started_at: DateTime<Utc>,
    /// When the attempt was closed; `None` while in flight
    pub completed_at: Option<DateTime<Utc>>,
}

/// Transient normalized review returned by a provider fetch. Mapped into a
/// [`SyncedReview`] during reconciliation, never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Stable review id assigned by the platform, identical across repeated
    /// fetches of the same review
    pub platform_review_id: String,
    /// Review author display name
    pub author_name: String,
    /// Author avatar URL; empty when the platform provides none
    pub author_photo_url: String,
    /// Star rating; `None` for platforms without ratings
    pub rating: Option<f64>,
    /// Review body text
    pub review_text: String,
    /// Merchant reply; empty when unanswered
    pub review_reply: String,
    /// When the review was authored
    pub reviewed_at: DateTime<Utc>,
    /// Free-form platform-specific extras
    pub metadata: serde_json::Value,
}

/// OAuth token response from a code exchange or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer access token
    pub access_token: String,
    /// Refresh token; `None` for platforms that re-exchange long-lived tokens
    pub refresh_token: Option<String>,
    /// Lifetime in seconds as reported by the platform
    pub expires_in: i64,
    /// Token type, typically `Bearer`
    pub token_type: String,
    /// Absolute expiry computed at exchange time
    pub expires_at: DateTime<Utc>,
}

/// Account information fetched from a platform with an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// Account id on the platform
    pub account_id: String,
    /// Account display name
    pub account_name: String,
    /// Avatar URL; empty when the platform provides none
    pub avatar_url: String,
}

/// Result of one sync attempt: counts plus per-item reconciliation errors
/// that did not abort the run.
#[derive(Debug, Default)]
pub struct SyncStats {
    /// Reviews returned by the provider fetch
    pub total_fetched: usize,
    /// Reviews inserted during reconciliation
    pub total_added: usize,
    /// Reviews updated in place during reconciliation
    pub total_updated: usize,
    /// Per-item errors collected without aborting the batch
    pub errors: Vec<SyncError>,
}

impl SyncStats {
    /// True if any per-item error was collected.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Per-item error messages, for surfacing to callers and logs.
    #[must_use]
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// One-line human-readable outcome.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        if self.has_errors() {
            "Completed with errors"
        } else if self.total_fetched == 0 {
            "No new reviews found"
        } else {
            "Completed successfully"
        }
    }
}

/// Aggregate over a merchant's visible reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewStats {
    /// Visible review count
    pub total_reviews: i64,
    /// Distinct platforms contributing reviews
    pub platforms_connected: i64,
    /// Average rating with missing ratings counted as 0
    pub average_rating: f64,
    /// Authored time of the most recent review; `None` with no reviews
    pub latest_review_at: Option<DateTime<Utc>>,
}
