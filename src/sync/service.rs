// ABOUTME: SyncService, the per-connection sync state machine
// ABOUTME: Lease, log-open, token check/refresh, fetch, reconcile, bookkeeping on both outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reviewsync_core::errors::SyncError;
use reviewsync_core::models::{
    ApiConnection, Review, SyncLog, SyncLogStatus, SyncStats, SyncStatus, SyncType, SyncedReview,
};
use tracing::{debug, info, warn};

use crate::crypto::TokenEncryptor;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::providers::{ProviderRegistry, ReviewProvider};
use crate::sync::lease::SyncLeases;

/// Drives one connection through the sync state machine.
///
/// Cheap to clone; all clones share the database pool, the provider registry,
/// and the in-process lease map.
#[derive(Clone)]
pub struct SyncService {
    db: Database,
    registry: Arc<ProviderRegistry>,
    encryptor: TokenEncryptor,
    leases: SyncLeases,
}

impl SyncService {
    /// Create a sync service.
    #[must_use]
    pub fn new(db: Database, registry: Arc<ProviderRegistry>, encryptor: TokenEncryptor) -> Self {
        Self {
            db,
            registry,
            encryptor,
            leases: SyncLeases::new(),
        }
    }

    /// The in-process lease map shared by all clones.
    #[must_use]
    pub const fn leases(&self) -> &SyncLeases {
        &self.leases
    }

    /// The provider registry backing this service.
    #[must_use]
    pub fn registry(&self) -> Arc<ProviderRegistry> {
        Arc::clone(&self.registry)
    }

    /// Run one sync for a connection.
    ///
    /// The flow: acquire the in-process lease, resolve connection and
    /// provider, open a sync log, mark the connection `syncing`, ensure a
    /// usable access token (refreshing and persisting new tokens first when
    /// needed), fetch reviews since the last sync, reconcile them into
    /// storage, then record the outcome on both the connection and the log.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::AlreadySyncing`] when a sync for this connection
    /// is already in flight in this process, [`SyncError::ConnectionNotFound`]
    /// / [`SyncError::ProviderNotFound`] for resolution failures (these leave
    /// persistent state untouched), and credential, provider, or database
    /// errors for failures mid-run (these are also recorded on the connection
    /// and the log).
    pub async fn sync_connection(
        &self,
        connection_id: i64,
        sync_type: SyncType,
    ) -> Result<SyncStats, SyncError> {
        self.sync_inner(connection_id, sync_type, None).await
    }

    /// Run one sync for a connection under a deadline.
    ///
    /// Same flow as [`sync_connection`](Self::sync_connection), but the
    /// token-check/fetch/reconcile phase is cancelled once `deadline` elapses
    /// and the timeout is recorded through the normal failure bookkeeping, so
    /// a cancelled sync never leaves the connection marked `syncing` or its
    /// log open. The scheduler wraps every scheduled task in this.
    ///
    /// # Errors
    ///
    /// Everything [`sync_connection`](Self::sync_connection) returns, plus
    /// [`SyncError::Timeout`] when the deadline elapses.
    pub async fn sync_connection_with_deadline(
        &self,
        connection_id: i64,
        sync_type: SyncType,
        deadline: Duration,
    ) -> Result<SyncStats, SyncError> {
        self.sync_inner(connection_id, sync_type, Some(deadline))
            .await
    }

    async fn sync_inner(
        &self,
        connection_id: i64,
        sync_type: SyncType,
        deadline: Option<Duration>,
    ) -> Result<SyncStats, SyncError> {
        let _lease = self.leases.acquire(connection_id)?;

        let mut connection = self
            .db
            .get_connection(connection_id)
            .await
            .map_err(SyncError::database)?
            .ok_or(SyncError::ConnectionNotFound { connection_id })?;

        // Unknown platform is a configuration error; fail before any state
        // mutation so nothing needs cleaning up.
        let provider = self
            .registry
            .get(&connection.platform)
            .ok_or_else(|| SyncError::ProviderNotFound {
                platform: connection.platform.clone(),
            })?;

        info!(
            connection_id,
            platform = %connection.platform,
            sync_type = %sync_type,
            "Starting sync"
        );

        // The log row is the durable record of the attempt regardless of
        // outcome, so it is created before any work happens.
        let mut log = self
            .db
            .create_sync_log(connection_id, sync_type)
            .await
            .map_err(SyncError::database)?;

        connection.sync_status = SyncStatus::Syncing;
        if let Err(e) = self.db.update_connection(&connection).await {
            let err = SyncError::database(e);
            self.handle_sync_error(&mut connection, &mut log, &err).await;
            return Err(err);
        }

        // The deadline covers only the fallible middle: cancelling it there
        // leaves connection and log in states the failure bookkeeping below
        // knows how to close out.
        let outcome = match deadline {
            Some(limit) => tokio::time::timeout(
                limit,
                self.run_sync(&mut connection, provider.as_ref(), &mut log),
            )
            .await
            .unwrap_or_else(|_| {
                Err(SyncError::Timeout {
                    seconds: limit.as_secs(),
                })
            }),
            None => {
                self.run_sync(&mut connection, provider.as_ref(), &mut log)
                    .await
            }
        };

        match outcome {
            Ok(stats) => {
                info!(
                    connection_id,
                    fetched = stats.total_fetched,
                    added = stats.total_added,
                    updated = stats.total_updated,
                    errors = stats.errors.len(),
                    "Sync finished: {}",
                    stats.summary()
                );
                Ok(stats)
            }
            Err(err) => {
                self.handle_sync_error(&mut connection, &mut log, &err).await;
                Err(err)
            }
        }
    }

    /// The fallible middle of the state machine: token check, fetch,
    /// reconcile, success bookkeeping. Failure bookkeeping lives with the
    /// caller.
    async fn run_sync(
        &self,
        connection: &mut ApiConnection,
        provider: &dyn ReviewProvider,
        log: &mut SyncLog,
    ) -> Result<SyncStats, SyncError> {
        let access_token = self.ensure_valid_token(connection, provider).await?;

        let since = connection.last_sync_at;
        debug!(
            connection_id = connection.id,
            since = ?since,
            "Fetching reviews"
        );
        let reviews = provider.fetch_reviews(&access_token, since).await?;

        let mut stats = SyncStats {
            total_fetched: reviews.len(),
            ..SyncStats::default()
        };
        for review in &reviews {
            match self.reconcile_review(connection, review).await {
                Ok(added) => {
                    if added {
                        stats.total_added += 1;
                    } else {
                        stats.total_updated += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        connection_id = connection.id,
                        platform_review_id = %review.platform_review_id,
                        "Failed to store review: {e}"
                    );
                    stats.errors.push(e);
                }
            }
        }

        connection.last_sync_at = Some(Utc::now());
        connection.sync_status = SyncStatus::Completed;
        connection.error_message = None;
        self.db
            .update_connection(connection)
            .await
            .map_err(SyncError::database)?;

        // Closing the log is best-effort: the sync itself succeeded and that
        // result must not be masked by a bookkeeping write.
        log.status = SyncLogStatus::Completed;
        log.reviews_fetched = i64::try_from(stats.total_fetched).unwrap_or(i64::MAX);
        log.reviews_added = i64::try_from(stats.total_added).unwrap_or(i64::MAX);
        log.reviews_updated = i64::try_from(stats.total_updated).unwrap_or(i64::MAX);
        log.completed_at = Some(Utc::now());
        if let Err(e) = self.db.update_sync_log(log).await {
            warn!(log_id = log.id, "Failed to close sync log: {e}");
        }

        Ok(stats)
    }

    /// Decrypt the stored access token and make sure it is usable, refreshing
    /// when it is not. Newly refreshed tokens are persisted before this
    /// returns, so a crash later in the sync never loses the credential.
    async fn ensure_valid_token(
        &self,
        connection: &mut ApiConnection,
        provider: &dyn ReviewProvider,
    ) -> Result<String, SyncError> {
        let access_token = self.encryptor.decrypt(&connection.access_token)?;

        // Transport failure during validation is treated the same as an
        // invalid token: try the refresh path.
        let valid = provider
            .validate_token(&access_token)
            .await
            .unwrap_or(false);
        if valid {
            return Ok(access_token);
        }

        if connection.refresh_token.is_empty() {
            return Err(SyncError::InvalidToken);
        }
        let refresh_token = self.encryptor.decrypt(&connection.refresh_token)?;

        debug!(connection_id = connection.id, "Refreshing access token");
        let refreshed = provider.refresh_token(&refresh_token).await?;

        connection.access_token = self.encryptor.encrypt(&refreshed.access_token)?;
        if let Some(new_refresh) = &refreshed.refresh_token {
            connection.refresh_token = self.encryptor.encrypt(new_refresh)?;
        }
        connection.token_expires_at = refreshed.expires_at;
        self.db
            .update_connection(connection)
            .await
            .map_err(SyncError::database)?;

        Ok(refreshed.access_token)
    }

    /// Insert or update one fetched review. Returns `true` when a new row was
    /// inserted, `false` when an existing row was updated in place.
    async fn reconcile_review(
        &self,
        connection: &ApiConnection,
        review: &Review,
    ) -> Result<bool, SyncError> {
        if review.platform_review_id.is_empty() {
            return Err(SyncError::MissingReviewId);
        }

        let existing = self
            .db
            .get_synced_review_by_platform_id(&connection.platform, &review.platform_review_id)
            .await
            .map_err(SyncError::database)?;

        match existing {
            Some(mut stored) => {
                stored.author_name = review.author_name.clone();
                stored.author_photo_url = review.author_photo_url.clone();
                stored.rating = review.rating;
                stored.review_text = review.review_text.clone();
                stored.review_reply = review.review_reply.clone();
                stored.metadata = review.metadata.clone();
                self.db
                    .update_synced_review(&stored)
                    .await
                    .map_err(SyncError::database)?;
                Ok(false)
            }
            None => {
                let new_review = SyncedReview {
                    id: 0,
                    merchant_id: connection.merchant_id,
                    api_connection_id: Some(connection.id),
                    platform: connection.platform.clone(),
                    platform_review_id: review.platform_review_id.clone(),
                    author_name: review.author_name.clone(),
                    author_photo_url: review.author_photo_url.clone(),
                    rating: review.rating,
                    review_text: review.review_text.clone(),
                    review_reply: review.review_reply.clone(),
                    reviewed_at: review.reviewed_at,
                    synced_at: Utc::now(),
                    is_visible: true,
                    metadata: review.metadata.clone(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                };
                self.db
                    .create_synced_review(&new_review)
                    .await
                    .map_err(SyncError::database)?;
                Ok(true)
            }
        }
    }

    /// Record a failed sync on both the connection and the log so the two
    /// always agree. Both writes are best-effort: a failed bookkeeping write
    /// is logged but never masks the primary error.
    async fn handle_sync_error(
        &self,
        connection: &mut ApiConnection,
        log: &mut SyncLog,
        err: &SyncError,
    ) {
        let message = err.to_string();
        warn!(
            connection_id = connection.id,
            platform = %connection.platform,
            "Sync failed: {message}"
        );

        connection.sync_status = SyncStatus::Failed;
        connection.error_message = Some(message.clone());
        if let Err(e) = self.db.update_connection(connection).await {
            warn!(
                connection_id = connection.id,
                "Failed to record sync failure on connection: {e}"
            );
        }

        log.status = SyncLogStatus::Failed;
        log.error_message = message;
        log.completed_at = Some(Utc::now());
        if let Err(e) = self.db.update_sync_log(log).await {
            warn!(log_id = log.id, "Failed to close sync log as failed: {e}");
        }
    }
}
