// ABOUTME: Background scheduler running periodic batched syncs over active connections
// ABOUTME: Warm-up run, fixed interval, bounded per-batch concurrency, cooperative stop
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reviewsync_core::errors::SyncError;
use reviewsync_core::models::{SyncStats, SyncStatus, SyncType};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::SchedulerConfig;
use crate::database_plugins::factory::Database;
use crate::database_plugins::DatabaseProvider;
use crate::sync::service::SyncService;

/// Outcome tally of one scheduler run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncRunReport {
    /// Active connections considered this run
    pub total: usize,
    /// Syncs that completed successfully
    pub succeeded: usize,
    /// Syncs that failed or timed out
    pub failed: usize,
    /// Connections skipped because a sync was already in flight
    pub skipped: usize,
}

/// Point-in-time scheduler state for status reporting.
#[derive(Debug, Clone, Copy)]
pub struct SchedulerStatus {
    /// True while the background loop is running
    pub is_running: bool,
    /// Period between scheduled runs
    pub interval: Duration,
    /// Connections synced concurrently per batch
    pub batch_size: usize,
}

/// Periodic batch scheduler over active connections.
///
/// Each run loads active connections oldest-synced-first, splits them into
/// fixed-size batches, and runs one sync task per connection with bounded
/// per-batch concurrency. Batch N+1 never starts before all of batch N's
/// tasks have returned.
pub struct SyncScheduler {
    service: SyncService,
    db: Database,
    config: SchedulerConfig,
    running: AtomicBool,
    stop_tx: watch::Sender<bool>,
}

impl SyncScheduler {
    /// Create a scheduler over the given service.
    #[must_use]
    pub fn new(service: SyncService, db: Database, config: SchedulerConfig) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            service,
            db,
            config,
            running: AtomicBool::new(false),
            stop_tx,
        }
    }

    /// Start the background loop: one warm-up run after a short delay, then a
    /// run every interval until [`stop`](Self::stop). Idempotent; a second
    /// call while running is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Sync scheduler already running");
            return;
        }
        let _ = self.stop_tx.send_replace(false);

        info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            warmup_secs = self.config.warmup_delay.as_secs(),
            "Starting sync scheduler"
        );

        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut stop_rx = scheduler.stop_tx.subscribe();

            tokio::select! {
                () = tokio::time::sleep(scheduler.config.warmup_delay) => {}
                _ = stop_rx.changed() => {
                    scheduler.running.store(false, Ordering::SeqCst);
                    return;
                }
            }
            scheduler.run_and_log().await;

            let mut ticker = tokio::time::interval(scheduler.config.interval);
            // The first tick completes immediately; the warm-up run already
            // covered it.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => scheduler.run_and_log().await,
                    _ = stop_rx.changed() => break,
                }
            }
            scheduler.running.store(false, Ordering::SeqCst);
            info!("Sync scheduler stopped");
        });
    }

    /// Signal the background loop to stop after its current run. Idempotent.
    pub fn stop(&self) {
        let _ = self.stop_tx.send_replace(true);
    }

    /// Current scheduler state.
    #[must_use]
    pub fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            is_running: self.running.load(Ordering::SeqCst),
            interval: self.config.interval,
            batch_size: self.config.batch_size,
        }
    }

    /// Trigger a sync for one connection right now, bypassing the periodic
    /// loop. No task deadline is applied; the caller owns its own.
    ///
    /// # Errors
    ///
    /// Propagates the [`SyncError`] of the underlying sync.
    pub async fn run_manual_sync(&self, connection_id: i64) -> Result<SyncStats, SyncError> {
        self.service
            .sync_connection(connection_id, SyncType::Manual)
            .await
    }

    async fn run_and_log(&self) {
        match self.run_once().await {
            Ok(report) => info!(
                total = report.total,
                succeeded = report.succeeded,
                failed = report.failed,
                skipped = report.skipped,
                "Scheduled sync run finished"
            ),
            Err(e) => warn!("Scheduled sync run aborted: {e}"),
        }
    }

    /// Run one full pass over the active connections.
    ///
    /// # Errors
    ///
    /// Returns an error only when the active-connection listing itself fails;
    /// individual sync failures are tallied in the report instead.
    pub async fn run_once(&self) -> Result<SyncRunReport> {
        let connections = self.db.get_active_connections().await?;
        let mut report = SyncRunReport {
            total: connections.len(),
            ..SyncRunReport::default()
        };
        if connections.is_empty() {
            return Ok(report);
        }

        let batches: Vec<_> = connections.chunks(self.config.batch_size).collect();
        let batch_count = batches.len();

        for (index, batch) in batches.into_iter().enumerate() {
            let mut tasks = JoinSet::new();
            for connection in batch {
                // The persisted marker is the cross-process busy signal; the
                // in-process lease still backstops it inside the task.
                if connection.sync_status == SyncStatus::Syncing {
                    report.skipped += 1;
                    continue;
                }
                let service = self.service.clone();
                let connection_id = connection.id;
                let deadline = self.config.task_timeout;
                tasks.spawn(async move {
                    // The service applies the deadline itself so a timed-out
                    // sync still gets failure bookkeeping: the connection is
                    // marked failed and its log closed, not left "syncing".
                    match service
                        .sync_connection_with_deadline(connection_id, SyncType::Scheduled, deadline)
                        .await
                    {
                        Ok(_) => TaskOutcome::Succeeded,
                        Err(SyncError::AlreadySyncing { .. }) => TaskOutcome::Skipped,
                        Err(SyncError::Timeout { .. }) => {
                            warn!(connection_id, "Sync task exceeded its deadline");
                            TaskOutcome::Failed
                        }
                        Err(_) => TaskOutcome::Failed,
                    }
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(TaskOutcome::Succeeded) => report.succeeded += 1,
                    Ok(TaskOutcome::Skipped) => report.skipped += 1,
                    Ok(TaskOutcome::Failed) => report.failed += 1,
                    Err(e) => {
                        warn!("Sync task panicked or was cancelled: {e}");
                        report.failed += 1;
                    }
                }
            }

            if index + 1 < batch_count {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        Ok(report)
    }
}

enum TaskOutcome {
    Succeeded,
    Skipped,
    Failed,
}
