// ABOUTME: Integration tests for the batch scheduler
// ABOUTME: Run reports, skip-on-busy, task deadlines, stop idempotence, manual trigger
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reviewsync::config::SchedulerConfig;
use reviewsync::database_plugins::{factory::Database, DatabaseProvider};
use reviewsync::models::{SyncLogStatus, SyncStatus, SyncType};
use reviewsync::providers::SyntheticProvider;
use reviewsync::sync::SyncScheduler;

mod common;

fn fast_config(batch_size: usize) -> SchedulerConfig {
    SchedulerConfig {
        interval: Duration::from_secs(3600),
        batch_size,
        warmup_delay: Duration::from_millis(10),
        batch_delay: Duration::from_millis(5),
        task_timeout: Duration::from_secs(5),
    }
}

struct Harness {
    db: Database,
    provider: Arc<SyntheticProvider>,
    scheduler: SyncScheduler,
    ids: Vec<i64>,
    // Keeps the database file alive for the test's duration.
    _dir: tempfile::TempDir,
}

async fn scheduler_harness(connections: i64, batch_size: usize) -> Harness {
    let (db, dir) = common::create_file_database().await.expect("test db");

    let encryptor = common::test_encryptor();
    let mut ids = Vec::new();
    for merchant in 1..=connections {
        let connection = common::seed_connection(&db, &encryptor, merchant)
            .await
            .expect("seed");
        ids.push(connection.id);
    }

    let provider = Arc::new(SyntheticProvider::new());
    let service = common::build_service(db.clone(), Arc::clone(&provider));
    let scheduler = SyncScheduler::new(service, db.clone(), fast_config(batch_size));
    Harness {
        db,
        provider,
        scheduler,
        ids,
        _dir: dir,
    }
}

#[tokio::test]
async fn run_once_syncs_every_active_connection_in_batches() {
    let h = scheduler_harness(5, 2).await;
    h.provider
        .set_reviews(vec![common::make_review("rev-1", Utc::now())]);

    let report = h.scheduler.run_once().await.expect("run");
    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 5);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 0);

    for id in h.ids {
        let connection = h
            .db
            .get_connection(id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(connection.sync_status, SyncStatus::Completed);
        let logs = h
            .db
            .get_sync_logs_by_connection(id, 10)
            .await
            .expect("logs");
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].sync_type, SyncType::Scheduled);
    }
}

#[tokio::test]
async fn busy_connections_are_skipped() {
    let h = scheduler_harness(3, 10).await;

    let mut busy = h
        .db
        .get_connection(h.ids[0])
        .await
        .expect("get")
        .expect("present");
    busy.sync_status = SyncStatus::Syncing;
    h.db.update_connection(&busy).await.expect("update");

    let report = h.scheduler.run_once().await.expect("run");
    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.failed, 0);

    // Skipped connections get no sync log.
    assert!(h
        .db
        .get_sync_logs_by_connection(h.ids[0], 10)
        .await
        .expect("logs")
        .is_empty());
}

#[tokio::test]
async fn provider_failures_count_as_failed() {
    let h = scheduler_harness(2, 10).await;
    h.provider.set_fetch_error(Some("upstream 503"));

    let report = h.scheduler.run_once().await.expect("run");
    assert_eq!(report.failed, 2);
    assert_eq!(report.succeeded, 0);

    let connection = h
        .db
        .get_connection(h.ids[0])
        .await
        .expect("get")
        .expect("present");
    assert_eq!(connection.sync_status, SyncStatus::Failed);
}

#[tokio::test]
async fn timed_out_tasks_fail_and_recover_next_run() {
    let h = scheduler_harness(1, 10).await;
    h.provider.set_fetch_delay(Some(Duration::from_millis(500)));

    let service = common::build_service(h.db.clone(), Arc::clone(&h.provider));
    let config = SchedulerConfig {
        task_timeout: Duration::from_millis(50),
        ..fast_config(10)
    };
    let scheduler = SyncScheduler::new(service, h.db.clone(), config);

    let report = scheduler.run_once().await.expect("run");
    assert_eq!(report.failed, 1);
    assert_eq!(report.succeeded, 0);

    // The timeout gets the same bookkeeping as any other failure.
    let connection = h
        .db
        .get_connection(h.ids[0])
        .await
        .expect("get")
        .expect("present");
    assert_eq!(connection.sync_status, SyncStatus::Failed);
    assert!(connection
        .error_message
        .as_deref()
        .is_some_and(|m| m.contains("timed out")));

    let logs = h
        .db
        .get_sync_logs_by_connection(h.ids[0], 10)
        .await
        .expect("logs");
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, SyncLogStatus::Failed);
    assert!(logs[0].error_message.contains("timed out"));
    assert!(logs[0].completed_at.is_some());

    // Not left "syncing": once the slowness clears, the next run picks the
    // connection up again instead of skipping it.
    h.provider.set_fetch_delay(None);
    let report = scheduler.run_once().await.expect("second run");
    assert_eq!(report.skipped, 0);
    assert_eq!(report.succeeded, 1);
}

#[tokio::test]
async fn batches_drain_before_the_next_one_starts() {
    let h = scheduler_harness(5, 2).await;
    h.provider.set_fetch_delay(Some(Duration::from_millis(50)));

    let report = h.scheduler.run_once().await.expect("run");
    assert_eq!(report.succeeded, 5);
    assert_eq!(h.provider.fetch_count(), 5);

    // ceil(5/2) batches of at most 2; a third fetch in flight would mean a
    // batch started before the previous one finished.
    let peak = h.provider.peak_fetch_concurrency();
    assert!(peak <= 2, "peak concurrent fetches was {peak}");
}

#[tokio::test]
async fn empty_database_reports_nothing_to_do() {
    let db = common::create_test_database().await.expect("test db");
    let service = common::build_service(db.clone(), Arc::new(SyntheticProvider::new()));
    let scheduler = SyncScheduler::new(service, db, fast_config(10));

    let report = scheduler.run_once().await.expect("run");
    assert_eq!(report.total, 0);
    assert_eq!(report.succeeded, 0);
}

#[tokio::test]
async fn start_runs_warmup_and_stop_is_idempotent() {
    let h = scheduler_harness(1, 10).await;
    let scheduler = Arc::new(h.scheduler);

    assert!(!scheduler.status().is_running);
    scheduler.start();
    // Second start while running is a no-op.
    scheduler.start();
    assert!(scheduler.status().is_running);

    // Give the warm-up run time to fire.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(h.provider.fetch_count() >= 1);

    scheduler.stop();
    scheduler.stop();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!scheduler.status().is_running);
}

#[tokio::test]
async fn manual_sync_bypasses_the_schedule() {
    let h = scheduler_harness(1, 10).await;
    h.provider
        .set_reviews(vec![common::make_review("rev-manual", Utc::now())]);

    let stats = h.scheduler.run_manual_sync(h.ids[0]).await.expect("manual");
    assert_eq!(stats.total_added, 1);

    let logs = h
        .db
        .get_sync_logs_by_connection(h.ids[0], 10)
        .await
        .expect("logs");
    assert_eq!(logs[0].sync_type, SyncType::Manual);
}

#[tokio::test]
async fn status_reflects_configuration() {
    let h = scheduler_harness(1, 7).await;
    let status = h.scheduler.status();
    assert!(!status.is_running);
    assert_eq!(status.batch_size, 7);
    assert_eq!(status.interval, Duration::from_secs(3600));
}
