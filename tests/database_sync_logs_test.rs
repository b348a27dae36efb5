// ABOUTME: Integration tests for sync log persistence
// ABOUTME: Open/close lifecycle and per-connection listing with ordering and limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::Utc;
use reviewsync::database_plugins::DatabaseProvider;
use reviewsync::models::{SyncLogStatus, SyncType};

mod common;

#[tokio::test]
async fn create_opens_log_as_started() {
    let db = common::create_test_database().await.expect("test db");
    let encryptor = common::test_encryptor();
    let connection = common::seed_connection(&db, &encryptor, 1)
        .await
        .expect("seed");

    let log = db
        .create_sync_log(connection.id, SyncType::Scheduled)
        .await
        .expect("create log");
    assert!(log.id > 0);
    assert_eq!(log.api_connection_id, connection.id);
    assert_eq!(log.sync_type, SyncType::Scheduled);
    assert_eq!(log.status, SyncLogStatus::Started);
    assert_eq!(log.reviews_fetched, 0);
    assert!(log.error_message.is_empty());
    assert!(log.completed_at.is_none());
}

#[tokio::test]
async fn close_records_counts_and_completion() {
    let db = common::create_test_database().await.expect("test db");
    let encryptor = common::test_encryptor();
    let connection = common::seed_connection(&db, &encryptor, 1)
        .await
        .expect("seed");

    let mut log = db
        .create_sync_log(connection.id, SyncType::Manual)
        .await
        .expect("create log");
    log.status = SyncLogStatus::Completed;
    log.reviews_fetched = 12;
    log.reviews_added = 9;
    log.reviews_updated = 3;
    log.completed_at = Some(Utc::now());
    db.update_sync_log(&log).await.expect("close log");

    let stored = db
        .get_sync_log(log.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored.status, SyncLogStatus::Completed);
    assert_eq!(stored.reviews_fetched, 12);
    assert_eq!(stored.reviews_added, 9);
    assert_eq!(stored.reviews_updated, 3);
    assert!(stored.completed_at.is_some());
}

#[tokio::test]
async fn failed_close_keeps_error_text() {
    let db = common::create_test_database().await.expect("test db");
    let encryptor = common::test_encryptor();
    let connection = common::seed_connection(&db, &encryptor, 1)
        .await
        .expect("seed");

    let mut log = db
        .create_sync_log(connection.id, SyncType::Scheduled)
        .await
        .expect("create log");
    log.status = SyncLogStatus::Failed;
    log.error_message = "synthetic: network error: upstream 503".to_owned();
    log.completed_at = Some(Utc::now());
    db.update_sync_log(&log).await.expect("close log");

    let stored = db
        .get_sync_log(log.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored.status, SyncLogStatus::Failed);
    assert_eq!(stored.error_message, "synthetic: network error: upstream 503");
}

#[tokio::test]
async fn listing_is_newest_first_with_limit() {
    let db = common::create_test_database().await.expect("test db");
    let encryptor = common::test_encryptor();
    let connection = common::seed_connection(&db, &encryptor, 1)
        .await
        .expect("seed");
    let other = common::seed_connection_on(&db, &encryptor, 2, "platform_b")
        .await
        .expect("other");

    let mut ids = Vec::new();
    for _ in 0..4 {
        let log = db
            .create_sync_log(connection.id, SyncType::Scheduled)
            .await
            .expect("create log");
        ids.push(log.id);
        // Distinct started_at values so the ordering assertion is meaningful.
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    db.create_sync_log(other.id, SyncType::Scheduled)
        .await
        .expect("other log");

    let recent = db
        .get_sync_logs_by_connection(connection.id, 3)
        .await
        .expect("list");
    assert_eq!(recent.len(), 3);
    let listed: Vec<i64> = recent.iter().map(|l| l.id).collect();
    assert_eq!(listed, vec![ids[3], ids[2], ids[1]]);
}
