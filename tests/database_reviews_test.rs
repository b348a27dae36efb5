// ABOUTME: Integration tests for synced review persistence
// ABOUTME: Platform-key lookups, visibility filtering, pagination, update rules, and stats
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use chrono::{Duration, Utc};
use reviewsync::database_plugins::{factory::Database, DatabaseProvider};
use reviewsync::models::SyncedReview;
use reviewsync::platforms;

mod common;

async fn store_review(
    db: &Database,
    merchant_id: i64,
    platform_review_id: &str,
    days_ago: i64,
) -> SyncedReview {
    let review = common::make_review(platform_review_id, Utc::now() - Duration::days(days_ago));
    let now = Utc::now();
    db.create_synced_review(&SyncedReview {
        id: 0,
        merchant_id,
        api_connection_id: None,
        platform: platforms::SYNTHETIC.to_owned(),
        platform_review_id: review.platform_review_id,
        author_name: review.author_name,
        author_photo_url: review.author_photo_url,
        rating: review.rating,
        review_text: review.review_text,
        review_reply: review.review_reply,
        reviewed_at: review.reviewed_at,
        synced_at: now,
        is_visible: true,
        metadata: review.metadata,
        created_at: now,
        updated_at: now,
    })
    .await
    .expect("create review")
}

#[tokio::test]
async fn create_and_lookup_by_platform_key() {
    let db = common::create_test_database().await.expect("test db");

    let created = store_review(&db, 1, "rev-1", 1).await;
    assert!(created.id > 0);

    let by_id = db
        .get_synced_review(created.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(by_id.platform_review_id, "rev-1");

    let by_key = db
        .get_synced_review_by_platform_id(platforms::SYNTHETIC, "rev-1")
        .await
        .expect("get by key")
        .expect("present");
    assert_eq!(by_key.id, created.id);

    assert!(db
        .get_synced_review_by_platform_id(platforms::SYNTHETIC, "rev-unknown")
        .await
        .expect("get by key")
        .is_none());
}

#[tokio::test]
async fn platform_key_is_unique() {
    let db = common::create_test_database().await.expect("test db");

    store_review(&db, 1, "rev-dup", 1).await;
    let now = Utc::now();
    let duplicate = SyncedReview {
        id: 0,
        merchant_id: 2,
        api_connection_id: None,
        platform: platforms::SYNTHETIC.to_owned(),
        platform_review_id: "rev-dup".to_owned(),
        author_name: "Other".to_owned(),
        author_photo_url: String::new(),
        rating: None,
        review_text: String::new(),
        review_reply: String::new(),
        reviewed_at: now,
        synced_at: now,
        is_visible: true,
        metadata: serde_json::json!({}),
        created_at: now,
        updated_at: now,
    };
    assert!(db.create_synced_review(&duplicate).await.is_err());
}

#[tokio::test]
async fn merchant_listing_is_visible_only_and_paginated() {
    let db = common::create_test_database().await.expect("test db");

    for day in 1..=5 {
        store_review(&db, 1, &format!("rev-{day}"), day).await;
    }
    let mut hidden = store_review(&db, 1, "rev-hidden", 0).await;
    hidden.is_visible = false;
    db.update_synced_review(&hidden).await.expect("hide");
    store_review(&db, 2, "rev-other-merchant", 0).await;

    let first_page = db
        .get_synced_reviews_by_merchant(1, 3, 0)
        .await
        .expect("page 1");
    let ids: Vec<&str> = first_page
        .iter()
        .map(|r| r.platform_review_id.as_str())
        .collect();
    // Newest authored first, hidden review excluded.
    assert_eq!(ids, vec!["rev-1", "rev-2", "rev-3"]);

    let second_page = db
        .get_synced_reviews_by_merchant(1, 3, 3)
        .await
        .expect("page 2");
    assert_eq!(second_page.len(), 2);
    assert_eq!(second_page[0].platform_review_id, "rev-4");
}

#[tokio::test]
async fn update_touches_only_mutable_columns() {
    let db = common::create_test_database().await.expect("test db");

    let mut review = store_review(&db, 1, "rev-edit", 2).await;
    let original_synced_at = review.synced_at;
    let original_reviewed_at = review.reviewed_at;

    review.author_name = "Edited Author".to_owned();
    review.rating = Some(2.0);
    review.review_reply = "Thanks for the feedback".to_owned();
    review.metadata = serde_json::json!({"edited": true});
    db.update_synced_review(&review).await.expect("update");

    let stored = db
        .get_synced_review(review.id)
        .await
        .expect("get")
        .expect("present");
    assert_eq!(stored.author_name, "Edited Author");
    assert_eq!(stored.rating, Some(2.0));
    assert_eq!(stored.review_reply, "Thanks for the feedback");
    assert_eq!(stored.metadata, serde_json::json!({"edited": true}));
    assert_eq!(stored.synced_at, original_synced_at);
    assert_eq!(stored.reviewed_at, original_reviewed_at);
    assert!(stored.updated_at >= review.updated_at);
}

#[tokio::test]
async fn delete_removes_review() {
    let db = common::create_test_database().await.expect("test db");

    let review = store_review(&db, 1, "rev-gone", 1).await;
    db.delete_synced_review(review.id).await.expect("delete");
    assert!(db
        .get_synced_review(review.id)
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn merchant_stats_aggregate_visible_reviews() {
    let db = common::create_test_database().await.expect("test db");

    let empty = db.get_merchant_review_stats(1).await.expect("stats");
    assert_eq!(empty.total_reviews, 0);
    assert!(empty.latest_review_at.is_none());

    let newest = store_review(&db, 1, "rev-a", 1).await;
    let mut unrated = store_review(&db, 1, "rev-b", 2).await;
    unrated.rating = None;
    db.update_synced_review(&unrated).await.expect("unrate");
    let mut hidden = store_review(&db, 1, "rev-c", 0).await;
    hidden.is_visible = false;
    db.update_synced_review(&hidden).await.expect("hide");

    let stats = db.get_merchant_review_stats(1).await.expect("stats");
    assert_eq!(stats.total_reviews, 2);
    assert_eq!(stats.platforms_connected, 1);
    // One 4.0 rating and one NULL counted as 0.
    assert!((stats.average_rating - 2.0).abs() < f64::EPSILON);
    assert_eq!(stats.latest_review_at, Some(newest.reviewed_at));
}
