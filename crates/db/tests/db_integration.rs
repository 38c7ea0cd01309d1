//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `anichart_test`)
//!   `TEST_DB_PASSWORD` (default: `anichart_test`)
//!   `TEST_DB_NAME` (default: `anichart_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use anichart_common::AppError;
use anichart_db::{
    entities::{content_item, episode, submission, voting_period},
    repositories::{EpisodeRepository, SubmissionRepository, VotingPeriodRepository},
    test_utils::{TestDatabase, TestDbConfig},
};
use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;

async fn seed_period(db: &TestDatabase) -> voting_period::Model {
    let start = Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap();
    voting_period::ActiveModel {
        id: Set("w1".to_string()),
        start_at: Set(start.into()),
        end_at: Set((start + Duration::days(7)).into()),
        closed_at: Set(None),
        created_at: Set(start.into()),
    }
    .insert(db.connection())
    .await
    .unwrap()
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let result = TestDatabase::with_config(TestDbConfig::default()).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_submission_is_already_voted() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.connection().clone());
    let period = seed_period(&db).await;

    let repo = SubmissionRepository::new(Arc::clone(&conn));
    let make = |id: &str| submission::ActiveModel {
        id: Set(id.to_string()),
        period_id: Set(period.id.clone()),
        principal_key: Set("same-principal".to_string()),
        member_id: Set(Some("alice".to_string())),
        network_hash: Set(None),
        blocked: Set(false),
        created_at: Set(Utc::now().into()),
    };

    repo.create(conn.as_ref(), make("s1")).await.unwrap();
    let second = repo.create(conn.as_ref(), make("s2")).await;

    assert!(matches!(second, Err(AppError::AlreadyVoted)));
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_period_lookup_and_aggregate_write() {
    let db = TestDatabase::create_unique().await.unwrap();
    let conn = Arc::new(db.connection().clone());
    let period = seed_period(&db).await;

    content_item::ActiveModel {
        id: Set("title".to_string()),
        title: Set("Sample Title".to_string()),
        debut_rank: Set(None),
        debut_date: Set(None),
        peak_rank: Set(None),
        peak_date: Set(None),
        weeks_on_top: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn.as_ref())
    .await
    .unwrap();

    let aired_at = period.start_at + Duration::hours(20);
    episode::ActiveModel {
        id: Set("ep1".to_string()),
        content_item_id: Set("title".to_string()),
        number: Set(1),
        aired_at: Set(aired_at),
        is_break: Set(false),
        voter_count: Set(0),
        histogram: Set(json!(vec![0i32; 10])),
        weighted_sum: Set(0),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn.as_ref())
    .await
    .unwrap();

    let periods = VotingPeriodRepository::new(Arc::clone(&conn));
    let containing = periods.get_containing(conn.as_ref(), aired_at).await.unwrap();
    assert_eq!(containing.id, period.id);

    let episodes = EpisodeRepository::new(Arc::clone(&conn));
    episodes
        .write_aggregate(
            conn.as_ref(),
            "ep1",
            1,
            json!([0, 0, 0, 0, 0, 0, 0, 1, 0, 0]),
            8,
        )
        .await
        .unwrap();

    let stored = episodes.get_by_id("ep1").await.unwrap();
    assert_eq!(stored.voter_count, 1);
    assert_eq!(stored.weighted_sum, 8);

    let aired = episodes
        .find_aired_between(conn.as_ref(), period.start_at, period.end_at)
        .await
        .unwrap();
    assert_eq!(aired.len(), 1);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.ends_with("/testdb"));
}
