//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test -p biznetworq-db --test db_integration -- --ignored --test-threads=1`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `biznetworq_test`)
//!   `TEST_DB_PASSWORD` (default: `biznetworq_test`)
//!   `TEST_DB_NAME` (default: `biznetworq_test`)

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use biznetworq_common::AppError;
use biznetworq_db::entities::{ReactionKind, TargetKind, VideoKind};
use biznetworq_db::repositories::{
    ChannelRepository, CommentRepository, ContentQuery, EngagementRepository, NewComment,
    VideoRepository,
};
use biznetworq_db::test_utils::{TestDatabase, TestDbConfig};

async fn seeded() -> (TestDatabase, Arc<sea_orm::DatabaseConnection>) {
    let db = TestDatabase::new().await.unwrap();
    db.cleanup().await.unwrap();
    db.seed_user("owner", "owner", true).await.unwrap();
    db.seed_user("viewer", "viewer", false).await.unwrap();
    db.seed_channel("chan", "owner").await.unwrap();
    db.seed_video("vid", "chan", "owner", VideoKind::Webinar)
        .await
        .unwrap();
    let conn = Arc::new(
        sea_orm::Database::connect(db.config.database_url())
            .await
            .unwrap(),
    );
    (db, conn)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_reaction_toggle_keeps_counters_in_step() {
    let (_db, conn) = seeded().await;
    let engagement = EngagementRepository::new(Arc::clone(&conn));
    let videos = VideoRepository::new(conn);

    let liked = engagement
        .set_reaction("r1".into(), "viewer", TargetKind::Video, "vid", Some(ReactionKind::Like))
        .await
        .unwrap();
    assert_eq!(liked.reaction, Some(ReactionKind::Like));
    assert_eq!((liked.likes, liked.dislikes), (1, 0));

    let switched = engagement
        .set_reaction("r2".into(), "viewer", TargetKind::Video, "vid", Some(ReactionKind::Dislike))
        .await
        .unwrap();
    assert_eq!((switched.likes, switched.dislikes), (0, 1));

    let cleared = engagement
        .set_reaction("r3".into(), "viewer", TargetKind::Video, "vid", Some(ReactionKind::Dislike))
        .await
        .unwrap();
    assert_eq!(cleared.reaction, None);

    let video = videos.find_by_id("vid").await.unwrap().unwrap();
    assert_eq!((video.likes_count, video.dislikes_count), (0, 0));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_reaction_on_missing_target() {
    let (_db, conn) = seeded().await;
    let engagement = EngagementRepository::new(conn);

    let result = engagement
        .set_reaction("r1".into(), "viewer", TargetKind::Short, "nope", Some(ReactionKind::Like))
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_subscribe_is_idempotent() {
    let (_db, conn) = seeded().await;
    let channels = ChannelRepository::new(conn);

    assert!(channels.subscribe("s1".into(), "viewer", "chan").await.unwrap());
    assert!(!channels.subscribe("s2".into(), "viewer", "chan").await.unwrap());
    assert_eq!(channels.get_by_id("chan").await.unwrap().subscribers_count, 1);

    assert!(channels.unsubscribe("viewer", "chan").await.unwrap());
    assert!(!channels.unsubscribe("viewer", "chan").await.unwrap());
    assert_eq!(channels.get_by_id("chan").await.unwrap().subscribers_count, 0);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_comment_counters_and_cascade() {
    let (_db, conn) = seeded().await;
    let comments = CommentRepository::new(Arc::clone(&conn));
    let videos = VideoRepository::new(conn);

    let top = comments
        .create(NewComment {
            id: "c1".into(),
            user_id: "viewer".into(),
            target_kind: TargetKind::Video,
            target_id: "vid".into(),
            parent_id: None,
            text: "First".into(),
        })
        .await
        .unwrap();
    comments
        .create(NewComment {
            id: "c2".into(),
            user_id: "owner".into(),
            target_kind: TargetKind::Video,
            target_id: "vid".into(),
            parent_id: Some("c1".into()),
            text: "Thanks".into(),
        })
        .await
        .unwrap();

    assert_eq!(comments.get_by_id("c1").await.unwrap().replies_count, 1);
    assert_eq!(videos.find_by_id("vid").await.unwrap().unwrap().comments_count, 2);

    let removed = comments.delete(&top).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(videos.find_by_id("vid").await.unwrap().unwrap().comments_count, 0);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_content_delete_purges_engagement() {
    let (_db, conn) = seeded().await;
    let engagement = EngagementRepository::new(Arc::clone(&conn));
    let videos = VideoRepository::new(conn);

    assert!(engagement
        .toggle_save("s1".into(), "viewer", TargetKind::Video, "vid")
        .await
        .unwrap());
    videos.delete("vid").await.unwrap();

    let saved = engagement.find_saved("viewer", None, 10, 0).await.unwrap();
    assert!(saved.is_empty());
    assert!(videos.list(&ContentQuery::published(10, 0)).await.unwrap().is_empty());
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
    assert!(url.contains("testhost:5432"));
    assert!(url.ends_with("/testdb"));
}
