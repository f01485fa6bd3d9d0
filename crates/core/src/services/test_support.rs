//! Fixtures shared by the service tests.

#![allow(clippy::unwrap_used)]

use std::{collections::BTreeMap, sync::Arc};

use biznetworq_common::TokenSigner;
use biznetworq_db::entities::{
    PdfCategory, TargetKind, VideoKind, blog_post, channel, comment, pdf_document, user, video,
};
use chrono::Utc;
use sea_orm::{DatabaseConnection, MockDatabase, Value};

pub fn mock_db(db: MockDatabase) -> Arc<DatabaseConnection> {
    Arc::new(db.into_connection())
}

/// Rows answering a `COUNT(*)` query.
pub fn count_rows(n: i64) -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([("num_items", Value::BigInt(Some(n)))])]
}

/// Row answering a target's channel and publish-state lookup.
pub fn visibility(channel_id: &str, is_published: bool) -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([
        ("channel_id", Value::from(channel_id)),
        ("is_published", Value::from(is_published)),
    ])]
}

/// Row answering the locked like/dislike counter read.
pub fn counters(likes: i64, dislikes: i64) -> Vec<BTreeMap<&'static str, Value>> {
    vec![BTreeMap::from([
        ("dislikes_count", Value::from(dislikes)),
        ("likes_count", Value::from(likes)),
    ])]
}

pub fn signer() -> TokenSigner {
    TokenSigner::new("service-test-secret-0123456789", 1).unwrap()
}

pub fn user(id: &str, username: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        username: username.to_string(),
        username_lower: username.to_lowercase(),
        email: format!("{}@example.com", username.to_lowercase()),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g".to_string(),
        name: None,
        avatar_url: None,
        bio: None,
        is_admin: false,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn admin(id: &str) -> user::Model {
    user::Model {
        is_admin: true,
        ..user(id, "admin")
    }
}

pub fn channel(id: &str, owner_id: &str) -> channel::Model {
    channel::Model {
        id: id.to_string(),
        owner_id: owner_id.to_string(),
        name: "Acme Cloud".to_string(),
        slug: format!("acme-{id}"),
        description: None,
        logo_url: None,
        banner_url: None,
        website_url: None,
        subscribers_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn video(id: &str, channel_id: &str, kind: VideoKind) -> video::Model {
    video::Model {
        id: id.to_string(),
        channel_id: channel_id.to_string(),
        author_id: "owner".to_string(),
        kind,
        title: "Scaling Postgres".to_string(),
        slug: format!("scaling-postgres-{id}"),
        description: None,
        media_url: "https://cdn.example.com/v.mp4".to_string(),
        thumbnail_url: None,
        duration_seconds: Some(600),
        starts_at: None,
        registration_url: None,
        tags: serde_json::json!(["postgres"]),
        is_published: true,
        views_count: 0,
        likes_count: 0,
        dislikes_count: 0,
        comments_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn blog_post(id: &str, channel_id: &str) -> blog_post::Model {
    blog_post::Model {
        id: id.to_string(),
        channel_id: channel_id.to_string(),
        author_id: "owner".to_string(),
        title: "Why we moved to Rust".to_string(),
        slug: format!("why-we-moved-to-rust-{id}"),
        excerpt: Some("A short story".to_string()),
        body: "Long body".to_string(),
        cover_image_url: None,
        read_minutes: 1,
        tags: serde_json::json!([]),
        is_published: true,
        views_count: 0,
        likes_count: 0,
        dislikes_count: 0,
        comments_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn pdf(id: &str, channel_id: &str) -> pdf_document::Model {
    pdf_document::Model {
        id: id.to_string(),
        channel_id: channel_id.to_string(),
        author_id: "owner".to_string(),
        category: PdfCategory::WhitePaper,
        title: "Zero trust networking".to_string(),
        slug: format!("zero-trust-{id}"),
        description: None,
        file_url: "https://cdn.example.com/zt.pdf".to_string(),
        thumbnail_url: None,
        page_count: Some(12),
        downloads_count: 0,
        tags: serde_json::json!([]),
        is_published: true,
        views_count: 0,
        likes_count: 0,
        dislikes_count: 0,
        comments_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn comment(id: &str, user_id: &str, parent_id: Option<&str>) -> comment::Model {
    comment::Model {
        id: id.to_string(),
        user_id: user_id.to_string(),
        target_kind: TargetKind::Video,
        target_id: "v1".to_string(),
        parent_id: parent_id.map(str::to_string),
        text: "Great talk".to_string(),
        likes_count: 0,
        dislikes_count: 0,
        replies_count: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}
