//! Video service: videos, webinars, podcasts, testimonials, demos and events.

use biznetworq_common::{AppError, AppResult};
use biznetworq_db::{
    entities::{VideoKind, user, video},
    repositories::{ContentQuery, VideoRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{
    ContentContext, ContentDetail, Page, double_option, non_blank, require_title, tags_from_json,
    tags_to_json,
};

const fn default_kind() -> VideoKind {
    VideoKind::Video
}

const fn default_true() -> bool {
    true
}

/// Input for publishing a video.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVideoInput {
    pub channel_id: String,
    #[serde(default = "default_kind")]
    pub kind: VideoKind,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub media_url: String,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 0))]
    pub duration_seconds: Option<i32>,
    pub starts_at: Option<DateTime<FixedOffset>>,
    #[validate(url)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a video. `null` clears optional fields.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVideoInput {
    pub kind: Option<VideoKind>,
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(url)]
    pub media_url: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration_seconds: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub starts_at: Option<Option<DateTime<FixedOffset>>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub registration_url: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    /// Derive a new slug from the (new) title.
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// Video listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListVideosQuery {
    pub kind: Option<VideoKind>,
    pub channel_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Video as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub kind: VideoKind,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub starts_at: Option<String>,
    pub registration_url: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<video::Model> for VideoResponse {
    fn from(v: video::Model) -> Self {
        Self {
            tags: tags_from_json(&v.tags),
            id: v.id,
            channel_id: v.channel_id,
            author_id: v.author_id,
            kind: v.kind,
            title: v.title,
            slug: v.slug,
            description: v.description,
            media_url: v.media_url,
            thumbnail_url: v.thumbnail_url,
            duration_seconds: v.duration_seconds,
            starts_at: v.starts_at.map(|t| t.to_rfc3339()),
            registration_url: v.registration_url,
            is_published: v.is_published,
            views_count: v.views_count,
            likes_count: v.likes_count,
            dislikes_count: v.dislikes_count,
            comments_count: v.comments_count,
            created_at: v.created_at.to_rfc3339(),
            updated_at: v.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for the video table.
#[derive(Clone)]
pub struct VideoService {
    repo: VideoRepository,
    ctx: ContentContext,
}

impl VideoService {
    /// Create a new video service.
    #[must_use]
    pub const fn new(repo: VideoRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    /// Publish a video in a channel the user manages.
    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateVideoInput,
    ) -> AppResult<video::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;
        check_schedule(
            input.kind,
            input.starts_at.is_some(),
            input.registration_url.is_some(),
        )?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = video::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            kind: Set(input.kind),
            title: Set(title),
            slug: Set(slug),
            description: Set(non_blank(input.description)),
            media_url: Set(input.media_url),
            thumbnail_url: Set(input.thumbnail_url),
            duration_seconds: Set(input.duration_seconds),
            starts_at: Set(input.starts_at),
            registration_url: Set(input.registration_url),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let video = self.repo.create(model).await?;
        tracing::info!(video_id = %video.id, kind = ?video.kind, channel_id = %video.channel_id, "Video created");
        Ok(video)
    }

    /// Update a video.
    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateVideoInput,
    ) -> AppResult<video::Model> {
        input.validate()?;
        let video = self.ctx.load_managed(&self.repo, user, id).await?;

        let kind = input.kind.unwrap_or(video.kind);
        let has_start = match &input.starts_at {
            Some(value) => value.is_some(),
            None => video.starts_at.is_some(),
        };
        let has_registration = match &input.registration_url {
            Some(value) => value.is_some(),
            None => video.registration_url.is_some(),
        };
        check_schedule(kind, has_start, has_registration)?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&video.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: video::ActiveModel = video.into();
        active.kind = Set(kind);

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(non_blank(description));
        }
        if let Some(media_url) = input.media_url {
            active.media_url = Set(media_url);
        }
        if let Some(thumbnail_url) = input.thumbnail_url {
            active.thumbnail_url = Set(thumbnail_url);
        }
        if let Some(duration_seconds) = input.duration_seconds {
            if duration_seconds.is_some_and(|d| d < 0) {
                return Err(AppError::Validation(
                    "Duration must not be negative".to_string(),
                ));
            }
            active.duration_seconds = Set(duration_seconds);
        }
        if let Some(starts_at) = input.starts_at {
            active.starts_at = Set(starts_at);
        }
        if let Some(registration_url) = input.registration_url {
            active.registration_url = Set(registration_url);
        }
        if let Some(tags) = input.tags {
            active.tags = Set(tags_to_json(tags)?);
        }
        if let Some(is_published) = input.is_published {
            active.is_published = Set(is_published);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.repo.update(active).await
    }

    /// Delete a video with its comments, reactions and saves.
    pub async fn delete(&self, user: &user::Model, id: &str) -> AppResult<()> {
        let video = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&video.id).await?;

        tracing::info!(video_id = %video.id, actor = %user.id, "Video deleted");
        Ok(())
    }

    /// Show a video by ID or slug.
    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<VideoResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(VideoResponse::from))
    }

    /// List published videos, newest first.
    pub async fn list(&self, filter: ListVideosQuery) -> AppResult<Vec<video::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        match filter.kind {
            Some(kind) => self.repo.list_by_kind(kind, &query).await,
            None => self.repo.list(&query).await,
        }
    }
}

/// Start times and registration links belong to webinars and events.
fn check_schedule(kind: VideoKind, has_start: bool, has_registration: bool) -> AppResult<()> {
    if !kind.is_scheduled() && (has_start || has_registration) {
        return Err(AppError::Validation(
            "Only webinars and events can have a start time or registration link".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, count_rows, mock_db};
    use biznetworq_db::{
        entities::{ReactionKind, TargetKind, reaction},
        repositories::{ChannelRepository, EngagementRepository},
    };
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn service(db: MockDatabase) -> VideoService {
        let db = mock_db(db);
        VideoService::new(
            VideoRepository::new(db.clone()),
            ContentContext::new(ChannelRepository::new(db.clone()), EngagementRepository::new(db)),
        )
    }

    fn create_input(kind: VideoKind) -> CreateVideoInput {
        CreateVideoInput {
            channel_id: "c1".to_string(),
            kind,
            title: "Scaling Postgres".to_string(),
            description: None,
            media_url: "https://cdn.example.com/v.mp4".to_string(),
            thumbnail_url: None,
            duration_seconds: Some(600),
            starts_at: None,
            registration_url: None,
            tags: vec!["postgres".to_string()],
            is_published: true,
        }
    }

    #[test]
    fn test_check_schedule() {
        assert!(check_schedule(VideoKind::Webinar, true, true).is_ok());
        assert!(check_schedule(VideoKind::Event, false, true).is_ok());
        assert!(check_schedule(VideoKind::Podcast, false, false).is_ok());
        assert!(check_schedule(VideoKind::Demo, true, false).is_err());
    }

    #[test]
    fn test_create_input_defaults() {
        let input: CreateVideoInput = serde_json::from_str(
            r#"{"channelId":"c1","title":"Hello","mediaUrl":"https://cdn.example.com/a.mp4"}"#,
        )
        .unwrap();
        assert_eq!(input.kind, VideoKind::Video);
        assert!(input.is_published);
        assert!(input.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_by_stranger_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]]);
        let stranger = test_support::user("u2", "mallory");

        let result = service(db)
            .create(&stranger, create_input(VideoKind::Video))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_webinar() {
        let owner = test_support::user("owner", "owner");
        let created = test_support::video("v1", "c1", VideoKind::Webinar);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]])
            .append_query_results([count_rows(0)])
            .append_query_results([[created]]);

        let mut input = create_input(VideoKind::Webinar);
        input.starts_at = Some(Utc::now().fixed_offset());
        input.registration_url = Some("https://acme.example/register".to_string());

        let video = service(db).create(&owner, input).await.unwrap();
        assert_eq!(video.kind, VideoKind::Webinar);
    }

    #[tokio::test]
    async fn test_get_hides_drafts_from_anonymous_viewers() {
        let mut draft = test_support::video("v1", "c1", VideoKind::Video);
        draft.is_published = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[draft]]);

        let result = service(db).get("v1", None).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_counts_view_and_attaches_viewer_state() {
        let viewer = test_support::user("u2", "bob");
        let liked = reaction::Model {
            id: "r1".to_string(),
            user_id: "u2".to_string(),
            target_kind: TargetKind::Video,
            target_id: "v1".to_string(),
            kind: ReactionKind::Like,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::video("v1", "c1", VideoKind::Video)]])
            .append_query_results([[test_support::channel("c1", "owner")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[liked]])
            .append_query_results([count_rows(0)]);

        let detail = service(db).get("v1", Some(&viewer)).await.unwrap();
        assert_eq!(detail.item.views_count, 1);
        assert!(!detail.can_manage);
        let state = detail.viewer.unwrap();
        assert_eq!(state.reaction, Some(ReactionKind::Like));
        assert!(!state.saved);
    }

    #[tokio::test]
    async fn test_update_rejects_schedule_on_plain_video() {
        let owner = test_support::user("owner", "owner");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::video("v1", "c1", VideoKind::Video)]])
            .append_query_results([[test_support::channel("c1", "owner")]]);

        let input = UpdateVideoInput {
            registration_url: Some(Some("https://acme.example/register".to_string())),
            ..UpdateVideoInput::default()
        };
        let result = service(db).update(&owner, "v1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
