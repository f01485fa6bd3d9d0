//! Shorts service (short-form vertical videos).

use biznetworq_common::{AppError, AppResult};
use biznetworq_db::{
    entities::{short, user},
    repositories::{ContentQuery, ShortRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{
    ContentContext, ContentDetail, Page, double_option, require_title, tags_from_json,
    tags_to_json,
};

/// Longest accepted short, in seconds.
const MAX_SHORT_SECONDS: i32 = 180;

const fn default_true() -> bool {
    true
}

/// Input for publishing a short.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateShortInput {
    pub channel_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(url)]
    pub media_url: String,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 1, max = MAX_SHORT_SECONDS))]
    pub duration_seconds: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a short.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShortInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(url)]
    pub media_url: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub duration_seconds: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// Shorts listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListShortsQuery {
    pub channel_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Short as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub media_url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<i32>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<short::Model> for ShortResponse {
    fn from(s: short::Model) -> Self {
        Self {
            tags: tags_from_json(&s.tags),
            id: s.id,
            channel_id: s.channel_id,
            author_id: s.author_id,
            title: s.title,
            slug: s.slug,
            media_url: s.media_url,
            thumbnail_url: s.thumbnail_url,
            duration_seconds: s.duration_seconds,
            is_published: s.is_published,
            views_count: s.views_count,
            likes_count: s.likes_count,
            dislikes_count: s.dislikes_count,
            comments_count: s.comments_count,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for shorts.
#[derive(Clone)]
pub struct ShortService {
    repo: ShortRepository,
    ctx: ContentContext,
}

impl ShortService {
    #[must_use]
    pub const fn new(repo: ShortRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateShortInput,
    ) -> AppResult<short::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = short::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            title: Set(title),
            slug: Set(slug),
            media_url: Set(input.media_url),
            thumbnail_url: Set(input.thumbnail_url),
            duration_seconds: Set(input.duration_seconds),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let short = self.repo.create(model).await?;
        tracing::info!(short_id = %short.id, channel_id = %short.channel_id, "Short created");
        Ok(short)
    }

    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateShortInput,
    ) -> AppResult<short::Model> {
        input.validate()?;
        let short = self.ctx.load_managed(&self.repo, user, id).await?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&short.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: short::ActiveModel = short.into();

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(media_url) = input.media_url {
            active.media_url = Set(media_url);
        }
        if let Some(thumbnail_url) = input.thumbnail_url {
            active.thumbnail_url = Set(thumbnail_url);
        }
        if let Some(duration_seconds) = input.duration_seconds {
            if duration_seconds.is_some_and(|d| !(1..=MAX_SHORT_SECONDS).contains(&d)) {
                return Err(AppError::Validation(format!(
                    "Shorts last between 1 and {MAX_SHORT_SECONDS} seconds"
                )));
            }
            active.duration_seconds = Set(duration_seconds);
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

    pub async fn delete(&self, user: &user::Model, id: &str) -> AppResult<()> {
        let short = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&short.id).await?;

        tracing::info!(short_id = %short.id, actor = %user.id, "Short deleted");
        Ok(())
    }

    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<ShortResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(ShortResponse::from))
    }

    pub async fn list(&self, filter: ListShortsQuery) -> AppResult<Vec<short::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        self.repo.list(&query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(duration: Option<i32>) -> CreateShortInput {
        CreateShortInput {
            channel_id: "c1".to_string(),
            title: "60 second Rust tip".to_string(),
            media_url: "https://cdn.example.com/s.mp4".to_string(),
            thumbnail_url: None,
            duration_seconds: duration,
            tags: vec![],
            is_published: true,
        }
    }

    #[test]
    fn test_duration_bounds() {
        assert!(input(Some(60)).validate().is_ok());
        assert!(input(None).validate().is_ok());
        assert!(input(Some(0)).validate().is_err());
        assert!(input(Some(MAX_SHORT_SECONDS + 1)).validate().is_err());
    }
}
