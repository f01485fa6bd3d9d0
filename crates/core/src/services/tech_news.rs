//! Tech news service.

use biznetworq_common::AppResult;
use biznetworq_db::{
    entities::{tech_news, user},
    repositories::{ContentQuery, TechNewsRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{
    ContentContext, ContentDetail, Page, double_option, non_blank, require_title, tags_from_json,
    tags_to_json,
};

const fn default_true() -> bool {
    true
}

/// Input for publishing a news item.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTechNewsInput {
    pub channel_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub summary: Option<String>,
    #[validate(length(min = 1, max = 100_000))]
    pub body: String,
    #[validate(length(max = 128))]
    pub source_name: Option<String>,
    #[validate(url)]
    pub source_url: Option<String>,
    #[validate(url)]
    pub image_url: Option<String>,
    #[validate(length(max = 64))]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a news item.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTechNewsInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
    #[validate(length(min = 1, max = 100_000))]
    pub body: Option<String>,
    #[validate(length(max = 128))]
    #[serde(default, deserialize_with = "double_option")]
    pub source_name: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub source_url: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub image_url: Option<Option<String>>,
    #[validate(length(max = 64))]
    #[serde(default, deserialize_with = "double_option")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// News listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTechNewsQuery {
    pub channel_id: Option<String>,
    pub category: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// News item as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechNewsResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub body: String,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<tech_news::Model> for TechNewsResponse {
    fn from(n: tech_news::Model) -> Self {
        Self {
            tags: tags_from_json(&n.tags),
            id: n.id,
            channel_id: n.channel_id,
            author_id: n.author_id,
            title: n.title,
            slug: n.slug,
            summary: n.summary,
            body: n.body,
            source_name: n.source_name,
            source_url: n.source_url,
            image_url: n.image_url,
            category: n.category,
            is_published: n.is_published,
            views_count: n.views_count,
            likes_count: n.likes_count,
            dislikes_count: n.dislikes_count,
            comments_count: n.comments_count,
            created_at: n.created_at.to_rfc3339(),
            updated_at: n.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for tech news.
#[derive(Clone)]
pub struct TechNewsService {
    repo: TechNewsRepository,
    ctx: ContentContext,
}

impl TechNewsService {
    #[must_use]
    pub const fn new(repo: TechNewsRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateTechNewsInput,
    ) -> AppResult<tech_news::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = tech_news::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            title: Set(title),
            slug: Set(slug),
            summary: Set(non_blank(input.summary)),
            body: Set(input.body),
            source_name: Set(non_blank(input.source_name)),
            source_url: Set(input.source_url),
            image_url: Set(input.image_url),
            category: Set(normalize_category(input.category)),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let news = self.repo.create(model).await?;
        tracing::info!(news_id = %news.id, channel_id = %news.channel_id, "Tech news created");
        Ok(news)
    }

    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateTechNewsInput,
    ) -> AppResult<tech_news::Model> {
        input.validate()?;
        let news = self.ctx.load_managed(&self.repo, user, id).await?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&news.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: tech_news::ActiveModel = news.into();

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(summary) = input.summary {
            active.summary = Set(non_blank(summary));
        }
        if let Some(body) = input.body {
            active.body = Set(body);
        }
        if let Some(source_name) = input.source_name {
            active.source_name = Set(non_blank(source_name));
        }
        if let Some(source_url) = input.source_url {
            active.source_url = Set(source_url);
        }
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(category) = input.category {
            active.category = Set(normalize_category(category));
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
        let news = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&news.id).await?;

        tracing::info!(news_id = %news.id, actor = %user.id, "Tech news deleted");
        Ok(())
    }

    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<TechNewsResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(TechNewsResponse::from))
    }

    /// Published news, newest first, optionally for one category.
    pub async fn list(&self, filter: ListTechNewsQuery) -> AppResult<Vec<tech_news::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        match normalize_category(filter.category) {
            Some(category) => self.repo.list_by_category(&category, &query).await,
            None => self.repo.list(&query).await,
        }
    }
}

/// Categories are stored lowercase so filtering is case-insensitive.
fn normalize_category(category: Option<String>) -> Option<String> {
    non_blank(category).map(|c| c.to_lowercase())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::mock_db;
    use biznetworq_db::repositories::{ChannelRepository, EngagementRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category(Some(" AI ".to_string())).as_deref(), Some("ai"));
        assert_eq!(normalize_category(Some("  ".to_string())), None);
        assert_eq!(normalize_category(None), None);
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let item = tech_news::Model {
            id: "n1".to_string(),
            channel_id: "c1".to_string(),
            author_id: "owner".to_string(),
            title: "Chip shortage eases".to_string(),
            slug: "chip-shortage-eases".to_string(),
            summary: None,
            body: "Body".to_string(),
            source_name: Some("Wire".to_string()),
            source_url: None,
            image_url: None,
            category: Some("hardware".to_string()),
            tags: serde_json::json!([]),
            is_published: true,
            views_count: 0,
            likes_count: 0,
            dislikes_count: 0,
            comments_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let db = mock_db(MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[item]]));
        let service = TechNewsService::new(
            TechNewsRepository::new(db.clone()),
            ContentContext::new(ChannelRepository::new(db.clone()), EngagementRepository::new(db)),
        );

        let news = service
            .list(ListTechNewsQuery {
                category: Some("Hardware".to_string()),
                ..ListTechNewsQuery::default()
            })
            .await
            .unwrap();
        assert_eq!(news.len(), 1);
        assert_eq!(TechNewsResponse::from(news[0].clone()).category.as_deref(), Some("hardware"));
    }
}
