//! Blog service.

use biznetworq_common::AppResult;
use biznetworq_db::{
    entities::{blog_post, user},
    repositories::{BlogPostRepository, ContentQuery},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{
    ContentContext, ContentDetail, Page, double_option, non_blank, require_title, tags_from_json,
    tags_to_json,
};

const WORDS_PER_MINUTE: usize = 200;

const fn default_true() -> bool {
    true
}

/// Input for publishing a blog post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostInput {
    pub channel_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub excerpt: Option<String>,
    #[validate(length(min = 1, max = 200_000))]
    pub body: String,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a blog post.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    #[serde(default, deserialize_with = "double_option")]
    pub excerpt: Option<Option<String>>,
    #[validate(length(min = 1, max = 200_000))]
    pub body: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image_url: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// Blog listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBlogPostsQuery {
    pub channel_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Blog post as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub read_minutes: i32,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<blog_post::Model> for BlogPostResponse {
    fn from(p: blog_post::Model) -> Self {
        Self {
            tags: tags_from_json(&p.tags),
            id: p.id,
            channel_id: p.channel_id,
            author_id: p.author_id,
            title: p.title,
            slug: p.slug,
            excerpt: p.excerpt,
            body: p.body,
            cover_image_url: p.cover_image_url,
            read_minutes: p.read_minutes,
            is_published: p.is_published,
            views_count: p.views_count,
            likes_count: p.likes_count,
            dislikes_count: p.dislikes_count,
            comments_count: p.comments_count,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for blog posts.
#[derive(Clone)]
pub struct BlogService {
    repo: BlogPostRepository,
    ctx: ContentContext,
}

impl BlogService {
    /// Create a new blog service.
    #[must_use]
    pub const fn new(repo: BlogPostRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    /// Publish a blog post.
    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateBlogPostInput,
    ) -> AppResult<blog_post::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = blog_post::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            title: Set(title),
            slug: Set(slug),
            excerpt: Set(non_blank(input.excerpt)),
            read_minutes: Set(read_minutes(&input.body)),
            body: Set(input.body),
            cover_image_url: Set(input.cover_image_url),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let post = self.repo.create(model).await?;
        tracing::info!(post_id = %post.id, channel_id = %post.channel_id, "Blog post created");
        Ok(post)
    }

    /// Update a blog post.
    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateBlogPostInput,
    ) -> AppResult<blog_post::Model> {
        input.validate()?;
        let post = self.ctx.load_managed(&self.repo, user, id).await?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&post.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: blog_post::ActiveModel = post.into();

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(excerpt) = input.excerpt {
            active.excerpt = Set(non_blank(excerpt));
        }
        if let Some(body) = input.body {
            active.read_minutes = Set(read_minutes(&body));
            active.body = Set(body);
        }
        if let Some(cover_image_url) = input.cover_image_url {
            active.cover_image_url = Set(cover_image_url);
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

    /// Delete a blog post.
    pub async fn delete(&self, user: &user::Model, id: &str) -> AppResult<()> {
        let post = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&post.id).await?;

        tracing::info!(post_id = %post.id, actor = %user.id, "Blog post deleted");
        Ok(())
    }

    /// Show a blog post by ID or slug.
    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<BlogPostResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(BlogPostResponse::from))
    }

    /// List published posts, newest first.
    pub async fn list(&self, filter: ListBlogPostsQuery) -> AppResult<Vec<blog_post::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        self.repo.list(&query).await
    }
}

/// Estimated reading time, at least one minute.
fn read_minutes(body: &str) -> i32 {
    let words = body.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as i32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, count_rows, mock_db};
    use biznetworq_common::AppError;
    use biznetworq_db::repositories::{ChannelRepository, EngagementRepository};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> BlogService {
        let db = mock_db(db);
        BlogService::new(
            BlogPostRepository::new(db.clone()),
            ContentContext::new(ChannelRepository::new(db.clone()), EngagementRepository::new(db)),
        )
    }

    #[test]
    fn test_read_minutes() {
        assert_eq!(read_minutes(""), 1);
        assert_eq!(read_minutes("one two three"), 1);
        assert_eq!(read_minutes(&"word ".repeat(200)), 1);
        assert_eq!(read_minutes(&"word ".repeat(201)), 2);
        assert_eq!(read_minutes(&"word ".repeat(1000)), 5);
    }

    #[tokio::test]
    async fn test_admin_can_post_in_any_channel() {
        let admin = test_support::admin("root");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]])
            .append_query_results([count_rows(0)])
            .append_query_results([[test_support::blog_post("b1", "c1")]]);

        let input = CreateBlogPostInput {
            channel_id: "c1".to_string(),
            title: "Why we moved to Rust".to_string(),
            excerpt: None,
            body: "Long body".to_string(),
            cover_image_url: None,
            tags: vec![],
            is_published: true,
        };

        let post = service(db).create(&admin, input).await.unwrap();
        assert_eq!(post.channel_id, "c1");
    }

    #[tokio::test]
    async fn test_update_missing_post() {
        let owner = test_support::user("owner", "owner");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<blog_post::Model>::new()]);

        let result = service(db)
            .update(&owner, "nope", UpdateBlogPostInput::default())
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_published() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            test_support::blog_post("b2", "c1"),
            test_support::blog_post("b1", "c1"),
        ]]);

        let posts = service(db)
            .list(ListBlogPostsQuery::default())
            .await
            .unwrap();
        assert_eq!(posts.len(), 2);
    }
}
