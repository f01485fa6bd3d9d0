//! Case study service.

use biznetworq_common::AppResult;
use biznetworq_db::{
    entities::{case_study, user},
    repositories::{CaseStudyRepository, ContentQuery},
};
use chrono::Utc;
use sea_orm::{Condition, ColumnTrait, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{
    ContentContext, ContentDetail, Page, double_option, non_blank, require_title, tags_from_json,
    tags_to_json,
};

const fn default_true() -> bool {
    true
}

/// Input for publishing a case study.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaseStudyInput {
    pub channel_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 256))]
    pub client_name: Option<String>,
    #[validate(length(max = 128))]
    pub industry: Option<String>,
    #[validate(length(max = 2000))]
    pub summary: Option<String>,
    #[validate(length(min = 1, max = 200_000))]
    pub body: String,
    #[validate(url)]
    pub cover_image_url: Option<String>,
    /// Downloadable companion document.
    #[validate(url)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a case study.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaseStudyInput {
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 256))]
    #[serde(default, deserialize_with = "double_option")]
    pub client_name: Option<Option<String>>,
    #[validate(length(max = 128))]
    #[serde(default, deserialize_with = "double_option")]
    pub industry: Option<Option<String>>,
    #[validate(length(max = 2000))]
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
    #[validate(length(min = 1, max = 200_000))]
    pub body: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image_url: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub attachment_url: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// Case study listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCaseStudiesQuery {
    pub channel_id: Option<String>,
    pub industry: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Case study as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub title: String,
    pub slug: String,
    pub client_name: Option<String>,
    pub industry: Option<String>,
    pub summary: Option<String>,
    pub body: String,
    pub cover_image_url: Option<String>,
    pub attachment_url: Option<String>,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<case_study::Model> for CaseStudyResponse {
    fn from(c: case_study::Model) -> Self {
        Self {
            tags: tags_from_json(&c.tags),
            id: c.id,
            channel_id: c.channel_id,
            author_id: c.author_id,
            title: c.title,
            slug: c.slug,
            client_name: c.client_name,
            industry: c.industry,
            summary: c.summary,
            body: c.body,
            cover_image_url: c.cover_image_url,
            attachment_url: c.attachment_url,
            is_published: c.is_published,
            views_count: c.views_count,
            likes_count: c.likes_count,
            dislikes_count: c.dislikes_count,
            comments_count: c.comments_count,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Service for case studies.
#[derive(Clone)]
pub struct CaseStudyService {
    repo: CaseStudyRepository,
    ctx: ContentContext,
}

impl CaseStudyService {
    #[must_use]
    pub const fn new(repo: CaseStudyRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    pub async fn create(
        &self,
        user: &user::Model,
        input: CreateCaseStudyInput,
    ) -> AppResult<case_study::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = case_study::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            title: Set(title),
            slug: Set(slug),
            client_name: Set(non_blank(input.client_name)),
            industry: Set(non_blank(input.industry)),
            summary: Set(non_blank(input.summary)),
            body: Set(input.body),
            cover_image_url: Set(input.cover_image_url),
            attachment_url: Set(input.attachment_url),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let study = self.repo.create(model).await?;
        tracing::info!(case_study_id = %study.id, channel_id = %study.channel_id, "Case study created");
        Ok(study)
    }

    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdateCaseStudyInput,
    ) -> AppResult<case_study::Model> {
        input.validate()?;
        let study = self.ctx.load_managed(&self.repo, user, id).await?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&study.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: case_study::ActiveModel = study.into();

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(client_name) = input.client_name {
            active.client_name = Set(non_blank(client_name));
        }
        if let Some(industry) = input.industry {
            active.industry = Set(non_blank(industry));
        }
        if let Some(summary) = input.summary {
            active.summary = Set(non_blank(summary));
        }
        if let Some(body) = input.body {
            active.body = Set(body);
        }
        if let Some(cover_image_url) = input.cover_image_url {
            active.cover_image_url = Set(cover_image_url);
        }
        if let Some(attachment_url) = input.attachment_url {
            active.attachment_url = Set(attachment_url);
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
        let study = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&study.id).await?;

        tracing::info!(case_study_id = %study.id, actor = %user.id, "Case study deleted");
        Ok(())
    }

    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<CaseStudyResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(CaseStudyResponse::from))
    }

    /// Published case studies, newest first, optionally for one industry.
    pub async fn list(&self, filter: ListCaseStudiesQuery) -> AppResult<Vec<case_study::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        let mut extra = Condition::all();
        if let Some(industry) = non_blank(filter.industry) {
            extra = extra.add(case_study::Column::Industry.eq(industry));
        }

        self.repo.list_where(&query, extra).await
    }
}
