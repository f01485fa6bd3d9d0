//! PDF service: ebooks, infographics and white papers.

use biznetworq_common::{AppError, AppResult};
use biznetworq_db::{
    entities::{PdfCategory, pdf_document, user},
    repositories::{ContentQuery, PdfDocumentRepository},
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

/// Input for publishing a PDF.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePdfInput {
    pub channel_id: String,
    pub category: PdfCategory,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(url)]
    pub file_url: String,
    #[validate(url)]
    pub thumbnail_url: Option<String>,
    #[validate(range(min = 1, max = 10000))]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Partial update of a PDF.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePdfInput {
    pub category: Option<PdfCategory>,
    #[validate(length(min = 1, max = 256))]
    pub title: Option<String>,
    #[validate(length(max = 10000))]
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(url)]
    pub file_url: Option<String>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub page_count: Option<Option<i32>>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub regenerate_slug: bool,
}

/// PDF listing filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPdfsQuery {
    pub category: Option<PdfCategory>,
    pub channel_id: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// PDF as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfResponse {
    pub id: String,
    pub channel_id: String,
    pub author_id: String,
    pub category: PdfCategory,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub file_url: String,
    pub thumbnail_url: Option<String>,
    pub page_count: Option<i32>,
    pub downloads_count: i64,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<pdf_document::Model> for PdfResponse {
    fn from(d: pdf_document::Model) -> Self {
        Self {
            tags: tags_from_json(&d.tags),
            id: d.id,
            channel_id: d.channel_id,
            author_id: d.author_id,
            category: d.category,
            title: d.title,
            slug: d.slug,
            description: d.description,
            file_url: d.file_url,
            thumbnail_url: d.thumbnail_url,
            page_count: d.page_count,
            downloads_count: d.downloads_count,
            is_published: d.is_published,
            views_count: d.views_count,
            likes_count: d.likes_count,
            dislikes_count: d.dislikes_count,
            comments_count: d.comments_count,
            created_at: d.created_at.to_rfc3339(),
            updated_at: d.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Result of a recorded download.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub file_url: String,
    pub downloads_count: i64,
}

/// Service for PDF documents.
#[derive(Clone)]
pub struct PdfService {
    repo: PdfDocumentRepository,
    ctx: ContentContext,
}

impl PdfService {
    #[must_use]
    pub const fn new(repo: PdfDocumentRepository, ctx: ContentContext) -> Self {
        Self { repo, ctx }
    }

    pub async fn create(
        &self,
        user: &user::Model,
        input: CreatePdfInput,
    ) -> AppResult<pdf_document::Model> {
        input.validate()?;
        let channel = self.ctx.ensure_manager(user, &input.channel_id).await?;

        let title = require_title(&input.title)?;
        let slug = self.ctx.slug_for(&self.repo, &title).await?;

        let model = pdf_document::ActiveModel {
            id: Set(self.ctx.new_id()),
            channel_id: Set(channel.id),
            author_id: Set(user.id.clone()),
            category: Set(input.category),
            title: Set(title),
            slug: Set(slug),
            description: Set(non_blank(input.description)),
            file_url: Set(input.file_url),
            thumbnail_url: Set(input.thumbnail_url),
            page_count: Set(input.page_count),
            downloads_count: Set(0),
            tags: Set(tags_to_json(input.tags)?),
            is_published: Set(input.is_published),
            views_count: Set(0),
            likes_count: Set(0),
            dislikes_count: Set(0),
            comments_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let doc = self.repo.create(model).await?;
        tracing::info!(pdf_id = %doc.id, category = ?doc.category, channel_id = %doc.channel_id, "PDF created");
        Ok(doc)
    }

    pub async fn update(
        &self,
        user: &user::Model,
        id: &str,
        input: UpdatePdfInput,
    ) -> AppResult<pdf_document::Model> {
        input.validate()?;
        let doc = self.ctx.load_managed(&self.repo, user, id).await?;

        let title = match input.title {
            Some(title) => Some(require_title(&title)?),
            None => None,
        };
        let slug = if input.regenerate_slug {
            let source = title.as_deref().unwrap_or(&doc.title);
            Some(self.ctx.slug_for(&self.repo, source).await?)
        } else {
            None
        };

        let mut active: pdf_document::ActiveModel = doc.into();

        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(slug) = slug {
            active.slug = Set(slug);
        }
        if let Some(description) = input.description {
            active.description = Set(non_blank(description));
        }
        if let Some(file_url) = input.file_url {
            active.file_url = Set(file_url);
        }
        if let Some(thumbnail_url) = input.thumbnail_url {
            active.thumbnail_url = Set(thumbnail_url);
        }
        if let Some(page_count) = input.page_count {
            if page_count.is_some_and(|n| n < 1) {
                return Err(AppError::Validation(
                    "Page count must be positive".to_string(),
                ));
            }
            active.page_count = Set(page_count);
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
        let doc = self.ctx.load_managed(&self.repo, user, id).await?;
        self.repo.delete(&doc.id).await?;

        tracing::info!(pdf_id = %doc.id, actor = %user.id, "PDF deleted");
        Ok(())
    }

    pub async fn get(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<PdfResponse>> {
        let detail = self.ctx.show(&self.repo, key, viewer).await?;
        Ok(detail.map(PdfResponse::from))
    }

    /// Published PDFs, newest first, optionally for one category.
    pub async fn list(&self, filter: ListPdfsQuery) -> AppResult<Vec<pdf_document::Model>> {
        let page = Page {
            limit: filter.limit,
            offset: filter.offset,
        };
        let mut query = ContentQuery::published(page.limit(), page.offset());
        query.channel_id = filter.channel_id;

        match filter.category {
            Some(category) => self.repo.list_by_category(category, &query).await,
            None => self.repo.list(&query).await,
        }
    }

    /// Count a download and hand out the file URL.
    ///
    /// Drafts can only be downloaded by channel managers.
    pub async fn record_download(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<DownloadResponse> {
        let doc = self
            .repo
            .find_by_id_or_slug(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("PDF not found: {key}")))?;

        if !doc.is_published && !self.ctx.is_manager(viewer, &doc.channel_id).await? {
            return Err(AppError::NotFound(format!("PDF not found: {key}")));
        }

        self.repo.increment_downloads(&doc.id).await?;
        tracing::debug!(pdf_id = %doc.id, "PDF downloaded");

        Ok(DownloadResponse {
            file_url: doc.file_url,
            downloads_count: doc.downloads_count + 1,
        })
    }
}
