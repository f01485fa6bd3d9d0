//! Content repositories.
//!
//! Every content table has the same shape around its own fields (channel,
//! slug, publication flag, engagement counters), so one generic repository
//! serves all of them. Table-specific queries live in inherent impls on the
//! concrete instantiation.

use std::marker::PhantomData;
use std::sync::Arc;

use biznetworq_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, sea_query::Expr,
};

use super::{insert_error, targets};
use crate::entities::{
    BlogPost, CaseStudy, ContentColumns, PdfCategory, PdfDocument, Short, TechNews, Video,
    VideoKind, pdf_document, tech_news, video,
};

/// Videos, webinars, podcasts, testimonials, demos and events.
pub type VideoRepository = ContentRepository<Video>;
/// Blog posts.
pub type BlogPostRepository = ContentRepository<BlogPost>;
/// Case studies.
pub type CaseStudyRepository = ContentRepository<CaseStudy>;
/// Tech news.
pub type TechNewsRepository = ContentRepository<TechNews>;
/// Ebooks, infographics and white papers.
pub type PdfDocumentRepository = ContentRepository<PdfDocument>;
/// Short-form videos.
pub type ShortRepository = ContentRepository<Short>;

/// Listing filter shared by every content table.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
    /// Restrict to one channel.
    pub channel_id: Option<String>,
    /// Include drafts (managers only).
    pub include_unpublished: bool,
    /// Maximum number of rows.
    pub limit: u64,
    /// Rows to skip.
    pub offset: u64,
}

impl ContentQuery {
    /// Published content of any channel.
    #[must_use]
    pub const fn published(limit: u64, offset: u64) -> Self {
        Self {
            channel_id: None,
            include_unpublished: false,
            limit,
            offset,
        }
    }

    /// Restrict to one channel.
    #[must_use]
    pub fn in_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    fn condition<E: ContentColumns>(&self) -> Condition {
        let mut condition = Condition::all();
        if let Some(channel_id) = &self.channel_id {
            condition = condition.add(E::CHANNEL_ID.eq(channel_id.as_str()));
        }
        if !self.include_unpublished {
            condition = condition.add(E::IS_PUBLISHED.eq(true));
        }
        condition
    }
}

/// Repository over one content table.
pub struct ContentRepository<E> {
    db: Arc<DatabaseConnection>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ContentRepository<E> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            _entity: PhantomData,
        }
    }
}

impl<E> ContentRepository<E>
where
    E: ContentColumns,
    E::Model: Sync,
{
    /// Create a new content repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// Find by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<E::Model>> {
        E::find()
            .filter(E::ID.eq(id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<E::Model>> {
        E::find()
            .filter(E::SLUG.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find by ID, falling back to slug.
    pub async fn find_by_id_or_slug(&self, key: &str) -> AppResult<Option<E::Model>> {
        match self.find_by_id(key).await? {
            Some(model) => Ok(Some(model)),
            None => self.find_by_slug(key).await,
        }
    }

    /// Find several rows by ID, in no particular order.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<E::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        E::find()
            .filter(E::ID.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a slug is already used in this table.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = E::find()
            .filter(E::SLUG.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// List rows, newest first.
    pub async fn list(&self, query: &ContentQuery) -> AppResult<Vec<E::Model>> {
        self.list_where(query, Condition::all()).await
    }

    /// List rows matching an extra condition, newest first.
    pub async fn list_where(
        &self,
        query: &ContentQuery,
        extra: Condition,
    ) -> AppResult<Vec<E::Model>> {
        E::find()
            .filter(query.condition::<E>())
            .filter(extra)
            .order_by(E::CREATED_AT, Order::Desc)
            .offset(query.offset)
            .limit(query.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search titles (substring match), newest first.
    pub async fn search_titles(
        &self,
        needle: &str,
        query: &ContentQuery,
    ) -> AppResult<Vec<E::Model>> {
        self.list_where(query, Condition::all().add(E::TITLE.contains(needle)))
            .await
    }

    /// Count rows of a channel.
    pub async fn count_by_channel(
        &self,
        channel_id: &str,
        include_unpublished: bool,
    ) -> AppResult<u64> {
        let query = ContentQuery {
            channel_id: Some(channel_id.to_string()),
            include_unpublished,
            ..ContentQuery::default()
        };

        E::find()
            .filter(query.condition::<E>())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of every row of a channel.
    pub async fn ids_by_channel(&self, channel_id: &str) -> AppResult<Vec<String>> {
        E::find()
            .select_only()
            .column(E::ID)
            .filter(E::CHANNEL_ID.eq(channel_id))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a row.
    pub async fn create<A>(&self, model: A) -> AppResult<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Slug"))
    }

    /// Update a row.
    pub async fn update<A>(&self, model: A) -> AppResult<E::Model>
    where
        A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
        E::Model: IntoActiveModel<A>,
    {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Slug"))
    }

    /// Delete a row together with its comments, reactions and saves.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        targets::purge_engagement(&txn, E::KIND, vec![id.to_string()]).await?;

        E::delete_many()
            .filter(E::ID.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment the view counter atomically.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        E::update_many()
            .col_expr(E::VIEWS, Expr::col(E::VIEWS).add(1))
            .filter(E::ID.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

impl ContentRepository<Video> {
    /// List one kind of video, newest first.
    pub async fn list_by_kind(
        &self,
        kind: VideoKind,
        query: &ContentQuery,
    ) -> AppResult<Vec<video::Model>> {
        self.list_where(query, Condition::all().add(video::Column::Kind.eq(kind)))
            .await
    }

    /// Count a channel's videos per kind.
    pub async fn count_by_kind(
        &self,
        channel_id: &str,
        include_unpublished: bool,
    ) -> AppResult<Vec<(VideoKind, i64)>> {
        let mut select = Video::find()
            .select_only()
            .column(video::Column::Kind)
            .column_as(Expr::col(video::Column::Id).count(), "count")
            .filter(video::Column::ChannelId.eq(channel_id));

        if !include_unpublished {
            select = select.filter(video::Column::IsPublished.eq(true));
        }

        select
            .group_by(video::Column::Kind)
            .into_tuple::<(VideoKind, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

impl ContentRepository<PdfDocument> {
    /// List one category of PDF, newest first.
    pub async fn list_by_category(
        &self,
        category: PdfCategory,
        query: &ContentQuery,
    ) -> AppResult<Vec<pdf_document::Model>> {
        self.list_where(
            query,
            Condition::all().add(pdf_document::Column::Category.eq(category)),
        )
        .await
    }

    /// Increment the download counter atomically.
    pub async fn increment_downloads(&self, id: &str) -> AppResult<()> {
        PdfDocument::update_many()
            .col_expr(
                pdf_document::Column::DownloadsCount,
                Expr::col(pdf_document::Column::DownloadsCount).add(1),
            )
            .filter(pdf_document::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

impl ContentRepository<TechNews> {
    /// List one news category, newest first.
    pub async fn list_by_category(
        &self,
        category: &str,
        query: &ContentQuery,
    ) -> AppResult<Vec<tech_news::Model>> {
        self.list_where(
            query,
            Condition::all().add(tech_news::Column::Category.eq(category)),
        )
        .await
    }
}
