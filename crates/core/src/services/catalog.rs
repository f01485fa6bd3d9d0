//! Queries spanning every content table.

use std::sync::Arc;

use biznetworq_common::AppResult;
use biznetworq_db::{
    entities::{ContentColumns, TargetKind, VideoKind},
    repositories::{
        BlogPostRepository, CaseStudyRepository, ContentQuery, ContentRepository,
        PdfDocumentRepository, ShortRepository, TechNewsRepository, VideoRepository,
    },
};
use sea_orm::DatabaseConnection;
use serde::Serialize;

use super::content::{ContentItem, ContentSummary, MAX_OFFSET};

/// Per-kind content counts of a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentCounts {
    pub videos: u64,
    pub webinars: u64,
    pub podcasts: u64,
    pub testimonials: u64,
    pub demos: u64,
    pub events: u64,
    pub blog_posts: u64,
    pub case_studies: u64,
    pub tech_news: u64,
    pub pdfs: u64,
    pub shorts: u64,
}

impl ContentCounts {
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.videos
            + self.webinars
            + self.podcasts
            + self.testimonials
            + self.demos
            + self.events
            + self.blog_posts
            + self.case_studies
            + self.tech_news
            + self.pdfs
            + self.shorts
    }
}

/// The six content repositories behind one handle.
#[derive(Clone)]
pub struct ContentCatalog {
    pub videos: VideoRepository,
    pub blog_posts: BlogPostRepository,
    pub case_studies: CaseStudyRepository,
    pub tech_news: TechNewsRepository,
    pub pdfs: PdfDocumentRepository,
    pub shorts: ShortRepository,
}

impl ContentCatalog {
    /// Build every content repository over one connection.
    #[must_use]
    pub fn new(db: &Arc<DatabaseConnection>) -> Self {
        Self {
            videos: ContentRepository::new(Arc::clone(db)),
            blog_posts: ContentRepository::new(Arc::clone(db)),
            case_studies: ContentRepository::new(Arc::clone(db)),
            tech_news: ContentRepository::new(Arc::clone(db)),
            pdfs: ContentRepository::new(Arc::clone(db)),
            shorts: ContentRepository::new(Arc::clone(db)),
        }
    }

    /// Summaries of the given items of one kind, in the order of `ids`.
    ///
    /// Missing IDs are skipped.
    pub async fn summaries_by_ids(
        &self,
        kind: TargetKind,
        ids: &[String],
    ) -> AppResult<Vec<ContentSummary>> {
        let mut found = match kind {
            TargetKind::Video => summarize_all(self.videos.find_by_ids(ids).await?),
            TargetKind::BlogPost => summarize_all(self.blog_posts.find_by_ids(ids).await?),
            TargetKind::CaseStudy => summarize_all(self.case_studies.find_by_ids(ids).await?),
            TargetKind::TechNews => summarize_all(self.tech_news.find_by_ids(ids).await?),
            TargetKind::PdfDocument => summarize_all(self.pdfs.find_by_ids(ids).await?),
            TargetKind::Short => summarize_all(self.shorts.find_by_ids(ids).await?),
            TargetKind::Comment => vec![],
        };

        found.sort_by_key(|s| ids.iter().position(|id| *id == s.id).unwrap_or(usize::MAX));
        Ok(found)
    }

    /// Newest items across `kinds`, merged and paged.
    ///
    /// Each table is asked for `offset + limit` rows so the merged page is
    /// exact. Offsets past `MAX_OFFSET` yield an empty page.
    pub async fn list(
        &self,
        kinds: &[TargetKind],
        query: &ContentQuery,
    ) -> AppResult<Vec<ContentSummary>> {
        self.collect(kinds, query, None).await
    }

    /// Title search across `kinds`, newest first.
    pub async fn search(
        &self,
        needle: &str,
        kinds: &[TargetKind],
        query: &ContentQuery,
    ) -> AppResult<Vec<ContentSummary>> {
        self.collect(kinds, query, Some(needle)).await
    }

    /// Per-kind counts for a channel.
    pub async fn channel_counts(
        &self,
        channel_id: &str,
        include_unpublished: bool,
    ) -> AppResult<ContentCounts> {
        let mut counts = ContentCounts::default();

        for (kind, count) in self
            .videos
            .count_by_kind(channel_id, include_unpublished)
            .await?
        {
            let count = count.max(0) as u64;
            match kind {
                VideoKind::Video => counts.videos = count,
                VideoKind::Webinar => counts.webinars = count,
                VideoKind::Podcast => counts.podcasts = count,
                VideoKind::Testimonial => counts.testimonials = count,
                VideoKind::Demo => counts.demos = count,
                VideoKind::Event => counts.events = count,
            }
        }

        counts.blog_posts = self
            .blog_posts
            .count_by_channel(channel_id, include_unpublished)
            .await?;
        counts.case_studies = self
            .case_studies
            .count_by_channel(channel_id, include_unpublished)
            .await?;
        counts.tech_news = self
            .tech_news
            .count_by_channel(channel_id, include_unpublished)
            .await?;
        counts.pdfs = self
            .pdfs
            .count_by_channel(channel_id, include_unpublished)
            .await?;
        counts.shorts = self
            .shorts
            .count_by_channel(channel_id, include_unpublished)
            .await?;

        Ok(counts)
    }

    async fn collect(
        &self,
        kinds: &[TargetKind],
        query: &ContentQuery,
        needle: Option<&str>,
    ) -> AppResult<Vec<ContentSummary>> {
        if query.offset > MAX_OFFSET {
            return Ok(Vec::new());
        }
        let window = ContentQuery {
            limit: query.offset.saturating_add(query.limit),
            offset: 0,
            ..query.clone()
        };

        let mut merged = Vec::new();
        for kind in TargetKind::CONTENT {
            if !kinds.is_empty() && !kinds.contains(&kind) {
                continue;
            }
            let rows = match kind {
                TargetKind::Video => fetch(&self.videos, &window, needle).await?,
                TargetKind::BlogPost => fetch(&self.blog_posts, &window, needle).await?,
                TargetKind::CaseStudy => fetch(&self.case_studies, &window, needle).await?,
                TargetKind::TechNews => fetch(&self.tech_news, &window, needle).await?,
                TargetKind::PdfDocument => fetch(&self.pdfs, &window, needle).await?,
                TargetKind::Short => fetch(&self.shorts, &window, needle).await?,
                TargetKind::Comment => vec![],
            };
            merged.extend(rows);
        }

        Ok(page_newest_first(merged, query.offset, query.limit))
    }
}

async fn fetch<E>(
    repo: &ContentRepository<E>,
    query: &ContentQuery,
    needle: Option<&str>,
) -> AppResult<Vec<ContentSummary>>
where
    E: ContentColumns,
    E::Model: ContentItem + Sync,
{
    let rows = match needle {
        Some(needle) => repo.search_titles(needle, query).await?,
        None => repo.list(query).await?,
    };
    Ok(summarize_all(rows))
}

fn summarize_all<M: ContentItem>(rows: Vec<M>) -> Vec<ContentSummary> {
    rows.iter().map(ContentItem::summarize).collect()
}

/// Sort newest first (ties broken by ID) and cut one page.
fn page_newest_first(
    mut items: Vec<ContentSummary>,
    offset: u64,
    limit: u64,
) -> Vec<ContentSummary> {
    items.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
    items
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, count_rows, mock_db};
    use biznetworq_db::entities::{blog_post, pdf_document, video};
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;

    fn at(minutes_ago: i64, mut summary: ContentSummary) -> ContentSummary {
        let time = (Utc::now() - Duration::minutes(minutes_ago)).fixed_offset();
        summary.created = time;
        summary.created_at = time.to_rfc3339();
        summary
    }

    #[test]
    fn test_page_newest_first() {
        let items = vec![
            at(30, test_support::video("v1", "c1", VideoKind::Video).summarize()),
            at(10, test_support::blog_post("b1", "c1").summarize()),
            at(20, test_support::pdf("p1", "c1").summarize()),
        ];

        let page = page_newest_first(items.clone(), 0, 2);
        let ids: Vec<_> = page.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["b1", "p1"]);

        let page = page_newest_first(items, 2, 2);
        let ids: Vec<_> = page.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["v1"]);
    }

    #[tokio::test]
    async fn test_list_merges_tables() {
        let mut older = test_support::video("v1", "c1", VideoKind::Webinar);
        older.created_at = (Utc::now() - Duration::hours(2)).into();
        let newer = test_support::blog_post("b1", "c1");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[older]])
            .append_query_results([[newer]]);
        let catalog = ContentCatalog::new(&mock_db(db));

        let page = catalog
            .list(
                &[TargetKind::Video, TargetKind::BlogPost],
                &ContentQuery::published(10, 0),
            )
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].kind, TargetKind::BlogPost);
        assert_eq!(page[1].kind, TargetKind::Video);
        assert_eq!(page[1].subtype.as_deref(), Some("webinar"));
    }

    #[tokio::test]
    async fn test_list_past_deepest_offset_is_empty() {
        let catalog = ContentCatalog::new(&mock_db(MockDatabase::new(DatabaseBackend::Postgres)));

        let page = catalog
            .list(&[], &ContentQuery::published(u64::MAX, u64::MAX))
            .await
            .unwrap();

        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_summaries_keep_requested_order() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![
            test_support::pdf("p1", "c1"),
            test_support::pdf("p2", "c1"),
        ]]);
        let catalog = ContentCatalog::new(&mock_db(db));

        let ids = vec!["p2".to_string(), "gone".to_string(), "p1".to_string()];
        let summaries = catalog
            .summaries_by_ids(TargetKind::PdfDocument, &ids)
            .await
            .unwrap();

        let got: Vec<_> = summaries.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(got, ["p2", "p1"]);
        assert_eq!(summaries[0].subtype.as_deref(), Some("white_paper"));
    }

    #[tokio::test]
    async fn test_channel_counts() {
        let by_kind = vec![
            BTreeMap::from([
                ("kind", Value::from("webinar")),
                ("num", Value::BigInt(Some(2))),
            ]),
            BTreeMap::from([
                ("kind", Value::from("video")),
                ("num", Value::BigInt(Some(5))),
            ]),
        ];
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([by_kind])
            .append_query_results([count_rows(3)])
            .append_query_results([count_rows(0)])
            .append_query_results([count_rows(1)])
            .append_query_results([count_rows(4)])
            .append_query_results([count_rows(0)]);
        let catalog = ContentCatalog::new(&mock_db(db));

        let counts = catalog.channel_counts("c1", false).await.unwrap();
        assert_eq!(counts.videos, 5);
        assert_eq!(counts.webinars, 2);
        assert_eq!(counts.blog_posts, 3);
        assert_eq!(counts.tech_news, 1);
        assert_eq!(counts.pdfs, 4);
        assert_eq!(counts.total(), 15);
    }

    #[test]
    fn test_summary_excerpt_prefers_explicit_excerpt() {
        let post: blog_post::Model = test_support::blog_post("b1", "c1");
        assert_eq!(post.summarize().excerpt.as_deref(), Some("A short story"));

        let clip: video::Model = test_support::video("v1", "c1", VideoKind::Video);
        assert!(clip.summarize().excerpt.is_none());

        let doc: pdf_document::Model = test_support::pdf("p1", "c1");
        assert_eq!(doc.summarize().kind, TargetKind::PdfDocument);
    }
}
