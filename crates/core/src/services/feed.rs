//! Cross-type feeds: a channel's content, the latest items and search.

use biznetworq_common::{AppError, AppResult};
use biznetworq_db::{
    entities::{TargetKind, user},
    repositories::{ChannelRepository, ContentQuery},
};

use super::{
    catalog::ContentCatalog,
    content::{ContentSummary, Page, can_manage},
};

const MAX_QUERY_LEN: usize = 200;

/// Parse a comma-separated kind filter such as `video,blog_post`.
///
/// A missing or blank filter selects every content kind.
pub fn parse_kinds(raw: Option<&str>) -> AppResult<Vec<TargetKind>> {
    let Some(raw) = raw else {
        return Ok(vec![]);
    };

    let mut kinds = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let kind = TargetKind::CONTENT
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown content type: {name}")))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

/// Service for aggregated content listings.
#[derive(Clone)]
pub struct FeedService {
    catalog: ContentCatalog,
    channel_repo: ChannelRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(catalog: ContentCatalog, channel_repo: ChannelRepository) -> Self {
        Self {
            catalog,
            channel_repo,
        }
    }

    /// All content of one channel, newest first.
    ///
    /// With `manager` set, drafts are included once the user is confirmed to
    /// manage the channel.
    pub async fn channel_content(
        &self,
        key: &str,
        kinds: &[TargetKind],
        manager: Option<&user::Model>,
        page: Page,
    ) -> AppResult<Vec<ContentSummary>> {
        let channel = self.channel_repo.get_by_id_or_slug(key).await?;

        let include_unpublished = match manager {
            Some(user) if can_manage(user, &channel) => true,
            Some(_) => {
                return Err(AppError::Forbidden(
                    "Not a manager of this channel".to_string(),
                ));
            }
            None => false,
        };

        let query = ContentQuery {
            include_unpublished,
            ..ContentQuery::published(page.limit(), page.offset()).in_channel(channel.id)
        };
        self.catalog.list(kinds, &query).await
    }

    /// Newest published items across the platform.
    pub async fn latest(&self, kinds: &[TargetKind], page: Page) -> AppResult<Vec<ContentSummary>> {
        let query = ContentQuery::published(page.limit(), page.offset());
        self.catalog.list(kinds, &query).await
    }

    /// Published items whose title contains `q`.
    pub async fn search(
        &self,
        q: &str,
        kinds: &[TargetKind],
        page: Page,
    ) -> AppResult<Vec<ContentSummary>> {
        let q = q.trim();
        if q.is_empty() {
            return Err(AppError::BadRequest("Search query is empty".to_string()));
        }
        if q.chars().count() > MAX_QUERY_LEN {
            return Err(AppError::BadRequest("Search query is too long".to_string()));
        }

        let query = ContentQuery::published(page.limit(), page.offset());
        self.catalog.search(q, kinds, &query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, mock_db};
    use biznetworq_db::entities::{VideoKind, channel};
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> FeedService {
        let conn = mock_db(db);
        FeedService::new(ContentCatalog::new(&conn), ChannelRepository::new(conn))
    }

    #[test]
    fn test_parse_kinds() {
        assert!(parse_kinds(None).unwrap().is_empty());
        assert!(parse_kinds(Some(" ")).unwrap().is_empty());
        assert_eq!(
            parse_kinds(Some("video, blog_post,video")).unwrap(),
            vec![TargetKind::Video, TargetKind::BlogPost]
        );
    }

    #[test]
    fn test_parse_kinds_rejects_unknown_and_comments() {
        assert!(matches!(
            parse_kinds(Some("video,podcasts")),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            parse_kinds(Some("comment")),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_latest_merges_newest_first() {
        let mut older = test_support::video("v1", "ch1", VideoKind::Webinar);
        older.created_at = (Utc::now() - Duration::hours(2)).into();
        let mut newer = test_support::blog_post("b1", "ch1");
        newer.created_at = Utc::now().into();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[older]])
            .append_query_results([[newer]]);
        let service = service(db);

        let items = service
            .latest(&[TargetKind::Video, TargetKind::BlogPost], Page::default())
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["b1", "v1"]);
        assert_eq!(items[1].subtype.as_deref(), Some("webinar"));
    }

    #[tokio::test]
    async fn test_latest_honours_offset() {
        let mut a = test_support::video("v1", "ch1", VideoKind::Video);
        a.created_at = (Utc::now() - Duration::hours(1)).into();
        let mut b = test_support::video("v2", "ch1", VideoKind::Video);
        b.created_at = Utc::now().into();

        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[b, a]]);
        let service = service(db);

        let page = Page {
            limit: Some(1),
            offset: Some(1),
        };
        let items = service.latest(&[TargetKind::Video], page).await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "v1");
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.search("  ", &[], Page::default()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_channel_drafts_need_manager() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("ch1", "owner")]]);
        let service = service(db);
        let stranger = test_support::user("u9", "mallory");

        let result = service
            .channel_content("ch1", &[], Some(&stranger), Page::default())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_channel_content_unknown_channel() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<channel::Model>::new()])
            .append_query_results([Vec::<channel::Model>::new()]);
        let service = service(db);

        let result = service
            .channel_content("nope", &[], None, Page::default())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_channel_content_for_owner() {
        let mut draft = test_support::blog_post("b1", "ch1");
        draft.is_published = false;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("ch1", "owner")]])
            .append_query_results([[draft]]);
        let service = service(db);
        let owner = test_support::user("owner", "olivia");

        let items = service
            .channel_content("ch1", &[TargetKind::BlogPost], Some(&owner), Page::default())
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert!(!items[0].is_published);
    }
}
