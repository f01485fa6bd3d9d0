//! Pieces shared by the per-type content services.

use biznetworq_common::{AppError, AppResult, IdGenerator};
use biznetworq_db::{
    entities::{
        ContentColumns, ReactionKind, TargetKind, blog_post, case_study, channel, pdf_document,
        short, tech_news, user, video,
    },
    repositories::{ChannelRepository, ContentRepository, EngagementRepository},
};
use chrono::{DateTime, FixedOffset};
use sea_orm::prelude::Json;
use serde::{Deserialize, Deserializer, Serialize};

use super::slug::{SlugStore, unique_slug};

/// Page size when the client does not ask for one.
pub const DEFAULT_LIMIT: u64 = 20;
/// Largest page a client can request.
pub const MAX_LIMIT: u64 = 100;
/// Deepest offset a client can page to.
pub const MAX_OFFSET: u64 = 10_000;

const MAX_TAGS: usize = 20;
const MAX_TAG_LEN: usize = 64;

/// Pagination parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Page {
    /// Limit clamped to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Offset capped at `MAX_OFFSET`.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0).min(MAX_OFFSET)
    }
}

/// What the current viewer has done to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerState {
    pub reaction: Option<ReactionKind>,
    pub saved: bool,
}

/// A content item together with the viewer's state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentDetail<T> {
    #[serde(flatten)]
    pub item: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<ViewerState>,
    /// Whether the viewer may edit the item.
    pub can_manage: bool,
}

/// Type-independent card for feeds, search results and saved lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSummary {
    #[serde(rename = "type")]
    pub kind: TargetKind,
    /// Video kind or PDF category, when the table has one.
    pub subtype: Option<String>,
    pub id: String,
    pub channel_id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_published: bool,
    pub views_count: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    pub created_at: String,
    #[serde(skip)]
    pub(crate) created: DateTime<FixedOffset>,
}

impl<T> ContentDetail<T> {
    /// Convert the item, keeping the viewer fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ContentDetail<U> {
        ContentDetail {
            item: f(self.item),
            viewer: self.viewer,
            can_manage: self.can_manage,
        }
    }
}

/// Row of a content table.
pub trait ContentItem {
    fn id(&self) -> &str;
    fn channel_id(&self) -> &str;
    fn is_published(&self) -> bool;
    /// Reflect a view counted in the database.
    fn record_view(&mut self);
    fn summarize(&self) -> ContentSummary;
}

macro_rules! content_item {
    ($($module:ident),+ $(,)?) => {
        $(
            impl ContentItem for biznetworq_db::entities::$module::Model {
                fn id(&self) -> &str {
                    &self.id
                }

                fn channel_id(&self) -> &str {
                    &self.channel_id
                }

                fn is_published(&self) -> bool {
                    self.is_published
                }

                fn record_view(&mut self) {
                    self.views_count += 1;
                }

                fn summarize(&self) -> ContentSummary {
                    let card = Card::from(self);
                    ContentSummary {
                        kind: <biznetworq_db::entities::$module::Entity as ContentColumns>::KIND,
                        subtype: card.subtype,
                        id: self.id.clone(),
                        channel_id: self.channel_id.clone(),
                        title: self.title.clone(),
                        slug: self.slug.clone(),
                        excerpt: card.excerpt,
                        thumbnail_url: card.thumbnail_url,
                        is_published: self.is_published,
                        views_count: self.views_count,
                        likes_count: self.likes_count,
                        dislikes_count: self.dislikes_count,
                        comments_count: self.comments_count,
                        created_at: self.created_at.to_rfc3339(),
                        created: self.created_at,
                    }
                }
            }
        )+
    };
}

content_item!(video, blog_post, case_study, tech_news, pdf_document, short);

/// The per-table part of a summary.
struct Card {
    subtype: Option<String>,
    excerpt: Option<String>,
    thumbnail_url: Option<String>,
}

impl From<&video::Model> for Card {
    fn from(m: &video::Model) -> Self {
        Self {
            subtype: Some(enum_name(&m.kind)),
            excerpt: m.description.as_deref().map(excerpt),
            thumbnail_url: m.thumbnail_url.clone(),
        }
    }
}

impl From<&blog_post::Model> for Card {
    fn from(m: &blog_post::Model) -> Self {
        Self {
            subtype: None,
            excerpt: Some(excerpt(m.excerpt.as_deref().unwrap_or(&m.body))),
            thumbnail_url: m.cover_image_url.clone(),
        }
    }
}

impl From<&case_study::Model> for Card {
    fn from(m: &case_study::Model) -> Self {
        Self {
            subtype: m.industry.clone(),
            excerpt: Some(excerpt(m.summary.as_deref().unwrap_or(&m.body))),
            thumbnail_url: m.cover_image_url.clone(),
        }
    }
}

impl From<&tech_news::Model> for Card {
    fn from(m: &tech_news::Model) -> Self {
        Self {
            subtype: m.category.clone(),
            excerpt: Some(excerpt(m.summary.as_deref().unwrap_or(&m.body))),
            thumbnail_url: m.image_url.clone(),
        }
    }
}

impl From<&pdf_document::Model> for Card {
    fn from(m: &pdf_document::Model) -> Self {
        Self {
            subtype: Some(enum_name(&m.category)),
            excerpt: m.description.as_deref().map(excerpt),
            thumbnail_url: m.thumbnail_url.clone(),
        }
    }
}

impl From<&short::Model> for Card {
    fn from(m: &short::Model) -> Self {
        Self {
            subtype: None,
            excerpt: None,
            thumbnail_url: m.thumbnail_url.clone(),
        }
    }
}

const EXCERPT_CHARS: usize = 280;

fn excerpt(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// Wire name of a unit enum (`white_paper`, `webinar`).
fn enum_name<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

/// Parse a stored tag array.
#[must_use]
pub fn tags_from_json(tags: &Json) -> Vec<String> {
    serde_json::from_value(tags.clone()).unwrap_or_default()
}

/// Normalize client tags: trimmed, lowercased, de-duplicated, bounded.
pub fn tags_to_json(tags: Vec<String>) -> AppResult<Json> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            continue;
        }
        if tag.chars().count() > MAX_TAG_LEN {
            return Err(AppError::Validation(format!(
                "Tags must be at most {MAX_TAG_LEN} characters"
            )));
        }
        if !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }

    if normalized.len() > MAX_TAGS {
        return Err(AppError::Validation(format!(
            "At most {MAX_TAGS} tags are allowed"
        )));
    }

    Ok(serde_json::json!(normalized))
}

/// Deserialize a field where `null` clears the value and absence keeps it.
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim an optional text field; blank becomes `None`.
#[must_use]
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Require a non-blank title.
pub fn require_title(title: &str) -> AppResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Whether `user` manages `channel` (its owner or any admin).
#[must_use]
pub fn can_manage(user: &user::Model, channel: &channel::Model) -> bool {
    user.is_admin || channel.owner_id == user.id
}

/// Channel permission, viewer state and slug lookups used by every content
/// service.
#[derive(Clone)]
pub struct ContentContext {
    channel_repo: ChannelRepository,
    engagement_repo: EngagementRepository,
    id_gen: IdGenerator,
}

impl ContentContext {
    #[must_use]
    pub const fn new(channel_repo: ChannelRepository, engagement_repo: EngagementRepository) -> Self {
        Self {
            channel_repo,
            engagement_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Load the channel and fail with `Forbidden` unless `user` manages it.
    pub async fn ensure_manager(
        &self,
        user: &user::Model,
        channel_id: &str,
    ) -> AppResult<channel::Model> {
        let channel = self.channel_repo.get_by_id(channel_id).await?;
        if !can_manage(user, &channel) {
            return Err(AppError::Forbidden(
                "Not a manager of this channel".to_string(),
            ));
        }
        Ok(channel)
    }

    /// Whether the (possibly anonymous) viewer manages a channel.
    pub async fn is_manager(
        &self,
        viewer: Option<&user::Model>,
        channel_id: &str,
    ) -> AppResult<bool> {
        match viewer {
            None => Ok(false),
            Some(user) if user.is_admin => Ok(true),
            Some(user) => Ok(self
                .channel_repo
                .find_by_id(channel_id)
                .await?
                .is_some_and(|channel| channel.owner_id == user.id)),
        }
    }

    /// Fail with `NotFound` unless the target exists and the viewer may see
    /// it. Drafts, and comments under drafts, are visible to channel managers
    /// only.
    pub async fn ensure_visible(
        &self,
        viewer: Option<&user::Model>,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<()> {
        let not_found = || AppError::NotFound(format!("{kind} not found: {target_id}"));

        let target = self
            .engagement_repo
            .target_visibility(kind, target_id)
            .await?
            .ok_or_else(not_found)?;
        if target.is_published || self.is_manager(viewer, &target.channel_id).await? {
            Ok(())
        } else {
            Err(not_found())
        }
    }

    /// Reaction and saved flag of a signed-in viewer.
    pub async fn viewer_state(
        &self,
        viewer: Option<&user::Model>,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Option<ViewerState>> {
        let Some(user) = viewer else {
            return Ok(None);
        };

        let reaction = self
            .engagement_repo
            .find_reaction(&user.id, kind, target_id)
            .await?
            .map(|r| r.kind);
        let saved = self
            .engagement_repo
            .is_saved(&user.id, kind, target_id)
            .await?;

        Ok(Some(ViewerState { reaction, saved }))
    }

    /// Fresh row ID.
    #[must_use]
    pub fn new_id(&self) -> String {
        self.id_gen.generate()
    }

    /// Load a content row the user manages, for update or delete.
    pub async fn load_managed<E>(
        &self,
        repo: &ContentRepository<E>,
        user: &user::Model,
        id: &str,
    ) -> AppResult<E::Model>
    where
        E: ContentColumns,
        E::Model: ContentItem + Sync,
    {
        let model = repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} not found: {id}", E::KIND)))?;
        self.ensure_manager(user, model.channel_id()).await?;
        Ok(model)
    }

    /// Resolve an item for display by ID or slug.
    ///
    /// Drafts are hidden from everyone but channel managers. Showing an
    /// item counts a view.
    pub async fn show<E>(
        &self,
        repo: &ContentRepository<E>,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ContentDetail<E::Model>>
    where
        E: ContentColumns,
        E::Model: ContentItem + Sync,
    {
        let not_found = || AppError::NotFound(format!("{} not found: {key}", E::KIND));

        let mut model = repo.find_by_id_or_slug(key).await?.ok_or_else(not_found)?;

        let can_manage = self.is_manager(viewer, model.channel_id()).await?;
        if !model.is_published() && !can_manage {
            return Err(not_found());
        }

        repo.increment_views(model.id()).await?;
        model.record_view();

        let viewer = self.viewer_state(viewer, E::KIND, model.id()).await?;

        Ok(ContentDetail {
            item: model,
            viewer,
            can_manage,
        })
    }

    /// Unused slug for `title` in `store`.
    pub async fn slug_for<S>(&self, store: &S, title: &str) -> AppResult<String>
    where
        S: SlugStore + ?Sized,
    {
        unique_slug(store, &self.id_gen, title).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    #[test]
    fn test_page_limits() {
        assert_eq!(Page::default().limit(), DEFAULT_LIMIT);
        assert_eq!(
            Page {
                limit: Some(1000),
                offset: None
            }
            .limit(),
            MAX_LIMIT
        );
        assert_eq!(
            Page {
                limit: Some(0),
                offset: Some(5)
            }
            .limit(),
            1
        );
    }

    #[test]
    fn test_page_offset_capped() {
        assert_eq!(Page::default().offset(), 0);
        assert_eq!(
            Page {
                limit: None,
                offset: Some(u64::MAX)
            }
            .offset(),
            MAX_OFFSET
        );
    }

    #[test]
    fn test_tags_normalized() {
        let json = tags_to_json(vec![
            " rust ".to_string(),
            "Rust".to_string(),
            String::new(),
            "Cloud".to_string(),
            "CLOUD".to_string(),
        ])
        .unwrap_or_default();
        assert_eq!(tags_from_json(&json), vec!["rust", "cloud"]);
    }

    #[test]
    fn test_too_many_tags() {
        let tags = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        assert!(matches!(tags_to_json(tags), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_can_manage() {
        let owner = test_support::user("owner", "owner");
        let stranger = test_support::user("other", "other");
        let admin = test_support::admin("root");
        let channel = test_support::channel("c1", "owner");

        assert!(can_manage(&owner, &channel));
        assert!(!can_manage(&stranger, &channel));
        assert!(can_manage(&admin, &channel));
    }
}
