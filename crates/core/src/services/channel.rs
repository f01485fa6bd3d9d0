//! Channel service.

use biznetworq_common::{AppError, AppResult, IdGenerator};
use biznetworq_db::{
    entities::{channel, user},
    repositories::{ChannelRepository, UserRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{
    catalog::{ContentCatalog, ContentCounts},
    content::{Page, can_manage, double_option, non_blank},
    slug::{SlugStore, slugify, unique_slug},
};

/// Input for creating a channel.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChannelInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Requested handle; derived from the name when absent.
    #[validate(length(min = 1, max = 80))]
    pub slug: Option<String>,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(url)]
    pub logo_url: Option<String>,
    #[validate(url)]
    pub banner_url: Option<String>,
    #[validate(url)]
    pub website_url: Option<String>,
    /// Owner of the new channel; the creating admin when absent.
    pub owner_id: Option<String>,
}

/// Input for updating a channel. `null` clears optional fields.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChannelInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 4096))]
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub logo_url: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub banner_url: Option<Option<String>>,
    #[validate(url)]
    #[serde(default, deserialize_with = "double_option")]
    pub website_url: Option<Option<String>>,
    /// Transfer the channel (admins only).
    pub owner_id: Option<String>,
}

/// Channel as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub banner_url: Option<String>,
    pub website_url: Option<String>,
    pub subscribers_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<channel::Model> for ChannelResponse {
    fn from(c: channel::Model) -> Self {
        Self {
            id: c.id,
            owner_id: c.owner_id,
            name: c.name,
            slug: c.slug,
            description: c.description,
            logo_url: c.logo_url,
            banner_url: c.banner_url,
            website_url: c.website_url,
            subscribers_count: c.subscribers_count,
            created_at: c.created_at.to_rfc3339(),
            updated_at: c.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// Subscriber and per-kind content counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub subscribers: i64,
    pub total_content: u64,
    pub content: ContentCounts,
}

/// Channel page: the channel, its statistics and the viewer's relation to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDetail {
    pub channel: ChannelResponse,
    pub stats: ChannelStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed: Option<bool>,
    pub can_manage: bool,
}

/// Subscription state after a (un)subscribe call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub subscribed: bool,
    pub subscribers_count: i64,
}

/// Service for managing channels and subscriptions.
#[derive(Clone)]
pub struct ChannelService {
    channel_repo: ChannelRepository,
    user_repo: UserRepository,
    catalog: ContentCatalog,
    id_gen: IdGenerator,
}

impl ChannelService {
    /// Create a new channel service.
    #[must_use]
    pub const fn new(
        channel_repo: ChannelRepository,
        user_repo: UserRepository,
        catalog: ContentCatalog,
    ) -> Self {
        Self {
            channel_repo,
            user_repo,
            catalog,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a channel. Admins only.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateChannelInput,
    ) -> AppResult<channel::Model> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can create channels".to_string(),
            ));
        }
        input.validate()?;

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Name must not be empty".to_string()));
        }

        let owner_id = match input.owner_id {
            Some(owner_id) if owner_id != actor.id => {
                self.user_repo.get_by_id(&owner_id).await?;
                owner_id
            }
            _ => actor.id.clone(),
        };

        let slug = match input.slug {
            Some(requested) => {
                let slug = slugify(&requested);
                if self.channel_repo.slug_taken(&slug).await? {
                    return Err(AppError::Conflict(format!(
                        "Channel slug already exists: {slug}"
                    )));
                }
                slug
            }
            None => unique_slug(&self.channel_repo, &self.id_gen, &name).await?,
        };

        let model = channel::ActiveModel {
            id: Set(self.id_gen.generate()),
            owner_id: Set(owner_id),
            name: Set(name),
            slug: Set(slug),
            description: Set(non_blank(input.description)),
            logo_url: Set(input.logo_url),
            banner_url: Set(input.banner_url),
            website_url: Set(input.website_url),
            subscribers_count: Set(0),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let channel = self.channel_repo.create(model).await?;
        tracing::info!(channel_id = %channel.id, slug = %channel.slug, "Channel created");
        Ok(channel)
    }

    /// Update a channel. Owner or admin.
    pub async fn update(
        &self,
        actor: &user::Model,
        channel_id: &str,
        input: UpdateChannelInput,
    ) -> AppResult<channel::Model> {
        input.validate()?;
        let channel = self.ensure_manager(actor, channel_id).await?;

        let mut active: channel::ActiveModel = channel.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("Name must not be empty".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(non_blank(description));
        }
        if let Some(logo_url) = input.logo_url {
            active.logo_url = Set(logo_url);
        }
        if let Some(banner_url) = input.banner_url {
            active.banner_url = Set(banner_url);
        }
        if let Some(website_url) = input.website_url {
            active.website_url = Set(website_url);
        }
        if let Some(owner_id) = input.owner_id {
            if !actor.is_admin {
                return Err(AppError::Forbidden(
                    "Only admins can transfer channels".to_string(),
                ));
            }
            self.user_repo.get_by_id(&owner_id).await?;
            active.owner_id = Set(owner_id);
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.channel_repo.update(active).await
    }

    /// Delete a channel with its content. Admins only.
    pub async fn delete(&self, actor: &user::Model, channel_id: &str) -> AppResult<()> {
        if !actor.is_admin {
            return Err(AppError::Forbidden(
                "Only admins can delete channels".to_string(),
            ));
        }

        let channel = self.channel_repo.get_by_id(channel_id).await?;
        self.channel_repo.delete(&channel.id).await?;

        tracing::info!(channel_id = %channel.id, actor = %actor.id, "Channel deleted");
        Ok(())
    }

    /// Get a channel by ID or slug.
    pub async fn get(&self, key: &str) -> AppResult<channel::Model> {
        self.channel_repo.get_by_id_or_slug(key).await
    }

    /// Channel page with statistics. Managers see draft counts too.
    pub async fn get_detail(
        &self,
        key: &str,
        viewer: Option<&user::Model>,
    ) -> AppResult<ChannelDetail> {
        let channel = self.get(key).await?;
        let manages = viewer.is_some_and(|u| can_manage(u, &channel));

        let stats = self.stats(&channel, manages).await?;
        let subscribed = match viewer {
            Some(user) => Some(self.channel_repo.is_subscribed(&user.id, &channel.id).await?),
            None => None,
        };

        Ok(ChannelDetail {
            channel: channel.into(),
            stats,
            subscribed,
            can_manage: manages,
        })
    }

    /// List channels, or search them when `query` is non-blank.
    pub async fn list(&self, query: Option<&str>, page: Page) -> AppResult<Vec<channel::Model>> {
        match query.map(str::trim).filter(|q| !q.is_empty()) {
            Some(q) => {
                self.channel_repo
                    .search(q, page.limit(), page.offset())
                    .await
            }
            None => self.channel_repo.list(page.limit(), page.offset()).await,
        }
    }

    /// Subscriber and per-kind content counts.
    pub async fn stats(
        &self,
        channel: &channel::Model,
        include_unpublished: bool,
    ) -> AppResult<ChannelStats> {
        let content = self
            .catalog
            .channel_counts(&channel.id, include_unpublished)
            .await?;

        Ok(ChannelStats {
            subscribers: channel.subscribers_count,
            total_content: content.total(),
            content,
        })
    }

    /// Subscribe to a channel. Subscribing twice is a no-op.
    pub async fn subscribe(&self, user: &user::Model, key: &str) -> AppResult<SubscriptionState> {
        let channel = self.get(key).await?;
        let created = self
            .channel_repo
            .subscribe(self.id_gen.generate(), &user.id, &channel.id)
            .await?;

        if created {
            tracing::debug!(user_id = %user.id, channel_id = %channel.id, "Subscribed");
        }

        self.subscription_state(true, &channel.id).await
    }

    /// Unsubscribe from a channel. Unsubscribing twice is a no-op.
    pub async fn unsubscribe(&self, user: &user::Model, key: &str) -> AppResult<SubscriptionState> {
        let channel = self.get(key).await?;
        self.channel_repo.unsubscribe(&user.id, &channel.id).await?;

        self.subscription_state(false, &channel.id).await
    }

    /// Whether the user subscribes to a channel.
    pub async fn subscription_status(
        &self,
        user: &user::Model,
        key: &str,
    ) -> AppResult<SubscriptionState> {
        let channel = self.get(key).await?;
        let subscribed = self.channel_repo.is_subscribed(&user.id, &channel.id).await?;

        Ok(SubscriptionState {
            subscribed,
            subscribers_count: channel.subscribers_count,
        })
    }

    /// Channels the user subscribes to, most recent first.
    pub async fn list_subscribed(
        &self,
        user: &user::Model,
        page: Page,
    ) -> AppResult<Vec<channel::Model>> {
        self.channel_repo
            .find_subscribed_by_user(&user.id, page.limit(), page.offset())
            .await
    }

    /// Load a channel and fail with `Forbidden` unless `user` manages it.
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

    async fn subscription_state(
        &self,
        subscribed: bool,
        channel_id: &str,
    ) -> AppResult<SubscriptionState> {
        let channel = self.channel_repo.get_by_id(channel_id).await?;
        Ok(SubscriptionState {
            subscribed,
            subscribers_count: channel.subscribers_count,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, count_rows, mock_db};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> ChannelService {
        let db = mock_db(db);
        ChannelService::new(
            ChannelRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            ContentCatalog::new(&db),
        )
    }

    fn create_input(name: &str) -> CreateChannelInput {
        CreateChannelInput {
            name: name.to_string(),
            slug: None,
            description: Some("Cloud tooling".to_string()),
            logo_url: None,
            banner_url: None,
            website_url: Some("https://acme.example".to_string()),
            owner_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = test_support::user("u1", "alice");

        let result = service.create(&user, create_input("Acme")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_derives_slug() {
        let admin = test_support::admin("root");
        let mut created = test_support::channel("c1", "root");
        created.slug = "acme-cloud".to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count_rows(0)])
            .append_query_results([[created]]);

        let channel = service(db)
            .create(&admin, create_input("Acme Cloud"))
            .await
            .unwrap();
        assert_eq!(channel.slug, "acme-cloud");
        assert_eq!(channel.owner_id, "root");
    }

    #[tokio::test]
    async fn test_create_with_taken_slug_conflicts() {
        let admin = test_support::admin("root");
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([count_rows(1)]);

        let mut input = create_input("Acme Cloud");
        input.slug = Some("acme".to_string());

        let result = service(db).create(&admin, input).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_by_stranger_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]]);
        let stranger = test_support::user("u2", "mallory");

        let result = service(db)
            .update(&stranger, "c1", UpdateChannelInput::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_owner_cannot_transfer() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]]);
        let owner = test_support::user("owner", "owner");

        let input = UpdateChannelInput {
            owner_id: Some("someone".to_string()),
            ..UpdateChannelInput::default()
        };
        let result = service(db).update(&owner, "c1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_requires_admin() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let owner = test_support::user("owner", "owner");

        let result = service.delete(&owner, "c1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_update_input_distinguishes_null_from_missing() {
        let input: UpdateChannelInput =
            serde_json::from_str(r#"{"description": null, "name": "New"}"#).unwrap();
        assert_eq!(input.description, Some(None));
        assert_eq!(input.logo_url, None);
        assert_eq!(input.name.as_deref(), Some("New"));
    }

    #[tokio::test]
    async fn test_list_blank_query_lists_all() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::channel("c1", "owner")]]);

        let channels = service(db).list(Some("   "), Page::default()).await.unwrap();
        assert_eq!(channels.len(), 1);
    }
}
