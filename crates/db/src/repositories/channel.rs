//! Channel repository.

use std::collections::HashMap;
use std::sync::Arc;

use biznetworq_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
    sea_query::Expr,
};

use super::{insert_error, targets};
use crate::entities::{Channel, Subscription, channel, subscription};

/// Repository for channel operations.
#[derive(Clone)]
pub struct ChannelRepository {
    db: Arc<DatabaseConnection>,
}

impl ChannelRepository {
    /// Create a new channel repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    // ==================== Channel Operations ====================

    /// Find channel by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<channel::Model>> {
        Channel::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get channel by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<channel::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Channel not found: {id}")))
    }

    /// Find channel by slug.
    pub async fn find_by_slug(&self, slug: &str) -> AppResult<Option<channel::Model>> {
        Channel::find()
            .filter(channel::Column::Slug.eq(slug))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get channel by ID or slug, returning error if not found.
    pub async fn get_by_id_or_slug(&self, key: &str) -> AppResult<channel::Model> {
        if let Some(channel) = self.find_by_id(key).await? {
            return Ok(channel);
        }
        self.find_by_slug(key)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Channel not found: {key}")))
    }

    /// Check whether a slug is taken.
    pub async fn slug_exists(&self, slug: &str) -> AppResult<bool> {
        let count = Channel::find()
            .filter(channel::Column::Slug.eq(slug))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// List channels, most subscribed first.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<channel::Model>> {
        Channel::find()
            .order_by(channel::Column::SubscribersCount, Order::Desc)
            .order_by(channel::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Search channels by name or slug.
    pub async fn search(
        &self,
        query: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<channel::Model>> {
        Channel::find()
            .filter(
                Condition::any()
                    .add(channel::Column::Name.contains(query))
                    .add(channel::Column::Slug.contains(query.to_lowercase())),
            )
            .order_by(channel::Column::SubscribersCount, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find channels owned by a user.
    pub async fn find_by_owner(&self, owner_id: &str) -> AppResult<Vec<channel::Model>> {
        Channel::find()
            .filter(channel::Column::OwnerId.eq(owner_id))
            .order_by(channel::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new channel.
    pub async fn create(&self, model: channel::ActiveModel) -> AppResult<channel::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Channel slug"))
    }

    /// Update a channel.
    pub async fn update(&self, model: channel::ActiveModel) -> AppResult<channel::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| insert_error(e, "Channel slug"))
    }

    /// Delete a channel with all of its content and engagement.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        targets::purge_channel_engagement(&txn, id).await?;

        Channel::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ==================== Subscription Operations ====================

    /// Check if user is subscribed to a channel.
    pub async fn is_subscribed(&self, user_id: &str, channel_id: &str) -> AppResult<bool> {
        let count = Subscription::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::ChannelId.eq(channel_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// Subscribe a user to a channel.
    ///
    /// Returns `false` when the subscription already existed. The subscription
    /// row and `subscribers_count` change in one transaction.
    pub async fn subscribe(&self, id: String, user_id: &str, channel_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Channel::find_by_id(channel_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Channel not found: {channel_id}")))?;

        let existing = Subscription::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::ChannelId.eq(channel_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_some() {
            txn.commit()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        subscription::ActiveModel {
            id: Set(id),
            user_id: Set(user_id.to_string()),
            channel_id: Set(channel_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| insert_error(e, "Subscription"))?;

        Channel::update_many()
            .col_expr(
                channel::Column::SubscribersCount,
                Expr::col(channel::Column::SubscribersCount).add(1),
            )
            .filter(channel::Column::Id.eq(channel_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Unsubscribe a user from a channel.
    ///
    /// Returns `false` when there was nothing to remove.
    pub async fn unsubscribe(&self, user_id: &str, channel_id: &str) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Channel::find_by_id(channel_id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::NotFound(format!("Channel not found: {channel_id}")))?;

        let deleted = Subscription::delete_many()
            .filter(subscription::Column::UserId.eq(user_id))
            .filter(subscription::Column::ChannelId.eq(channel_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected > 0 {
            Channel::update_many()
                .col_expr(
                    channel::Column::SubscribersCount,
                    Expr::cust("GREATEST(subscribers_count - 1, 0)"),
                )
                .filter(channel::Column::Id.eq(channel_id))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(deleted.rows_affected > 0)
    }

    /// Find channels a user subscribes to, most recent subscription first.
    pub async fn find_subscribed_by_user(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<channel::Model>> {
        let channel_ids: Vec<String> = Subscription::find()
            .select_only()
            .column(subscription::Column::ChannelId)
            .filter(subscription::Column::UserId.eq(user_id))
            .order_by(subscription::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if channel_ids.is_empty() {
            return Ok(vec![]);
        }

        let position: HashMap<&str, usize> = channel_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut channels = Channel::find()
            .filter(channel::Column::Id.is_in(channel_ids.clone()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        channels.sort_by_key(|c| position.get(c.id.as_str()).copied().unwrap_or(usize::MAX));
        Ok(channels)
    }

    /// Count channels a user subscribes to.
    pub async fn count_subscribed_by_user(&self, user_id: &str) -> AppResult<u64> {
        Subscription::find()
            .filter(subscription::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
