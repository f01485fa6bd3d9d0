//! Reactions and saved items.
//!
//! A user holds at most one reaction per target. Pressing the reaction the
//! user already holds clears it, pressing the other one switches it. Reaction
//! rows and the target's counters change in a single transaction with the
//! target row locked, so concurrent toggles on one target serialise.

use std::sync::Arc;

use biznetworq_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::{insert_error, targets};
use crate::entities::{
    Comment, Reaction, ReactionKind, SavedItem, TargetKind, reaction, saved_item,
};

/// Outcome of pressing a reaction button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionChange {
    /// Reaction held afterwards.
    pub next: Option<ReactionKind>,
    /// Change to apply to the like counter.
    pub likes_delta: i64,
    /// Change to apply to the dislike counter.
    pub dislikes_delta: i64,
}

/// Resolve a reaction press.
///
/// `pressed == None` clears whatever the user holds.
#[must_use]
pub fn resolve_reaction(
    current: Option<ReactionKind>,
    pressed: Option<ReactionKind>,
) -> ReactionChange {
    let next = match pressed {
        Some(kind) if current == Some(kind) => None,
        other => other,
    };

    let delta = |kind: ReactionKind| i64::from(next == Some(kind)) - i64::from(current == Some(kind));

    ReactionChange {
        next,
        likes_delta: delta(ReactionKind::Like),
        dislikes_delta: delta(ReactionKind::Dislike),
    }
}

/// Reaction state of a target after a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionState {
    /// The caller's reaction.
    pub reaction: Option<ReactionKind>,
    /// Like counter.
    pub likes: i64,
    /// Dislike counter.
    pub dislikes: i64,
}

/// Where a target lives and whether it is out of draft.
///
/// Comments report the content item they belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVisibility {
    pub channel_id: String,
    pub is_published: bool,
}

/// Repository for reactions and saved items.
#[derive(Clone)]
pub struct EngagementRepository {
    db: Arc<DatabaseConnection>,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Channel and publish state of a target, `None` if it does not exist.
    pub async fn target_visibility(
        &self,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Option<TargetVisibility>> {
        let (kind, target_id) = if kind == TargetKind::Comment {
            let comment = Comment::find_by_id(target_id)
                .one(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            match comment {
                Some(comment) => (comment.target_kind, comment.target_id),
                None => return Ok(None),
            }
        } else {
            (kind, target_id.to_string())
        };

        let found = targets::content_visibility(self.db.as_ref(), kind, &target_id).await?;
        Ok(found.map(|(channel_id, is_published)| TargetVisibility {
            channel_id,
            is_published,
        }))
    }

    // ==================== Reactions ====================

    /// Find a user's reaction to a target.
    pub async fn find_reaction(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<Option<reaction::Model>> {
        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(kind))
            .filter(reaction::Column::TargetId.eq(target_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's reactions to several targets of one kind.
    pub async fn find_reactions(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_ids: &[String],
    ) -> AppResult<Vec<reaction::Model>> {
        if target_ids.is_empty() {
            return Ok(vec![]);
        }

        Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(kind))
            .filter(reaction::Column::TargetId.is_in(target_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Press a reaction button (or clear with `None`).
    ///
    /// `new_id` is used when a reaction row has to be inserted.
    pub async fn set_reaction(
        &self,
        new_id: String,
        user_id: &str,
        kind: TargetKind,
        target_id: &str,
        pressed: Option<ReactionKind>,
    ) -> AppResult<ReactionState> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let (likes, dislikes) = targets::lock_reaction_counters(&txn, kind, target_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{kind} not found: {target_id}")))?;

        let existing = Reaction::find()
            .filter(reaction::Column::UserId.eq(user_id))
            .filter(reaction::Column::TargetKind.eq(kind))
            .filter(reaction::Column::TargetId.eq(target_id))
            .one(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let change = resolve_reaction(existing.as_ref().map(|r| r.kind), pressed);

        match (existing, change.next) {
            (Some(row), None) => {
                Reaction::delete_by_id(row.id)
                    .exec(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            (Some(row), Some(next)) if row.kind != next => {
                let mut active: reaction::ActiveModel = row.into();
                active.kind = Set(next);
                active
                    .update(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
            (None, Some(next)) => {
                reaction::ActiveModel {
                    id: Set(new_id),
                    user_id: Set(user_id.to_string()),
                    target_kind: Set(kind),
                    target_id: Set(target_id.to_string()),
                    kind: Set(next),
                    created_at: Set(Utc::now().into()),
                }
                .insert(&txn)
                .await
                .map_err(|e| insert_error(e, "Reaction"))?;
            }
            _ => {}
        }

        targets::apply_reaction_deltas(
            &txn,
            kind,
            target_id,
            change.likes_delta,
            change.dislikes_delta,
        )
        .await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::debug!(
            user_id = %user_id,
            target_kind = %kind,
            target_id = %target_id,
            reaction = ?change.next,
            "Reaction updated"
        );

        Ok(ReactionState {
            reaction: change.next,
            likes: (likes + change.likes_delta).max(0),
            dislikes: (dislikes + change.dislikes_delta).max(0),
        })
    }

    // ==================== Saved items ====================

    /// Whether a user saved a target.
    pub async fn is_saved(&self, user_id: &str, kind: TargetKind, target_id: &str) -> AppResult<bool> {
        let count = SavedItem::find()
            .filter(saved_item::Column::UserId.eq(user_id))
            .filter(saved_item::Column::TargetKind.eq(kind))
            .filter(saved_item::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(count > 0)
    }

    /// IDs among `target_ids` that the user saved.
    pub async fn saved_among(
        &self,
        user_id: &str,
        kind: TargetKind,
        target_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if target_ids.is_empty() {
            return Ok(vec![]);
        }

        SavedItem::find()
            .select_only()
            .column(saved_item::Column::TargetId)
            .filter(saved_item::Column::UserId.eq(user_id))
            .filter(saved_item::Column::TargetKind.eq(kind))
            .filter(saved_item::Column::TargetId.is_in(target_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Save a target, or unsave it if already saved. Returns the new state.
    pub async fn toggle_save(
        &self,
        new_id: String,
        user_id: &str,
        kind: TargetKind,
        target_id: &str,
    ) -> AppResult<bool> {
        let deleted = SavedItem::delete_many()
            .filter(saved_item::Column::UserId.eq(user_id))
            .filter(saved_item::Column::TargetKind.eq(kind))
            .filter(saved_item::Column::TargetId.eq(target_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if deleted.rows_affected > 0 {
            return Ok(false);
        }

        if !targets::target_exists(self.db.as_ref(), kind, target_id).await? {
            return Err(AppError::NotFound(format!("{kind} not found: {target_id}")));
        }

        let inserted = saved_item::ActiveModel {
            id: Set(new_id),
            user_id: Set(user_id.to_string()),
            target_kind: Set(kind),
            target_id: Set(target_id.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.db.as_ref())
        .await;

        match inserted {
            Ok(_) => Ok(true),
            // A concurrent save won the race; the item is saved either way.
            Err(e) => match insert_error(e, "Saved item") {
                AppError::Conflict(_) => Ok(true),
                other => Err(other),
            },
        }
    }

    /// A user's saved items, most recent first.
    pub async fn find_saved(
        &self,
        user_id: &str,
        kind: Option<TargetKind>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<saved_item::Model>> {
        let mut query = SavedItem::find().filter(saved_item::Column::UserId.eq(user_id));
        if let Some(kind) = kind {
            query = query.filter(saved_item::Column::TargetKind.eq(kind));
        }

        query
            .order_by(saved_item::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use crate::entities::ReactionKind::{Dislike, Like};

    #[test]
    fn test_like_from_neutral() {
        let change = resolve_reaction(None, Some(Like));
        assert_eq!(change.next, Some(Like));
        assert_eq!((change.likes_delta, change.dislikes_delta), (1, 0));
    }

    #[test]
    fn test_like_twice_returns_to_neutral() {
        let change = resolve_reaction(Some(Like), Some(Like));
        assert_eq!(change.next, None);
        assert_eq!((change.likes_delta, change.dislikes_delta), (-1, 0));
    }

    #[test]
    fn test_dislike_after_like_switches() {
        let change = resolve_reaction(Some(Like), Some(Dislike));
        assert_eq!(change.next, Some(Dislike));
        assert_eq!((change.likes_delta, change.dislikes_delta), (-1, 1));
    }

    #[test]
    fn test_like_after_dislike_switches() {
        let change = resolve_reaction(Some(Dislike), Some(Like));
        assert_eq!(change.next, Some(Like));
        assert_eq!((change.likes_delta, change.dislikes_delta), (1, -1));
    }

    #[test]
    fn test_clear() {
        assert_eq!(resolve_reaction(Some(Dislike), None).dislikes_delta, -1);
        assert_eq!(
            resolve_reaction(None, None),
            ReactionChange {
                next: None,
                likes_delta: 0,
                dislikes_delta: 0,
            }
        );
    }

    #[test]
    fn test_deltas_track_state_for_every_transition() {
        let states = [None, Some(Like), Some(Dislike)];
        for current in states {
            for pressed in states {
                let change = resolve_reaction(current, pressed);
                let count = |state: Option<ReactionKind>, kind| i64::from(state == Some(kind));
                assert_eq!(count(current, Like) + change.likes_delta, count(change.next, Like));
                assert_eq!(
                    count(current, Dislike) + change.dislikes_delta,
                    count(change.next, Dislike)
                );
            }
        }
    }

    fn counters(likes: i64, dislikes: i64) -> Vec<BTreeMap<&'static str, Value>> {
        vec![BTreeMap::from([
            ("dislikes_count", Value::from(dislikes)),
            ("likes_count", Value::from(likes)),
        ])]
    }

    fn stored_reaction(kind: ReactionKind) -> reaction::Model {
        reaction::Model {
            id: "r1".to_string(),
            user_id: "user1".to_string(),
            target_kind: TargetKind::Video,
            target_id: "v1".to_string(),
            kind,
            created_at: Utc::now().into(),
        }
    }

    fn updated(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    #[tokio::test]
    async fn test_set_reaction_like_from_neutral() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([counters(4, 2)])
            .append_query_results([Vec::<reaction::Model>::new()])
            .append_query_results([[stored_reaction(Like)]])
            .append_exec_results([updated(1)])
            .into_connection();

        let state = EngagementRepository::new(Arc::new(db))
            .set_reaction("r1".to_string(), "user1", TargetKind::Video, "v1", Some(Like))
            .await
            .unwrap();

        assert_eq!(state.reaction, Some(Like));
        assert_eq!((state.likes, state.dislikes), (5, 2));
    }

    #[tokio::test]
    async fn test_set_reaction_switch_moves_both_counters() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([counters(4, 2)])
            .append_query_results([[stored_reaction(Like)]])
            .append_query_results([[stored_reaction(Dislike)]])
            .append_exec_results([updated(1)])
            .into_connection();

        let state = EngagementRepository::new(Arc::new(db))
            .set_reaction("r2".to_string(), "user1", TargetKind::Video, "v1", Some(Dislike))
            .await
            .unwrap();

        assert_eq!(state.reaction, Some(Dislike));
        assert_eq!((state.likes, state.dislikes), (3, 3));
    }

    #[tokio::test]
    async fn test_set_reaction_clear_never_goes_negative() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([counters(0, 0)])
            .append_query_results([[stored_reaction(Like)]])
            .append_exec_results([updated(1), updated(1)])
            .into_connection();

        let state = EngagementRepository::new(Arc::new(db))
            .set_reaction("r2".to_string(), "user1", TargetKind::Video, "v1", None)
            .await
            .unwrap();

        assert_eq!(state.reaction, None);
        assert_eq!((state.likes, state.dislikes), (0, 0));
    }

    #[tokio::test]
    async fn test_set_reaction_missing_target() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let result = EngagementRepository::new(Arc::new(db))
            .set_reaction("r1".to_string(), "user1", TargetKind::Short, "gone", Some(Like))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_comment_visibility_follows_its_target() {
        let comment = crate::entities::comment::Model {
            id: "cm1".to_string(),
            user_id: "user1".to_string(),
            target_kind: TargetKind::BlogPost,
            target_id: "post1".to_string(),
            parent_id: None,
            text: "Nice".to_string(),
            likes_count: 0,
            dislikes_count: 0,
            replies_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[comment]])
            .append_query_results([vec![BTreeMap::from([
                ("channel_id", Value::from("c1")),
                ("is_published", Value::from(false)),
            ])]])
            .into_connection();

        let found = EngagementRepository::new(Arc::new(db))
            .target_visibility(TargetKind::Comment, "cm1")
            .await
            .unwrap();

        assert_eq!(
            found,
            Some(TargetVisibility {
                channel_id: "c1".to_string(),
                is_published: false,
            })
        );
    }

    #[tokio::test]
    async fn test_find_saved() {
        let saved = saved_item::Model {
            id: "s1".to_string(),
            user_id: "user1".to_string(),
            target_kind: TargetKind::TechNews,
            target_id: "news1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[saved]])
            .into_connection();

        let repo = EngagementRepository::new(Arc::new(db));
        let result = repo
            .find_saved("user1", Some(TargetKind::TechNews), 20, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].target_id, "news1");
    }

    #[tokio::test]
    async fn test_find_reactions_empty_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let repo = EngagementRepository::new(Arc::new(db));
        let result = repo
            .find_reactions("user1", TargetKind::Video, &[])
            .await
            .unwrap();

        assert!(result.is_empty());
    }
}
