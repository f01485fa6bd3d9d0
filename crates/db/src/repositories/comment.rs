//! Comment repository.

use std::sync::Arc;

use biznetworq_common::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

use super::targets;
use crate::entities::{Comment, Reaction, TargetKind, comment, reaction};

/// Fields of a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Comment ID.
    pub id: String,
    /// Author.
    pub user_id: String,
    /// Commented content kind.
    pub target_kind: TargetKind,
    /// Commented content ID.
    pub target_id: String,
    /// Top-level comment this one replies to.
    pub parent_id: Option<String>,
    /// Comment body.
    pub text: String,
}

/// Repository for comment operations.
#[derive(Clone)]
pub struct CommentRepository {
    db: Arc<DatabaseConnection>,
}

impl CommentRepository {
    /// Create a new comment repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a comment by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<comment::Model>> {
        Comment::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a comment by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<comment::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Comment not found: {id}")))
    }

    /// Top-level comments of a target, newest first.
    pub async fn find_by_target(
        &self,
        kind: TargetKind,
        target_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::TargetKind.eq(kind))
            .filter(comment::Column::TargetId.eq(target_id))
            .filter(comment::Column::ParentId.is_null())
            .order_by(comment::Column::CreatedAt, Order::Desc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replies to a comment, oldest first.
    pub async fn find_replies(
        &self,
        parent_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<comment::Model>> {
        Comment::find()
            .filter(comment::Column::ParentId.eq(parent_id))
            .order_by(comment::Column::CreatedAt, Order::Asc)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all comments of a target, replies included.
    pub async fn count_by_target(&self, kind: TargetKind, target_id: &str) -> AppResult<u64> {
        Comment::find()
            .filter(comment::Column::TargetKind.eq(kind))
            .filter(comment::Column::TargetId.eq(target_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a comment and bump the counters of its target and parent.
    pub async fn create(&self, new: NewComment) -> AppResult<comment::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        targets::lock_reaction_counters(&txn, new.target_kind, &new.target_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("{} not found: {}", new.target_kind, new.target_id))
            })?;

        if let Some(parent_id) = &new.parent_id {
            let updated = Comment::update_many()
                .col_expr(
                    comment::Column::RepliesCount,
                    Expr::col(comment::Column::RepliesCount).add(1),
                )
                .filter(comment::Column::Id.eq(parent_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if updated.rows_affected == 0 {
                return Err(AppError::NotFound(format!(
                    "Comment not found: {parent_id}"
                )));
            }
        }

        let now = Utc::now();
        let created = comment::ActiveModel {
            id: Set(new.id),
            user_id: Set(new.user_id),
            target_kind: Set(new.target_kind),
            target_id: Set(new.target_id.clone()),
            parent_id: Set(new.parent_id),
            text: Set(new.text),
            likes_count: Set(0),
            dislikes_count: Set(0),
            replies_count: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        }
        .insert(&txn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        targets::apply_comments_delta(&txn, new.target_kind, &new.target_id, 1).await?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Delete a comment with its replies and their reactions.
    ///
    /// Returns the number of comments removed.
    pub async fn delete(&self, comment: &comment::Model) -> AppResult<u64> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut ids: Vec<String> = Comment::find()
            .select_only()
            .column(comment::Column::Id)
            .filter(comment::Column::ParentId.eq(comment.id.as_str()))
            .into_tuple::<String>()
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        ids.push(comment.id.clone());

        Reaction::delete_many()
            .filter(reaction::Column::TargetKind.eq(TargetKind::Comment))
            .filter(reaction::Column::TargetId.is_in(ids.clone()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let removed = Comment::delete_many()
            .filter(comment::Column::Id.is_in(ids))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .rows_affected;

        if removed > 0 {
            targets::apply_comments_delta(
                &txn,
                comment.target_kind,
                &comment.target_id,
                -(removed as i64),
            )
            .await?;
        }

        if let Some(parent_id) = &comment.parent_id {
            Comment::update_many()
                .col_expr(
                    comment::Column::RepliesCount,
                    Expr::cust("GREATEST(replies_count - 1, 0)"),
                )
                .filter(comment::Column::Id.eq(parent_id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(removed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn affected(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn create_test_comment(id: &str, parent_id: Option<&str>) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            user_id: "user1".to_string(),
            target_kind: TargetKind::BlogPost,
            target_id: "post1".to_string(),
            parent_id: parent_id.map(ToString::to_string),
            text: "Great write-up".to_string(),
            likes_count: 0,
            dislikes_count: 0,
            replies_count: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_target() {
        let newer = create_test_comment("c2", None);
        let older = create_test_comment("c1", None);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[newer, older]])
            .into_connection();

        let repo = CommentRepository::new(Arc::new(db));
        let result = repo
            .find_by_target(TargetKind::BlogPost, "post1", 20, 0)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|c| c.parent_id.is_none()));
    }

    #[tokio::test]
    async fn test_find_replies() {
        let reply = create_test_comment("r1", Some("c1"));

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[reply]])
            .into_connection();

        let repo = CommentRepository::new(Arc::new(db));
        let result = repo.find_replies("c1", 20, 0).await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].parent_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_delete_thread_drops_replies_from_counter() {
        let reply_ids = vec![
            BTreeMap::from([("id", Value::from("r1"))]),
            BTreeMap::from([("id", Value::from("r2"))]),
        ];
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([reply_ids])
                .append_exec_results([affected(2), affected(3), affected(1)])
                .into_connection(),
        );

        let repo = CommentRepository::new(conn.clone());
        let removed = repo
            .delete(&create_test_comment("c1", None))
            .await
            .unwrap();
        assert_eq!(removed, 3);

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(conn).unwrap().into_transaction_log());
        assert!(log.contains("comments_count"));
        assert!(log.contains("BigInt(Some(-3))"));
    }

    #[tokio::test]
    async fn test_delete_reply_decrements_parent() {
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
                .append_exec_results([affected(0), affected(1), affected(1), affected(1)])
                .into_connection(),
        );

        let repo = CommentRepository::new(conn.clone());
        let removed = repo
            .delete(&create_test_comment("r1", Some("c1")))
            .await
            .unwrap();
        assert_eq!(removed, 1);

        drop(repo);
        let log = format!("{:?}", Arc::try_unwrap(conn).unwrap().into_transaction_log());
        assert!(log.contains("GREATEST(replies_count - 1, 0)"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<comment::Model>::new()])
            .into_connection();

        let repo = CommentRepository::new(Arc::new(db));
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
