//! Comment service.
//!
//! Comments attach to content only, with a single level of replies. A reply
//! to a reply is attached to the top-level comment instead. Comments under a
//! draft are seen only by the channel's managers.

use std::collections::HashMap;

use biznetworq_common::{AppError, AppResult, IdGenerator};
use biznetworq_db::{
    entities::{ReactionKind, TargetKind, comment, user},
    repositories::{CommentRepository, EngagementRepository, NewComment, UserRepository},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::content::{ContentContext, Page};

/// Input for posting a comment.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    pub parent_id: Option<String>,
}

/// Public fields of a comment author.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&user::Model> for CommentAuthor {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Comment as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub target_kind: TargetKind,
    pub target_id: String,
    pub parent_id: Option<String>,
    pub text: String,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub replies_count: i64,
    pub created_at: String,
    /// `None` when the author account is gone.
    pub author: Option<CommentAuthor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reaction: Option<ReactionKind>,
}

impl CommentResponse {
    fn build(
        model: comment::Model,
        author: Option<CommentAuthor>,
        reaction: Option<ReactionKind>,
    ) -> Self {
        Self {
            id: model.id,
            target_kind: model.target_kind,
            target_id: model.target_id,
            parent_id: model.parent_id,
            text: model.text,
            likes_count: model.likes_count,
            dislikes_count: model.dislikes_count,
            replies_count: model.replies_count,
            created_at: model.created_at.to_rfc3339(),
            author,
            reaction,
        }
    }
}

/// Resolve the comment a new reply hangs under.
///
/// The parent must sit on the same target. Replies to replies are folded
/// into the top-level thread.
fn thread_parent(parent: &comment::Model, kind: TargetKind, target_id: &str) -> AppResult<String> {
    if parent.target_kind != kind || parent.target_id != target_id {
        return Err(AppError::BadRequest(
            "Parent comment belongs to another item".to_string(),
        ));
    }

    Ok(parent
        .parent_id
        .clone()
        .unwrap_or_else(|| parent.id.clone()))
}

/// Service for comments and replies.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    engagement_repo: EngagementRepository,
    user_repo: UserRepository,
    ctx: ContentContext,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(
        comment_repo: CommentRepository,
        engagement_repo: EngagementRepository,
        user_repo: UserRepository,
        ctx: ContentContext,
    ) -> Self {
        Self {
            comment_repo,
            engagement_repo,
            user_repo,
            ctx,
            id_gen: IdGenerator::new(),
        }
    }

    /// Post a comment or a reply.
    pub async fn create(
        &self,
        user: &user::Model,
        kind: TargetKind,
        target_id: &str,
        input: CreateCommentInput,
    ) -> AppResult<CommentResponse> {
        input.validate()?;
        ensure_commentable(kind)?;

        let text = input.text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::Validation("Comment text is empty".to_string()));
        }
        self.ctx.ensure_visible(Some(user), kind, target_id).await?;

        let parent_id = match input.parent_id.as_deref() {
            Some(id) => {
                let parent = self.comment_repo.get_by_id(id).await?;
                Some(thread_parent(&parent, kind, target_id)?)
            }
            None => None,
        };

        let created = self
            .comment_repo
            .create(NewComment {
                id: self.id_gen.generate(),
                user_id: user.id.clone(),
                target_kind: kind,
                target_id: target_id.to_string(),
                parent_id,
                text,
            })
            .await?;

        tracing::info!(
            comment_id = %created.id,
            target_kind = %kind,
            target_id = %target_id,
            "Comment created"
        );

        Ok(CommentResponse::build(created, Some(user.into()), None))
    }

    /// Top-level comments of an item, newest first.
    pub async fn list(
        &self,
        kind: TargetKind,
        target_id: &str,
        page: Page,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<CommentResponse>> {
        ensure_commentable(kind)?;
        self.ctx.ensure_visible(viewer, kind, target_id).await?;

        let comments = self
            .comment_repo
            .find_by_target(kind, target_id, page.limit(), page.offset())
            .await?;
        self.present(comments, viewer).await
    }

    /// Replies to a comment, oldest first.
    pub async fn replies(
        &self,
        comment_id: &str,
        page: Page,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<CommentResponse>> {
        let parent = self.comment_repo.get_by_id(comment_id).await?;
        self.ctx
            .ensure_visible(viewer, parent.target_kind, &parent.target_id)
            .await?;

        let replies = self
            .comment_repo
            .find_replies(comment_id, page.limit(), page.offset())
            .await?;
        self.present(replies, viewer).await
    }

    /// Delete a comment together with its replies.
    pub async fn delete(&self, user: &user::Model, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.user_id != user.id && !user.is_admin {
            return Err(AppError::Forbidden(
                "Only the author can delete this comment".to_string(),
            ));
        }

        let removed = self.comment_repo.delete(&comment).await?;
        tracing::info!(comment_id = %comment_id, removed, "Comment deleted");
        Ok(())
    }

    /// Attach authors and the viewer's reactions.
    async fn present(
        &self,
        comments: Vec<comment::Model>,
        viewer: Option<&user::Model>,
    ) -> AppResult<Vec<CommentResponse>> {
        if comments.is_empty() {
            return Ok(vec![]);
        }

        let mut author_ids: Vec<String> = comments.iter().map(|c| c.user_id.clone()).collect();
        author_ids.sort();
        author_ids.dedup();

        let authors: HashMap<String, CommentAuthor> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), CommentAuthor::from(u)))
            .collect();

        let reactions: HashMap<String, ReactionKind> = match viewer {
            Some(viewer) => {
                let ids: Vec<String> = comments.iter().map(|c| c.id.clone()).collect();
                self.engagement_repo
                    .find_reactions(&viewer.id, TargetKind::Comment, &ids)
                    .await?
                    .into_iter()
                    .map(|r| (r.target_id, r.kind))
                    .collect()
            }
            None => HashMap::new(),
        };

        Ok(comments
            .into_iter()
            .map(|c| {
                let author = authors.get(&c.user_id).cloned();
                let reaction = reactions.get(&c.id).copied();
                CommentResponse::build(c, author, reaction)
            })
            .collect())
    }
}

fn ensure_commentable(kind: TargetKind) -> AppResult<()> {
    if kind.is_content() {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "Comments can only be posted on content".to_string(),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::services::test_support::{self, mock_db, visibility};
    use biznetworq_db::{entities::reaction, repositories::ChannelRepository};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    fn service(db: MockDatabase) -> CommentService {
        let conn = mock_db(db);
        let engagement_repo = EngagementRepository::new(conn.clone());
        let ctx = ContentContext::new(ChannelRepository::new(conn.clone()), engagement_repo.clone());
        CommentService::new(
            CommentRepository::new(conn.clone()),
            engagement_repo,
            UserRepository::new(conn),
            ctx,
        )
    }

    fn input(text: &str, parent_id: Option<&str>) -> CreateCommentInput {
        CreateCommentInput {
            text: text.to_string(),
            parent_id: parent_id.map(str::to_string),
        }
    }

    #[test]
    fn test_thread_parent_folds_nested_replies() {
        let top = test_support::comment("c1", "u1", None);
        let reply = test_support::comment("c2", "u2", Some("c1"));

        assert_eq!(thread_parent(&top, TargetKind::Video, "v1").unwrap(), "c1");
        assert_eq!(thread_parent(&reply, TargetKind::Video, "v1").unwrap(), "c1");
    }

    #[test]
    fn test_thread_parent_rejects_other_target() {
        let top = test_support::comment("c1", "u1", None);

        assert!(matches!(
            thread_parent(&top, TargetKind::Video, "v2"),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            thread_parent(&top, TargetKind::Short, "v1"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_create_rejects_comment_target() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = test_support::user("u1", "alice");

        let result = service
            .create(&user, TargetKind::Comment, "c1", input("hi", None))
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_text() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = test_support::user("u1", "alice");

        let empty = service
            .create(&user, TargetKind::Video, "v1", input("", None))
            .await;
        let blank = service
            .create(&user, TargetKind::Video, "v1", input("   ", None))
            .await;

        assert!(matches!(empty, Err(AppError::Validation(_))));
        assert!(matches!(blank, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_overlong_text() {
        let service = service(MockDatabase::new(DatabaseBackend::Postgres));
        let user = test_support::user("u1", "alice");

        let result = service
            .create(&user, TargetKind::Video, "v1", input(&"a".repeat(2001), None))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_reply_to_reply_attaches_to_thread() {
        let nested = test_support::comment("c2", "u2", Some("c1"));
        let created = test_support::comment("c3", "u1", Some("c1"));
        let counters = BTreeMap::from([
            ("dislikes_count", Value::BigInt(Some(0))),
            ("likes_count", Value::BigInt(Some(3))),
        ]);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", true)])
            .append_query_results([[nested]])
            .append_query_results([[counters]])
            .append_query_results([[created]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ]);
        let service = service(db);
        let user = test_support::user("u1", "alice");

        let response = service
            .create(&user, TargetKind::Video, "v1", input("Agreed", Some("c2")))
            .await
            .unwrap();

        assert_eq!(response.parent_id.as_deref(), Some("c1"));
        assert_eq!(response.author.unwrap().username, "alice");
        assert!(response.reaction.is_none());
    }

    #[tokio::test]
    async fn test_create_with_missing_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", true)])
            .append_query_results([Vec::<comment::Model>::new()]);
        let service = service(db);
        let user = test_support::user("u1", "alice");

        let result = service
            .create(&user, TargetKind::Video, "v1", input("hi", Some("gone")))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_attaches_authors_and_reactions() {
        let first = test_support::comment("c2", "u2", None);
        let second = test_support::comment("c1", "u1", None);
        let liked = reaction::Model {
            id: "r1".to_string(),
            user_id: "u1".to_string(),
            target_kind: TargetKind::Comment,
            target_id: "c1".to_string(),
            kind: ReactionKind::Like,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", true)])
            .append_query_results([[first, second]])
            .append_query_results([[
                test_support::user("u1", "alice"),
                test_support::user("u2", "bob"),
            ]])
            .append_query_results([[liked]]);
        let service = service(db);
        let viewer = test_support::user("u1", "alice");

        let comments = service
            .list(TargetKind::Video, "v1", Page::default(), Some(&viewer))
            .await
            .unwrap();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author.as_ref().unwrap().username, "bob");
        assert!(comments[0].reaction.is_none());
        assert_eq!(comments[1].reaction, Some(ReactionKind::Like));
    }

    #[tokio::test]
    async fn test_list_unknown_target() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()]);
        let service = service(db);

        let result = service
            .list(TargetKind::Short, "missing", Page::default(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_on_draft_hidden_from_anonymous() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", false)]);

        let result = service(db)
            .list(TargetKind::Video, "v1", Page::default(), None)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_on_draft_shown_to_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", false)])
            .append_query_results([[test_support::channel("c1", "owner")]])
            .append_query_results([Vec::<comment::Model>::new()]);
        let owner = test_support::user("owner", "olga");

        let comments = service(db)
            .list(TargetKind::Video, "v1", Page::default(), Some(&owner))
            .await
            .unwrap();

        assert!(comments.is_empty());
    }

    #[tokio::test]
    async fn test_create_on_draft_is_not_found_for_strangers() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([visibility("c1", false)])
            .append_query_results([[test_support::channel("c1", "owner")]]);
        let user = test_support::user("u1", "alice");

        let result = service(db)
            .create(&user, TargetKind::Video, "v1", input("hi", None))
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_replies_under_draft_hidden_from_anonymous() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::comment("c1", "u1", None)]])
            .append_query_results([visibility("c1", false)]);

        let result = service(db).replies("c1", Page::default(), None).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_forbidden() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_support::comment("c1", "u1", None)]]);
        let service = service(db);
        let stranger = test_support::user("u9", "mallory");

        let result = service.delete(&stranger, "c1").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_comment_response_shape() {
        let author = test_support::user("u1", "alice");
        let response = CommentResponse::build(
            test_support::comment("c1", "u1", None),
            Some((&author).into()),
            None,
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["targetKind"], "video");
        assert_eq!(json["author"]["username"], "alice");
        assert!(json.get("reaction").is_none());
        assert!(json["author"].get("email").is_none());
    }
}
