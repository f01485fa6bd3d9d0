//! Counter maintenance shared by every reactable or commentable table.
//!
//! All functions take a connection so they can run inside the caller's
//! transaction.

use biznetworq_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect,
    sea_query::{Expr, Func, SimpleExpr},
};

use crate::entities::{
    BlogPost, CaseStudy, Comment, ContentColumns, PdfDocument, Reaction, ReactionCounters,
    SavedItem, Short, TargetKind, TechNews, Video, comment, reaction, saved_item,
};

/// Run `$body` with `$entity` bound to the entity type behind a target kind.
macro_rules! with_entity {
    ($kind:expr, $entity:ident => $body:expr) => {
        match $kind {
            TargetKind::Video => {
                type $entity = Video;
                $body
            }
            TargetKind::BlogPost => {
                type $entity = BlogPost;
                $body
            }
            TargetKind::CaseStudy => {
                type $entity = CaseStudy;
                $body
            }
            TargetKind::TechNews => {
                type $entity = TechNews;
                $body
            }
            TargetKind::PdfDocument => {
                type $entity = PdfDocument;
                $body
            }
            TargetKind::Short => {
                type $entity = Short;
                $body
            }
            TargetKind::Comment => {
                type $entity = Comment;
                $body
            }
        }
    };
}

/// `GREATEST(col + delta, 0)`.
fn shifted<C: ColumnTrait>(column: C, delta: i64) -> SimpleExpr {
    Func::greatest([Expr::col(column).add(delta), Expr::val(0_i64).into()]).into()
}

/// Read the like/dislike counters of a target and lock its row until the
/// surrounding transaction ends.
async fn lock_counters<E, C>(conn: &C, id: &str) -> AppResult<Option<(i64, i64)>>
where
    E: ReactionCounters,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::DISLIKES)
        .column(E::LIKES)
        .filter(E::ID.eq(id))
        .lock_exclusive()
        .into_tuple::<(i64, i64)>()
        .one(conn)
        .await
        .map(|row| row.map(|(dislikes, likes)| (likes, dislikes)))
        .map_err(|e| AppError::Database(e.to_string()))
}

async fn visibility<E, C>(conn: &C, id: &str) -> AppResult<Option<(String, bool)>>
where
    E: ContentColumns,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::CHANNEL_ID)
        .column(E::IS_PUBLISHED)
        .filter(E::ID.eq(id))
        .into_tuple::<(String, bool)>()
        .one(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

async fn shift_reaction_counters<E, C>(conn: &C, id: &str, likes: i64, dislikes: i64) -> AppResult<()>
where
    E: ReactionCounters,
    C: ConnectionTrait,
{
    let mut update = E::update_many();
    if likes != 0 {
        update = update.col_expr(E::LIKES, shifted(E::LIKES, likes));
    }
    if dislikes != 0 {
        update = update.col_expr(E::DISLIKES, shifted(E::DISLIKES, dislikes));
    }

    update
        .filter(E::ID.eq(id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

async fn shift_comments_counter<E, C>(conn: &C, id: &str, delta: i64) -> AppResult<()>
where
    E: ContentColumns,
    C: ConnectionTrait,
{
    E::update_many()
        .col_expr(E::COMMENTS, shifted(E::COMMENTS, delta))
        .filter(E::ID.eq(id))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

/// Lock a target row and return its `(likes, dislikes)` counters.
pub(crate) async fn lock_reaction_counters<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    id: &str,
) -> AppResult<Option<(i64, i64)>> {
    with_entity!(kind, E => lock_counters::<E, C>(conn, id).await)
}

/// Apply like/dislike deltas to a target.
pub(crate) async fn apply_reaction_deltas<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    id: &str,
    likes: i64,
    dislikes: i64,
) -> AppResult<()> {
    if likes == 0 && dislikes == 0 {
        return Ok(());
    }
    with_entity!(kind, E => shift_reaction_counters::<E, C>(conn, id, likes, dislikes).await)
}

/// Apply a delta to the comment counter of a content row.
pub(crate) async fn apply_comments_delta<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    id: &str,
    delta: i64,
) -> AppResult<()> {
    match kind {
        TargetKind::Video => shift_comments_counter::<Video, C>(conn, id, delta).await,
        TargetKind::BlogPost => shift_comments_counter::<BlogPost, C>(conn, id, delta).await,
        TargetKind::CaseStudy => shift_comments_counter::<CaseStudy, C>(conn, id, delta).await,
        TargetKind::TechNews => shift_comments_counter::<TechNews, C>(conn, id, delta).await,
        TargetKind::PdfDocument => {
            shift_comments_counter::<PdfDocument, C>(conn, id, delta).await
        }
        TargetKind::Short => shift_comments_counter::<Short, C>(conn, id, delta).await,
        TargetKind::Comment => Err(AppError::BadRequest(
            "Comments are counted through replies_count".to_string(),
        )),
    }
}

/// `(channel_id, is_published)` of a content row.
pub(crate) async fn content_visibility<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    id: &str,
) -> AppResult<Option<(String, bool)>> {
    match kind {
        TargetKind::Video => visibility::<Video, C>(conn, id).await,
        TargetKind::BlogPost => visibility::<BlogPost, C>(conn, id).await,
        TargetKind::CaseStudy => visibility::<CaseStudy, C>(conn, id).await,
        TargetKind::TechNews => visibility::<TechNews, C>(conn, id).await,
        TargetKind::PdfDocument => visibility::<PdfDocument, C>(conn, id).await,
        TargetKind::Short => visibility::<Short, C>(conn, id).await,
        TargetKind::Comment => Err(AppError::BadRequest(
            "Comments have no channel of their own".to_string(),
        )),
    }
}

/// Whether a target row exists.
pub(crate) async fn target_exists<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    id: &str,
) -> AppResult<bool> {
    let found = with_entity!(kind, E => {
        E::find()
            .select_only()
            .column(E::ID)
            .filter(E::ID.eq(id))
            .into_tuple::<String>()
            .one(conn)
            .await
    });

    found
        .map(|row| row.is_some())
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Delete every reaction, save and comment attached to the given content
/// rows, including reactions on those comments.
pub(crate) async fn purge_engagement<C: ConnectionTrait>(
    conn: &C,
    kind: TargetKind,
    ids: Vec<String>,
) -> AppResult<()> {
    if ids.is_empty() {
        return Ok(());
    }

    let comment_ids: Vec<String> = Comment::find()
        .select_only()
        .column(comment::Column::Id)
        .filter(comment::Column::TargetKind.eq(kind))
        .filter(comment::Column::TargetId.is_in(ids.clone()))
        .into_tuple::<String>()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    if !comment_ids.is_empty() {
        Reaction::delete_many()
            .filter(reaction::Column::TargetKind.eq(TargetKind::Comment))
            .filter(reaction::Column::TargetId.is_in(comment_ids))
            .exec(conn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    // Replies share the target of their parent, so this covers them too.
    Comment::delete_many()
        .filter(comment::Column::TargetKind.eq(kind))
        .filter(comment::Column::TargetId.is_in(ids.clone()))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Reaction::delete_many()
        .filter(reaction::Column::TargetKind.eq(kind))
        .filter(reaction::Column::TargetId.is_in(ids.clone()))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    SavedItem::delete_many()
        .filter(saved_item::Column::TargetKind.eq(kind))
        .filter(saved_item::Column::TargetId.is_in(ids))
        .exec(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    Ok(())
}

async fn channel_content_ids<E, C>(conn: &C, channel_id: &str) -> AppResult<Vec<String>>
where
    E: ContentColumns,
    C: ConnectionTrait,
{
    E::find()
        .select_only()
        .column(E::ID)
        .filter(E::CHANNEL_ID.eq(channel_id))
        .into_tuple::<String>()
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

/// Delete the engagement rows of every content row of a channel.
///
/// The content rows themselves go with the channel through `ON DELETE CASCADE`.
pub(crate) async fn purge_channel_engagement<C: ConnectionTrait>(
    conn: &C,
    channel_id: &str,
) -> AppResult<()> {
    let groups = [
        (
            TargetKind::Video,
            channel_content_ids::<Video, C>(conn, channel_id).await?,
        ),
        (
            TargetKind::BlogPost,
            channel_content_ids::<BlogPost, C>(conn, channel_id).await?,
        ),
        (
            TargetKind::CaseStudy,
            channel_content_ids::<CaseStudy, C>(conn, channel_id).await?,
        ),
        (
            TargetKind::TechNews,
            channel_content_ids::<TechNews, C>(conn, channel_id).await?,
        ),
        (
            TargetKind::PdfDocument,
            channel_content_ids::<PdfDocument, C>(conn, channel_id).await?,
        ),
        (
            TargetKind::Short,
            channel_content_ids::<Short, C>(conn, channel_id).await?,
        ),
    ];

    for (kind, ids) in groups {
        purge_engagement(conn, kind, ids).await?;
    }

    Ok(())
}
