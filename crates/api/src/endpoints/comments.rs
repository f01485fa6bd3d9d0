//! Comment endpoints that address a comment directly.
//!
//! Listing and posting go through the content routes
//! (`/api/{type}/{id}/comments`).

use axum::{
    Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{delete, get},
};
use biznetworq_common::AppResult;
use biznetworq_core::{CommentResponse, Page};
use biznetworq_db::entities::TargetKind;

use super::engagement::reaction_routes;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Replies to a comment, oldest first.
async fn replies(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(page): Query<Page>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let replies = state
        .comment_service
        .replies(&id, page, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(replies))
}

async fn remove(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.comment_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(remove))
        .route("/{id}/replies", get(replies))
        .merge(reaction_routes(TargetKind::Comment))
}
