//! Reaction, save and comment routes shared by every content type.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post},
};
use biznetworq_common::AppResult;
use biznetworq_core::{
    CommentResponse, CreateCommentInput, Page, ReactionResponse, SaveResponse, ViewerState,
};
use biznetworq_db::entities::{ReactionKind, TargetKind};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

async fn react(
    kind: TargetKind,
    pressed: ReactionKind,
    user: AuthUser,
    state: AppState,
    id: String,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let response = state
        .engagement_service
        .react(&user.0, kind, &id, pressed)
        .await?;
    Ok(ApiResponse::ok(response))
}

async fn clear_reaction(
    kind: TargetKind,
    user: AuthUser,
    state: AppState,
    id: String,
) -> AppResult<ApiResponse<ReactionResponse>> {
    let response = state
        .engagement_service
        .clear_reaction(&user.0, kind, &id)
        .await?;
    Ok(ApiResponse::ok(response))
}

async fn toggle_save(
    kind: TargetKind,
    user: AuthUser,
    state: AppState,
    id: String,
) -> AppResult<ApiResponse<SaveResponse>> {
    let response = state
        .engagement_service
        .toggle_save(&user.0, kind, &id)
        .await?;
    Ok(ApiResponse::ok(response))
}

async fn viewer_state(
    kind: TargetKind,
    user: AuthUser,
    state: AppState,
    id: String,
) -> AppResult<ApiResponse<ViewerState>> {
    let response = state
        .engagement_service
        .viewer_state(&user.0, kind, &id)
        .await?;
    Ok(ApiResponse::ok(response))
}

async fn list_comments(
    kind: TargetKind,
    viewer: MaybeAuthUser,
    state: AppState,
    id: String,
    page: Page,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state
        .comment_service
        .list(kind, &id, page, viewer.0.as_ref())
        .await?;
    Ok(ApiResponse::ok(comments))
}

async fn create_comment(
    kind: TargetKind,
    user: AuthUser,
    state: AppState,
    id: String,
    input: CreateCommentInput,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .create(&user.0, kind, &id, input)
        .await?;
    Ok(ApiResponse::created(comment))
}

/// Like/dislike routes for any reactable target, comments included.
pub fn reaction_routes(kind: TargetKind) -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/like",
            post(
                move |user: AuthUser, State(state): State<AppState>, Path(id): Path<String>| {
                    react(kind, ReactionKind::Like, user, state, id)
                },
            ),
        )
        .route(
            "/{id}/dislike",
            post(
                move |user: AuthUser, State(state): State<AppState>, Path(id): Path<String>| {
                    react(kind, ReactionKind::Dislike, user, state, id)
                },
            ),
        )
        .route(
            "/{id}/reaction",
            delete(
                move |user: AuthUser, State(state): State<AppState>, Path(id): Path<String>| {
                    clear_reaction(kind, user, state, id)
                },
            ),
        )
}

/// Reaction, save, viewer-state and comment routes for a content type.
pub fn content_routes(kind: TargetKind) -> Router<AppState> {
    reaction_routes(kind)
        .route(
            "/{id}/save",
            post(
                move |user: AuthUser, State(state): State<AppState>, Path(id): Path<String>| {
                    toggle_save(kind, user, state, id)
                },
            ),
        )
        .route(
            "/{id}/engagement",
            get(
                move |user: AuthUser, State(state): State<AppState>, Path(id): Path<String>| {
                    viewer_state(kind, user, state, id)
                },
            ),
        )
        .route(
            "/{id}/comments",
            get(
                move |viewer: MaybeAuthUser,
                      State(state): State<AppState>,
                      Path(id): Path<String>,
                      Query(page): Query<Page>| {
                    list_comments(kind, viewer, state, id, page)
                },
            )
            .post(
                move |user: AuthUser,
                      State(state): State<AppState>,
                      Path(id): Path<String>,
                      Json(input): Json<CreateCommentInput>| {
                    create_comment(kind, user, state, id, input)
                },
            ),
        )
}
