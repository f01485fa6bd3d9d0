//! Video endpoints.
//!
//! Videos cover webinars, podcasts, testimonials, demos and events; the
//! `kind` query parameter narrows listings to one of them.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use biznetworq_common::AppResult;
use biznetworq_core::{
    ContentDetail, CreateVideoInput, ListVideosQuery, UpdateVideoInput, VideoResponse,
};
use biznetworq_db::entities::TargetKind;

use super::engagement::content_routes;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// List published videos.
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ListVideosQuery>,
) -> AppResult<ApiResponse<Vec<VideoResponse>>> {
    let items = state.video_service.list(filter).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// Publish a video in a managed channel.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateVideoInput>,
) -> AppResult<ApiResponse<VideoResponse>> {
    let item = state.video_service.create(&user, input).await?;
    Ok(ApiResponse::created(item.into()))
}

/// Show a video by ID or slug.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ContentDetail<VideoResponse>>> {
    let detail = state.video_service.get(&key, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateVideoInput>,
) -> AppResult<ApiResponse<VideoResponse>> {
    let item = state.video_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(item.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.video_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
        .merge(content_routes(TargetKind::Video))
}
