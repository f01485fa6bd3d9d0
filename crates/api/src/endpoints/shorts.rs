//! Short video endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use biznetworq_common::AppResult;
use biznetworq_core::{
    ContentDetail, CreateShortInput, ListShortsQuery, ShortResponse, UpdateShortInput,
};
use biznetworq_db::entities::TargetKind;

use super::engagement::content_routes;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// List published shorts.
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ListShortsQuery>,
) -> AppResult<ApiResponse<Vec<ShortResponse>>> {
    let items = state.short_service.list(filter).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateShortInput>,
) -> AppResult<ApiResponse<ShortResponse>> {
    let item = state.short_service.create(&user, input).await?;
    Ok(ApiResponse::created(item.into()))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ContentDetail<ShortResponse>>> {
    let detail = state.short_service.get(&key, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateShortInput>,
) -> AppResult<ApiResponse<ShortResponse>> {
    let item = state.short_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(item.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.short_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
        .merge(content_routes(TargetKind::Short))
}
