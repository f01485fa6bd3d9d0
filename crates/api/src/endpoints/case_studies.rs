//! Case study endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use biznetworq_common::AppResult;
use biznetworq_core::{
    CaseStudyResponse, ContentDetail, CreateCaseStudyInput, ListCaseStudiesQuery, UpdateCaseStudyInput,
};
use biznetworq_db::entities::TargetKind;

use super::engagement::content_routes;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// List published case studies, optionally by `industry`.
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ListCaseStudiesQuery>,
) -> AppResult<ApiResponse<Vec<CaseStudyResponse>>> {
    let items = state.case_study_service.list(filter).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// Publish a case study in a managed channel.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateCaseStudyInput>,
) -> AppResult<ApiResponse<CaseStudyResponse>> {
    let item = state.case_study_service.create(&user, input).await?;
    Ok(ApiResponse::created(item.into()))
}

async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ContentDetail<CaseStudyResponse>>> {
    let detail = state.case_study_service.get(&key, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateCaseStudyInput>,
) -> AppResult<ApiResponse<CaseStudyResponse>> {
    let item = state.case_study_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(item.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.case_study_service.delete(&user, &id).await?;
    Ok(no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
        .merge(content_routes(TargetKind::CaseStudy))
}
