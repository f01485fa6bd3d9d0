//! PDF endpoints: ebooks, infographics and white papers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use biznetworq_common::AppResult;
use biznetworq_core::{
    ContentDetail, CreatePdfInput, DownloadResponse, ListPdfsQuery, PdfResponse, UpdatePdfInput,
};
use biznetworq_db::entities::TargetKind;

use super::engagement::content_routes;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// List published documents.
async fn list(
    State(state): State<AppState>,
    Query(filter): Query<ListPdfsQuery>,
) -> AppResult<ApiResponse<Vec<PdfResponse>>> {
    let items = state.pdf_service.list(filter).await?;
    Ok(ApiResponse::ok(items.into_iter().map(Into::into).collect()))
}

/// Publish a document in a managed channel.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePdfInput>,
) -> AppResult<ApiResponse<PdfResponse>> {
    let item = state.pdf_service.create(&user, input).await?;
    Ok(ApiResponse::created(item.into()))
}

/// Show a document by ID or slug.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ContentDetail<PdfResponse>>> {
    let detail = state.pdf_service.get(&key, viewer.as_ref()).await?;
    Ok(ApiResponse::ok(detail))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdatePdfInput>,
) -> AppResult<ApiResponse<PdfResponse>> {
    let item = state.pdf_service.update(&user, &id, input).await?;
    Ok(ApiResponse::ok(item.into()))
}

async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.pdf_service.delete(&user, &id).await?;
    Ok(no_content())
}

/// Count a download and hand out the file URL.
async fn download(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<DownloadResponse>> {
    let response = state
        .pdf_service
        .record_download(&key, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(response))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/download", post(download))
        .merge(content_routes(TargetKind::PdfDocument))
}
