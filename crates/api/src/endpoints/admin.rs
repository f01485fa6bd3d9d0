//! Channel administration endpoints.
//!
//! Creating and deleting channels is reserved for administrators; channel
//! owners may update their own channel and browse its drafts.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, patch, post},
};
use biznetworq_common::AppResult;
use biznetworq_core::{ChannelResponse, ContentSummary, CreateChannelInput, UpdateChannelInput};

use super::feed::FeedQuery;
use crate::{
    extractors::{AdminUser, AuthUser},
    middleware::AppState,
    response::{ApiResponse, no_content},
};

async fn create_channel(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Json(input): Json<CreateChannelInput>,
) -> AppResult<ApiResponse<ChannelResponse>> {
    let channel = state.channel_service.create(&admin, input).await?;
    Ok(ApiResponse::created(channel.into()))
}

async fn update_channel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Json(input): Json<UpdateChannelInput>,
) -> AppResult<ApiResponse<ChannelResponse>> {
    let channel = state
        .channel_service
        .update(&user, &channel_id, input)
        .await?;
    Ok(ApiResponse::ok(channel.into()))
}

async fn delete_channel(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.channel_service.delete(&user, &channel_id).await?;
    Ok(no_content())
}

/// Every item of a managed channel, drafts included.
async fn channel_content(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<ContentSummary>>> {
    let items = state
        .feed_service
        .channel_content(&channel_id, &query.kinds()?, Some(&user), query.page())
        .await?;
    Ok(ApiResponse::ok(items))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/channels", post(create_channel))
        .route(
            "/channels/{channel_id}",
            patch(update_channel).delete(delete_channel),
        )
        .route("/channels/{channel_id}/content", get(channel_content))
}
