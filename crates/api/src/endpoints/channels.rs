//! Channel endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use biznetworq_common::AppResult;
use biznetworq_core::{ChannelDetail, ChannelResponse, ContentSummary, Page, SubscriptionState};
use serde::Deserialize;

use super::feed::FeedQuery;
use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Channel listing, optionally filtered by a search term.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChannelsQuery {
    pub q: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// List or search channels.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListChannelsQuery>,
) -> AppResult<ApiResponse<Vec<ChannelResponse>>> {
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };
    let channels = state.channel_service.list(query.q.as_deref(), page).await?;

    Ok(ApiResponse::ok(channels.into_iter().map(Into::into).collect()))
}

/// Channel by ID or slug, with statistics.
async fn show(
    MaybeAuthUser(viewer): MaybeAuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<ChannelDetail>> {
    let detail = state
        .channel_service
        .get_detail(&key, viewer.as_ref())
        .await?;
    Ok(ApiResponse::ok(detail))
}

/// Published content of a channel across every type.
async fn content(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<ContentSummary>>> {
    let items = state
        .feed_service
        .channel_content(&key, &query.kinds()?, None, query.page())
        .await?;
    Ok(ApiResponse::ok(items))
}

/// Whether the current user subscribes to the channel.
async fn subscription_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<SubscriptionState>> {
    let status = state
        .channel_service
        .subscription_status(&user, &key)
        .await?;
    Ok(ApiResponse::ok(status))
}

async fn subscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<SubscriptionState>> {
    let status = state.channel_service.subscribe(&user, &key).await?;
    Ok(ApiResponse::ok(status))
}

async fn unsubscribe(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<ApiResponse<SubscriptionState>> {
    let status = state.channel_service.unsubscribe(&user, &key).await?;
    Ok(ApiResponse::ok(status))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(show))
        .route("/{id}/content", get(content))
        .route(
            "/{id}/subscription",
            get(subscription_status).post(subscribe).delete(unsubscribe),
        )
}
