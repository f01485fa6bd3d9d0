//! User endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use biznetworq_common::{AppError, AppResult};
use biznetworq_core::{
    ChannelResponse, Page, SavedItemResponse, UpdateProfileInput, UserResponse, parse_kinds,
};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Saved-items filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub kind: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<UserResponse> {
    ApiResponse::ok(user.into())
}

/// Update the current user's profile.
async fn update_me(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(updated.into()))
}

/// Items the current user saved, most recent first.
async fn saved(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SavedQuery>,
) -> AppResult<ApiResponse<Vec<SavedItemResponse>>> {
    let kind = match parse_kinds(query.kind.as_deref())?.as_slice() {
        [] => None,
        [kind] => Some(*kind),
        _ => {
            return Err(AppError::BadRequest(
                "Filter saved items by a single content type".to_string(),
            ));
        }
    };
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let items = state
        .engagement_service
        .saved_items(&user, kind, page)
        .await?;
    Ok(ApiResponse::ok(items))
}

/// Channels the current user subscribes to.
async fn subscriptions(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> AppResult<ApiResponse<Vec<ChannelResponse>>> {
    let channels = state.channel_service.list_subscribed(&user, page).await?;
    Ok(ApiResponse::ok(channels.into_iter().map(Into::into).collect()))
}

/// Public profile of a user.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.user_service.get(&id).await?;
    Ok(ApiResponse::ok(UserResponse::public(user)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).patch(update_me))
        .route("/me/saved", get(saved))
        .route("/me/subscriptions", get(subscriptions))
        .route("/{id}", get(show))
}
