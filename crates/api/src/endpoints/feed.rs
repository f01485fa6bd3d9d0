//! Cross-type feed and search endpoints.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use biznetworq_common::AppResult;
use biznetworq_core::{ContentSummary, Page, parse_kinds};
use biznetworq_db::entities::TargetKind;
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Kind filter plus paging, e.g. `?kinds=video,short&limit=20`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedQuery {
    pub kinds: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FeedQuery {
    pub fn kinds(&self) -> AppResult<Vec<TargetKind>> {
        parse_kinds(self.kinds.as_deref())
    }

    pub const fn page(&self) -> Page {
        Page {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Search parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub kinds: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// Newest published content across every type.
async fn latest(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> AppResult<ApiResponse<Vec<ContentSummary>>> {
    let items = state
        .feed_service
        .latest(&query.kinds()?, query.page())
        .await?;
    Ok(ApiResponse::ok(items))
}

/// Title search across every type.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<ApiResponse<Vec<ContentSummary>>> {
    let kinds = parse_kinds(query.kinds.as_deref())?;
    let page = Page {
        limit: query.limit,
        offset: query.offset,
    };

    let items = state.feed_service.search(&query.q, &kinds, page).await?;
    Ok(ApiResponse::ok(items))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed/latest", get(latest))
        .route("/search", get(search))
}
