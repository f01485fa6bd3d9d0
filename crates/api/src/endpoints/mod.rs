//! API endpoints.

mod admin;
mod auth;
mod blog;
mod case_studies;
mod channels;
mod comments;
mod engagement;
mod feed;
mod pdfs;
mod shorts;
mod tech_news;
mod uploads;
mod users;
mod videos;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
///
/// `max_upload_bytes` bounds the body accepted by the upload route.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(feed::router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/channels", channels::router())
        .nest("/admin", admin::router())
        .nest("/videos", videos::router())
        .nest("/blog/posts", blog::router())
        .nest("/case-studies", case_studies::router())
        .nest("/tech-news", tech_news::router())
        .nest("/pdfs", pdfs::router())
        .nest("/shorts", shorts::router())
        .nest("/comments", comments::router())
        .nest("/uploads", uploads::router(max_upload_bytes))
}
