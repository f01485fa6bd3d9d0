//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use biznetworq_common::{StorageBackend, TokenSigner, config::AuthConfig};
use biznetworq_core::{
    BlogService, CaseStudyService, ChannelService, CommentService, ContentCatalog,
    ContentContext, EngagementService, FeedService, PdfService, ShortService, TechNewsService,
    UploadService, UserService, VideoService,
};
use biznetworq_db::repositories::{
    ChannelRepository, CommentRepository, EngagementRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
}

impl SessionConfig {
    /// Cookie carrying a freshly issued token.
    #[must_use]
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((self.cookie_name.clone(), token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }

    /// Expired, empty cookie that clears the session on the client.
    #[must_use]
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.cookie_name.clone(), ""))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie
    }
}

impl From<&AuthConfig> for SessionConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            cookie_name: config.cookie_name.clone(),
            secure: config.secure_cookie,
        }
    }
}

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub channel_service: ChannelService,
    pub video_service: VideoService,
    pub blog_service: BlogService,
    pub case_study_service: CaseStudyService,
    pub tech_news_service: TechNewsService,
    pub pdf_service: PdfService,
    pub short_service: ShortService,
    pub engagement_service: EngagementService,
    pub comment_service: CommentService,
    pub feed_service: FeedService,
    pub upload_service: UploadService,
    pub session: SessionConfig,
}

impl AppState {
    /// Wire every repository and service over one connection pool.
    #[must_use]
    pub fn new(
        db: Arc<DatabaseConnection>,
        tokens: TokenSigner,
        storage: Arc<dyn StorageBackend>,
        max_upload_bytes: usize,
        session: SessionConfig,
    ) -> Self {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let channel_repo = ChannelRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let engagement_repo = EngagementRepository::new(Arc::clone(&db));
        let catalog = ContentCatalog::new(&db);

        let ctx = ContentContext::new(channel_repo.clone(), engagement_repo.clone());

        Self {
            user_service: UserService::new(user_repo.clone(), tokens),
            channel_service: ChannelService::new(
                channel_repo.clone(),
                user_repo.clone(),
                catalog.clone(),
            ),
            video_service: VideoService::new(catalog.videos.clone(), ctx.clone()),
            blog_service: BlogService::new(catalog.blog_posts.clone(), ctx.clone()),
            case_study_service: CaseStudyService::new(catalog.case_studies.clone(), ctx.clone()),
            tech_news_service: TechNewsService::new(catalog.tech_news.clone(), ctx.clone()),
            pdf_service: PdfService::new(catalog.pdfs.clone(), ctx.clone()),
            short_service: ShortService::new(catalog.shorts.clone(), ctx.clone()),
            engagement_service: EngagementService::new(
                engagement_repo.clone(),
                catalog.clone(),
                ctx.clone(),
            ),
            comment_service: CommentService::new(comment_repo, engagement_repo, user_repo, ctx),
            feed_service: FeedService::new(catalog, channel_repo),
            upload_service: UploadService::new(storage, max_upload_bytes),
            session,
        }
    }
}

/// Session token carried by a request: the bearer token wins over the cookie.
fn request_token(req: &Request<Body>, cookie_name: &str) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(req.headers())
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

/// Authentication middleware.
///
/// Resolves the session token to a user and stores it in the request
/// extensions. Requests without a valid token continue anonymously.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = request_token(&req, &state.session.cookie_name) {
        match state.user_service.authenticate_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session token");
            }
        }
    }

    next.run(req).await
}
