//! HTTP API layer for BizNetworQ.
//!
//! - **Endpoints**: auth, channels, the content types, engagement, comments,
//!   feeds and uploads, all under `/api`
//! - **Extractors**: [`AuthUser`], [`MaybeAuthUser`] and [`AdminUser`]
//! - **Middleware**: session token resolution from the `Authorization`
//!   header or the session cookie
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use extractors::{AdminUser, AuthUser, MaybeAuthUser};
pub use middleware::{AppState, SessionConfig, auth_middleware};
pub use response::ApiResponse;
