//! Authentication endpoints.

use axum::{Json, Router, extract::State, response::IntoResponse, routing::post};
use axum_extra::extract::cookie::CookieJar;
use biznetworq_common::AppResult;
use biznetworq_core::{AuthSession, SigninInput, SignupInput};

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, no_content},
};

/// Create an account and start a session.
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<SignupInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthSession>)> {
    let session = state.user_service.signup(input).await?;
    let jar = jar.add(state.session.session_cookie(session.token.clone()));

    Ok((jar, ApiResponse::created(session)))
}

/// Sign in with a username or email and a password.
async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<SigninInput>,
) -> AppResult<(CookieJar, ApiResponse<AuthSession>)> {
    let session = state.user_service.signin(input).await?;
    let jar = jar.add(state.session.session_cookie(session.token.clone()));

    Ok((jar, ApiResponse::ok(session)))
}

/// Drop the session cookie.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    jar: CookieJar,
) -> impl IntoResponse {
    tracing::debug!(user_id = %user.id, "Signed out");
    (jar.add(state.session.removal_cookie()), no_content())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}
