//! BizNetworQ server entry point.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Json, Router, http::StatusCode, middleware, routing::get};
use biznetworq_api::{AppState, SessionConfig, router as api_router};
use biznetworq_common::{Config, TokenSigner, build_backend};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Liveness probe; reports whether the database answers.
async fn health(db: Arc<DatabaseConnection>) -> (StatusCode, Json<Value>) {
    match db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biznetworq=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting BizNetworQ server...");

    let config = Config::load()?;

    let db = Arc::new(biznetworq_db::init(&config).await?);
    info!("Connected to database");

    info!("Running database migrations...");
    biznetworq_db::migrate(&db).await?;
    info!("Migrations completed");

    let storage = build_backend(&config.storage)?;
    let tokens = TokenSigner::new(&config.auth.jwt_secret, config.auth.token_ttl_hours)?;
    let max_upload_bytes = config.uploads.max_upload_bytes;

    let state = AppState::new(
        Arc::clone(&db),
        tokens,
        storage,
        max_upload_bytes,
        SessionConfig::from(&config.auth),
    );

    let health_db = Arc::clone(&db);
    let app = Router::new()
        .route("/health", get(move || health(Arc::clone(&health_db))))
        .nest("/api", api_router(max_upload_bytes))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            biznetworq_api::auth_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let ip = config.server.host.parse()?;
    let addr = SocketAddr::new(ip, config.server.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
