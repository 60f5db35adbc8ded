//! HTTP API Server for Discovery Queries
//!
//! Thin routing layer over the discovery engine. Translates the logical
//! endpoints onto the engine's query modes; authentication is the upstream
//! proxy's concern, so user-scoped routes take the already-resolved user id
//! as a path parameter.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, Request},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ApiConfig;
use crate::discovery::{DiscoveryEngine, DiscoveryResponse, QueryMode, RawQueryParams};
use crate::error::{Error, Result};

/// Shared application state
pub struct AppState {
    pub engine: DiscoveryEngine,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Stamps each request with a fresh `x-request-id`
#[derive(Clone, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let request_id = uuid::Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&request_id).ok()?))
    }
}

/// Build the API router
pub fn router(engine: DiscoveryEngine, config: &ApiConfig) -> Router {
    let state = Arc::new(AppState { engine });

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/podcasts", get(search))
        .route("/api/v1/podcasts/trending", get(trending))
        .route("/api/v1/podcasts/related/:user_id", get(related))
        .route("/api/v1/podcasts/recommended/:user_id", get(recommended))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TimeoutLayer::new(config.request_timeout))
        .with_state(state);

    if config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server, shutting down cleanly on ctrl-c / SIGTERM
pub async fn start_server(engine: DiscoveryEngine, config: &ApiConfig) -> Result<()> {
    let app = router(engine, config);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Starting discovery API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(Error::internal)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::internal)?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, draining in-flight requests");
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Filtered, paginated catalog search
async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawQueryParams>,
) -> Result<Json<DiscoveryResponse>> {
    let response = state.engine.query(QueryMode::Search, &params, None).await?;
    Ok(Json(response))
}

/// Engagement-weighted leaderboard for the requested time frame
async fn trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawQueryParams>,
) -> Result<Json<DiscoveryResponse>> {
    let response = state
        .engine
        .query(QueryMode::Trending, &params, None)
        .await?;
    Ok(Json(response))
}

/// Items related to the user's signals (favorites count double)
async fn related(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DiscoveryResponse>> {
    let response = state
        .engine
        .query(QueryMode::Related, &RawQueryParams::default(), Some(&user_id))
        .await?;
    Ok(Json(response))
}

/// Personalized recommendations with a recency fallback
async fn recommended(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<DiscoveryResponse>> {
    let response = state
        .engine
        .query(
            QueryMode::Recommended,
            &RawQueryParams::default(),
            Some(&user_id),
        )
        .await?;
    Ok(Json(response))
}
