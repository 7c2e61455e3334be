// SPDX-FileCopyrightText: 2026 Wacast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wacast_core::{CampaignError, CampaignStore};
use wacast_engine::{Dispatcher, Reconciler};

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Webhook verification settings.
#[derive(Clone, Default)]
pub struct WebhookConfig {
    /// Token expected in the subscription handshake.
    pub verify_token: Option<String>,
    /// When set, callbacks must carry a valid `X-Hub-Signature-256`.
    pub app_secret: Option<String>,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub store: Arc<dyn CampaignStore>,
    pub dispatcher: Dispatcher,
    pub reconciler: Reconciler,
    pub auth: AuthConfig,
    pub webhook: WebhookConfig,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Gateway server configuration (mirrors `[gateway]` from wacast-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Largest accepted campaign submission, in bytes.
    pub max_upload_bytes: usize,
}

/// Assemble every route.
///
/// Public:
/// - GET /health
/// - GET, POST /webhook
/// - POST /v1/login, POST /v1/logout
///
/// Behind a session:
/// - GET, POST /v1/campaigns
/// - GET, DELETE /v1/campaigns/{id}
/// - GET /v1/campaigns/{id}/records, /refill, /report
pub fn build_router(config: &ServerConfig, state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route(
            "/webhook",
            get(handlers::webhook_verify).post(handlers::webhook_receive),
        )
        .route("/v1/login", post(handlers::post_login))
        .route("/v1/logout", post(handlers::post_logout))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/campaigns",
            get(handlers::list_campaigns).post(handlers::post_campaign),
        )
        .route(
            "/v1/campaigns/{id}",
            get(handlers::get_campaign).delete(handlers::delete_campaign),
        )
        .route("/v1/campaigns/{id}/records", get(handlers::get_records))
        .route("/v1/campaigns/{id}/refill", get(handlers::get_refill))
        .route("/v1/campaigns/{id}/report", get(handlers::get_report))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until `shutdown` resolves,
/// letting in-flight requests finish.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), CampaignError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| CampaignError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CampaignError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
