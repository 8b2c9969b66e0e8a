//! Advisor API /v1: REST endpoints
pub mod config;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod state;
pub mod telemetry;

pub use config::{ConfigError, ServiceConfig};
pub use state::{AppState, StartupError};
pub use telemetry::init_tracing;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/v1/chat", post(handlers::chat))
        .route("/v1/chat/status", get(handlers::chat_status))
        .route("/v1/health", get(handlers::health))
        .route("/v1/usage/session", get(handlers::usage_session))
        .route("/v1/usage/daily", get(handlers::usage_daily))
        .route("/v1/usage/alerts", get(handlers::usage_alerts))
        .route("/metrics", get(handlers::export_metrics))
        .layer(axum::middleware::from_fn(middleware::log_requests))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: &str, state: AppState) -> std::io::Result<()> {
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Advisor API listening on {}", addr);
    axum::serve(listener, app).await
}
