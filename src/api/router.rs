use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{cors_layer, logging_middleware, metrics_middleware};
use super::predict;
use super::state::AppState;
use crate::config::AppConfig;

/// Create the full router with application state
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        // Inference
        .route("/predict/", post(predict::predict))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors))
}
