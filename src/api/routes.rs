use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

/// Path Telegram delivers updates to
pub const WEBHOOK_PATH: &str = "/telegram/webhook";

/// Creates the main router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route(WEBHOOK_PATH, post(handlers::telegram_webhook))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
