use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde_json::{json, Value};

use crate::{
    channel::telegram::Update,
    error::{AppError, AppResult},
};

use super::AppState;

/// Header Telegram uses to echo the secret given to `setWebhook`
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Receives a Telegram update and hands it to the bot
///
/// Responds as soon as the update is queued; Telegram retries deliveries that
/// are not acknowledged with a 2xx.
pub async fn telegram_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> AppResult<StatusCode> {
    if let Some(expected) = state.webhook_secret.as_deref() {
        let provided = headers
            .get(SECRET_TOKEN_HEADER)
            .and_then(|h| h.to_str().ok());
        if provided != Some(expected) {
            tracing::warn!(update_id = update.update_id, "Webhook call with bad secret token");
            return Err(AppError::Unauthorized("invalid webhook secret".to_string()));
        }
    }

    let update_id = update.update_id;
    match update.into_event() {
        Some(event) => {
            tracing::debug!(update_id, "Update accepted");
            state.bot.dispatch(event);
        }
        None => tracing::debug!(update_id, "Update ignored"),
    }

    Ok(StatusCode::OK)
}
