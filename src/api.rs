//! Webhook server
//!
//! Receives Telegram updates over HTTP and feeds them to the dialogue
//! engine.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::chat::Update;
use crate::dialogue::DialogueEngine;
use crate::error::BotError;

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<DialogueEngine>,
    pub webhook_secret: Option<String>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Webhook Endpoint
/// =============================

fn secret_matches(headers: &HeaderMap, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(SECRET_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == expected)
}

async fn telegram_webhook(
    State(state): State<ApiState>,
    headers: HeaderMap,
    payload: Result<Json<Update>, JsonRejection>,
) -> (StatusCode, Json<ApiResponse>) {
    if !secret_matches(&headers, state.webhook_secret.as_deref()) {
        warn!("Webhook call with missing or wrong secret token");
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::error("invalid secret token".into())),
        );
    }

    let update = match payload {
        Ok(Json(update)) => update,
        Err(rejection) => {
            let err = BotError::InvalidUpdate(rejection.body_text());
            warn!("{}", err);
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(err.to_string())));
        }
    };

    let update_id = update.update_id;
    let Some(incoming) = update.into_incoming() else {
        return (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "update_id": update_id,
                "status": "ignored",
            }))),
        );
    };

    if let Some(callback_id) = incoming.callback_id.as_deref() {
        if let Err(e) = state.engine.chat().answer_callback(callback_id).await {
            warn!(update_id, "answerCallbackQuery failed: {}", e);
        }
    }

    match state
        .engine
        .handle_event(incoming.chat_id, incoming.inbound)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "update_id": update_id,
                "status": "handled",
            }))),
        ),
        Err(e) => {
            warn!(update_id, chat_id = %incoming.chat_id, "Update failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(format!("update {} failed: {}", update_id, e))),
            )
        }
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(engine: Arc<DialogueEngine>, webhook_secret: Option<String>) -> Router {
    let state = ApiState {
        engine,
        webhook_secret,
    };

    Router::new()
        .route("/health", get(health))
        .route("/telegram/webhook", post(telegram_webhook))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(router: Router, port: u16) -> crate::Result<()> {
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("Webhook server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
