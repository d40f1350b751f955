//! HTTP API for liveness, health, and bot metrics.
//!
//! Read-only and purely informational; nothing here mutates bot state.

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
};
use serde_json::{Value, json};
use vigil_core::BotMetrics;

/// API state containing the shared metrics collector.
#[derive(Clone)]
pub struct ApiState {
    metrics: BotMetrics,
}

impl ApiState {
    /// Creates new API state.
    pub fn new(metrics: BotMetrics) -> Self {
        Self { metrics }
    }
}

/// Creates the healthcheck API router.
pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

fn liveness_payload() -> Value {
    json!({
        "status": "ok",
        "message": "Bot is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })
}

fn health_payload(metrics: &BotMetrics) -> Value {
    json!({
        "status": "healthy",
        "bot": metrics.bot_tag().unwrap_or_else(|| "starting...".to_string()),
    })
}

/// Liveness endpoint.
async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, Json(liveness_payload()))
}

/// Health endpoint with the logged-in bot tag.
async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(health_payload(&state.metrics)))
}

/// Current metrics snapshot.
async fn metrics(State(state): State<ApiState>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.metrics.snapshot()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liveness_payload_shape() {
        let payload = liveness_payload();
        assert_eq!(payload["status"], "ok");
        assert!(payload["timestamp"].is_string());
    }

    #[test]
    fn test_health_reports_starting_before_ready() {
        let metrics = BotMetrics::new();
        let payload = health_payload(&metrics);
        assert_eq!(payload["status"], "healthy");
        assert_eq!(payload["bot"], "starting...");
    }

    #[test]
    fn test_health_reports_bot_tag_once_ready() {
        let metrics = BotMetrics::new();
        metrics.set_bot_tag("vigil#0001");
        let payload = health_payload(&metrics);
        assert_eq!(payload["bot"], "vigil#0001");
    }

    #[test]
    fn test_router_builds() {
        let _router = create_router(ApiState::new(BotMetrics::new()));
    }
}
