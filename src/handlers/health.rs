use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use std::time::Instant;
use utoipa::ToSchema;

use super::HealthHandlerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub version: String,
    pub timestamp: String,
    pub store: ComponentHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub latency_ms: u64,
}

pub fn health_routes<S>() -> Router<S>
where
    S: HealthHandlerState,
{
    Router::new().route("/health", get(health_check::<S>))
}

/// Readiness probe backed by a store ping
pub async fn health_check<S>(State(state): State<S>) -> impl IntoResponse
where
    S: HealthHandlerState,
{
    let started = Instant::now();
    let result = state.product_store().ping().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    let (status, error) = match result {
        Ok(()) => (ComponentStatus::Up, None),
        Err(err) => (ComponentStatus::Down, Some(err.to_string())),
    };
    let code = match status {
        ComponentStatus::Up => StatusCode::OK,
        ComponentStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            store: ComponentHealth {
                status,
                error,
                latency_ms,
            },
        }),
    )
}
