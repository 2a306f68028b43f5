//! System endpoints: health check and shop configuration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::{ProviderId, ShopSchedule};

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health`: Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Opening hours as served to clients.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    provider_id: ProviderId,
    schedule: ShopSchedule,
    slots_per_day: usize,
}

/// `GET /config/schedule`: Opening hours and slot size.
#[utoipa::path(
    get,
    path = "/config/schedule",
    tag = "System",
    summary = "Shop schedule",
    description = "Returns the open blocks, the slot length and the number of slots in a day.",
    responses(
        (status = 200, description = "Schedule", body = ScheduleResponse),
    )
)]
pub async fn schedule_handler(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.booking_service;
    let schedule = service.schedule().clone();
    let slots_per_day = schedule.generate_slots(service.now().date()).len();
    Json(ScheduleResponse {
        provider_id: service.provider_id().clone(),
        schedule,
        slots_per_day,
    })
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/schedule", get(schedule_handler))
}
