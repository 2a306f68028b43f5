//! Day views: slot grid, live queue and admin dashboard.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{DateQuery, SlotsQuery, SlotsResponse};
use crate::app_state::AppState;
use crate::domain::{DashboardStats, QueueStatus, SlotStatus};
use crate::error::{BookingError, ErrorResponse};

/// `GET /slots`: Classified slot grid of a day.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] for an unknown provider.
#[utoipa::path(
    get,
    path = "/api/v1/slots",
    tag = "Calendar",
    summary = "Slot availability",
    description = "Every slot of the day, each marked available, occupied, closed or past.",
    params(SlotsQuery),
    responses(
        (status = 200, description = "Slot grid", body = SlotsResponse),
        (status = 400, description = "Unknown provider", body = ErrorResponse),
    )
)]
pub async fn slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let requested = query.provider();
    let slots = state
        .booking_service
        .available_slots(query.date, requested.as_ref())
        .await?;
    Ok(Json(SlotsResponse {
        date: query.date,
        provider_id: requested.unwrap_or_else(|| state.booking_service.provider_id().clone()),
        available: slots
            .iter()
            .filter(|s| s.status == SlotStatus::Available)
            .count(),
        slots,
    }))
}

/// `GET /queue`: Live queue of a day.
///
/// # Errors
///
/// Returns a store error.
#[utoipa::path(
    get,
    path = "/api/v1/queue",
    tag = "Calendar",
    summary = "Queue status",
    params(DateQuery),
    responses(
        (status = 200, description = "Waiting counts and estimated waits per tier", body = QueueStatus),
    )
)]
pub async fn queue(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.booking_service.queue_status(query.date).await?))
}

/// `GET /dashboard`: Daily figures for the shop.
///
/// # Errors
///
/// Returns a store error.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    tag = "Calendar",
    summary = "Admin dashboard",
    params(DateQuery),
    responses(
        (status = 200, description = "Counts, revenue, rating and top services", body = DashboardStats),
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<DateQuery>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.booking_service.dashboard(query.date).await?))
}

/// Calendar routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/slots", get(slots))
        .route("/queue", get(queue))
        .route("/dashboard", get(dashboard))
}
