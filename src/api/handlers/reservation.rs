//! Reservation handlers: create, list, get, status change, rating.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateReservationRequest, RatingRequest, ReservationListQuery, ReservationListResponse,
    UpdateStatusRequest, parse_optional_status_filter,
};
use crate::app_state::AppState;
use crate::domain::{ProviderId, Reservation, ReservationId};
use crate::error::{BookingError, ErrorResponse};

/// `POST /reservations`: Book a slot.
///
/// # Errors
///
/// Returns [`BookingError::SlotUnavailable`] when the slot is closed, past
/// or already taken, and the lookup errors of the service and customer.
#[utoipa::path(
    post,
    path = "/api/v1/reservations",
    tag = "Reservations",
    summary = "Create a reservation",
    description = "Books one slot for a registered customer. The price and the queue position are computed server-side.",
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation created", body = Reservation),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown service or customer", body = ErrorResponse),
        (status = 409, description = "Slot unavailable", body = ErrorResponse),
    )
)]
pub async fn create_reservation(
    State(state): State<AppState>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let reservation = state
        .booking_service
        .create_reservation(req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// `GET /reservations`: Reservations of a day.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] for an unknown status or provider.
#[utoipa::path(
    get,
    path = "/api/v1/reservations",
    tag = "Reservations",
    summary = "List reservations of a day",
    params(ReservationListQuery),
    responses(
        (status = 200, description = "Reservations, oldest first", body = ReservationListResponse),
        (status = 400, description = "Invalid filter", body = ErrorResponse),
    )
)]
pub async fn list_reservations(
    State(state): State<AppState>,
    Query(query): Query<ReservationListQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let statuses = parse_optional_status_filter(query.status.as_deref())?;
    let provider = query.provider_id.as_deref().map(ProviderId::from);
    let data = state
        .booking_service
        .list_reservations(query.date, provider.as_ref(), statuses.as_deref())
        .await?;
    Ok(Json(ReservationListResponse {
        date: query.date,
        count: data.len(),
        data,
    }))
}

/// `GET /reservations/{id}`: One reservation.
///
/// # Errors
///
/// Returns [`BookingError::ReservationNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/reservations/{id}",
    tag = "Reservations",
    summary = "Get a reservation",
    params(
        ("id" = uuid::Uuid, Path, description = "Reservation UUID"),
    ),
    responses(
        (status = 200, description = "Reservation", body = Reservation),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
    )
)]
pub async fn get_reservation(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, BookingError> {
    let reservation = state
        .booking_service
        .get_reservation(ReservationId::from_uuid(id))
        .await?;
    Ok(Json(reservation))
}

/// `PATCH /reservations/{id}/status`: Move a reservation through its lifecycle.
///
/// # Errors
///
/// Returns [`BookingError::InvalidStateTransition`] for an illegal edge,
/// [`BookingError::ActorNotPermitted`] when a customer asks for a staff
/// transition, and [`BookingError::Conflict`] when concurrent writers kept
/// winning.
#[utoipa::path(
    patch,
    path = "/api/v1/reservations/{id}/status",
    tag = "Reservations",
    summary = "Change a reservation's status",
    description = "Customers may cancel their own pending or confirmed reservations with a reason. Every other transition is reserved to the shop.",
    params(
        ("id" = uuid::Uuid, Path, description = "Reservation UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated reservation", body = Reservation),
        (status = 400, description = "Missing cancellation reason", body = ErrorResponse),
        (status = 403, description = "Actor not permitted", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
        (status = 409, description = "Illegal transition or concurrent update", body = ErrorResponse),
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let reservation = state
        .booking_service
        .update_status(ReservationId::from_uuid(id), req.into())
        .await?;
    Ok(Json(reservation))
}

/// `POST /reservations/{id}/rating`: Rate a completed reservation.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRating`] for a rating outside 1..=5 or a
/// reservation that is not completed.
#[utoipa::path(
    post,
    path = "/api/v1/reservations/{id}/rating",
    tag = "Reservations",
    summary = "Rate a reservation",
    params(
        ("id" = uuid::Uuid, Path, description = "Reservation UUID"),
    ),
    request_body = RatingRequest,
    responses(
        (status = 200, description = "Rated reservation", body = Reservation),
        (status = 400, description = "Invalid rating", body = ErrorResponse),
        (status = 404, description = "Reservation not found", body = ErrorResponse),
    )
)]
pub async fn rate_reservation(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<RatingRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let reservation = state
        .booking_service
        .rate_reservation(ReservationId::from_uuid(id), req.rating, req.review)
        .await?;
    Ok(Json(reservation))
}

/// Reservation routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            post(create_reservation).get(list_reservations),
        )
        .route("/reservations/{id}", get(get_reservation))
        .route("/reservations/{id}/status", patch(update_status))
        .route("/reservations/{id}/rating", post(rate_reservation))
}
