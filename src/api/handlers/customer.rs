//! Customer handlers: profile and reservation history.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{HistoryQuery, UpsertCustomerRequest, parse_optional_status_filter};
use crate::app_state::AppState;
use crate::domain::{CustomerId, Reservation, UserProfile};
use crate::error::{BookingError, ErrorResponse};

/// `GET /customers/{id}`: A customer's profile and totals.
///
/// # Errors
///
/// Returns [`BookingError::UserNotFound`].
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    summary = "Get a customer",
    params(
        ("id" = String, Path, description = "Customer id"),
    ),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(
        state
            .booking_service
            .get_customer(&CustomerId::from(id))
            .await?,
    ))
}

/// `PUT /customers/{id}`: Register or update a customer.
///
/// Running totals are kept when the customer already exists.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] for a blank name or phone.
#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    summary = "Register a customer",
    params(
        ("id" = String, Path, description = "Customer id"),
    ),
    request_body = UpsertCustomerRequest,
    responses(
        (status = 200, description = "Stored profile", body = UserProfile),
        (status = 400, description = "Invalid profile", body = ErrorResponse),
    )
)]
pub async fn upsert_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpsertCustomerRequest>,
) -> Result<impl IntoResponse, BookingError> {
    if req.name.trim().is_empty() || req.phone.trim().is_empty() {
        return Err(BookingError::InvalidRequest(
            "name and phone are required".to_string(),
        ));
    }
    let profile = UserProfile::new(CustomerId::from(id), req.name, req.phone, req.email);
    Ok(Json(state.booking_service.upsert_customer(profile).await?))
}

/// `GET /customers/{id}/reservations`: A customer's history.
///
/// # Errors
///
/// Returns [`BookingError::UserNotFound`] or
/// [`BookingError::InvalidRequest`] for an unknown status.
#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/reservations",
    tag = "Customers",
    summary = "Customer history",
    params(
        ("id" = String, Path, description = "Customer id"),
        HistoryQuery,
    ),
    responses(
        (status = 200, description = "Reservations, newest first", body = Vec<Reservation>),
        (status = 404, description = "Customer not found", body = ErrorResponse),
    )
)]
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let statuses = parse_optional_status_filter(query.status.as_deref())?;
    let reservations = state
        .booking_service
        .customer_history(&CustomerId::from(id), statuses.as_deref(), query.limit)
        .await?;
    Ok(Json(reservations))
}

/// Customer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers/{id}", get(get_customer).put(upsert_customer))
        .route("/customers/{id}/reservations", get(history))
}
