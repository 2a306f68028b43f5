//! Catalog handlers: services and price quotes.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{QuoteQuery, QuoteResponse};
use crate::app_state::AppState;
use crate::domain::{ServiceCatalogEntry, ServiceId};
use crate::error::{BookingError, ErrorResponse};

/// `GET /services`: The service catalog.
///
/// # Errors
///
/// Returns a store error.
#[utoipa::path(
    get,
    path = "/api/v1/services",
    tag = "Catalog",
    summary = "List services",
    responses(
        (status = 200, description = "Catalog, in display order", body = Vec<ServiceCatalogEntry>),
    )
)]
pub async fn list_services(State(state): State<AppState>) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(state.booking_service.list_services().await?))
}

/// `GET /services/{id}`: One catalog entry.
///
/// # Errors
///
/// Returns [`BookingError::UnknownService`].
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    tag = "Catalog",
    summary = "Get a service",
    params(
        ("id" = String, Path, description = "Service id, e.g. `homme_classic`"),
    ),
    responses(
        (status = 200, description = "Catalog entry", body = ServiceCatalogEntry),
        (status = 404, description = "Unknown service", body = ErrorResponse),
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, BookingError> {
    Ok(Json(
        state.booking_service.get_service(&ServiceId::from(id)).await?,
    ))
}

/// `GET /services/{id}/quote`: Price a service at a tier.
///
/// # Errors
///
/// Returns [`BookingError::UnknownService`].
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}/quote",
    tag = "Catalog",
    summary = "Quote a price",
    description = "Returns the tier price, the flat service fee, the 8% tax and the total, in FCFA.",
    params(
        ("id" = String, Path, description = "Service id"),
        QuoteQuery,
    ),
    responses(
        (status = 200, description = "Price breakdown", body = QuoteResponse),
        (status = 404, description = "Unknown service", body = ErrorResponse),
    )
)]
pub async fn quote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<QuoteQuery>,
) -> Result<impl IntoResponse, BookingError> {
    let service_id = ServiceId::from(id);
    let price = state.booking_service.quote(&service_id, query.tier).await?;
    Ok(Json(QuoteResponse {
        service_id,
        tier: query.tier,
        price,
    }))
}

/// Catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services))
        .route("/services/{id}", get(get_service))
        .route("/services/{id}/quote", get(quote))
}
