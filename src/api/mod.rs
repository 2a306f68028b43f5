//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All resource endpoints are mounted under `/api/v1`; health and
//! configuration live at the root. With the `swagger-ui` feature the
//! OpenAPI document is served at `/api-docs/openapi.json` and browsable
//! at `/swagger-ui`.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Baye Zale Cutt booking API",
        description = "Slots, reservations, queue and pricing for the Baye Zale Cutt barbershop."
    ),
    paths(
        handlers::system::health_handler,
        handlers::system::schedule_handler,
        handlers::catalog::list_services,
        handlers::catalog::get_service,
        handlers::catalog::quote,
        handlers::calendar::slots,
        handlers::calendar::queue,
        handlers::calendar::dashboard,
        handlers::reservation::create_reservation,
        handlers::reservation::list_reservations,
        handlers::reservation::get_reservation,
        handlers::reservation::update_status,
        handlers::reservation::rate_reservation,
        handlers::customer::get_customer,
        handlers::customer::upsert_customer,
        handlers::customer::history,
    ),
    tags(
        (name = "System", description = "Health and shop configuration"),
        (name = "Catalog", description = "Services and prices"),
        (name = "Calendar", description = "Slot grid, queue and dashboard"),
        (name = "Reservations", description = "Booking lifecycle"),
        (name = "Customers", description = "Profiles and history"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_resource() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/slots",
            "/api/v1/reservations",
            "/api/v1/reservations/{id}/status",
            "/api/v1/customers/{id}/reservations",
            "/api/v1/services/{id}/quote",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
