//! # bayezale-booking
//!
//! Appointment booking core of the Baye Zale Cutt barbershop: the slot grid,
//! availability, the two-tier queue with wait estimates, pricing and the
//! reservation lifecycle, served over REST and a WebSocket live feed.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── BookingService, CustomerDirectory (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Schedule, Availability, Queue, Pricing, State machine (domain/)
//!     │
//!     └── Stores: in-memory or PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use app_state::AppState;

/// Upper bound on the time spent serving one REST request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Assembles the full application: REST API, WebSocket feed and the HTTP
/// middleware stack.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(api::build_router())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .route("/ws", get(ws::handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
