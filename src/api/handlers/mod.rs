//! REST endpoint handlers organized by resource.

pub mod calendar;
pub mod catalog;
pub mod customer;
pub mod reservation;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(catalog::routes())
        .merge(calendar::routes())
        .merge(reservation::routes())
        .merge(customer::routes())
}
