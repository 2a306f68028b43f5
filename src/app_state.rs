//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::BookingService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking service for all business logic.
    pub booking_service: Arc<BookingService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket feed.
    #[must_use]
    pub fn new(booking_service: BookingService) -> Self {
        let event_bus = booking_service.event_bus().clone();
        Self {
            booking_service: Arc::new(booking_service),
            event_bus,
        }
    }
}
