//! Service layer: business logic orchestration.
//!
//! [`BookingService`] coordinates the stores, runs post-commit follow-ups
//! through the [`CustomerDirectory`] and [`RefundGateway`], and emits
//! events through the [`super::domain::EventBus`].

pub mod booking_service;
pub mod customer_directory;
pub mod refunds;

pub use booking_service::{BookingRequest, BookingService};
pub use customer_directory::CustomerDirectory;
pub use refunds::{LoggingRefundGateway, RefundGateway};
