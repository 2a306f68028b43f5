//! Domain layer: booking rules, value types and the event system.
//!
//! Everything here is synchronous and storage-agnostic. The slot grid,
//! availability classification, pricing, queue estimates and the
//! reservation state machine are pure functions of their inputs and an
//! injected [`Clock`]; the [`EventBus`] broadcasts committed changes.

pub mod availability;
pub mod booking_event;
pub mod catalog;
pub mod clock;
pub mod event_bus;
pub mod ids;
pub mod pricing;
pub mod queue;
pub mod reservation;
pub mod schedule;
pub mod stats;
pub mod user;

pub use availability::{AvailabilityFilter, SlotAvailability, SlotStatus};
pub use booking_event::BookingEvent;
pub use catalog::{ServiceCatalogEntry, ServiceCategory, Tier, seeded_catalog};
pub use clock::{Clock, FixedClock, SystemClock};
pub use event_bus::EventBus;
pub use ids::{CustomerId, ProviderId, ReservationId, ServiceId};
pub use pricing::{PriceBreakdown, PricingPolicy};
pub use queue::{QueueSnapshot, QueueStatus};
pub use reservation::{
    Actor, FollowUp, NewReservation, PaymentMethod, PaymentStatus, Reservation,
    ReservationStatus, StatusChange,
};
pub use schedule::{OpenBlock, ScheduleError, ShopSchedule};
pub use stats::DashboardStats;
pub use user::{LoyaltyTier, UserProfile};
