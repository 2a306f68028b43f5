//! Persistence layer: reservation, user and catalog stores.
//!
//! The booking service talks to storage only through the async traits
//! below. [`memory`] holds lock-based implementations used by default and
//! in tests; [`postgres`] holds the `sqlx` implementations used when
//! persistence is enabled.
//!
//! The one operation with a concurrency contract is
//! [`ReservationStore::create_reservation`]: the occupancy check, the queue
//! count and the insert are a single atomic step, so concurrent creates on
//! the same `(date, time, provider)` admit at most one winner. The creation
//! timestamp is taken inside that step as well.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SubsecRound, TimeDelta, Utc};

use crate::domain::{
    CustomerId, NewReservation, ProviderId, Reservation, ReservationId, ReservationStatus,
    ServiceCatalogEntry, ServiceId, UserProfile,
};
use crate::error::BookingError;

pub use memory::{InMemoryCatalogStore, InMemoryReservationStore, InMemoryUserStore};
pub use postgres::{PostgresReservationStore, PostgresUserStore};

/// Creation timestamp for a reservation whose day already holds `latest`.
///
/// Stamps are strictly increasing per day, at the microsecond precision
/// PostgreSQL stores, so `created_at` order matches queue assignment order.
#[must_use]
pub fn creation_stamp(latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now().trunc_subsecs(6);
    match latest {
        Some(latest) if latest >= now => latest + TimeDelta::microseconds(1),
        _ => now,
    }
}

/// Result of a compare-and-swap status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusWrite {
    /// The expected status matched and the reservation was replaced.
    Applied(Reservation),
    /// Someone else changed the status first; carries the fresh record.
    Stale(Reservation),
}

/// Storage of reservations.
#[async_trait]
pub trait ReservationStore: Send + Sync + Debug {
    /// Reservations of `date`, oldest first, optionally narrowed to one
    /// provider and a set of statuses.
    async fn list_reservations(
        &self,
        date: NaiveDate,
        provider_id: Option<&ProviderId>,
        statuses: Option<&[ReservationStatus]>,
    ) -> Result<Vec<Reservation>, BookingError>;

    /// Loads one reservation.
    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, BookingError>;

    /// Atomically checks the slot, assigns the queue snapshot and inserts.
    ///
    /// Fails with [`BookingError::SlotUnavailable`] when an active
    /// reservation already holds `(date, time, provider)`. The stored
    /// `created_at` comes from [`creation_stamp`].
    async fn create_reservation(&self, new: NewReservation)
    -> Result<Reservation, BookingError>;

    /// Replaces the stored reservation if its status is still `expected`.
    async fn update_reservation_status(
        &self,
        expected: ReservationStatus,
        updated: &Reservation,
    ) -> Result<StatusWrite, BookingError>;

    /// Stores a rating on a completed reservation.
    async fn record_rating(
        &self,
        id: ReservationId,
        rating: u8,
        review: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Reservation, BookingError>;

    /// A customer's reservations, newest first, at most `limit` of them.
    async fn list_customer_reservations(
        &self,
        customer_id: &CustomerId,
        statuses: Option<&[ReservationStatus]>,
        limit: usize,
    ) -> Result<Vec<Reservation>, BookingError>;
}

/// Storage of customer profiles and their running totals.
#[async_trait]
pub trait UserStore: Send + Sync + Debug {
    /// Loads a profile.
    async fn get_user_profile(&self, id: &CustomerId) -> Result<UserProfile, BookingError>;

    /// Creates or replaces a profile's identity fields, keeping its totals.
    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, BookingError>;

    /// Counts a new reservation.
    async fn record_booking(&self, id: &CustomerId) -> Result<(), BookingError>;

    /// Adds a completed reservation's spend and loyalty points.
    async fn credit_completion(
        &self,
        id: &CustomerId,
        amount: u64,
        points: u64,
    ) -> Result<(), BookingError>;

    /// Counts a customer-initiated cancellation.
    async fn record_cancellation(&self, id: &CustomerId) -> Result<(), BookingError>;
}

/// Read access to the service catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync + Debug {
    /// Every catalog entry, in catalog order.
    async fn list_services(&self) -> Result<Vec<ServiceCatalogEntry>, BookingError>;

    /// One catalog entry; [`BookingError::UnknownService`] on a miss.
    async fn get_service_catalog_entry(
        &self,
        id: &ServiceId,
    ) -> Result<ServiceCatalogEntry, BookingError>;
}
