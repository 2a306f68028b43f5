//! Domain events reflecting reservation mutations.
//!
//! Every successful create, status change and rating emits a
//! [`BookingEvent`] through the [`super::EventBus`]. WebSocket subscribers
//! receive the events of the dates they follow.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use super::{ReservationId, ReservationStatus, Tier};

/// Domain event emitted after every reservation mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BookingEvent {
    /// A reservation was created and holds its slot.
    ReservationCreated {
        /// Reservation identifier.
        reservation_id: ReservationId,
        /// Booked date.
        date: NaiveDate,
        /// Booked slot start.
        time: NaiveTime,
        /// Speed class.
        tier: Tier,
        /// Queue position at creation.
        queue_position: u32,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A reservation moved to a new status.
    ReservationStatusChanged {
        /// Reservation identifier.
        reservation_id: ReservationId,
        /// Booked date.
        date: NaiveDate,
        /// Booked slot start.
        time: NaiveTime,
        /// Status before the change.
        from: ReservationStatus,
        /// Status after the change.
        to: ReservationStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A completed reservation was rated.
    ReservationRated {
        /// Reservation identifier.
        reservation_id: ReservationId,
        /// Booked date.
        date: NaiveDate,
        /// Rating from 1 to 5.
        rating: u8,
        /// Rating timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl BookingEvent {
    /// Returns the reservation ID associated with this event.
    #[must_use]
    pub const fn reservation_id(&self) -> ReservationId {
        match self {
            Self::ReservationCreated { reservation_id, .. }
            | Self::ReservationStatusChanged { reservation_id, .. }
            | Self::ReservationRated { reservation_id, .. } => *reservation_id,
        }
    }

    /// Returns the booked date, used to route the event to subscribers.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        match self {
            Self::ReservationCreated { date, .. }
            | Self::ReservationStatusChanged { date, .. }
            | Self::ReservationRated { date, .. } => *date,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::ReservationCreated { .. } => "reservation_created",
            Self::ReservationStatusChanged { .. } => "reservation_status_changed",
            Self::ReservationRated { .. } => "reservation_rated",
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        let Some(d) = NaiveDate::from_ymd_opt(2026, 10, 20) else {
            panic!("valid date");
        };
        d
    }

    #[test]
    fn status_change_serializes_with_tag() {
        let Some(time) = NaiveTime::from_hms_opt(9, 30, 0) else {
            panic!("valid time");
        };
        let event = BookingEvent::ReservationStatusChanged {
            reservation_id: ReservationId::new(),
            date: day(),
            time,
            from: ReservationStatus::Pending,
            to: ReservationStatus::InProgress,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_string(&event).unwrap_or_default();
        assert!(json.contains("\"event_type\":\"reservation_status_changed\""));
        assert!(json.contains("\"to\":\"in_progress\""));
        assert!(json.contains("\"date\":\"2026-10-20\""));
    }

    #[test]
    fn accessors() {
        let id = ReservationId::new();
        let event = BookingEvent::ReservationRated {
            reservation_id: id,
            date: day(),
            rating: 5,
            timestamp: Utc::now(),
        };
        assert_eq!(event.reservation_id(), id);
        assert_eq!(event.date(), day());
        assert_eq!(event.event_type_str(), "reservation_rated");
    }
}
