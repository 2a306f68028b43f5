//! Slot availability classification.
//!
//! Intersects the slot grid with the active reservations of one
//! date/provider. The classification is the read side of the
//! slot-exclusivity rule: a slot held by an active reservation is never
//! reported as available.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::reservation::Reservation;
use super::{ReservationId, ShopSchedule};

/// Availability of a single slot start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    /// Free to book.
    Available,
    /// Held by an active reservation.
    Occupied,
    /// Outside the open blocks or off the slot grid.
    Closed,
    /// Today, at or before the current time.
    Past,
}

/// A slot start time with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SlotAvailability {
    /// Slot start time.
    #[schema(value_type = String, example = "08:30:00")]
    pub time: NaiveTime,
    /// Classification of the slot.
    pub status: SlotStatus,
    /// Reservation holding the slot, when occupied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<ReservationId>,
}

/// Classifies slots of one date against the active reservations that hold
/// them.
///
/// Built once per query from the reservations of the date/provider; inactive
/// reservations passed in are ignored.
#[derive(Debug, Clone)]
pub struct AvailabilityFilter<'a> {
    schedule: &'a ShopSchedule,
    date: NaiveDate,
    now: NaiveDateTime,
    held: HashMap<NaiveTime, ReservationId>,
}

impl<'a> AvailabilityFilter<'a> {
    /// Creates a filter for `date`, evaluated at shop-local time `now`.
    #[must_use]
    pub fn new(
        schedule: &'a ShopSchedule,
        date: NaiveDate,
        now: NaiveDateTime,
        reservations: &[Reservation],
    ) -> Self {
        let held = reservations
            .iter()
            .filter(|r| r.date == date && r.status.is_active())
            .map(|r| (r.time, r.id))
            .collect();
        Self {
            schedule,
            date,
            now,
            held,
        }
    }

    /// Classifies a single start time by direct lookup.
    ///
    /// Times that are not on the grid are `Closed`. Grid times on today's
    /// date at or before `now` are `Past`; otherwise a held slot is
    /// `Occupied` and a free one `Available`.
    #[must_use]
    pub fn classify(&self, time: NaiveTime) -> SlotAvailability {
        let reservation_id = self.held.get(&time).copied();
        let status = if !self.schedule.is_slot_start(time) {
            SlotStatus::Closed
        } else if self.date == self.now.date() && time <= self.now.time() {
            SlotStatus::Past
        } else if reservation_id.is_some() {
            SlotStatus::Occupied
        } else {
            SlotStatus::Available
        };
        SlotAvailability {
            time,
            status,
            reservation_id: match status {
                SlotStatus::Occupied => reservation_id,
                _ => None,
            },
        }
    }

    /// Classifies every slot of the day's grid, in grid order.
    #[must_use]
    pub fn classify_day(&self) -> Vec<SlotAvailability> {
        self.schedule
            .generate_slots(self.date)
            .into_iter()
            .map(|time| self.classify(time))
            .collect()
    }
}
