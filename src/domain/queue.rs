//! Queue positions and wait estimates.
//!
//! The position of a new reservation is `active reservations in the same
//! (date, tier) + 1`, counted by the store inside the create operation.
//! The wait is a flat estimate: `(position - 1) * 35 min`, halved for
//! express. Both values are a snapshot taken at creation and are never
//! recomputed.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::reservation::{Reservation, ReservationStatus};
use super::{ReservationId, Tier};

/// Average minutes spent per customer, independent of the service.
pub const AVERAGE_SERVICE_MINUTES: u64 = 35;

/// Tier speed factor as a `(numerator, denominator)` pair.
#[must_use]
pub const fn tier_factor(tier: Tier) -> (u64, u64) {
    match tier {
        Tier::Standard => (1, 1),
        Tier::Express => (1, 2),
    }
}

/// Minutes to wait for `customers_ahead`, rounded half-up.
#[must_use]
pub const fn wait_for(customers_ahead: u64, tier: Tier) -> u64 {
    let (num, den) = tier_factor(tier);
    let minutes = customers_ahead
        .saturating_mul(AVERAGE_SERVICE_MINUTES)
        .saturating_mul(num);
    minutes.saturating_mul(2).saturating_add(den) / den.saturating_mul(2)
}

/// Estimated wait for a reservation at `position` in its tier's queue.
#[must_use]
pub const fn estimate_wait(position: u32, tier: Tier) -> u64 {
    wait_for(position.saturating_sub(1) as u64, tier)
}

/// Queue position and wait captured when a reservation is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct QueueSnapshot {
    /// 1-based position within the (date, tier) queue.
    pub position: u32,
    /// Estimated wait in minutes at creation time.
    pub estimated_wait_minutes: u64,
}

impl QueueSnapshot {
    /// Snapshot for a reservation placed at `position`.
    #[must_use]
    pub const fn assign(position: u32, tier: Tier) -> Self {
        Self {
            position,
            estimated_wait_minutes: estimate_wait(position, tier),
        }
    }

    /// Snapshot for a reservation with `active_ahead` active reservations
    /// before it in the same partition.
    #[must_use]
    pub fn after(active_ahead: usize, tier: Tier) -> Self {
        let position = u32::try_from(active_ahead)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        Self::assign(position, tier)
    }
}

/// Waiting line of one tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TierQueue {
    /// Pending and confirmed reservations of the tier.
    pub waiting: u32,
    /// Wait in minutes for a newcomer.
    pub estimated_wait_minutes: u64,
    /// Shop-local time a newcomer would be served.
    #[schema(value_type = String, example = "2026-10-20T10:35:00")]
    pub next_available: NaiveDateTime,
}

/// The reservation currently being served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct NowServing {
    /// Reservation in progress.
    pub reservation_id: ReservationId,
    /// Customer being served.
    pub customer_name: String,
    /// Service being performed.
    pub service_name: String,
    /// Expected end of the slot.
    #[schema(value_type = String, example = "10:00:00")]
    pub estimated_end: NaiveTime,
}

/// Live queue overview for a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QueueStatus {
    /// Day the queue refers to.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Standard tier line.
    pub standard: TierQueue,
    /// Express tier line.
    pub express: TierQueue,
    /// In-progress reservation, if any.
    pub currently_serving: Option<NowServing>,
}

impl QueueStatus {
    /// Summarises the reservations of `date` as seen at shop-local `now`.
    #[must_use]
    pub fn summarize(date: NaiveDate, now: NaiveDateTime, reservations: &[Reservation]) -> Self {
        let on_date = || reservations.iter().filter(move |r| r.date == date);
        let line = |tier: Tier| {
            let waiting = on_date()
                .filter(|r| {
                    r.tier == tier
                        && matches!(
                            r.status,
                            ReservationStatus::Pending | ReservationStatus::Confirmed
                        )
                })
                .count();
            let minutes = wait_for(u64::try_from(waiting).unwrap_or(u64::MAX), tier);
            let wait = i64::try_from(minutes)
                .ok()
                .and_then(TimeDelta::try_minutes)
                .unwrap_or_default();
            TierQueue {
                waiting: u32::try_from(waiting).unwrap_or(u32::MAX),
                estimated_wait_minutes: minutes,
                next_available: now.checked_add_signed(wait).unwrap_or(now),
            }
        };
        let currently_serving = on_date()
            .find(|r| r.status == ReservationStatus::InProgress)
            .map(|r| NowServing {
                reservation_id: r.id,
                customer_name: r.customer_name.clone(),
                service_name: r.service_name.clone(),
                estimated_end: r.end_time,
            });
        Self {
            date,
            standard: line(Tier::Standard),
            express: line(Tier::Express),
            currently_serving,
        }
    }
}
