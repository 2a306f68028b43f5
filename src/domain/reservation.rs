//! Reservation record and its status state machine.
//!
//! ```text
//! pending ──► confirmed ──► in_progress ──► completed
//!    │            │              │
//!    ├──► cancelled ◄┘           │
//!    └────────────┴──────────────┴──► no_show
//! ```
//!
//! `completed`, `cancelled` and `no_show` are terminal. Customers may only
//! cancel their own pending or confirmed reservations; every other edge is
//! reserved to the shop.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::queue::QueueSnapshot;
use super::{CustomerId, ProviderId, ReservationId, ServiceId, Tier};
use crate::error::BookingError;

/// Lifecycle status of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Created, awaiting confirmation by the shop.
    Pending,
    /// Confirmed by the shop.
    Confirmed,
    /// The customer is being served.
    InProgress,
    /// Service finished.
    Completed,
    /// Cancelled by the customer or the shop.
    Cancelled,
    /// The customer did not show up.
    NoShow,
}

impl ReservationStatus {
    /// Statuses that hold a slot and count towards the queue.
    pub const ACTIVE: [Self; 3] = [Self::Pending, Self::Confirmed, Self::InProgress];

    /// Returns the status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Parses a status from its wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "no_show" => Some(Self::NoShow),
            _ => None,
        }
    }

    /// Returns `true` if the reservation still holds its slot.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::InProgress)
    }

    /// Returns `true` if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    /// Returns `true` if `self -> to` is an edge of the state machine.
    #[must_use]
    pub const fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Confirmed)
                | (Self::Confirmed, Self::InProgress)
                | (Self::InProgress, Self::Completed)
                | (Self::Pending | Self::Confirmed, Self::Cancelled)
                | (Self::Pending | Self::Confirmed | Self::InProgress, Self::NoShow)
        )
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Orange Money mobile wallet.
    OrangeMoney,
    /// Wave mobile wallet.
    Wave,
    /// Cash at the shop.
    Cash,
    /// Bank card.
    Card,
}

impl PaymentMethod {
    /// Returns the method as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrangeMoney => "orange_money",
            Self::Wave => "wave",
            Self::Cash => "cash",
            Self::Card => "card",
        }
    }

    /// Parses a method from its wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "orange_money" => Some(Self::OrangeMoney),
            "wave" => Some(Self::Wave),
            "cash" => Some(Self::Cash),
            "card" => Some(Self::Card),
            _ => None,
        }
    }
}

/// Settlement state of the reservation's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Nothing paid yet.
    Pending,
    /// A deposit was paid.
    Partial,
    /// Fully paid.
    Paid,
    /// The deposit was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns the payment status as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Refunded => "refunded",
        }
    }

    /// Parses a payment status from its wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "partial" => Some(Self::Partial),
            "paid" => Some(Self::Paid),
            "refunded" => Some(Self::Refunded),
            _ => None,
        }
    }
}

/// Who is requesting a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// A customer, acting on their own reservations.
    Customer(CustomerId),
    /// Shop staff.
    Admin,
}

/// A requested status change with its optional annotations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    /// Target status.
    pub to: ReservationStatus,
    /// Requesting actor.
    pub actor: Actor,
    /// Cancellation reason. Required when `to` is `cancelled`.
    pub reason: Option<String>,
    /// Free-form staff notes, stored as-is. Only the shop may send them.
    pub admin_notes: Option<String>,
}

/// Work left to do after a transition has been persisted.
///
/// These never roll back the reservation; failures are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Credit lifetime spend and loyalty points.
    CreditCompletion {
        /// Customer to credit.
        customer_id: CustomerId,
        /// Amount spent.
        amount: u64,
        /// Loyalty points earned.
        points: u64,
    },
    /// Refund the deposit.
    Refund {
        /// Reservation being refunded.
        reservation_id: ReservationId,
        /// Amount to refund.
        amount: u64,
    },
    /// Count a customer-initiated cancellation.
    RecordCancellation {
        /// Customer who cancelled.
        customer_id: CustomerId,
    },
}

/// Loyalty points earned for `amount`: one point per 100 FCFA, rounded down.
#[must_use]
pub const fn loyalty_points_for(amount: u64) -> u64 {
    amount / 100
}

/// Input of the atomic create operation, assembled by the booking service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReservation {
    /// Customer making the booking.
    pub customer_id: CustomerId,
    /// Denormalized customer name.
    pub customer_name: String,
    /// Denormalized customer phone.
    pub customer_phone: String,
    /// Provider serving the reservation.
    pub provider_id: ProviderId,
    /// Denormalized provider name.
    pub provider_name: String,
    /// Booked service.
    pub service_id: ServiceId,
    /// Denormalized service name.
    pub service_name: String,
    /// Calendar day.
    pub date: NaiveDate,
    /// Slot start.
    pub time: NaiveTime,
    /// Slot start plus the service duration.
    pub end_time: NaiveTime,
    /// Speed class.
    pub tier: Tier,
    /// Price computed at creation.
    pub total_price: u64,
    /// Payment method chosen by the customer.
    pub payment_method: PaymentMethod,
    /// Free-form customer request.
    pub special_requests: Option<String>,
}

impl NewReservation {
    /// Materialises the draft once the store has assigned its queue slot.
    #[must_use]
    pub fn into_reservation(
        self,
        id: ReservationId,
        queue: QueueSnapshot,
        created_at: DateTime<Utc>,
    ) -> Reservation {
        Reservation {
            id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            provider_id: self.provider_id,
            provider_name: self.provider_name,
            service_id: self.service_id,
            service_name: self.service_name,
            date: self.date,
            time: self.time,
            end_time: self.end_time,
            tier: self.tier,
            status: ReservationStatus::Pending,
            total_price: self.total_price,
            deposit_paid: 0,
            remaining_amount: self.total_price,
            payment_method: self.payment_method,
            payment_status: PaymentStatus::Pending,
            queue,
            actual_start_at: None,
            actual_end_at: None,
            cancellation_reason: None,
            admin_notes: None,
            special_requests: self.special_requests,
            rating: None,
            review: None,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A booked slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    /// Reservation identifier.
    pub id: ReservationId,
    /// Customer who booked.
    pub customer_id: CustomerId,
    /// Customer name at booking time.
    pub customer_name: String,
    /// Customer phone at booking time.
    pub customer_phone: String,
    /// Serving provider.
    pub provider_id: ProviderId,
    /// Provider name at booking time.
    pub provider_name: String,
    /// Booked service.
    pub service_id: ServiceId,
    /// Service name at booking time.
    pub service_name: String,
    /// Calendar day.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Slot start.
    #[schema(value_type = String, example = "09:30:00")]
    pub time: NaiveTime,
    /// Expected end.
    #[schema(value_type = String, example = "10:00:00")]
    pub end_time: NaiveTime,
    /// Speed class.
    pub tier: Tier,
    /// Current status.
    pub status: ReservationStatus,
    /// Amount charged, fixed at creation.
    pub total_price: u64,
    /// Deposit already paid.
    pub deposit_paid: u64,
    /// Amount still due.
    pub remaining_amount: u64,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Payment settlement state.
    pub payment_status: PaymentStatus,
    /// Queue position and wait, fixed at creation.
    pub queue: QueueSnapshot,
    /// When service started.
    pub actual_start_at: Option<DateTime<Utc>>,
    /// When service ended.
    pub actual_end_at: Option<DateTime<Utc>>,
    /// Why the reservation was cancelled.
    pub cancellation_reason: Option<String>,
    /// Staff notes.
    pub admin_notes: Option<String>,
    /// Customer request.
    pub special_requests: Option<String>,
    /// Rating from 1 to 5, once completed.
    pub rating: Option<u8>,
    /// Free-form review.
    pub review: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// Checks that `change` is allowed from the current status.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidStateTransition`] if the edge does not exist.
    /// - [`BookingError::ActorNotPermitted`] if a customer requests a shop
    ///   transition or acts on someone else's reservation.
    /// - [`BookingError::InvalidRequest`] if a cancellation has no reason or
    ///   a customer sends staff notes.
    pub fn check_transition(&self, change: &StatusChange) -> Result<(), BookingError> {
        let (from, to) = (self.status, change.to);
        if !from.can_transition_to(to) {
            return Err(BookingError::InvalidStateTransition { from, to });
        }
        if let Actor::Customer(customer_id) = &change.actor
            && (to != ReservationStatus::Cancelled || *customer_id != self.customer_id)
        {
            return Err(BookingError::ActorNotPermitted { from, to });
        }
        if matches!(change.actor, Actor::Customer(_)) && change.admin_notes.is_some() {
            return Err(BookingError::InvalidRequest(
                "admin_notes are reserved to the shop".to_string(),
            ));
        }
        if to == ReservationStatus::Cancelled
            && change.reason.as_deref().is_none_or(|r| r.trim().is_empty())
        {
            return Err(BookingError::InvalidRequest(
                "cancellation requires a reason".to_string(),
            ));
        }
        Ok(())
    }

    /// Applies `change` and returns the follow-ups to run once it is stored.
    ///
    /// # Errors
    ///
    /// See [`Self::check_transition`]. On error the reservation is unchanged.
    pub fn apply_transition(
        &mut self,
        change: &StatusChange,
        at: DateTime<Utc>,
    ) -> Result<Vec<FollowUp>, BookingError> {
        self.check_transition(change)?;
        let mut follow_ups = Vec::new();
        match change.to {
            ReservationStatus::InProgress => self.actual_start_at = Some(at),
            ReservationStatus::Completed => {
                self.actual_end_at = Some(at);
                follow_ups.push(FollowUp::CreditCompletion {
                    customer_id: self.customer_id.clone(),
                    amount: self.total_price,
                    points: loyalty_points_for(self.total_price),
                });
            }
            ReservationStatus::Cancelled => {
                self.cancellation_reason = change.reason.clone();
                if self.deposit_paid > 0 {
                    self.payment_status = PaymentStatus::Refunded;
                    follow_ups.push(FollowUp::Refund {
                        reservation_id: self.id,
                        amount: self.deposit_paid,
                    });
                }
                match &change.actor {
                    Actor::Customer(_) => follow_ups.push(FollowUp::RecordCancellation {
                        customer_id: self.customer_id.clone(),
                    }),
                    Actor::Admin if change.admin_notes.is_none() => {
                        self.admin_notes = change
                            .reason
                            .as_deref()
                            .map(|reason| format!("Annulé par l'admin: {reason}"));
                    }
                    Actor::Admin => {}
                }
            }
            ReservationStatus::Pending
            | ReservationStatus::Confirmed
            | ReservationStatus::NoShow => {}
        }
        if let Some(notes) = &change.admin_notes {
            self.admin_notes = Some(notes.clone());
        }
        self.status = change.to;
        self.updated_at = at;
        Ok(follow_ups)
    }

    /// Records a rating on a completed reservation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRating`] if `rating` is outside 1–5 or
    /// the reservation is not completed.
    pub fn rate(
        &mut self,
        rating: u8,
        review: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<(), BookingError> {
        if !(1..=5).contains(&rating) {
            return Err(BookingError::InvalidRating(format!(
                "rating must be between 1 and 5, got {rating}"
            )));
        }
        if self.status != ReservationStatus::Completed {
            return Err(BookingError::InvalidRating(format!(
                "only completed reservations can be rated (status is {})",
                self.status
            )));
        }
        self.rating = Some(rating);
        self.review = review.filter(|r| !r.trim().is_empty());
        self.updated_at = at;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;

    /// Builds a standard `homme_classic` reservation for tests.
    pub(crate) fn sample_reservation(
        date: NaiveDate,
        time: NaiveTime,
        status: ReservationStatus,
    ) -> Reservation {
        let draft = NewReservation {
            customer_id: CustomerId::from("cust-1"),
            customer_name: "Awa Ndiaye".to_string(),
            customer_phone: "+221770000000".to_string(),
            provider_id: ProviderId::from("baye_zale"),
            provider_name: "Baye Zale".to_string(),
            service_id: ServiceId::from("homme_classic"),
            service_name: "Coupe Classique Homme".to_string(),
            date,
            time,
            end_time: time + chrono::TimeDelta::minutes(30),
            tier: Tier::Standard,
            total_price: 10_640,
            payment_method: PaymentMethod::Wave,
            special_requests: None,
        };
        let mut reservation = draft.into_reservation(
            ReservationId::new(),
            QueueSnapshot::assign(1, Tier::Standard),
            Utc::now(),
        );
        reservation.status = status;
        reservation
    }

    fn pending() -> Reservation {
        let (Some(date), Some(time)) = (
            NaiveDate::from_ymd_opt(2026, 10, 20),
            NaiveTime::from_hms_opt(10, 0, 0),
        ) else {
            panic!("valid date/time");
        };
        sample_reservation(date, time, ReservationStatus::Pending)
    }

    fn admin(to: ReservationStatus) -> StatusChange {
        StatusChange {
            to,
            actor: Actor::Admin,
            reason: Some("shop closed".to_string()),
            admin_notes: None,
        }
    }

    #[test]
    fn happy_path_records_timestamps() {
        let mut r = pending();
        let start = Utc::now();
        assert!(r.apply_transition(&admin(ReservationStatus::Confirmed), start).is_ok());
        assert!(r.apply_transition(&admin(ReservationStatus::InProgress), start).is_ok());
        assert_eq!(r.actual_start_at, Some(start));
        let Ok(follow_ups) = r.apply_transition(&admin(ReservationStatus::Completed), start) else {
            panic!("in_progress -> completed is legal");
        };
        assert_eq!(r.status, ReservationStatus::Completed);
        assert_eq!(r.actual_end_at, Some(start));
        assert_eq!(
            follow_ups,
            vec![FollowUp::CreditCompletion {
                customer_id: CustomerId::from("cust-1"),
                amount: 10_640,
                points: 106,
            }]
        );
    }

    #[test]
    fn pending_to_completed_is_rejected() {
        let mut r = pending();
        let result = r.apply_transition(&admin(ReservationStatus::Completed), Utc::now());
        assert!(matches!(
            result,
            Err(BookingError::InvalidStateTransition {
                from: ReservationStatus::Pending,
                to: ReservationStatus::Completed,
            })
        ));
        assert_eq!(r.status, ReservationStatus::Pending);
    }

    #[test]
    fn terminal_states_reject_everything() {
        let all = [
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::InProgress,
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
            ReservationStatus::NoShow,
        ];
        for from in [
            ReservationStatus::Completed,
            ReservationStatus::Cancelled,
            ReservationStatus::NoShow,
        ] {
            assert!(from.is_terminal());
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn no_show_reachable_from_every_active_state() {
        for from in ReservationStatus::ACTIVE {
            assert!(from.can_transition_to(ReservationStatus::NoShow));
        }
        assert!(!ReservationStatus::InProgress.can_transition_to(ReservationStatus::Cancelled));
    }

    #[test]
    fn customer_may_only_cancel_own_reservation() {
        let r = pending();
        let own = StatusChange {
            to: ReservationStatus::Cancelled,
            actor: Actor::Customer(CustomerId::from("cust-1")),
            reason: Some("travel".to_string()),
            admin_notes: None,
        };
        assert!(r.check_transition(&own).is_ok());

        let confirm = StatusChange {
            to: ReservationStatus::Confirmed,
            ..own.clone()
        };
        assert!(matches!(
            r.check_transition(&confirm),
            Err(BookingError::ActorNotPermitted { .. })
        ));

        let stranger = StatusChange {
            actor: Actor::Customer(CustomerId::from("cust-2")),
            ..own
        };
        assert!(matches!(
            r.check_transition(&stranger),
            Err(BookingError::ActorNotPermitted { .. })
        ));
    }

    #[test]
    fn cancellation_needs_reason_and_refunds_deposit() {
        let mut r = pending();
        r.deposit_paid = 3_000;
        let blank = StatusChange {
            to: ReservationStatus::Cancelled,
            actor: Actor::Customer(CustomerId::from("cust-1")),
            reason: Some("  ".to_string()),
            admin_notes: None,
        };
        assert!(matches!(
            r.apply_transition(&blank, Utc::now()),
            Err(BookingError::InvalidRequest(_))
        ));

        let change = StatusChange {
            reason: Some("sick".to_string()),
            ..blank
        };
        let Ok(follow_ups) = r.apply_transition(&change, Utc::now()) else {
            panic!("cancel should succeed");
        };
        assert_eq!(r.cancellation_reason.as_deref(), Some("sick"));
        assert!(follow_ups.contains(&FollowUp::Refund {
            reservation_id: r.id,
            amount: 3_000
        }));
        assert!(follow_ups.contains(&FollowUp::RecordCancellation {
            customer_id: CustomerId::from("cust-1")
        }));
        assert_eq!(r.payment_status, PaymentStatus::Refunded);
        assert_eq!(r.admin_notes, None);
    }

    #[test]
    fn customer_cannot_write_staff_notes() {
        let mut r = pending();
        let change = StatusChange {
            to: ReservationStatus::Cancelled,
            actor: Actor::Customer(CustomerId::from("cust-1")),
            reason: Some("travel".to_string()),
            admin_notes: Some("VIP - waive fees".to_string()),
        };
        assert!(matches!(
            r.apply_transition(&change, Utc::now()),
            Err(BookingError::InvalidRequest(_))
        ));
        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.admin_notes, None);
    }

    #[test]
    fn admin_cancel_leaves_a_note() {
        let mut r = pending();
        assert!(r.apply_transition(&admin(ReservationStatus::Cancelled), Utc::now()).is_ok());
        assert_eq!(r.admin_notes.as_deref(), Some("Annulé par l'admin: shop closed"));
        assert_eq!(r.payment_status, PaymentStatus::Pending);

        let mut noted = pending();
        let change = StatusChange {
            admin_notes: Some("called twice".to_string()),
            ..admin(ReservationStatus::Cancelled)
        };
        assert!(noted.apply_transition(&change, Utc::now()).is_ok());
        assert_eq!(noted.admin_notes.as_deref(), Some("called twice"));
    }

    #[test]
    fn rating_requires_completed_and_range() {
        let mut r = pending();
        assert!(matches!(
            r.rate(5, None, Utc::now()),
            Err(BookingError::InvalidRating(_))
        ));
        r.status = ReservationStatus::Completed;
        assert!(r.rate(0, None, Utc::now()).is_err());
        assert!(r.rate(6, None, Utc::now()).is_err());
        assert!(r.rate(4, Some("great fade".into()), Utc::now()).is_ok());
        assert_eq!(r.rating, Some(4));
        assert_eq!(r.review.as_deref(), Some("great fade"));
    }

    #[test]
    fn status_wire_names_round_trip() {
        assert_eq!(ReservationStatus::parse("in_progress"), Some(ReservationStatus::InProgress));
        assert_eq!(ReservationStatus::NoShow.to_string(), "no_show");
        assert_eq!(PaymentMethod::parse("orange_money"), Some(PaymentMethod::OrangeMoney));
        assert_eq!(PaymentStatus::parse("bogus"), None);
    }

    #[test]
    fn loyalty_points_round_down() {
        assert_eq!(loyalty_points_for(10_640), 106);
        assert_eq!(loyalty_points_for(99), 0);
    }
}
