//! Database rows for reservations and users.
//!
//! Rows mirror the SQL column types (`BIGINT` as `i64`, enums as `TEXT`)
//! and convert into domain types with `TryFrom`, so a corrupted row
//! surfaces as a [`BookingError::PersistenceError`] instead of a panic.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::{
    CustomerId, PaymentMethod, PaymentStatus, ProviderId, QueueSnapshot, Reservation,
    ReservationId, ReservationStatus, ServiceId, Tier, UserProfile,
};
use crate::error::BookingError;

/// Column list shared by every reservation query.
pub const RESERVATION_COLUMNS: &str = "id, customer_id, customer_name, customer_phone, \
     provider_id, provider_name, service_id, service_name, date, time, end_time, tier, status, \
     total_price, deposit_paid, remaining_amount, payment_method, payment_status, \
     queue_position, estimated_wait_minutes, actual_start_at, actual_end_at, \
     cancellation_reason, admin_notes, special_requests, rating, review, created_at, updated_at";

/// A row of the `reservations` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReservationRow {
    /// Primary key.
    pub id: Uuid,
    /// Customer identifier.
    pub customer_id: String,
    /// Customer name.
    pub customer_name: String,
    /// Customer phone.
    pub customer_phone: String,
    /// Provider identifier.
    pub provider_id: String,
    /// Provider name.
    pub provider_name: String,
    /// Service identifier.
    pub service_id: String,
    /// Service name.
    pub service_name: String,
    /// Booked date.
    pub date: NaiveDate,
    /// Slot start.
    pub time: NaiveTime,
    /// Expected end.
    pub end_time: NaiveTime,
    /// `standard` or `express`.
    pub tier: String,
    /// Status wire name.
    pub status: String,
    /// Total price.
    pub total_price: i64,
    /// Deposit paid.
    pub deposit_paid: i64,
    /// Amount still due.
    pub remaining_amount: i64,
    /// Payment method wire name.
    pub payment_method: String,
    /// Payment status wire name.
    pub payment_status: String,
    /// Queue position at creation.
    pub queue_position: i32,
    /// Wait estimate at creation.
    pub estimated_wait_minutes: i64,
    /// Service start.
    pub actual_start_at: Option<DateTime<Utc>>,
    /// Service end.
    pub actual_end_at: Option<DateTime<Utc>>,
    /// Cancellation reason.
    pub cancellation_reason: Option<String>,
    /// Staff notes.
    pub admin_notes: Option<String>,
    /// Customer request.
    pub special_requests: Option<String>,
    /// Rating 1–5.
    pub rating: Option<i16>,
    /// Review text.
    pub review: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

fn corrupt(column: &str, value: impl std::fmt::Display) -> BookingError {
    BookingError::PersistenceError(format!("invalid {column} in row: {value}"))
}

/// Converts an amount to its `BIGINT` column value.
///
/// # Errors
///
/// Returns [`BookingError::PersistenceError`] if it does not fit.
pub fn to_db_amount(amount: u64) -> Result<i64, BookingError> {
    i64::try_from(amount).map_err(|_| corrupt("amount", amount))
}

fn from_db_amount(column: &str, value: i64) -> Result<u64, BookingError> {
    u64::try_from(value).map_err(|_| corrupt(column, value))
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = BookingError;

    fn try_from(row: ReservationRow) -> Result<Self, Self::Error> {
        let tier = Tier::parse(&row.tier).ok_or_else(|| corrupt("tier", &row.tier))?;
        let status =
            ReservationStatus::parse(&row.status).ok_or_else(|| corrupt("status", &row.status))?;
        let payment_method = PaymentMethod::parse(&row.payment_method)
            .ok_or_else(|| corrupt("payment_method", &row.payment_method))?;
        let payment_status = PaymentStatus::parse(&row.payment_status)
            .ok_or_else(|| corrupt("payment_status", &row.payment_status))?;
        let rating = row
            .rating
            .map(|r| u8::try_from(r).map_err(|_| corrupt("rating", r)))
            .transpose()?;
        Ok(Self {
            id: ReservationId::from_uuid(row.id),
            customer_id: CustomerId::new(row.customer_id),
            customer_name: row.customer_name,
            customer_phone: row.customer_phone,
            provider_id: ProviderId::new(row.provider_id),
            provider_name: row.provider_name,
            service_id: ServiceId::new(row.service_id),
            service_name: row.service_name,
            date: row.date,
            time: row.time,
            end_time: row.end_time,
            tier,
            status,
            total_price: from_db_amount("total_price", row.total_price)?,
            deposit_paid: from_db_amount("deposit_paid", row.deposit_paid)?,
            remaining_amount: from_db_amount("remaining_amount", row.remaining_amount)?,
            payment_method,
            payment_status,
            queue: QueueSnapshot {
                position: u32::try_from(row.queue_position)
                    .map_err(|_| corrupt("queue_position", row.queue_position))?,
                estimated_wait_minutes: from_db_amount(
                    "estimated_wait_minutes",
                    row.estimated_wait_minutes,
                )?,
            },
            actual_start_at: row.actual_start_at,
            actual_end_at: row.actual_end_at,
            cancellation_reason: row.cancellation_reason,
            admin_notes: row.admin_notes,
            special_requests: row.special_requests,
            rating,
            review: row.review,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Customer identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: String,
    /// Reservations created.
    pub total_appointments: i32,
    /// Lifetime spend.
    pub total_spent: i64,
    /// Loyalty points.
    pub loyalty_points: i64,
    /// Customer cancellations.
    pub cancellations: i32,
    /// Account creation.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserProfile {
    type Error = BookingError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CustomerId::new(row.id),
            name: row.name,
            phone: row.phone,
            email: row.email,
            total_appointments: u32::try_from(row.total_appointments)
                .map_err(|_| corrupt("total_appointments", row.total_appointments))?,
            total_spent: from_db_amount("total_spent", row.total_spent)?,
            loyalty_points: from_db_amount("loyalty_points", row.loyalty_points)?,
            cancellations: u32::try_from(row.cancellations)
                .map_err(|_| corrupt("cancellations", row.cancellations))?,
            created_at: row.created_at,
        })
    }
}
