//! PostgreSQL implementation of the stores.
//!
//! Reservation creation runs in one transaction that first takes a
//! transaction-scoped advisory lock keyed on the booked date. Creates for
//! the same date are therefore serialized, which keeps both the occupancy
//! check and the queue count consistent. The partial unique index
//! `reservations_active_slot` backs the occupancy rule at the schema level.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use super::models::{RESERVATION_COLUMNS, ReservationRow, UserRow, to_db_amount};
use super::{ReservationStore, StatusWrite, UserStore, creation_stamp};
use crate::config::BookingConfig;
use crate::domain::{
    CustomerId, NewReservation, ProviderId, QueueSnapshot, Reservation, ReservationId,
    ReservationStatus, SlotStatus, UserProfile,
};
use crate::error::BookingError;

/// SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";

fn db_err(e: sqlx::Error) -> BookingError {
    BookingError::PersistenceError(e.to_string())
}

fn status_names(statuses: Option<&[ReservationStatus]>) -> Option<Vec<String>> {
    statuses.map(|s| s.iter().map(|st| st.as_str().to_string()).collect())
}

fn active_status_names() -> Vec<String> {
    ReservationStatus::ACTIVE
        .iter()
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Advisory lock key for a booking date.
fn date_lock_key(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Opens a connection pool and applies the embedded migrations.
///
/// # Errors
///
/// Returns [`BookingError::PersistenceError`] if the database cannot be
/// reached or a migration fails.
pub async fn connect(config: &BookingConfig) -> Result<PgPool, BookingError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(config.database_min_connections)
        .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
        .connect(&config.database_url)
        .await
        .map_err(db_err)?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| BookingError::PersistenceError(e.to_string()))?;
    Ok(pool)
}

/// PostgreSQL-backed reservation store.
#[derive(Debug, Clone)]
pub struct PostgresReservationStore {
    pool: PgPool,
}

impl PostgresReservationStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one(&self, id: ReservationId) -> Result<Option<Reservation>, BookingError> {
        let sql = format!("SELECT {RESERVATION_COLUMNS} FROM reservations WHERE id = $1");
        sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .map(Reservation::try_from)
            .transpose()
    }
}

#[async_trait]
impl ReservationStore for PostgresReservationStore {
    async fn list_reservations(
        &self,
        date: NaiveDate,
        provider_id: Option<&ProviderId>,
        statuses: Option<&[ReservationStatus]>,
    ) -> Result<Vec<Reservation>, BookingError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE date = $1 AND ($2::text IS NULL OR provider_id = $2) \
             AND ($3::text[] IS NULL OR status = ANY($3)) \
             ORDER BY created_at ASC, id ASC"
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(date)
            .bind(provider_id.map(ProviderId::as_str))
            .bind(status_names(statuses))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, BookingError> {
        self.fetch_one(id)
            .await?
            .ok_or(BookingError::ReservationNotFound(id))
    }

    async fn create_reservation(
        &self,
        new: NewReservation,
    ) -> Result<Reservation, BookingError> {
        let (date, time) = (new.date, new.time);
        let unavailable = move || BookingError::SlotUnavailable {
            date,
            time,
            status: SlotStatus::Occupied,
        };
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(date_lock_key(new.date))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let holder = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM reservations \
             WHERE date = $1 AND time = $2 AND provider_id = $3 AND status = ANY($4) LIMIT 1",
        )
        .bind(new.date)
        .bind(new.time)
        .bind(new.provider_id.as_str())
        .bind(active_status_names())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err)?;
        if holder.is_some() {
            return Err(unavailable());
        }

        // A failed count must not abort the surrounding transaction.
        sqlx::query("SAVEPOINT queue_count")
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        let counted = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM reservations WHERE date = $1 AND tier = $2 AND status = ANY($3)",
        )
        .bind(new.date)
        .bind(new.tier.as_str())
        .bind(active_status_names())
        .fetch_one(&mut *tx)
        .await;
        let queue = match counted {
            Ok(ahead) => QueueSnapshot::after(usize::try_from(ahead).unwrap_or(0), new.tier),
            Err(e) => {
                tracing::warn!(error = %e, date = %new.date, "queue count failed, using position 1");
                sqlx::query("ROLLBACK TO SAVEPOINT queue_count")
                    .execute(&mut *tx)
                    .await
                    .map_err(db_err)?;
                QueueSnapshot::assign(1, new.tier)
            }
        };

        let latest = sqlx::query_scalar::<_, Option<DateTime<Utc>>>(
            "SELECT MAX(created_at) FROM reservations WHERE date = $1",
        )
        .bind(new.date)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err)?;

        let reservation =
            new.into_reservation(ReservationId::new(), queue, creation_stamp(latest));
        let sql = format!(
            "INSERT INTO reservations ({RESERVATION_COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, \
              $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29) \
             RETURNING {RESERVATION_COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(*reservation.id.as_uuid())
            .bind(reservation.customer_id.as_str())
            .bind(&reservation.customer_name)
            .bind(&reservation.customer_phone)
            .bind(reservation.provider_id.as_str())
            .bind(&reservation.provider_name)
            .bind(reservation.service_id.as_str())
            .bind(&reservation.service_name)
            .bind(reservation.date)
            .bind(reservation.time)
            .bind(reservation.end_time)
            .bind(reservation.tier.as_str())
            .bind(reservation.status.as_str())
            .bind(to_db_amount(reservation.total_price)?)
            .bind(to_db_amount(reservation.deposit_paid)?)
            .bind(to_db_amount(reservation.remaining_amount)?)
            .bind(reservation.payment_method.as_str())
            .bind(reservation.payment_status.as_str())
            .bind(i32::try_from(reservation.queue.position).unwrap_or(i32::MAX))
            .bind(to_db_amount(reservation.queue.estimated_wait_minutes)?)
            .bind(reservation.actual_start_at)
            .bind(reservation.actual_end_at)
            .bind(&reservation.cancellation_reason)
            .bind(&reservation.admin_notes)
            .bind(&reservation.special_requests)
            .bind(reservation.rating.map(i16::from))
            .bind(&reservation.review)
            .bind(reservation.created_at)
            .bind(reservation.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                let unique = e
                    .as_database_error()
                    .and_then(|d| d.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION);
                if unique { unavailable() } else { db_err(e) }
            })?;

        tx.commit().await.map_err(db_err)?;
        Reservation::try_from(inserted)
    }

    async fn update_reservation_status(
        &self,
        expected: ReservationStatus,
        updated: &Reservation,
    ) -> Result<StatusWrite, BookingError> {
        let sql = format!(
            "UPDATE reservations SET status = $2, actual_start_at = $3, actual_end_at = $4, \
             cancellation_reason = $5, admin_notes = $6, updated_at = $7, payment_status = $9 \
             WHERE id = $1 AND status = $8 RETURNING {RESERVATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(*updated.id.as_uuid())
            .bind(updated.status.as_str())
            .bind(updated.actual_start_at)
            .bind(updated.actual_end_at)
            .bind(&updated.cancellation_reason)
            .bind(&updated.admin_notes)
            .bind(updated.updated_at)
            .bind(expected.as_str())
            .bind(updated.payment_status.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;
        match row {
            Some(row) => Ok(StatusWrite::Applied(Reservation::try_from(row)?)),
            None => {
                let fresh = self.get_reservation(updated.id).await?;
                Ok(StatusWrite::Stale(fresh))
            }
        }
    }

    async fn record_rating(
        &self,
        id: ReservationId,
        rating: u8,
        review: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Reservation, BookingError> {
        let mut current = self.get_reservation(id).await?;
        current.rate(rating, review, at)?;
        let sql = format!(
            "UPDATE reservations SET rating = $2, review = $3, updated_at = $4 \
             WHERE id = $1 AND status = 'completed' RETURNING {RESERVATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(*id.as_uuid())
            .bind(current.rating.map(i16::from))
            .bind(&current.review)
            .bind(current.updated_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| BookingError::Conflict(format!("reservation {id} changed while rating")))?;
        Reservation::try_from(row)
    }

    async fn list_customer_reservations(
        &self,
        customer_id: &CustomerId,
        statuses: Option<&[ReservationStatus]>,
        limit: usize,
    ) -> Result<Vec<Reservation>, BookingError> {
        let sql = format!(
            "SELECT {RESERVATION_COLUMNS} FROM reservations \
             WHERE customer_id = $1 AND ($2::text[] IS NULL OR status = ANY($2)) \
             ORDER BY created_at DESC, id DESC LIMIT $3"
        );
        let rows = sqlx::query_as::<_, ReservationRow>(&sql)
            .bind(customer_id.as_str())
            .bind(status_names(statuses))
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.into_iter().map(Reservation::try_from).collect()
    }
}

/// PostgreSQL-backed user store.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn touch(
        &self,
        id: &CustomerId,
        query: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<(), BookingError> {
        let result = query.execute(&self.pool).await.map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(BookingError::UserNotFound(id.clone()));
        }
        Ok(())
    }
}

const USER_COLUMNS: &str = "id, name, phone, email, total_appointments, total_spent, \
     loyalty_points, cancellations, created_at";

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn get_user_profile(&self, id: &CustomerId) -> Result<UserProfile, BookingError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| BookingError::UserNotFound(id.clone()))
            .and_then(UserProfile::try_from)
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, BookingError> {
        let sql = format!(
            "INSERT INTO users (id, name, phone, email, created_at) VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, phone = EXCLUDED.phone, \
             email = EXCLUDED.email RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(profile.id.as_str())
            .bind(&profile.name)
            .bind(&profile.phone)
            .bind(&profile.email)
            .bind(profile.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;
        UserProfile::try_from(row)
    }

    async fn record_booking(&self, id: &CustomerId) -> Result<(), BookingError> {
        self.touch(
            id,
            sqlx::query("UPDATE users SET total_appointments = total_appointments + 1 WHERE id = $1")
                .bind(id.as_str()),
        )
        .await
    }

    async fn credit_completion(
        &self,
        id: &CustomerId,
        amount: u64,
        points: u64,
    ) -> Result<(), BookingError> {
        self.touch(
            id,
            sqlx::query(
                "UPDATE users SET total_spent = total_spent + $2, \
                 loyalty_points = loyalty_points + $3 WHERE id = $1",
            )
            .bind(id.as_str())
            .bind(to_db_amount(amount)?)
            .bind(to_db_amount(points)?),
        )
        .await
    }

    async fn record_cancellation(&self, id: &CustomerId) -> Result<(), BookingError> {
        self.touch(
            id,
            sqlx::query("UPDATE users SET cancellations = cancellations + 1 WHERE id = $1")
                .bind(id.as_str()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_keys_differ_per_date() {
        let a = NaiveDate::from_ymd_opt(2026, 10, 20);
        let b = NaiveDate::from_ymd_opt(2026, 10, 21);
        assert_ne!(a.map(date_lock_key), b.map(date_lock_key));
    }

    #[test]
    fn status_filter_uses_wire_names() {
        let names = status_names(Some(&[ReservationStatus::InProgress, ReservationStatus::NoShow]));
        assert_eq!(
            names,
            Some(vec!["in_progress".to_string(), "no_show".to_string()])
        );
        assert_eq!(status_names(None), None);
        assert_eq!(active_status_names().len(), 3);
    }
}
