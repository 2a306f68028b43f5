//! In-memory stores guarded by [`tokio::sync::RwLock`].
//!
//! The reservation store keeps a single `RwLock<Vec<Reservation>>` in
//! creation order. Creating a reservation takes the write guard once and
//! holds it across the occupancy check, the queue count and the push, which
//! is what makes the create atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use super::{CatalogStore, ReservationStore, StatusWrite, UserStore, creation_stamp};
use crate::domain::{
    CustomerId, NewReservation, ProviderId, QueueSnapshot, Reservation, ReservationId,
    ReservationStatus, ServiceCatalogEntry, ServiceId, SlotStatus, UserProfile, seeded_catalog,
};
use crate::error::BookingError;

fn status_matches(status: ReservationStatus, filter: Option<&[ReservationStatus]>) -> bool {
    filter.is_none_or(|statuses| statuses.contains(&status))
}

/// Reservation store backed by a vector in creation order.
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    reservations: RwLock<Vec<Reservation>>,
}

impl InMemoryReservationStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reservations, whatever their status.
    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    /// Returns `true` if nothing has been booked yet.
    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn list_reservations(
        &self,
        date: NaiveDate,
        provider_id: Option<&ProviderId>,
        statuses: Option<&[ReservationStatus]>,
    ) -> Result<Vec<Reservation>, BookingError> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .iter()
            .filter(|r| r.date == date)
            .filter(|r| provider_id.is_none_or(|p| r.provider_id == *p))
            .filter(|r| status_matches(r.status, statuses))
            .cloned()
            .collect())
    }

    async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, BookingError> {
        let reservations = self.reservations.read().await;
        reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(BookingError::ReservationNotFound(id))
    }

    async fn create_reservation(
        &self,
        new: NewReservation,
    ) -> Result<Reservation, BookingError> {
        let mut reservations = self.reservations.write().await;

        if let Some(holder) = reservations.iter().find(|r| {
            r.status.is_active()
                && r.date == new.date
                && r.time == new.time
                && r.provider_id == new.provider_id
        }) {
            tracing::debug!(holder = %holder.id, date = %new.date, time = %new.time, "slot already held");
            return Err(BookingError::SlotUnavailable {
                date: new.date,
                time: new.time,
                status: SlotStatus::Occupied,
            });
        }

        let ahead = reservations
            .iter()
            .filter(|r| r.status.is_active() && r.date == new.date && r.tier == new.tier)
            .count();
        let queue = QueueSnapshot::after(ahead, new.tier);
        let latest = reservations
            .iter()
            .filter(|r| r.date == new.date)
            .map(|r| r.created_at)
            .max();

        let reservation =
            new.into_reservation(ReservationId::new(), queue, creation_stamp(latest));
        reservations.push(reservation.clone());
        Ok(reservation)
    }

    async fn update_reservation_status(
        &self,
        expected: ReservationStatus,
        updated: &Reservation,
    ) -> Result<StatusWrite, BookingError> {
        let mut reservations = self.reservations.write().await;
        let stored = reservations
            .iter_mut()
            .find(|r| r.id == updated.id)
            .ok_or(BookingError::ReservationNotFound(updated.id))?;
        if stored.status != expected {
            return Ok(StatusWrite::Stale(stored.clone()));
        }
        *stored = updated.clone();
        Ok(StatusWrite::Applied(updated.clone()))
    }

    async fn record_rating(
        &self,
        id: ReservationId,
        rating: u8,
        review: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<Reservation, BookingError> {
        let mut reservations = self.reservations.write().await;
        let stored = reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(BookingError::ReservationNotFound(id))?;
        stored.rate(rating, review, at)?;
        Ok(stored.clone())
    }

    async fn list_customer_reservations(
        &self,
        customer_id: &CustomerId,
        statuses: Option<&[ReservationStatus]>,
        limit: usize,
    ) -> Result<Vec<Reservation>, BookingError> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .iter()
            .rev()
            .filter(|r| r.customer_id == *customer_id && status_matches(r.status, statuses))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// User store backed by a hash map.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<CustomerId, UserProfile>>,
}

impl InMemoryUserStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `profiles`.
    #[must_use]
    pub fn with_users(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            users: RwLock::new(users),
        }
    }

    async fn update<F>(&self, id: &CustomerId, apply: F) -> Result<(), BookingError>
    where
        F: FnOnce(&mut UserProfile) + Send,
    {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| BookingError::UserNotFound(id.clone()))?;
        apply(user);
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user_profile(&self, id: &CustomerId) -> Result<UserProfile, BookingError> {
        self.users
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| BookingError::UserNotFound(id.clone()))
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, BookingError> {
        let mut users = self.users.write().await;
        let stored = users
            .entry(profile.id.clone())
            .and_modify(|existing| {
                existing.name.clone_from(&profile.name);
                existing.phone.clone_from(&profile.phone);
                existing.email.clone_from(&profile.email);
            })
            .or_insert(profile);
        Ok(stored.clone())
    }

    async fn record_booking(&self, id: &CustomerId) -> Result<(), BookingError> {
        self.update(id, |u| {
            u.total_appointments = u.total_appointments.saturating_add(1);
        })
        .await
    }

    async fn credit_completion(
        &self,
        id: &CustomerId,
        amount: u64,
        points: u64,
    ) -> Result<(), BookingError> {
        self.update(id, |u| {
            u.total_spent = u.total_spent.saturating_add(amount);
            u.loyalty_points = u.loyalty_points.saturating_add(points);
        })
        .await
    }

    async fn record_cancellation(&self, id: &CustomerId) -> Result<(), BookingError> {
        self.update(id, |u| u.cancellations = u.cancellations.saturating_add(1))
            .await
    }
}

/// Immutable catalog loaded at startup.
#[derive(Debug, Clone)]
pub struct InMemoryCatalogStore {
    entries: Vec<ServiceCatalogEntry>,
}

impl InMemoryCatalogStore {
    /// Creates a catalog from `entries`.
    #[must_use]
    pub fn new(entries: Vec<ServiceCatalogEntry>) -> Self {
        Self { entries }
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new(seeded_catalog())
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn list_services(&self) -> Result<Vec<ServiceCatalogEntry>, BookingError> {
        Ok(self.entries.clone())
    }

    async fn get_service_catalog_entry(
        &self,
        id: &ServiceId,
    ) -> Result<ServiceCatalogEntry, BookingError> {
        self.entries
            .iter()
            .find(|e| e.id == *id)
            .cloned()
            .ok_or_else(|| BookingError::UnknownService(id.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use chrono::{NaiveTime, TimeDelta};

    use super::*;
    use crate::domain::{PaymentMethod, Tier};

    fn draft(time: (u32, u32), tier: Tier) -> NewReservation {
        let (Some(date), Some(time)) = (
            NaiveDate::from_ymd_opt(2026, 10, 20),
            NaiveTime::from_hms_opt(time.0, time.1, 0),
        ) else {
            panic!("valid date/time");
        };
        NewReservation {
            customer_id: CustomerId::from("cust-1"),
            customer_name: "Awa".to_string(),
            customer_phone: "+221".to_string(),
            provider_id: ProviderId::from("baye_zale"),
            provider_name: "Baye Zale".to_string(),
            service_id: ServiceId::from("homme_classic"),
            service_name: "Coupe Classique Homme".to_string(),
            date,
            time,
            end_time: time + TimeDelta::minutes(30),
            tier,
            total_price: 10_640,
            payment_method: PaymentMethod::Cash,
            special_requests: None,
        }
    }

    #[tokio::test]
    async fn second_create_on_same_slot_is_rejected() {
        let store = InMemoryReservationStore::new();
        assert!(store.create_reservation(draft((9, 0), Tier::Standard)).await.is_ok());
        let second = store
            .create_reservation(draft((9, 0), Tier::Express))
            .await;
        assert!(matches!(
            second,
            Err(BookingError::SlotUnavailable {
                status: SlotStatus::Occupied,
                ..
            })
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn queue_positions_increase_per_tier() {
        let store = InMemoryReservationStore::new();
        let mut positions = Vec::new();
        for (slot, tier) in [
            ((9, 0), Tier::Standard),
            ((9, 30), Tier::Express),
            ((10, 0), Tier::Standard),
            ((10, 30), Tier::Standard),
        ] {
            let Ok(r) = store.create_reservation(draft(slot, tier)).await else {
                panic!("free slot");
            };
            positions.push((r.tier, r.queue.position, r.queue.estimated_wait_minutes));
        }
        assert_eq!(
            positions,
            vec![
                (Tier::Standard, 1, 0),
                (Tier::Express, 1, 0),
                (Tier::Standard, 2, 35),
                (Tier::Standard, 3, 70),
            ]
        );
    }

    #[tokio::test]
    async fn listing_order_matches_queue_order_under_contention() {
        let store = Arc::new(InMemoryReservationStore::new());
        let handles: Vec<_> = (0..12u32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create_reservation(draft((8 + i / 2, (i % 2) * 30), Tier::Standard))
                        .await
                })
            })
            .collect();
        for handle in handles {
            assert!(matches!(handle.await, Ok(Ok(_))));
        }

        let Some(date) = NaiveDate::from_ymd_opt(2026, 10, 20) else {
            panic!("valid date");
        };
        let Ok(listed) = store.list_reservations(date, None, None).await else {
            panic!("list should succeed");
        };
        let positions: Vec<_> = listed.iter().map(|r| r.queue.position).collect();
        assert_eq!(positions, (1..=12).collect::<Vec<_>>());
        assert!(listed.windows(2).all(|pair| match pair {
            [a, b] => a.created_at < b.created_at,
            _ => false,
        }));
    }

    #[tokio::test]
    async fn concurrent_creates_admit_one_winner() {
        let store = Arc::new(InMemoryReservationStore::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create_reservation(draft((11, 0), Tier::Standard))
                        .await
                })
            })
            .collect();
        let mut wins = 0;
        for handle in handles {
            if let Ok(Ok(_)) = handle.await {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }

    #[tokio::test]
    async fn stale_status_write_returns_fresh_record() {
        let store = InMemoryReservationStore::new();
        let Ok(created) = store.create_reservation(draft((9, 0), Tier::Standard)).await
        else {
            panic!("free slot");
        };
        let mut confirmed = created.clone();
        confirmed.status = ReservationStatus::Confirmed;
        let first = store
            .update_reservation_status(ReservationStatus::Pending, &confirmed)
            .await;
        assert!(matches!(first, Ok(StatusWrite::Applied(_))));

        let mut cancelled = created;
        cancelled.status = ReservationStatus::Cancelled;
        let second = store
            .update_reservation_status(ReservationStatus::Pending, &cancelled)
            .await;
        let Ok(StatusWrite::Stale(fresh)) = second else {
            panic!("expected a stale write");
        };
        assert_eq!(fresh.status, ReservationStatus::Confirmed);
    }

    #[tokio::test]
    async fn cancelled_reservation_frees_the_slot() {
        let store = InMemoryReservationStore::new();
        let Ok(created) = store.create_reservation(draft((9, 0), Tier::Standard)).await
        else {
            panic!("free slot");
        };
        let mut cancelled = created;
        cancelled.status = ReservationStatus::Cancelled;
        let _ = store
            .update_reservation_status(ReservationStatus::Pending, &cancelled)
            .await;
        let again = store.create_reservation(draft((9, 0), Tier::Standard)).await;
        let Ok(again) = again else {
            panic!("slot should be free again");
        };
        assert_eq!(again.queue.position, 1);
    }

    #[tokio::test]
    async fn customer_history_is_newest_first() {
        let store = InMemoryReservationStore::new();
        for slot in [(9, 0), (9, 30), (10, 0)] {
            let _ = store.create_reservation(draft(slot, Tier::Standard)).await;
        }
        let Ok(history) = store
            .list_customer_reservations(&CustomerId::from("cust-1"), None, 2)
            .await
        else {
            panic!("history");
        };
        let times: Vec<_> = history.iter().map(|r| r.time).collect();
        assert_eq!(times.len(), 2);
        assert!(times.first() > times.last());
    }

    #[tokio::test]
    async fn user_totals_accumulate() {
        let id = CustomerId::from("c1");
        let store = InMemoryUserStore::with_users([UserProfile::new(id.clone(), "Awa", "+221", "a@b.sn")]);
        assert!(store.record_booking(&id).await.is_ok());
        assert!(store.credit_completion(&id, 10_640, 106).await.is_ok());
        assert!(store.record_cancellation(&id).await.is_ok());
        let Ok(user) = store.get_user_profile(&id).await else {
            panic!("user exists");
        };
        assert_eq!(user.total_appointments, 1);
        assert_eq!(user.total_spent, 10_640);
        assert_eq!(user.loyalty_points, 106);
        assert_eq!(user.cancellations, 1);
        assert!(matches!(
            store.record_booking(&CustomerId::from("nobody")).await,
            Err(BookingError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn catalog_miss_is_unknown_service() {
        let catalog = InMemoryCatalogStore::default();
        assert!(catalog.get_service_catalog_entry(&ServiceId::from("femme_coupe")).await.is_ok());
        assert!(matches!(
            catalog.get_service_catalog_entry(&ServiceId::from("tatouage")).await,
            Err(BookingError::UnknownService(_))
        ));
    }
}
