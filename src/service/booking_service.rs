//! Booking service: orchestrates reservations and emits events.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use super::customer_directory::CustomerDirectory;
use super::refunds::{LoggingRefundGateway, RefundGateway};
use crate::config::BookingConfig;
use crate::domain::{
    Actor, AvailabilityFilter, BookingEvent, Clock, CustomerId, DashboardStats, EventBus,
    FollowUp, NewReservation, PaymentMethod, PriceBreakdown, PricingPolicy, ProviderId,
    QueueStatus, Reservation, ReservationId, ReservationStatus, ServiceCatalogEntry, ServiceId,
    ShopSchedule, SlotAvailability, SlotStatus, StatusChange, SystemClock, Tier, UserProfile,
};
use crate::error::BookingError;
use crate::persistence::{
    CatalogStore, InMemoryCatalogStore, ReservationStore, StatusWrite, UserStore,
};

/// Status writes attempted before giving up with [`BookingError::Conflict`].
pub const MAX_STATUS_ATTEMPTS: usize = 3;

/// Default and maximum page size of a customer's history.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;
/// Upper bound on a customer's history page.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// A customer's booking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    /// Customer making the booking.
    pub customer_id: CustomerId,
    /// Requested service.
    pub service_id: ServiceId,
    /// Requested day.
    pub date: NaiveDate,
    /// Requested slot start.
    pub time: NaiveTime,
    /// Speed class.
    pub tier: Tier,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Free-form request.
    pub special_requests: Option<String>,
    /// Provider; the shop's default provider when absent.
    pub provider_id: Option<ProviderId>,
}

/// Orchestration layer for all booking operations.
///
/// Owns handles to the stores, the [`CustomerDirectory`], the refund
/// gateway and the [`EventBus`]. Every mutation follows the same pattern:
/// validate against the domain rules, write through the store, run the
/// post-commit follow-ups, emit an event.
#[derive(Debug)]
pub struct BookingService {
    reservations: Arc<dyn ReservationStore>,
    catalog: Arc<dyn CatalogStore>,
    customers: Arc<CustomerDirectory>,
    refunds: Arc<dyn RefundGateway>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
    schedule: ShopSchedule,
    pricing: PricingPolicy,
    provider_id: ProviderId,
    provider_name: String,
}

impl BookingService {
    /// Creates a service with the default schedule, pricing and provider,
    /// a UTC system clock and a logging refund gateway.
    #[must_use]
    pub fn new(
        reservations: Arc<dyn ReservationStore>,
        catalog: Arc<dyn CatalogStore>,
        customers: Arc<CustomerDirectory>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            reservations,
            catalog,
            customers,
            refunds: Arc::new(LoggingRefundGateway),
            event_bus,
            clock: Arc::new(SystemClock::default()),
            schedule: ShopSchedule::default(),
            pricing: PricingPolicy::default(),
            provider_id: ProviderId::from("baye_zale"),
            provider_name: "Baye Zale".to_string(),
        }
    }

    /// Wires a service from configuration over the given stores.
    ///
    /// The catalog is the seeded in-memory one in every mode.
    #[must_use]
    pub fn from_config(
        config: &BookingConfig,
        reservations: Arc<dyn ReservationStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let customers =
            CustomerDirectory::new(users, Duration::from_secs(config.user_cache_ttl_secs));
        Self::new(
            reservations,
            Arc::new(InMemoryCatalogStore::default()),
            Arc::new(customers),
            EventBus::new(config.event_bus_capacity),
        )
        .with_clock(Arc::new(SystemClock::from_offset_minutes(
            config.shop_utc_offset_minutes,
        )))
        .with_schedule(config.schedule.clone())
        .with_provider(
            config.default_provider_id.clone(),
            config.default_provider_name.clone(),
        )
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the opening hours.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ShopSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Replaces the fee and tax policy.
    #[must_use]
    pub const fn with_pricing(mut self, pricing: PricingPolicy) -> Self {
        self.pricing = pricing;
        self
    }

    /// Replaces the shop's provider.
    #[must_use]
    pub fn with_provider(mut self, id: ProviderId, name: impl Into<String>) -> Self {
        self.provider_id = id;
        self.provider_name = name.into();
        self
    }

    /// Replaces the refund gateway.
    #[must_use]
    pub fn with_refund_gateway(mut self, refunds: Arc<dyn RefundGateway>) -> Self {
        self.refunds = refunds;
        self
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub const fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the opening hours.
    #[must_use]
    pub const fn schedule(&self) -> &ShopSchedule {
        &self.schedule
    }

    /// The shop's provider.
    #[must_use]
    pub const fn provider_id(&self) -> &ProviderId {
        &self.provider_id
    }

    /// Current shop-local time.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    fn resolve_provider(&self, requested: Option<&ProviderId>) -> Result<(), BookingError> {
        match requested {
            Some(id) if *id != self.provider_id => Err(BookingError::InvalidRequest(format!(
                "unknown provider: {id}"
            ))),
            _ => Ok(()),
        }
    }

    /// Classifies every slot of `date` for the provider.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an unknown provider or a
    /// store error.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        provider_id: Option<&ProviderId>,
    ) -> Result<Vec<SlotAvailability>, BookingError> {
        self.resolve_provider(provider_id)?;
        let active = self
            .reservations
            .list_reservations(date, Some(&self.provider_id), Some(&ReservationStatus::ACTIVE))
            .await?;
        Ok(AvailabilityFilter::new(&self.schedule, date, self.clock.now(), &active).classify_day())
    }

    /// Lists the catalog.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_services(&self) -> Result<Vec<ServiceCatalogEntry>, BookingError> {
        self.catalog.list_services().await
    }

    /// Looks up one catalog entry.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownService`] on a miss.
    pub async fn get_service(&self, id: &ServiceId) -> Result<ServiceCatalogEntry, BookingError> {
        self.catalog.get_service_catalog_entry(id).await
    }

    /// Prices a service at a tier without booking it.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UnknownService`] on a miss.
    pub async fn quote(&self, id: &ServiceId, tier: Tier) -> Result<PriceBreakdown, BookingError> {
        let entry = self.catalog.get_service_catalog_entry(id).await?;
        Ok(self.pricing.quote(&entry, tier))
    }

    /// Books a slot.
    ///
    /// The grid and clock checks happen here; the occupancy check and
    /// queue assignment happen atomically in the store.
    ///
    /// # Errors
    ///
    /// - [`BookingError::InvalidRequest`] for a past date or unknown provider.
    /// - [`BookingError::UnknownService`] / [`BookingError::UserNotFound`].
    /// - [`BookingError::SlotUnavailable`] if the slot is closed, past or taken.
    pub async fn create_reservation(
        &self,
        request: BookingRequest,
    ) -> Result<Reservation, BookingError> {
        let now = self.clock.now();
        if request.date < now.date() {
            return Err(BookingError::InvalidRequest(format!(
                "cannot book {} in the past",
                request.date
            )));
        }
        self.resolve_provider(request.provider_id.as_ref())?;

        let entry = self
            .catalog
            .get_service_catalog_entry(&request.service_id)
            .await?;
        let customer = self.customers.get(&request.customer_id).await?;

        let slot =
            AvailabilityFilter::new(&self.schedule, request.date, now, &[]).classify(request.time);
        if matches!(slot.status, SlotStatus::Closed | SlotStatus::Past) {
            return Err(BookingError::SlotUnavailable {
                date: request.date,
                time: request.time,
                status: slot.status,
            });
        }

        let price = self.pricing.quote(&entry, request.tier);
        let (end_time, wrapped) = request
            .time
            .overflowing_add_signed(TimeDelta::minutes(i64::from(entry.duration_minutes)));
        if wrapped != 0 {
            return Err(BookingError::InvalidRequest(
                "service would end after midnight".to_string(),
            ));
        }

        let draft = NewReservation {
            customer_id: customer.id,
            customer_name: customer.name,
            customer_phone: customer.phone,
            provider_id: self.provider_id.clone(),
            provider_name: self.provider_name.clone(),
            service_id: entry.id,
            service_name: entry.name,
            date: request.date,
            time: request.time,
            end_time,
            tier: request.tier,
            total_price: price.total,
            payment_method: request.payment_method,
            special_requests: request.special_requests,
        };
        let reservation = self
            .reservations
            .create_reservation(draft)
            .await
            .inspect_err(|e| {
                if matches!(e, BookingError::SlotUnavailable { .. }) {
                    tracing::info!(date = %request.date, time = %request.time, "slot already taken");
                }
            })?;

        if let Err(e) = self.customers.record_booking(&reservation.customer_id).await {
            tracing::warn!(error = %e, customer_id = %reservation.customer_id, "failed to count booking");
        }

        let _ = self.event_bus.publish(BookingEvent::ReservationCreated {
            reservation_id: reservation.id,
            date: reservation.date,
            time: reservation.time,
            tier: reservation.tier,
            queue_position: reservation.queue.position,
            timestamp: reservation.created_at,
        });

        tracing::info!(
            reservation_id = %reservation.id,
            date = %reservation.date,
            time = %reservation.time,
            tier = reservation.tier.as_str(),
            queue_position = reservation.queue.position,
            total_price = reservation.total_price,
            "reservation created"
        );
        Ok(reservation)
    }

    /// Moves a reservation to a new status.
    ///
    /// The write is a compare-and-swap on the current status. When another
    /// writer wins, the change is re-validated against the fresh record and
    /// retried, up to [`MAX_STATUS_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// - [`BookingError::ReservationNotFound`].
    /// - [`BookingError::InvalidStateTransition`] / [`BookingError::ActorNotPermitted`] /
    ///   [`BookingError::InvalidRequest`] from the state machine.
    /// - [`BookingError::Conflict`] if every attempt lost a race.
    pub async fn update_status(
        &self,
        id: ReservationId,
        change: StatusChange,
    ) -> Result<Reservation, BookingError> {
        let mut current = self.reservations.get_reservation(id).await?;
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let from = current.status;
            let mut next = current.clone();
            let follow_ups = next.apply_transition(&change, Utc::now())?;
            match self.reservations.update_reservation_status(from, &next).await? {
                StatusWrite::Applied(stored) => {
                    self.run_follow_ups(follow_ups).await;
                    let _ = self.event_bus.publish(BookingEvent::ReservationStatusChanged {
                        reservation_id: stored.id,
                        date: stored.date,
                        time: stored.time,
                        from,
                        to: stored.status,
                        timestamp: stored.updated_at,
                    });
                    tracing::info!(reservation_id = %stored.id, %from, to = %stored.status, "reservation status changed");
                    return Ok(stored);
                }
                StatusWrite::Stale(fresh) => {
                    tracing::debug!(reservation_id = %id, attempt, current = %fresh.status, "status changed concurrently");
                    current = fresh;
                }
            }
        }
        Err(BookingError::Conflict(format!(
            "reservation {id} kept changing; status update abandoned"
        )))
    }

    /// Cancels a reservation on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// See [`Self::update_status`].
    pub async fn cancel_reservation(
        &self,
        id: ReservationId,
        actor: Actor,
        reason: impl Into<String>,
    ) -> Result<Reservation, BookingError> {
        self.update_status(
            id,
            StatusChange {
                to: ReservationStatus::Cancelled,
                actor,
                reason: Some(reason.into()),
                admin_notes: None,
            },
        )
        .await
    }

    async fn run_follow_ups(&self, follow_ups: Vec<FollowUp>) {
        for follow_up in follow_ups {
            match follow_up {
                FollowUp::CreditCompletion {
                    customer_id,
                    amount,
                    points,
                } => {
                    if let Err(e) = self
                        .customers
                        .credit_completion(&customer_id, amount, points)
                        .await
                    {
                        tracing::warn!(error = %e, %customer_id, "failed to credit completion");
                    }
                }
                FollowUp::Refund {
                    reservation_id,
                    amount,
                } => {
                    let gateway = Arc::clone(&self.refunds);
                    tokio::spawn(async move {
                        if let Err(e) = gateway.refund(reservation_id, amount).await {
                            tracing::warn!(error = %e, %reservation_id, amount, "refund failed");
                        }
                    });
                }
                FollowUp::RecordCancellation { customer_id } => {
                    if let Err(e) = self.customers.record_cancellation(&customer_id).await {
                        tracing::warn!(error = %e, %customer_id, "failed to count cancellation");
                    }
                }
            }
        }
    }

    /// Rates a completed reservation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRating`] or
    /// [`BookingError::ReservationNotFound`].
    pub async fn rate_reservation(
        &self,
        id: ReservationId,
        rating: u8,
        review: Option<String>,
    ) -> Result<Reservation, BookingError> {
        let rated = self
            .reservations
            .record_rating(id, rating, review, Utc::now())
            .await?;
        let _ = self.event_bus.publish(BookingEvent::ReservationRated {
            reservation_id: rated.id,
            date: rated.date,
            rating,
            timestamp: rated.updated_at,
        });
        tracing::info!(reservation_id = %rated.id, rating, "reservation rated");
        Ok(rated)
    }

    /// Loads one reservation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::ReservationNotFound`].
    pub async fn get_reservation(&self, id: ReservationId) -> Result<Reservation, BookingError> {
        self.reservations.get_reservation(id).await
    }

    /// Lists the reservations of `date`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRequest`] for an unknown provider or a
    /// store error.
    pub async fn list_reservations(
        &self,
        date: NaiveDate,
        provider_id: Option<&ProviderId>,
        statuses: Option<&[ReservationStatus]>,
    ) -> Result<Vec<Reservation>, BookingError> {
        self.resolve_provider(provider_id)?;
        self.reservations
            .list_reservations(date, Some(&self.provider_id), statuses)
            .await
    }

    /// A customer's reservations, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_HISTORY_LIMIT`] and is capped at
    /// [`MAX_HISTORY_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UserNotFound`] or a store error.
    pub async fn customer_history(
        &self,
        customer_id: &CustomerId,
        statuses: Option<&[ReservationStatus]>,
        limit: Option<usize>,
    ) -> Result<Vec<Reservation>, BookingError> {
        self.customers.get(customer_id).await?;
        let limit = limit
            .unwrap_or(DEFAULT_HISTORY_LIMIT)
            .clamp(1, MAX_HISTORY_LIMIT);
        self.reservations
            .list_customer_reservations(customer_id, statuses, limit)
            .await
    }

    /// Loads a customer profile.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UserNotFound`].
    pub async fn get_customer(&self, id: &CustomerId) -> Result<UserProfile, BookingError> {
        self.customers.get(id).await
    }

    /// Registers or updates a customer profile.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn upsert_customer(&self, profile: UserProfile) -> Result<UserProfile, BookingError> {
        self.customers.upsert(profile).await
    }

    /// Live queue overview of `date`.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn queue_status(&self, date: NaiveDate) -> Result<QueueStatus, BookingError> {
        let active = self
            .reservations
            .list_reservations(date, Some(&self.provider_id), Some(&ReservationStatus::ACTIVE))
            .await?;
        Ok(QueueStatus::summarize(date, self.clock.now(), &active))
    }

    /// Daily figures of `date` for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn dashboard(&self, date: NaiveDate) -> Result<DashboardStats, BookingError> {
        let all = self
            .reservations
            .list_reservations(date, Some(&self.provider_id), None)
            .await?;
        Ok(DashboardStats::compute(date, &all))
    }
}
