//! Customer profile lookups with an owned TTL cache.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::{CustomerId, UserProfile};
use crate::error::BookingError;
use crate::persistence::UserStore;

/// Front of the [`UserStore`] used by the booking service.
///
/// Profiles are cached for `ttl`. Every write through the directory
/// invalidates the cached copy of the customer it touches, and a read that
/// overlapped an invalidation is returned without being cached.
#[derive(Debug)]
pub struct CustomerDirectory {
    store: Arc<dyn UserStore>,
    ttl: Duration,
    cache: RwLock<HashMap<CustomerId, (Instant, UserProfile)>>,
    // Bumped under the cache write lock on every invalidation.
    generation: AtomicU64,
}

impl CustomerDirectory {
    /// Creates a directory over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Returns the profile, from cache when still fresh.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::UserNotFound`] or a store error.
    pub async fn get(&self, id: &CustomerId) -> Result<UserProfile, BookingError> {
        if let Some((fetched_at, profile)) = self.cache.read().await.get(id)
            && fetched_at.elapsed() < self.ttl
        {
            return Ok(profile.clone());
        }
        let generation = self.generation.load(Ordering::Acquire);
        let profile = self.store.get_user_profile(id).await?;
        let mut cache = self.cache.write().await;
        if self.generation.load(Ordering::Acquire) == generation {
            cache.insert(id.clone(), (Instant::now(), profile.clone()));
        } else {
            tracing::debug!(customer_id = %id, "profile changed during read, not caching");
        }
        Ok(profile)
    }

    /// Creates or updates a profile.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn upsert(&self, profile: UserProfile) -> Result<UserProfile, BookingError> {
        let id = profile.id.clone();
        let stored = self.store.upsert_user(profile).await?;
        self.invalidate(&id).await;
        Ok(stored)
    }

    /// Counts a new reservation for the customer.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn record_booking(&self, id: &CustomerId) -> Result<(), BookingError> {
        let result = self.store.record_booking(id).await;
        self.invalidate(id).await;
        result
    }

    /// Credits spend and loyalty points for a completed reservation.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn credit_completion(
        &self,
        id: &CustomerId,
        amount: u64,
        points: u64,
    ) -> Result<(), BookingError> {
        let result = self.store.credit_completion(id, amount, points).await;
        self.invalidate(id).await;
        result
    }

    /// Counts a customer-initiated cancellation.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn record_cancellation(&self, id: &CustomerId) -> Result<(), BookingError> {
        let result = self.store.record_cancellation(id).await;
        self.invalidate(id).await;
        result
    }

    async fn invalidate(&self, id: &CustomerId) {
        let mut cache = self.cache.write().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        cache.remove(id);
    }
}
