//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use bayezale_booking::app_state::AppState;
use bayezale_booking::build_app;
use bayezale_booking::domain::{
    CustomerId, EventBus, FixedClock, PaymentMethod, ServiceId, Tier, UserProfile,
};
use bayezale_booking::persistence::{
    InMemoryCatalogStore, InMemoryReservationStore, InMemoryUserStore,
};
use bayezale_booking::service::{BookingRequest, BookingService, CustomerDirectory};

/// Customers registered in every fixture.
pub const CUSTOMERS: [&str; 3] = ["awa", "moussa", "fatou"];

pub fn day(d: u32) -> NaiveDate {
    let Some(date) = NaiveDate::from_ymd_opt(2026, 10, d) else {
        panic!("valid date");
    };
    date
}

pub fn hm(h: u32, m: u32) -> NaiveTime {
    let Some(time) = NaiveTime::from_hms_opt(h, m, 0) else {
        panic!("valid time");
    };
    time
}

/// Shop clock: 2026-10-20 at 10:00.
pub fn now() -> NaiveDateTime {
    day(20).and_time(hm(10, 0))
}

/// In-memory service with the seeded catalog and [`CUSTOMERS`].
pub fn service() -> BookingService {
    let users = InMemoryUserStore::with_users(CUSTOMERS.iter().map(|id| {
        UserProfile::new(CustomerId::from(*id), id.to_uppercase(), "+221770000000", "")
    }));
    let directory = CustomerDirectory::new(Arc::new(users), Duration::from_secs(300));
    BookingService::new(
        Arc::new(InMemoryReservationStore::new()),
        Arc::new(InMemoryCatalogStore::default()),
        Arc::new(directory),
        EventBus::new(256),
    )
    .with_clock(Arc::new(FixedClock::new(now())))
}

pub fn booking(customer: &str, date: NaiveDate, time: NaiveTime, tier: Tier) -> BookingRequest {
    BookingRequest {
        customer_id: CustomerId::from(customer),
        service_id: ServiceId::from("homme_classic"),
        date,
        time,
        tier,
        payment_method: PaymentMethod::Cash,
        special_requests: None,
        provider_id: None,
    }
}

/// Serves the full application on an ephemeral port.
pub async fn spawn_app() -> (SocketAddr, AppState) {
    let state = AppState::new(service());
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("local addr");
    };
    let app = build_app(state.clone());
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            panic!("server stopped: {e}");
        }
    });
    (addr, state)
}
