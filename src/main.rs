//! bayezale-booking server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use bayezale_booking::app_state::AppState;
use bayezale_booking::build_app;
use bayezale_booking::config::{BookingConfig, LogFormat};
use bayezale_booking::persistence::{
    self, InMemoryReservationStore, InMemoryUserStore, PostgresReservationStore,
    PostgresUserStore, ReservationStore, UserStore,
};
use bayezale_booking::service::BookingService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = BookingConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, "starting bayezale-booking");

    // Build persistence layer
    let (reservations, users) = build_stores(&config).await?;

    // Build service layer
    let booking_service = BookingService::from_config(&config, reservations, users);

    // Build application state and router
    let app = build_app(AppState::new(booking_service));

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await.context("serving HTTP")?;

    Ok(())
}

async fn build_stores(
    config: &BookingConfig,
) -> anyhow::Result<(Arc<dyn ReservationStore>, Arc<dyn UserStore>)> {
    if !config.persistence_enabled {
        tracing::info!("persistence disabled, using in-memory stores");
        return Ok((
            Arc::new(InMemoryReservationStore::new()),
            Arc::new(InMemoryUserStore::new()),
        ));
    }
    let pool = persistence::postgres::connect(config)
        .await
        .context("connecting to PostgreSQL")?;
    tracing::info!(
        max_connections = config.database_max_connections,
        "persistence enabled, migrations applied"
    );
    Ok((
        Arc::new(PostgresReservationStore::new(pool.clone())),
        Arc::new(PostgresUserStore::new(pool)),
    ))
}
