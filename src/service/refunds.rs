//! Deposit refunds.
//!
//! Payment processing lives outside this service. A cancelled reservation
//! with a deposit hands the refund to a [`RefundGateway`] in a background
//! task; the outcome is only logged.

use async_trait::async_trait;

use crate::domain::ReservationId;
use crate::error::BookingError;

/// Destination of refund requests.
#[async_trait]
pub trait RefundGateway: Send + Sync + std::fmt::Debug {
    /// Requests a refund of `amount` for `reservation_id`.
    async fn refund(&self, reservation_id: ReservationId, amount: u64)
    -> Result<(), BookingError>;
}

/// Gateway that records refund requests in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingRefundGateway;

#[async_trait]
impl RefundGateway for LoggingRefundGateway {
    async fn refund(
        &self,
        reservation_id: ReservationId,
        amount: u64,
    ) -> Result<(), BookingError> {
        tracing::info!(%reservation_id, amount, "refund requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logging_gateway_accepts_refunds() {
        let gateway = LoggingRefundGateway;
        assert!(gateway.refund(ReservationId::new(), 3_000).await.is_ok());
    }
}
