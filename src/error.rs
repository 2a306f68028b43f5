//! Booking error types with HTTP status code mapping.
//!
//! [`BookingError`] is the central error type of the crate. Domain rules,
//! stores and services all return it; each variant maps to a numeric code,
//! an HTTP status and a structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::schedule::ScheduleError;
use crate::domain::{
    CustomerId, ReservationId, ReservationStatus, ServiceId, SlotStatus,
};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2004,
///     "message": "slot 2026-10-20 09:30:00 is not available (occupied)",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`BookingError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                  |
/// |-----------|-----------------|------------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request              |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error    |
/// | 4000–4999 | Authorization   | 403 Forbidden                |
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Rating outside the 1–5 range or on a reservation that cannot be rated.
    #[error("invalid rating: {0}")]
    InvalidRating(String),

    /// Shop schedule configuration is invalid.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),

    /// Reservation with the given ID does not exist.
    #[error("reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// User profile with the given ID does not exist.
    #[error("user not found: {0}")]
    UserNotFound(CustomerId),

    /// Catalog lookup miss.
    #[error("unknown service: {0}")]
    UnknownService(ServiceId),

    /// The requested slot is not bookable; the caller should pick another time.
    #[error("slot {date} {time} is not available ({status:?})")]
    SlotUnavailable {
        /// Requested date.
        date: NaiveDate,
        /// Requested slot start.
        time: NaiveTime,
        /// Why the slot cannot be booked.
        status: SlotStatus,
    },

    /// The status change is not an edge of the reservation state machine.
    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition {
        /// Current status.
        from: ReservationStatus,
        /// Requested status.
        to: ReservationStatus,
    },

    /// Concurrent updates kept invalidating the status change.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The actor may not request this (otherwise legal) transition.
    #[error("transition {from} -> {to} is reserved to the shop")]
    ActorNotPermitted {
        /// Current status.
        from: ReservationStatus,
        /// Requested status.
        to: ReservationStatus,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRating(_) => 1002,
            Self::InvalidSchedule(_) => 1003,
            Self::ReservationNotFound(_) => 2001,
            Self::UserNotFound(_) => 2002,
            Self::UnknownService(_) => 2003,
            Self::SlotUnavailable { .. } => 2004,
            Self::InvalidStateTransition { .. } => 2005,
            Self::Conflict(_) => 2006,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::ActorNotPermitted { .. } => 4001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidRating(_) | Self::InvalidSchedule(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ReservationNotFound(_) | Self::UserNotFound(_) | Self::UnknownService(_) => {
                StatusCode::NOT_FOUND
            }
            Self::SlotUnavailable { .. }
            | Self::InvalidStateTransition { .. }
            | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ActorNotPermitted { .. } => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a hint for the client, when there is one.
    #[must_use]
    pub fn details(&self) -> Option<String> {
        match self {
            Self::SlotUnavailable { .. } => Some("pick another time".to_string()),
            Self::InvalidStateTransition { from, to } | Self::ActorNotPermitted { from, to } => {
                Some(format!("current={from} requested={to}"))
            }
            _ => None,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn slot_conflict_maps_to_409() {
        let (Some(date), Some(time)) = (
            NaiveDate::from_ymd_opt(2026, 10, 20),
            NaiveTime::from_hms_opt(9, 30, 0),
        ) else {
            panic!("valid date/time");
        };
        let err = BookingError::SlotUnavailable {
            date,
            time,
            status: SlotStatus::Occupied,
        };
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2004);
        assert_eq!(err.details().as_deref(), Some("pick another time"));
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = BookingError::InvalidStateTransition {
            from: ReservationStatus::Pending,
            to: ReservationStatus::Completed,
        };
        assert_eq!(err.to_string(), "invalid state transition: pending -> completed");
        assert_eq!(
            err.details().as_deref(),
            Some("current=pending requested=completed")
        );
    }

    #[test]
    fn codes_stay_in_their_ranges() {
        assert_eq!(
            BookingError::UnknownService(ServiceId::from("x")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BookingError::ActorNotPermitted {
                from: ReservationStatus::Pending,
                to: ReservationStatus::Confirmed,
            }
            .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            BookingError::PersistenceError("down".into()).error_code(),
            3001
        );
    }

    #[tokio::test]
    async fn into_response_sets_status() {
        let response = BookingError::InvalidRequest("bad date".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
