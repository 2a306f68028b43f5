//! Shared DTO types and query-string helpers.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;

use crate::domain::{ProviderId, ReservationStatus};
use crate::error::BookingError;

/// `?date=` query parameter.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct DateQuery {
    /// Calendar day (`YYYY-MM-DD`).
    #[param(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
}

/// `?date=&provider_id=` query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct SlotsQuery {
    /// Calendar day (`YYYY-MM-DD`).
    #[param(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Provider; the shop's default provider when absent.
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl SlotsQuery {
    /// Provider as a typed id.
    #[must_use]
    pub fn provider(&self) -> Option<ProviderId> {
        self.provider_id.as_deref().map(ProviderId::from)
    }
}

/// Parses a comma-separated status filter such as `pending,confirmed`.
///
/// # Errors
///
/// Returns [`BookingError::InvalidRequest`] naming the first unknown status.
pub fn parse_status_filter(raw: &str) -> Result<Vec<ReservationStatus>, BookingError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            ReservationStatus::parse(s)
                .ok_or_else(|| BookingError::InvalidRequest(format!("unknown status: {s}")))
        })
        .collect()
}

/// Parses an optional status filter. A filter naming no status, such as
/// `?status=` or `?status=,`, leaves the listing unfiltered.
///
/// # Errors
///
/// See [`parse_status_filter`].
pub fn parse_optional_status_filter(
    raw: Option<&str>,
) -> Result<Option<Vec<ReservationStatus>>, BookingError> {
    Ok(raw
        .map(parse_status_filter)
        .transpose()?
        .filter(|statuses| !statuses.is_empty()))
}

/// Accepts slot times as `HH:MM` or `HH:MM:SS`.
///
/// # Errors
///
/// Fails deserialization when the string is neither.
pub fn deserialize_slot_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
        .map_err(|_| serde::de::Error::custom(format!("invalid slot time: {raw}")))
}
