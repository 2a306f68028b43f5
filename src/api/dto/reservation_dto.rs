//! Request and response DTOs for reservation endpoints.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::deserialize_slot_time;
use crate::domain::{
    Actor, CustomerId, PaymentMethod, PriceBreakdown, ProviderId, Reservation, ReservationStatus,
    ServiceId, SlotAvailability, StatusChange, Tier,
};
use crate::service::BookingRequest;

/// `POST /reservations` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    /// Registered customer making the booking.
    pub customer_id: String,
    /// Catalog service id (e.g. `"homme_classic"`).
    pub service_id: String,
    /// Calendar day.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Slot start, `HH:MM`.
    #[schema(value_type = String, example = "09:30")]
    #[serde(deserialize_with = "deserialize_slot_time")]
    pub time: NaiveTime,
    /// Speed class. Defaults to `standard`.
    #[serde(default = "default_tier")]
    pub tier: Tier,
    /// Payment method.
    pub payment_method: PaymentMethod,
    /// Free-form request.
    #[serde(default)]
    pub special_requests: Option<String>,
    /// Provider; the shop's default provider when absent.
    #[serde(default)]
    pub provider_id: Option<String>,
}

const fn default_tier() -> Tier {
    Tier::Standard
}

impl From<CreateReservationRequest> for BookingRequest {
    fn from(req: CreateReservationRequest) -> Self {
        Self {
            customer_id: CustomerId::from(req.customer_id),
            service_id: ServiceId::from(req.service_id),
            date: req.date,
            time: req.time,
            tier: req.tier,
            payment_method: req.payment_method,
            special_requests: req.special_requests.filter(|s| !s.trim().is_empty()),
            provider_id: req.provider_id.map(ProviderId::from),
        }
    }
}

/// Who is asking for a status change.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum ActorDto {
    /// The customer who owns the reservation.
    Customer {
        /// Customer id.
        customer_id: String,
    },
    /// Shop staff.
    Admin,
}

impl From<ActorDto> for Actor {
    fn from(dto: ActorDto) -> Self {
        match dto {
            ActorDto::Customer { customer_id } => Self::Customer(CustomerId::from(customer_id)),
            ActorDto::Admin => Self::Admin,
        }
    }
}

/// `PATCH /reservations/{id}/status` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// Requesting actor.
    pub actor: ActorDto,
    /// Target status.
    pub status: ReservationStatus,
    /// Cancellation reason; required when cancelling.
    #[serde(default)]
    pub reason: Option<String>,
    /// Staff notes stored on the reservation.
    #[serde(default)]
    pub admin_notes: Option<String>,
}

impl From<UpdateStatusRequest> for StatusChange {
    fn from(req: UpdateStatusRequest) -> Self {
        Self {
            to: req.status,
            actor: req.actor.into(),
            reason: req.reason,
            admin_notes: req.admin_notes,
        }
    }
}

/// `POST /reservations/{id}/rating` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RatingRequest {
    /// Stars, 1 to 5.
    pub rating: u8,
    /// Optional review text.
    #[serde(default)]
    pub review: Option<String>,
}

/// `GET /reservations` query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ReservationListQuery {
    /// Calendar day (`YYYY-MM-DD`).
    #[param(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Provider; the shop's default provider when absent.
    #[serde(default)]
    pub provider_id: Option<String>,
    /// Comma-separated statuses, e.g. `pending,confirmed`.
    #[serde(default)]
    pub status: Option<String>,
}

/// `GET /customers/{id}/reservations` query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Comma-separated statuses.
    #[serde(default)]
    pub status: Option<String>,
    /// Page size (default 20, max 100).
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /services/{id}/quote` query parameters.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct QuoteQuery {
    /// Speed class. Defaults to `standard`.
    #[serde(default = "default_tier")]
    #[param(value_type = String, example = "express")]
    pub tier: Tier,
}

/// Price of one service at one tier.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteResponse {
    /// Catalog service id.
    pub service_id: ServiceId,
    /// Priced tier.
    pub tier: Tier,
    /// Itemised amounts in FCFA.
    pub price: PriceBreakdown,
}

/// Reservations of one day.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReservationListResponse {
    /// Day listed.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Number of reservations returned.
    pub count: usize,
    /// Reservations, oldest first.
    pub data: Vec<Reservation>,
}

/// Classified slot grid of one day.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotsResponse {
    /// Day classified.
    #[schema(value_type = String, example = "2026-10-20")]
    pub date: NaiveDate,
    /// Provider the grid belongs to.
    pub provider_id: ProviderId,
    /// Number of `available` slots.
    pub available: usize,
    /// Every slot of the day, in time order.
    pub slots: Vec<SlotAvailability>,
}

/// `PUT /customers/{id}` request body.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpsertCustomerRequest {
    /// Display name.
    pub name: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
}
