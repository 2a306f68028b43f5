//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain types that are already wire-shaped (`Reservation`,
//! `QueueStatus`, `DashboardStats`, ...) are returned directly; the types
//! here cover request bodies, query strings and list envelopes.

pub mod common_dto;
pub mod reservation_dto;

pub use common_dto::*;
pub use reservation_dto::*;
