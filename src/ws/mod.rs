//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The endpoint at `/ws` is the live feed of the admin dashboard. Clients
//! subscribe to calendar days and receive the booking events of those days;
//! they can also ask for a day's queue or slot grid.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
