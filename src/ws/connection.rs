//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding booking events of the
//! subscribed days.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType, parse_dates};
use super::subscription::SubscriptionManager;
use crate::domain::BookingEvent;
use crate::service::BookingService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<BookingEvent>,
    booking_service: Arc<BookingService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(&text, &mut subs, &booking_service).await;
                        if let Some(json) = reply
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(booking_event) => {
                        if !subs.matches(booking_event.date()) {
                            continue;
                        }
                        let payload = serde_json::to_value(&booking_event).unwrap_or_default();
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            payload,
                        );
                        let Ok(json) = serde_json::to_string(&msg) else {
                            continue;
                        };
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    booking_service: &BookingService,
) -> Option<String> {
    let reply = match serde_json::from_str::<WsMessage>(text) {
        Err(_) => WsMessage::error("", 400, "malformed JSON"),
        Ok(msg) => match serde_json::from_value::<WsCommand>(msg.payload) {
            Err(_) => WsMessage::error(msg.id, 404, "unknown command"),
            Ok(command) => dispatch(msg.id, command, subs, booking_service).await,
        },
    };
    serde_json::to_string(&reply).ok()
}

async fn dispatch(
    id: String,
    command: WsCommand,
    subs: &mut SubscriptionManager,
    booking_service: &BookingService,
) -> WsMessage {
    match command {
        WsCommand::Subscribe { dates } => {
            let (dates, wildcard, rejected) = parse_dates(&dates);
            subs.subscribe(&dates, wildcard);
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": dates,
                    "rejected": rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::Unsubscribe { dates } => {
            let (dates, wildcard, rejected) = parse_dates(&dates);
            subs.unsubscribe(&dates, wildcard);
            WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": dates,
                    "rejected": rejected,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )
        }
        WsCommand::QueueStatus { date } => match booking_service.queue_status(date).await {
            Ok(queue) => WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::to_value(queue).unwrap_or_default(),
            ),
            Err(e) => WsMessage::error(id, e.status_code().as_u16(), e.to_string()),
        },
        WsCommand::Slots { date } => match booking_service.available_slots(date, None).await {
            Ok(slots) => WsMessage::new(
                id,
                WsMessageType::Response,
                serde_json::json!({ "date": date, "slots": slots }),
            ),
            Err(e) => WsMessage::error(id, e.status_code().as_u16(), e.to_string()),
        },
    }
}
