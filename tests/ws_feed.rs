//! WebSocket live feed: date subscriptions and event delivery.

#![allow(clippy::panic)]

mod common;

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use bayezale_booking::domain::Tier;

use common::{booking, day, hm, spawn_app};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn send_command(ws: &mut Client, id: &str, payload: Value) {
    let msg = json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    if ws.send(Message::text(msg.to_string())).await.is_err() {
        panic!("send failed");
    }
}

async fn next_json(ws: &mut Client) -> Value {
    loop {
        let Ok(Some(Ok(msg))) = tokio::time::timeout(Duration::from_secs(2), ws.next()).await
        else {
            panic!("no message within 2s");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("JSON frame expected");
            };
            return value;
        }
    }
}

#[tokio::test]
async fn subscribed_day_receives_events() {
    let (addr, state) = spawn_app().await;
    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };

    send_command(
        &mut ws,
        "sub-1",
        json!({"command": "subscribe", "dates": ["2026-10-21", "someday"]}),
    )
    .await;
    let reply = next_json(&mut ws).await;
    assert_eq!(reply.get("type"), Some(&json!("response")));
    assert_eq!(reply.get("id"), Some(&json!("sub-1")));
    assert_eq!(reply.pointer("/payload/count"), Some(&json!(1)));
    assert_eq!(reply.pointer("/payload/rejected/0"), Some(&json!("someday")));

    // a booking on another day is filtered out
    let other = state
        .booking_service
        .create_reservation(booking("awa", day(22), hm(9, 0), Tier::Standard))
        .await;
    assert!(other.is_ok());
    let followed = state
        .booking_service
        .create_reservation(booking("moussa", day(21), hm(9, 0), Tier::Express))
        .await;
    let Ok(followed) = followed else {
        panic!("slot is free");
    };

    let event = next_json(&mut ws).await;
    assert_eq!(event.get("type"), Some(&json!("event")));
    assert_eq!(
        event.pointer("/payload/event_type"),
        Some(&json!("reservation_created"))
    );
    assert_eq!(
        event.pointer("/payload/reservation_id"),
        Some(&json!(followed.id.to_string()))
    );
    assert_eq!(event.pointer("/payload/date"), Some(&json!("2026-10-21")));
}

#[tokio::test]
async fn wildcard_and_queries() {
    let (addr, state) = spawn_app().await;
    let Ok((mut ws, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connect failed");
    };

    send_command(&mut ws, "all", json!({"command": "subscribe", "dates": ["*"]})).await;
    let reply = next_json(&mut ws).await;
    assert_eq!(reply.pointer("/payload/wildcard"), Some(&json!(true)));

    send_command(
        &mut ws,
        "q",
        json!({"command": "queue_status", "date": "2026-10-20"}),
    )
    .await;
    let queue = next_json(&mut ws).await;
    assert_eq!(queue.get("id"), Some(&json!("q")));
    assert_eq!(queue.pointer("/payload/standard/waiting"), Some(&json!(0)));

    send_command(&mut ws, "bad", json!({"command": "reschedule"})).await;
    let error = next_json(&mut ws).await;
    assert_eq!(error.get("type"), Some(&json!("error")));
    assert_eq!(error.pointer("/payload/code"), Some(&json!(404)));

    let created = state
        .booking_service
        .create_reservation(booking("fatou", day(25), hm(13, 0), Tier::Standard))
        .await;
    assert!(created.is_ok());
    let event = next_json(&mut ws).await;
    assert_eq!(event.pointer("/payload/date"), Some(&json!("2026-10-25")));
}
