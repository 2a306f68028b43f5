//! HTTP round trips against a server on an ephemeral port.

#![allow(clippy::panic)]

mod common;

use reqwest::StatusCode;
use serde_json::{Value, json};

use common::spawn_app;

async fn json_of(response: reqwest::Response) -> Value {
    let Ok(body) = response.json::<Value>().await else {
        panic!("JSON body expected");
    };
    body
}

#[tokio::test]
async fn health_and_schedule() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let Ok(health) = client.get(format!("http://{addr}/health")).send().await else {
        panic!("request failed");
    };
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(json_of(health).await.get("status"), Some(&json!("healthy")));

    let Ok(schedule) = client.get(format!("http://{addr}/config/schedule")).send().await else {
        panic!("request failed");
    };
    let body = json_of(schedule).await;
    assert_eq!(body.get("slots_per_day"), Some(&json!(26)));
    assert_eq!(body.get("provider_id"), Some(&json!("baye_zale")));
}

#[tokio::test]
async fn catalog_and_quote() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();

    let Ok(services) = client.get(format!("http://{addr}/api/v1/services")).send().await else {
        panic!("request failed");
    };
    let body = json_of(services).await;
    let Some(list) = body.as_array() else {
        panic!("array expected");
    };
    assert!(!list.is_empty());

    let Ok(quote) = client
        .get(format!(
            "http://{addr}/api/v1/services/homme_classic/quote?tier=express"
        ))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let body = json_of(quote).await;
    assert_eq!(body.pointer("/price/total"), Some(&json!(12_800)));
    assert_eq!(body.pointer("/price/tax"), Some(&json!(800)));

    let Ok(missing) = client
        .get(format!("http://{addr}/api/v1/services/tatouage"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        json_of(missing).await.pointer("/error/code"),
        Some(&json!(2003))
    );
}

#[tokio::test]
async fn book_then_conflict_then_cancel() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    let Ok(registered) = client
        .put(format!("{base}/customers/khady"))
        .json(&json!({"name": "Khady Sow", "phone": "+221781234567"}))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(registered.status(), StatusCode::OK);

    let body = json!({
        "customer_id": "khady",
        "service_id": "homme_barbe",
        "date": "2026-10-21",
        "time": "18:30",
        "tier": "express",
        "payment_method": "wave"
    });
    let Ok(created) = client
        .post(format!("{base}/reservations"))
        .json(&body)
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(created.status(), StatusCode::CREATED);
    let reservation = json_of(created).await;
    assert_eq!(reservation.get("status"), Some(&json!("pending")));
    assert_eq!(reservation.pointer("/queue/position"), Some(&json!(1)));
    assert_eq!(reservation.get("end_time"), Some(&json!("18:50:00")));
    let Some(id) = reservation.get("id").and_then(Value::as_str) else {
        panic!("id expected");
    };

    let Ok(taken) = client
        .post(format!("{base}/reservations"))
        .json(&body)
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(taken.status(), StatusCode::CONFLICT);
    let error = json_of(taken).await;
    assert_eq!(error.pointer("/error/code"), Some(&json!(2004)));

    let Ok(slots) = client
        .get(format!("{base}/slots?date=2026-10-21"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let grid = json_of(slots).await;
    assert_eq!(grid.get("available"), Some(&json!(25)));

    let Ok(forbidden) = client
        .patch(format!("{base}/reservations/{id}/status"))
        .json(&json!({
            "actor": {"role": "customer", "customer_id": "khady"},
            "status": "confirmed"
        }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

    let Ok(cancelled) = client
        .patch(format!("{base}/reservations/{id}/status"))
        .json(&json!({
            "actor": {"role": "customer", "customer_id": "khady"},
            "status": "cancelled",
            "reason": "empêchement"
        }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(cancelled.status(), StatusCode::OK);
    assert_eq!(
        json_of(cancelled).await.get("status"),
        Some(&json!("cancelled"))
    );

    let Ok(history) = client
        .get(format!("{base}/customers/khady/reservations?status=cancelled"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let list = json_of(history).await;
    assert_eq!(list.as_array().map(Vec::len), Some(1));

    let Ok(unfiltered) = client
        .get(format!("{base}/reservations?date=2026-10-21&status="))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(unfiltered.status(), StatusCode::OK);
    assert_eq!(json_of(unfiltered).await.get("count"), Some(&json!(1)));
}

#[tokio::test]
async fn validation_errors_map_to_400() {
    let (addr, _) = spawn_app().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    let Ok(bad_status) = client
        .get(format!("{base}/reservations?date=2026-10-21&status=lost"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(bad_status.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_of(bad_status).await.pointer("/error/code"),
        Some(&json!(1001))
    );

    let Ok(closed) = client
        .post(format!("{base}/reservations"))
        .json(&json!({
            "customer_id": "awa",
            "service_id": "homme_classic",
            "date": "2026-10-21",
            "time": "12:45",
            "payment_method": "cash"
        }))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(closed.status(), StatusCode::CONFLICT);

    let Ok(unknown) = client
        .get(format!("{base}/reservations/{}", uuid::Uuid::new_v4()))
        .send()
        .await
    else {
        panic!("request failed");
    };
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn queue_and_dashboard_endpoints() {
    let (addr, state) = spawn_app().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    for (customer, time) in [("awa", common::hm(11, 0)), ("moussa", common::hm(11, 30))] {
        let booked = state
            .booking_service
            .create_reservation(common::booking(
                customer,
                common::day(20),
                time,
                bayezale_booking::domain::Tier::Standard,
            ))
            .await;
        assert!(booked.is_ok());
    }

    let Ok(queue) = client
        .get(format!("{base}/queue?date=2026-10-20"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let body = json_of(queue).await;
    assert_eq!(body.pointer("/standard/waiting"), Some(&json!(2)));
    assert_eq!(
        body.pointer("/standard/estimated_wait_minutes"),
        Some(&json!(70))
    );

    let Ok(dashboard) = client
        .get(format!("{base}/dashboard?date=2026-10-20"))
        .send()
        .await
    else {
        panic!("request failed");
    };
    let stats = json_of(dashboard).await;
    assert_eq!(stats.get("total_reservations"), Some(&json!(2)));
}
