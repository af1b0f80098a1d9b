//! Integration tests for dnote-svc API endpoints
//!
//! Tests cover:
//! - Intake endpoints and status mapping
//! - Live set listing, removal, clearing
//! - Summary and snapshot
//! - Delivery note, text rendering, email compose
//! - SSE initial snapshot
//! - Health endpoint

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Local, TimeZone};
use futures::StreamExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

use dnote_common::config::TomlConfig;
use dnote_common::time::{Clock, ManualClock};
use dnote_common::tokens::SequentialTokenSource;
use dnote_svc::{build_router, AppState};

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

impl TestApp {
    fn new() -> Self {
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).single().unwrap(),
        ));
        let state = AppState::with_sources(
            &TomlConfig::default(),
            clock.clone(),
            Arc::new(SequentialTokenSource::new("gen")),
        );
        Self {
            router: build_router(state),
            clock,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Should read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Should parse JSON")
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(test_request("GET", uri, None)).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(test_request("POST", uri, Some(body))).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(test_request("DELETE", uri, None)).await
    }

    async fn scan(&self, payload: Value) -> (StatusCode, Value) {
        self.post("/api/scan", json!({ "text": payload.to_string() })).await
    }

    async fn manual_payload(&self, payload: Value) -> (StatusCode, Value) {
        self.post("/api/manual/payload", json!({ "text": payload.to_string() }))
            .await
    }
}

fn test_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn item(identity: &str, stock_code: &str, mass: f64) -> Value {
    json!({ "uuid": identity, "supplier": "Acme", "stockCode": stock_code, "mass": mass })
}

fn note_request() -> Value {
    json!({
        "fromLocation": "Plant A",
        "toLocation": "Depot B",
        "dispatcher": "Sam",
        "receiver": "Lee"
    })
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new();
    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "dnote-svc");
    assert!(body["version"].is_string());
    assert_eq!(body["items"], 0);
    assert_eq!(body["subscribers"], 0);

    app.manual_payload(item("a", "X1", 1.0)).await;
    let (_, body) = app.get("/health").await;
    assert_eq!(body["items"], 1);
}

// =============================================================================
// Intake
// =============================================================================

#[tokio::test]
async fn test_scan_accepted_with_defaults() {
    let app = TestApp::new();
    let (status, body) = app
        .scan(json!({ "supplier": "A", "stockCode": "X1", "mass": 10 }))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["uuid"], "gen-1");
    assert_eq!(body["date"], "15/03/2024");
    assert_eq!(body["type"], "Raw");
    assert_eq!(body["stockCode"], "X1");
}

#[tokio::test]
async fn test_malformed_payload_is_400() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/manual/payload", json!({ "text": "not json" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MALFORMED_PAYLOAD");
}

#[tokio::test]
async fn test_missing_fields_is_422_with_field_list() {
    let app = TestApp::new();
    let (status, body) = app.manual_payload(json!({ "mass": 5 })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "MISSING_REQUIRED_FIELD");
    assert_eq!(body["error"]["fields"], json!(["supplier", "stockCode"]));
}

#[tokio::test]
async fn test_duplicate_is_409() {
    let app = TestApp::new();
    let (status, _) = app.manual_payload(item("U1", "X1", 1.0)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app.manual_payload(item("U1", "X2", 2.0)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "DUPLICATE_SCAN");

    let (_, items) = app.get("/api/items").await;
    assert_eq!(items["count"], 1);
}

#[tokio::test]
async fn test_throttled_scan_is_429() {
    let app = TestApp::new();
    app.scan(item("a", "X1", 1.0)).await;
    app.clock.advance(chrono::Duration::seconds(1));

    let response = app
        .router
        .clone()
        .oneshot(test_request(
            "POST",
            "/api/scan",
            Some(json!({ "text": item("b", "X1", 1.0).to_string() })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "2");

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "THROTTLED");
    assert_eq!(body["error"]["retry_after_ms"], 2000);

    app.clock.advance(chrono::Duration::seconds(3));
    let (status, _) = app.scan(item("b", "X1", 1.0)).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_manual_form_entry() {
    let app = TestApp::new();
    let (status, body) = app
        .post(
            "/api/manual",
            json!({ "supplier": "Acme", "stockCode": "X7", "mass": "12.5", "category": "Flake" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["uuid"], "gen-1");
    assert_eq!(body["mass"], "12.5");
    assert_eq!(body["type"], "Flake");
}

#[tokio::test]
async fn test_blank_mass_is_422() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/manual", json!({ "supplier": "Acme", "stockCode": "X7", "mass": "" }))
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["fields"], json!(["mass"]));
}

#[tokio::test]
async fn test_decode_error_is_no_content() {
    let app = TestApp::new();
    let (status, body) = app
        .post("/api/decode-error", json!({ "cause": "blurry frame" }))
        .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

// =============================================================================
// Live set and summary
// =============================================================================

#[tokio::test]
async fn test_items_in_acceptance_order() {
    let app = TestApp::new();
    for (id, code) in [("c", "Z"), ("a", "A"), ("b", "M")] {
        app.manual_payload(item(id, code, 1.0)).await;
    }

    let (status, body) = app.get("/api/items").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["uuid"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["c", "a", "b"]);
}

#[tokio::test]
async fn test_summary_grouping() {
    let app = TestApp::new();
    app.manual_payload(item("1", "B1", 5.0)).await;
    app.manual_payload(item("2", "A2", 3.0)).await;
    app.manual_payload(item("3", "A2", 2.0)).await;

    let (status, body) = app.get("/api/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["groups"][0]["stockCode"], "A2");
    assert_eq!(body["groups"][0]["totalDisplay"], "5.00");
    assert_eq!(body["groups"][1]["stockCode"], "B1");
    assert_eq!(body["groups"][1]["totalDisplay"], "5.00");
    assert_eq!(body["grandTotalDisplay"], "10.00");
}

#[tokio::test]
async fn test_remove_item() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;
    app.manual_payload(item("b", "X1", 6.0)).await;

    let (status, body) = app.delete("/api/items/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], true);
    assert_eq!(body["count"], 1);

    let (status, body) = app.delete("/api/items/a").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], false);

    let (_, summary) = app.get("/api/summary").await;
    assert_eq!(summary["grandTotalDisplay"], "6.00");
}

#[tokio::test]
async fn test_clear_items() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;
    app.manual_payload(item("b", "X2", 6.0)).await;

    let (status, body) = app.delete("/api/items").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);

    let (_, snapshot) = app.get("/api/snapshot").await;
    assert_eq!(snapshot["records"], json!([]));
    assert_eq!(snapshot["summary"]["itemCount"], 0);
}

// =============================================================================
// Delivery note
// =============================================================================

#[tokio::test]
async fn test_delivery_note_json() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;

    let (status, body) = app.post("/api/delivery-note", note_request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "Delivery_Note_Plant_A_to_Depot_B_2024-03-15.pdf");
    assert_eq!(body["lines"][0]["mass"], "4 kg");
    assert_eq!(body["summary"]["grandTotalDisplay"], "4.00");
}

#[tokio::test]
async fn test_delivery_note_empty_is_409() {
    let app = TestApp::new();
    let (status, body) = app.post("/api/delivery-note", note_request()).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "EMPTY_DELIVERY_NOTE");
}

#[tokio::test]
async fn test_delivery_note_missing_receiver_is_400() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;

    let (status, body) = app
        .post("/api/delivery-note", json!({ "dispatcher": "Sam" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "MISSING_PARTY");
}

#[tokio::test]
async fn test_delivery_note_text() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;

    let response = app
        .router
        .clone()
        .oneshot(test_request("POST", "/api/delivery-note/text", Some(note_request())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("DELIVERY NOTE"));
    assert!(text.contains("Dispatcher: Sam"));
}

#[tokio::test]
async fn test_email_compose() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;
    app.manual_payload(item("b", "X2", 1.0)).await;

    let (status, body) = app
        .post(
            "/api/delivery-note/email",
            json!({
                "note": note_request(),
                "email": { "to": "ops@example.com", "subject": "Delivery", "message": "Attached" }
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["to"], "ops@example.com");
    assert_eq!(body["itemCount"], 2);
    assert_eq!(body["attachment"], "Delivery_Note_Plant_A_to_Depot_B_2024-03-15.pdf");
}

#[tokio::test]
async fn test_email_invalid_address_is_400() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;

    let (status, body) = app
        .post(
            "/api/delivery-note/email",
            json!({ "note": note_request(), "email": { "to": "ops@example" } }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_EMAIL");
}

// =============================================================================
// SSE
// =============================================================================

#[tokio::test]
async fn test_event_stream_starts_with_snapshot() {
    let app = TestApp::new();
    app.manual_payload(item("a", "X1", 4.0)).await;

    let response = app
        .router
        .clone()
        .oneshot(test_request("GET", "/api/events", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut frames = response.into_body().into_data_stream();
    let first = frames.next().await.unwrap().unwrap();
    let text = String::from_utf8(first.to_vec()).unwrap();
    assert!(text.contains("event: SessionSnapshot"));
    assert!(text.contains("\"uuid\":\"a\""));

    // Stamped from the injected clock
    let data = text
        .lines()
        .find_map(|line| line.strip_prefix("data:"))
        .unwrap();
    let event: Value = serde_json::from_str(data.trim()).unwrap();
    let stamped: chrono::DateTime<chrono::Utc> = event["timestamp"].as_str().unwrap().parse().unwrap();
    assert_eq!(stamped, app.clock.now().with_timezone(&chrono::Utc));
}
