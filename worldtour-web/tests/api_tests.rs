//! Integration tests for worldtour-web API endpoints
//!
//! Exercises the full router against in-memory databases: health check,
//! CRUD round-trips, validation failures, pagination, and filters.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use worldtour_web::{build_router, AppState};

/// Test helper: In-memory database with the full schema installed.
///
/// A single connection keeps every query on the same in-memory database.
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    worldtour_common::db::init::apply_schema(&pool)
        .await
        .expect("Failed to apply schema");

    pool
}

/// Test helper: Create app with test state
fn setup_app(db: SqlitePool) -> axum::Router {
    let state = AppState::new(db);
    build_router(state)
}

/// Test helper: Create request without a body
fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Create request with a JSON body
fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn tour_payload(origin: &str, destination: &str, price: &str, duration: i64) -> Value {
    json!({
        "origin_country": origin,
        "destination_country": destination,
        "price": price,
        "duration": duration,
        "description": format!("{} to {}", origin, destination),
    })
}

/// Test helper: Create a tour through the API, returning the stored record
async fn create_tour(app: &axum::Router, payload: &Value) -> Value {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/tours", payload))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await
}

// =============================================================================
// Health Endpoint
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(test_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "worldtour-web");
    assert!(body["version"].is_string());
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_create_tour_returns_stored_record() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Japan", "Vietnam", "1499.99", 10)).await;

    assert_eq!(created["origin_country"], "Japan");
    assert_eq!(created["destination_country"], "Vietnam");
    assert_eq!(created["price"], "1499.99");
    assert_eq!(created["duration"], 10);
    assert!(created["guid"].is_string());
    // Timestamps are assigned by the database
    assert!(created["created_at"].is_string());
    assert!(created["updated_at"].is_string());
}

#[tokio::test]
async fn test_create_tour_pads_price_scale() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Japan", "Vietnam", "800", 7)).await;
    assert_eq!(created["price"], "800.00");
}

#[tokio::test]
async fn test_create_tour_validation_failures() {
    let app = setup_app(setup_test_db().await);

    let cases = [
        tour_payload("", "Vietnam", "100.00", 5),
        tour_payload("Japan", "Vietnam", "not-a-price", 5),
        tour_payload("Japan", "Vietnam", "-5.00", 5),
        tour_payload("Japan", "Vietnam", "10.505", 5),
        tour_payload("Japan", "Vietnam", "123456789.00", 5),
        tour_payload("Japan", "Vietnam", "100.00", 0),
        tour_payload("Japan", "Vietnam", "100.00", -3),
    ];

    for payload in &cases {
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/tours", payload))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "payload should be rejected: {}",
            payload
        );

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"].is_string());
    }

    // Nothing was stored
    let response = app.oneshot(test_request("GET", "/api/tours")).await.unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 0);
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn test_get_tour_round_trip() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Nepal", "Bhutan", "999.00", 8)).await;
    let guid = created["guid"].as_str().unwrap();

    let response = app
        .oneshot(test_request("GET", &format!("/api/tours/{}", guid)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["guid"], created["guid"]);
    assert_eq!(body["origin_country"], "Nepal");
    assert_eq!(body["price"], "999.00");
}

#[tokio::test]
async fn test_get_unknown_tour_is_404() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/tours/3f9e7e4c-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_malformed_guid_is_rejected() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/api/tours/not-a-guid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// List, pagination, filters
// =============================================================================

#[tokio::test]
async fn test_list_empty_catalog() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(test_request("GET", "/api/tours")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 20);
    assert_eq!(body["total_pages"], 0);
    assert_eq!(body["tours"], json!([]));
}

#[tokio::test]
async fn test_list_paginates_at_twenty_rows() {
    let app = setup_app(setup_test_db().await);

    for i in 0..25 {
        create_tour(
            &app,
            &tour_payload("Japan", "Vietnam", &format!("{}.00", 100 + i), 5),
        )
        .await;
    }

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/tours?page=1"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 25);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["tours"].as_array().unwrap().len(), 20);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/tours?page=2"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"], 2);
    assert_eq!(body["tours"].as_array().unwrap().len(), 5);

    // Out-of-bounds pages clamp to the last page
    let response = app
        .oneshot(test_request("GET", "/api/tours?page=99"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_list_filters() {
    let app = setup_app(setup_test_db().await);

    create_tour(&app, &tour_payload("Japan", "Vietnam", "1200.00", 10)).await;
    create_tour(&app, &tour_payload("Japan", "Thailand", "800.00", 7)).await;
    create_tour(&app, &tour_payload("India", "Thailand", "300.00", 5)).await;

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/tours?origin=Japan"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 2);

    let response = app
        .clone()
        .oneshot(test_request("GET", "/api/tours?origin=Japan&max_price=1000"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["tours"][0]["destination_country"], "Thailand");

    let response = app
        .oneshot(test_request(
            "GET",
            "/api/tours?destination=Thailand&max_duration=6",
        ))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total_rows"], 1);
    assert_eq!(body["tours"][0]["origin_country"], "India");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_tour_round_trip() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Nepal", "Bhutan", "999.00", 8)).await;
    let guid = created["guid"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/tours/{}", guid),
            &tour_payload("Nepal", "Bhutan", "1099.50", 9),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["guid"], created["guid"]);
    assert_eq!(body["price"], "1099.50");
    assert_eq!(body["duration"], 9);
    // created_at is immutable across updates
    assert_eq!(body["created_at"], created["created_at"]);
}

#[tokio::test]
async fn test_update_unknown_tour_is_404() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/tours/3f9e7e4c-0000-0000-0000-000000000000",
            &tour_payload("Nepal", "Bhutan", "999.00", 8),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_rejects_invalid_payload() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Nepal", "Bhutan", "999.00", 8)).await;
    let guid = created["guid"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/tours/{}", guid),
            &tour_payload("Nepal", "Bhutan", "999.123", 8),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Stored record is untouched
    let response = app
        .oneshot(test_request("GET", &format!("/api/tours/{}", guid)))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["price"], "999.00");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_tour() {
    let app = setup_app(setup_test_db().await);

    let created = create_tour(&app, &tour_payload("Mongolia", "China", "640.00", 12)).await;
    let guid = created["guid"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(test_request("DELETE", &format!("/api/tours/{}", guid)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "deleted");
    assert_eq!(body["guid"], created["guid"]);

    // Gone afterwards
    let response = app
        .clone()
        .oneshot(test_request("GET", &format!("/api/tours/{}", guid)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // A second delete finds nothing
    let response = app
        .oneshot(test_request("DELETE", &format!("/api/tours/{}", guid)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// UI shell
// =============================================================================

#[tokio::test]
async fn test_index_page_served() {
    let app = setup_app(setup_test_db().await);

    let response = app.oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Worldtour"));
    assert!(html.contains("/static/app.js"));
}

#[tokio::test]
async fn test_app_js_served_with_content_type() {
    let app = setup_app(setup_test_db().await);

    let response = app
        .oneshot(test_request("GET", "/static/app.js"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/javascript"
    );
}
