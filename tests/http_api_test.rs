mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use tradeledger_api::config::AppConfig;
use tradeledger_api::storage::{InMemoryObjectStore, SharedObjectStore};
use tradeledger_api::{api_v1_routes, AppState};

async fn test_router() -> axum::Router {
    let harness = common::TestApp::new().await;
    let storage: SharedObjectStore = Arc::new(InMemoryObjectStore::new());
    let config = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        0,
        "test".to_string(),
    );
    // Reuse the harness's migrated pool rather than the config URL.
    let state = AppState::build(harness.db.clone(), config, storage);
    api_v1_routes().with_state(state)
}

fn authed(request: Request<Body>) -> Request<Body> {
    let (mut parts, body) = request.into_parts();
    parts.headers.insert("x-user-id", "1".parse().unwrap());
    parts.headers.insert("x-user-role", "admin".parse().unwrap());
    parts.headers.insert("x-company-id", "1".parse().unwrap());
    parts.headers.insert("x-store-id", "1".parse().unwrap());
    Request::from_parts(parts, body)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn requests_without_identity_headers_are_unauthorized() {
    let app = test_router().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/products")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn product_create_and_detail_use_the_response_envelope() {
    let app = test_router().await;

    let create = authed(json_request(
        "POST",
        "/products",
        json!({
            "name": "Widget",
            "code": "W-1",
            "unit": "pcs",
            "cost": "100",
            "price": "150"
        }),
    ));
    let response = app.clone().oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(true));
    let id = payload["data"]["id"].as_i64().unwrap();

    let detail = authed(
        Request::builder()
            .method("GET")
            .uri(format!("/products/{id}"))
            .body(Body::empty())
            .unwrap(),
    );
    let response = app.oneshot(detail).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let payload: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["data"]["code"], json!("W-1"));
    assert_eq!(payload["data"]["quantity"], json!(0));
}

#[tokio::test]
async fn validation_failures_surface_as_unprocessable() {
    let app = test_router().await;

    // Empty item list fails validation before any row is touched.
    let create = authed(json_request(
        "POST",
        "/purchases",
        json!({
            "purchased_at": "2026-01-10T00:00:00Z",
            "reference_no": "PU-1",
            "store_id": 1,
            "supplier_id": 7,
            "credit_days": 30,
            "items": []
        }),
    ));
    let response = app.oneshot(create).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
