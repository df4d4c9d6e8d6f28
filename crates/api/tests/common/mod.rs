#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chrono::NaiveDate;
use http_body_util::BodyExt;
use tower::ServiceExt;

use stockrecon_api::auth::jwt::{generate_access_token, JwtConfig};
use stockrecon_api::config::ServerConfig;
use stockrecon_api::router::build_app_router;
use stockrecon_api::state::AppState;
use stockrecon_core::memory::{InMemoryInventory, InMemoryStore};
use stockrecon_core::roles::{ROLE_APPROVER, ROLE_CLERK};
use stockrecon_core::workflow::ReconciliationService;

pub const P1: i64 = 1;
pub const P2: i64 = 2;
pub const CLERK_ID: i64 = 10;
pub const OTHER_CLERK_ID: i64 = 11;
pub const APPROVER_ID: i64 = 20;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Build the full application router on an in-memory store.
///
/// P1 has 47 packs from 2025-01-08 onwards, P2 has 12.
pub fn build_test_app() -> Router {
    let config = test_config();
    let inventory = Arc::new(
        InMemoryInventory::new()
            .with_product(P1, "Cola 24x330ml", "P-001")
            .with_product(P2, "Water 12x1.5l", "P-002")
            .with_movement(P1, date("2025-01-02"), 60)
            .with_movement(P1, date("2025-01-08"), -13)
            .with_movement(P2, date("2025-01-03"), 12),
    );
    let service = ReconciliationService::new(
        Arc::new(InMemoryStore::new()),
        inventory.clone(),
        inventory,
    );
    let state = AppState {
        service: Arc::new(service),
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

pub fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

pub fn token(user_id: i64, role: &str) -> String {
    generate_access_token(user_id, role, &test_config().jwt).unwrap()
}

pub fn clerk() -> String {
    token(CLERK_ID, ROLE_CLERK)
}

pub fn other_clerk() -> String {
    token(OTHER_CLERK_ID, ROLE_CLERK)
}

pub fn approver() -> String {
    token(APPROVER_ID, ROLE_APPROVER)
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

/// Send an authenticated GET request.
pub async fn get(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a GET request with no credentials.
pub async fn get_anonymous(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send an authenticated POST request with a JSON body.
pub async fn post_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"))
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Send an authenticated POST request with a raw body.
///
/// `content_type` of `None` omits the header, as a bodyless form post would.
pub async fn post_raw(
    app: &Router,
    uri: &str,
    token: &str,
    content_type: Option<&str>,
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("Authorization", format!("Bearer {token}"));
    if let Some(content_type) = content_type {
        builder = builder.header("Content-Type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    send(app, request).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a count as the clerk and return the created entry.
pub async fn submit(
    app: &Router,
    product_id: i64,
    stock_date: &str,
    manual_packs: i64,
) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/v1/stock-counts",
        &clerk(),
        serde_json::json!({
            "product_id": product_id,
            "stock_date": stock_date,
            "manual_packs": manual_packs,
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

/// Submit and approve a count, returning the entry id.
pub async fn submit_approved(
    app: &Router,
    product_id: i64,
    stock_date: &str,
    manual_packs: i64,
) -> i64 {
    let entry = submit(app, product_id, stock_date, manual_packs).await;
    let id = entry["id"].as_i64().unwrap();
    let response = post_json(
        app,
        &format!("/api/v1/stock-counts/{id}/approve"),
        &approver(),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    id
}
