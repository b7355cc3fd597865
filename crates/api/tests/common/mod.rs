#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use telesales_api::config::ServerConfig;
use telesales_api::router::build_app_router;
use telesales_api::state::AppState;

/// Agent id sent by the request helpers.
pub const AGENT: i64 = 10;

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default)
/// and a 30-second request timeout.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        max_upload_bytes: 1024,
    }
}

/// Build the application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

/// Build shared state so several requests can hit the same session registry.
pub fn test_state(pool: PgPool) -> AppState {
    AppState::new(pool, test_config())
}

/// Router over existing state.
pub fn app_with(state: &AppState) -> Router {
    build_app_router(state.clone(), &test_config())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-agent-id", AGENT.to_string());
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active campaign and return its id.
pub async fn create_campaign(pool: &PgPool, name: &str) -> i64 {
    let (id,): (i64,) =
        sqlx::query_as("INSERT INTO campaigns (name, status) VALUES ($1, 'ACTIVA') RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap();
    id
}

/// Insert a pending queue entry and return its id.
pub async fn create_contact(pool: &PgPool, campaign_id: i64, lead_id: i64, priority: &str) -> i64 {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO campaign_contacts (campaign_id, lead_id, full_name, phone, priority)
         VALUES ($1, $2, $3, '555-0100', $4)
         RETURNING id",
    )
    .bind(campaign_id)
    .bind(lead_id)
    .bind(format!("Lead {lead_id}"))
    .bind(priority)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// A valid script body for `POST /scripts`.
pub fn renewal_script_json() -> serde_json::Value {
    serde_json::json!({
        "name": "Renewal Q3",
        "objective": "Retain customers",
        "call_type": "RENOVACION",
        "sections": [
            { "kind": "CIERRE", "content": "<p>Offer 10% off</p>" },
            { "kind": "INTRO", "content": "<p>Hi, this is Ana</p>" },
            { "kind": "OBJECIONES", "content": "   " }
        ]
    })
}
