#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use quotes_core::tokens::{TokenSigner, DEFAULT_TOKEN_LIFETIME_SECS, REFRESH_ACTION};
use sqlx::SqlitePool;
use tower::ServiceExt;

use quotes_api::config::ServerConfig;
use quotes_api::router::build_app_router;
use quotes_api::state::AppState;

pub const TEST_SECRET: &str = "test-nonce-secret";

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
        database_url: "sqlite::memory:".to_string(),
        public_base_url: "http://localhost:3000".to_string(),
        nonce_secret: TEST_SECRET.to_string(),
        nonce_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        default_locale: "en".to_string(),
    }
}

/// Build the application state for `pool` with the test configuration.
pub fn test_state(pool: SqlitePool, config: ServerConfig) -> AppState {
    AppState::new(pool, config).expect("templates compile")
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
///
/// Uses the same [`build_app_router`] as `main.rs`, so integration tests
/// exercise the production middleware stack.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let config = test_config();
    let state = test_state(pool, config.clone());
    build_app_router(state, &config)
}

/// A refresh token valid right now under the test secret.
pub fn valid_nonce() -> String {
    TokenSigner::new(TEST_SECRET.to_string(), DEFAULT_TOKEN_LIFETIME_SECS)
        .issue(REFRESH_ACTION, chrono::Utc::now())
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::PUT, uri, body).await
}

async fn send_json(app: Router, method: Method, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send an `application/x-www-form-urlencoded` body.
pub async fn send_form(app: Router, method: Method, uri: &str, fields: &[(&str, &str)]) -> Response {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

fn encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a published quote through the API and return its id.
pub async fn create_quote(app: Router, body: serde_json::Value) -> i64 {
    let response = post_json(app, "/api/v1/quotes", body).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

/// Place a widget and return its widget id.
pub async fn place_widget(app: Router) -> String {
    let response = post_json(app, "/api/v1/widgets", serde_json::json!({})).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["widget_id"]
        .as_str()
        .unwrap()
        .to_string()
}
