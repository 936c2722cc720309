//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, body_text, get};
use sqlx::SqlitePool;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn health_check_returns_ok_with_json(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["db_healthy"], true);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_route_returns_404(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn response_contains_x_request_id_header(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/health").await;

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight allows the configured origin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn cors_preflight_returns_correct_headers(pool: SqlitePool) {
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/refresh")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let allow_origin = response
        .headers()
        .get("access-control-allow-origin")
        .expect("preflight must carry access-control-allow-origin");
    assert_eq!(allow_origin, "http://localhost:5173");
}

// ---------------------------------------------------------------------------
// Test: the client script is served as JavaScript
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn widget_script_is_served(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/assets/quotes-widget.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/javascript"));

    let script = body_text(response).await;
    assert!(script.contains("data-bootstrap"));
    assert!(script.contains("quotes_widget_refresh"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn widget_script_keeps_the_quote_while_loading(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let script = body_text(get(app, "/assets/quotes-widget.js").await).await;

    // Loading and retry live in the nav; only `display` writes the body.
    assert!(script.contains(r#"querySelector("nav.nav-next")"#));
    assert_eq!(script.matches("this.body().innerHTML").count(), 1);
    let display = script
        .find("Controller.prototype.display")
        .expect("display is defined");
    let body_write = script.find("this.body().innerHTML").unwrap();
    let next_method = script[display..]
        .find("Controller.prototype.restoreNav")
        .map(|offset| display + offset)
        .unwrap();
    assert!(display < body_write && body_write < next_method);

    // Transport failures are logged and flagged apart from "no more".
    assert!(script.contains("console.warn("));
    assert!(script.contains("self.complete(null, true)"));
    assert!(script.contains("self.complete(isNoMore(body) ? null : body, false)"));
}
