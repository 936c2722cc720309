//! Static client assets.

use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;

/// Browser-side refresh controller.
const WIDGET_SCRIPT: &str = include_str!("../../assets/quotes-widget.js");

/// GET /assets/quotes-widget.js
pub async fn widget_script() -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, "public, max-age=3600"),
        ],
        WIDGET_SCRIPT,
    )
}
