//! Page-facing routes mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::{assets, widgets};
use crate::state::AppState;

/// ```text
/// GET /widgets/{widget_id}/fragment    -> render_fragment (HTML)
/// GET /assets/quotes-widget.js         -> widget_script
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/widgets/{widget_id}/fragment", get(widgets::render_fragment))
        .route("/assets/quotes-widget.js", get(assets::widget_script))
}
