//! Route definitions for placed widget instances.

use axum::routing::get;
use axum::Router;

use crate::handlers::widgets;
use crate::state::AppState;

/// Widget routes mounted at `/widgets`.
///
/// ```text
/// GET    /                      -> list_widgets
/// POST   /                      -> place_widget
/// GET    /{widget_id}           -> get_widget_form
/// PUT    /{widget_id}           -> submit_settings (JSON or form)
/// DELETE /{widget_id}           -> remove_widget
/// GET    /{widget_id}/render    -> render_widget
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(widgets::list_widgets).post(widgets::place_widget))
        .route(
            "/{widget_id}",
            get(widgets::get_widget_form)
                .put(widgets::submit_settings)
                .delete(widgets::remove_widget),
        )
        .route("/{widget_id}/render", get(widgets::render_widget))
}
