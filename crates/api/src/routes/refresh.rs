//! Route definition for the refresh endpoint.

use axum::routing::post;
use axum::Router;

use crate::handlers::refresh;
use crate::state::AppState;

/// ```text
/// POST /refresh    -> refresh_quote (form-encoded)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/refresh", post(refresh::refresh_quote))
}
