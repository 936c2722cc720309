//! Route definitions for the tag vocabulary.

use axum::routing::get;
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Tag routes mounted at `/tags`.
///
/// ```text
/// GET    /           -> list_tags
/// POST   /           -> create_tag
/// GET    /suggest    -> suggest_tags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list_tags).post(tags::create_tag))
        .route("/suggest", get(tags::suggest_tags))
}
