//! Route definitions for quote administration.

use axum::routing::get;
use axum::Router;

use crate::handlers::quotes;
use crate::state::AppState;

/// Quote routes mounted at `/quotes`.
///
/// ```text
/// GET    /             -> list_quotes (?tag=&status=&limit=&offset=)
/// POST   /             -> create_quote
/// GET    /{id}         -> get_quote
/// PUT    /{id}         -> update_quote
/// DELETE /{id}         -> delete_quote
/// GET    /{id}/tags    -> get_quote_tags
/// PUT    /{id}/tags    -> set_quote_tags
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(quotes::list_quotes).post(quotes::create_quote))
        .route(
            "/{id}",
            get(quotes::get_quote)
                .put(quotes::update_quote)
                .delete(quotes::delete_quote),
        )
        .route(
            "/{id}/tags",
            get(quotes::get_quote_tags).put(quotes::set_quote_tags),
        )
}
