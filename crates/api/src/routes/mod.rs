pub mod health;
pub mod pages;
pub mod quotes;
pub mod refresh;
pub mod tags;
pub mod widgets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /quotes                              list, create
/// /quotes/{id}                         get, update, delete
/// /quotes/{id}/tags                    list, replace (by name)
///
/// /tags                                list, create
/// /tags/suggest                        autocomplete (?prefix=)
///
/// /widgets                             list, place
/// /widgets/{widget_id}                 settings form, submit settings, remove
/// /widgets/{widget_id}/render          rendered fragment + client bootstrap
///
/// /refresh                             next quote for a page widget (form POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/quotes", quotes::router())
        .nest("/tags", tags::router())
        .nest("/widgets", widgets::router())
        .merge(refresh::router())
}
