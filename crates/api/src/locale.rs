//! Request locale negotiation.

use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::HeaderMap;
use quotes_core::i18n::negotiate_locale;

use crate::state::AppState;

/// Locale for a request: `?locale=`, then `Accept-Language`, then the
/// configured default.
pub fn request_locale(state: &AppState, explicit: Option<&str>, headers: &HeaderMap) -> &'static str {
    let accept_language = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok());
    negotiate_locale(explicit, accept_language, &state.config.default_locale)
}
