//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// `?locale=` override for endpoints that produce localized text.
#[derive(Debug, Default, Deserialize)]
pub struct LocaleParams {
    pub locale: Option<String>,
}
