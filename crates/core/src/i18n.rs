//! Localized UI strings and locale negotiation.
//!
//! Catalogs live in `crates/core/locales/*.yml` and are compiled in by
//! `rust_i18n::i18n!` at the crate root.

use rust_i18n::t;
use serde::{Deserialize, Serialize};

/// Locale used when nothing else matches.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales that ship a catalog.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr"];

/// Map a language tag (`fr`, `fr-FR`, `FR_ca`) to a supported locale.
pub fn supported_locale(tag: &str) -> Option<&'static str> {
    let primary = tag
        .trim()
        .split(['-', '_', ';'])
        .next()
        .unwrap_or_default()
        .to_lowercase();

    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|locale| *locale == primary)
}

/// Pick the locale for a request.
///
/// An explicit `?locale=` wins, then the first entry of `Accept-Language`,
/// then `fallback`.
pub fn negotiate_locale(
    explicit: Option<&str>,
    accept_language: Option<&str>,
    fallback: &str,
) -> &'static str {
    explicit
        .and_then(supported_locale)
        .or_else(|| {
            accept_language
                .and_then(|header| header.split(',').next())
                .and_then(supported_locale)
        })
        .or_else(|| supported_locale(fallback))
        .unwrap_or(DEFAULT_LOCALE)
}

/// Strings handed to the page for the refresh controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetStrings {
    pub loading: String,
    pub error: String,
    pub next: String,
    pub no_quote: String,
}

impl WidgetStrings {
    pub fn for_locale(locale: &str) -> Self {
        Self {
            loading: t!("widget.loading", locale = locale).to_string(),
            error: t!("widget.error", locale = locale).to_string(),
            next: t!("widget.next", locale = locale).to_string(),
            no_quote: t!("widget.no_quote", locale = locale).to_string(),
        }
    }
}

/// Default widget title in the given locale.
pub fn default_title(locale: &str) -> String {
    t!("widget.default_title", locale = locale).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_subtags_map_to_primary_locale() {
        assert_eq!(supported_locale("fr-FR"), Some("fr"));
        assert_eq!(supported_locale("EN_us"), Some("en"));
        assert_eq!(supported_locale("de"), None);
    }

    #[test]
    fn explicit_locale_beats_header() {
        assert_eq!(negotiate_locale(Some("fr"), Some("en-US,en"), "en"), "fr");
    }

    #[test]
    fn header_used_when_no_explicit_locale() {
        assert_eq!(negotiate_locale(None, Some("fr-CA,fr;q=0.9"), "en"), "fr");
    }

    #[test]
    fn unsupported_everything_falls_back_to_default() {
        assert_eq!(negotiate_locale(Some("xx"), Some("de"), "zz"), DEFAULT_LOCALE);
    }

    #[test]
    fn strings_are_localized() {
        let en = WidgetStrings::for_locale("en");
        let fr = WidgetStrings::for_locale("fr");
        assert_eq!(en.loading, "Loading...");
        assert_eq!(fr.loading, "Chargement...");
        assert_ne!(en.no_quote, fr.no_quote);
    }
}
