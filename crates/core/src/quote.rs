//! Quote records and their display form.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Maximum length of a quote's text, in characters.
pub const QUOTE_MAX_LENGTH: u64 = 500;

/// Maximum length of a quote's author, in characters.
pub const QUOTE_AUTHOR_MAX_LENGTH: u64 = 250;

/// Maximum length of a quote's source, in characters.
pub const QUOTE_SOURCE_MAX_LENGTH: u64 = 250;

/// Publication status values for quotes.
pub mod status {
    pub const PUBLISH: &str = "publish";
    pub const DRAFT: &str = "draft";

    pub const ALL: &[&str] = &[PUBLISH, DRAFT];
}

/// A stored quote as the selector sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRecord {
    pub id: DbId,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub created_at: Timestamp,
}

/// A quote ready to be rendered or serialized to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayQuote {
    pub id: DbId,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub source_is_url: bool,
}

impl DisplayQuote {
    /// Trim the stored fields, detect URL sources, and apply `char_limit`
    /// (0 means unlimited). The record itself is left untouched.
    pub fn prepare(record: &QuoteRecord, char_limit: u32) -> Self {
        let text = truncate_chars(record.text.trim(), char_limit).to_string();
        let author = non_empty_trimmed(record.author.as_deref());
        let source = non_empty_trimmed(record.source.as_deref());
        let source_is_url = source.as_deref().is_some_and(is_url);

        Self {
            id: record.id,
            text,
            author,
            source,
            source_is_url,
        }
    }
}

fn non_empty_trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Whether `value` is an absolute URL with a host (`https://example.org/x`).
///
/// Book references such as `"Hamlet, Act III"` or bare paths are not URLs.
pub fn is_url(value: &str) -> bool {
    url::Url::parse(value.trim())
        .map(|u| u.has_host())
        .unwrap_or(false)
}

/// Cut `text` to at most `limit` characters. A limit of 0 disables truncation.
pub fn truncate_chars(text: &str, limit: u32) -> &str {
    if limit == 0 {
        return text;
    }
    match text.char_indices().nth(limit as usize) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
