//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&SqlitePool` as the first argument. Queries use positional `?`
//! placeholders because several of them bind variable-length id lists.

pub mod quote_repo;
pub mod tag_repo;
pub mod widget_repo;

pub use quote_repo::QuoteRepo;
pub use tag_repo::TagRepo;
pub use widget_repo::WidgetRepo;

/// Default page size for list endpoints.
pub(crate) const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list endpoints.
pub(crate) const MAX_LIMIT: i64 = 200;

/// Clamp a requested page size into `1..=MAX_LIMIT`.
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Negative offsets become zero.
pub(crate) fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// `?, ?, ?` for `count` bind parameters.
pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// Current time in the format the schema defaults use.
pub(crate) const NOW_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";
