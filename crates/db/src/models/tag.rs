//! Tag vocabulary model and DTOs.

use quotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    /// Normalized (trimmed, lowercased) unique name.
    pub name: String,
    /// Name with the casing it was first typed with.
    pub display_name: String,
    pub created_at: Timestamp,
}

/// Lightweight tag info returned alongside quotes.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagInfo {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
}

/// Tag suggestion returned by the autocomplete endpoint.
/// Includes `usage_count` so the admin UI can rank by popularity.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagSuggestion {
    pub id: DbId,
    pub name: String,
    pub display_name: String,
    pub usage_count: i64,
}

/// DTO for `POST /api/v1/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub name: String,
}

/// DTO for replacing a quote's tags.
#[derive(Debug, Clone, Deserialize)]
pub struct SetQuoteTags {
    /// Tag names; new tags are created on first use. Empty clears all tags.
    pub tag_names: Vec<String>,
}

/// Query parameters for `GET /api/v1/tags`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /api/v1/tags/suggest`.
#[derive(Debug, Clone, Deserialize)]
pub struct TagSuggestParams {
    #[serde(default)]
    pub prefix: String,
    pub limit: Option<i64>,
}
