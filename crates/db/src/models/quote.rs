//! Quote entity model and DTOs.

use quotes_core::quote::{
    status, QuoteRecord, QUOTE_AUTHOR_MAX_LENGTH, QUOTE_MAX_LENGTH, QUOTE_SOURCE_MAX_LENGTH,
};
use quotes_core::types::{DbId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::models::tag::TagInfo;

/// A row from the `quotes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: DbId,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Quote> for QuoteRecord {
    fn from(row: Quote) -> Self {
        Self {
            id: row.id,
            text: row.text,
            author: row.author,
            source: row.source,
            created_at: row.created_at,
        }
    }
}

/// A quote together with the tags applied to it.
#[derive(Debug, Clone, Serialize)]
pub struct QuoteWithTags {
    #[serde(flatten)]
    pub quote: Quote,
    pub tags: Vec<TagInfo>,
}

// ---------------------------------------------------------------------------
// DTOs
// ---------------------------------------------------------------------------

/// DTO for creating a quote.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuote {
    #[validate(length(min = 1, max = QUOTE_MAX_LENGTH))]
    pub text: String,
    #[validate(length(max = QUOTE_AUTHOR_MAX_LENGTH))]
    pub author: Option<String>,
    #[validate(length(max = QUOTE_SOURCE_MAX_LENGTH))]
    pub source: Option<String>,
    /// Defaults to `publish` if omitted.
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
    /// Tag names to apply. New tags are created on first use.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating a quote. All fields are optional; `author` and `source`
/// are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateQuote {
    #[validate(length(min = 1, max = QUOTE_MAX_LENGTH))]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = QUOTE_AUTHOR_MAX_LENGTH))]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[validate(length(max = QUOTE_SOURCE_MAX_LENGTH))]
    pub source: Option<Option<String>>,
    #[validate(custom(function = "validate_status"))]
    pub status: Option<String>,
}

/// Keep a present `null` apart from an absent field.
fn nullable<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn validate_status(value: &str) -> Result<(), ValidationError> {
    if status::ALL.contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::new("unknown_status"))
    }
}

/// Query parameters for `GET /api/v1/quotes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteListParams {
    /// Tag name or id.
    pub tag: Option<String>,
    /// `publish` or `draft`; all statuses when omitted.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
