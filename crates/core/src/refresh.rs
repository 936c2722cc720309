//! Wire types of the refresh request/response contract.
//!
//! The request is form-encoded by the page script; the success response is
//! a flat JSON object and "no further quote" is the JSON literal `false`.

use serde::{Deserialize, Serialize};

use crate::selection::{QuoteOrder, QuoteSelection, RefreshCursor};
use crate::settings::{bounded_int, split_tag_tokens, FormValue, DEFAULT_CHAR_LIMIT};
use crate::types::DbId;

/// Form parameters of `POST /api/v1/refresh`.
///
/// Every field is optional text so a malformed value degrades to its
/// default instead of rejecting the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub action: String,
    #[serde(rename = "_ajax_nonce", default)]
    pub nonce: String,
    pub current: Option<String>,
    pub current_page: Option<String>,
    pub char_limit: Option<String>,
    pub tags: Option<String>,
    pub orderby: Option<String>,
    pub widget_id: Option<String>,
}

impl RefreshRequest {
    pub fn cursor(&self) -> RefreshCursor {
        RefreshCursor {
            current_quote_id: parse_trimmed(self.current.as_deref()),
            current_page: parse_trimmed(self.current_page.as_deref()).filter(|p| *p > 0),
        }
    }

    /// Requested character limit; invalid input falls back to the default.
    pub fn char_limit(&self) -> u32 {
        let value = self.char_limit.clone().map(FormValue::Text);
        bounded_int(value.as_ref(), 0, u32::MAX).unwrap_or(DEFAULT_CHAR_LIMIT)
    }

    pub fn order(&self) -> QuoteOrder {
        self.orderby
            .as_deref()
            .map(QuoteOrder::from_param)
            .unwrap_or_default()
    }

    pub fn tag_tokens(&self) -> Vec<String> {
        self.tags.as_deref().map(split_tag_tokens).unwrap_or_default()
    }
}

fn parse_trimmed<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Successful refresh response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteResponse {
    pub quote_id: DbId,
    pub quote_text: String,
    pub quote_author: Option<String>,
    pub quote_source: Option<String>,
    pub quote_source_is_url: bool,
    pub current_page: u64,
    pub nb_pages: u64,
}

impl From<&QuoteSelection> for QuoteResponse {
    fn from(selection: &QuoteSelection) -> Self {
        Self {
            quote_id: selection.quote.id,
            quote_text: selection.quote.text.clone(),
            quote_author: selection.quote.author.clone(),
            quote_source: selection.quote.source.clone(),
            quote_source_is_url: selection.quote.source_is_url,
            current_page: selection.current_page,
            nb_pages: selection.total_pages,
        }
    }
}
