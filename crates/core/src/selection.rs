//! Quote selection: one quote per page over the filtered, ordered candidate
//! set, with wrap-around when the cursor overruns.
//!
//! The content repository is abstracted as [`QuoteSource`], so the same
//! selection rules run against SQLite in production and an in-memory list in
//! tests.

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::quote::{DisplayQuote, QuoteRecord};
use crate::types::DbId;

/// How the next quote is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteOrder {
    /// Creation order, latest first.
    #[default]
    Newest,
    /// Uniformly random over the candidate set.
    Random,
}

impl QuoteOrder {
    /// Parse the `orderby` request parameter. Anything but `random` is newest.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("random") {
            QuoteOrder::Random
        } else {
            QuoteOrder::Newest
        }
    }

    pub fn as_param(self) -> &'static str {
        match self {
            QuoteOrder::Newest => "newest",
            QuoteOrder::Random => "random",
        }
    }
}

/// Which quotes are candidates and how to walk them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteFilter {
    /// A quote matches when it carries any of these tags. Empty = all quotes.
    pub tags: Vec<DbId>,
    pub order: QuoteOrder,
}

/// Read access to published quotes.
///
/// Pages are 1-based, hold exactly one quote, and always follow newest-first
/// order; random selection is layered on top by picking a page.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    type Error: Send;

    /// Number of published quotes matching `filter`.
    async fn count_candidates(&self, filter: &QuoteFilter) -> Result<u64, Self::Error>;

    /// The quote on `page`, or `None` when the page is out of range.
    async fn fetch_page(
        &self,
        filter: &QuoteFilter,
        page: u64,
    ) -> Result<Option<QuoteRecord>, Self::Error>;

    /// The page `quote_id` sits on, or `None` if it is not a candidate.
    async fn position_of(
        &self,
        filter: &QuoteFilter,
        quote_id: DbId,
    ) -> Result<Option<u64>, Self::Error>;
}

/// One selected quote with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuoteSelection {
    pub quote: DisplayQuote,
    pub current_page: u64,
    pub total_pages: u64,
}

/// Where the client currently is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshCursor {
    pub current_quote_id: Option<DbId>,
    pub current_page: Option<u64>,
}

/// Result of asking for the next quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Quote(QuoteSelection),
    /// No candidate, or no candidate other than the one already shown.
    NoMore,
}

/// Select the quote on `page`.
///
/// Returns `None` when nothing matches the filter. An out-of-range page
/// wraps to page 1 instead of failing.
pub async fn select_quote<S>(
    source: &S,
    filter: &QuoteFilter,
    page: u64,
    char_limit: u32,
) -> Result<Option<QuoteSelection>, S::Error>
where
    S: QuoteSource + ?Sized,
{
    let total = source.count_candidates(filter).await?;
    fetch_with_wrap(source, filter, page, total, char_limit).await
}

/// Select the quote shown on first render: page 1 for newest-first, a
/// uniformly random page otherwise.
pub async fn select_initial<S, R>(
    source: &S,
    filter: &QuoteFilter,
    char_limit: u32,
    rng: &mut R,
) -> Result<Option<QuoteSelection>, S::Error>
where
    S: QuoteSource + ?Sized,
    R: Rng + Send + ?Sized,
{
    let total = source.count_candidates(filter).await?;
    let page = match filter.order {
        QuoteOrder::Newest => 1,
        QuoteOrder::Random if total > 0 => rng.random_range(1..=total),
        QuoteOrder::Random => 1,
    };
    fetch_with_wrap(source, filter, page, total, char_limit).await
}

/// Select the quote following `cursor`.
///
/// Newest-first advances one page (wrapping after the last); random picks
/// uniformly among the candidates other than the current one.
pub async fn select_next<S, R>(
    source: &S,
    filter: &QuoteFilter,
    cursor: RefreshCursor,
    char_limit: u32,
    rng: &mut R,
) -> Result<RefreshOutcome, S::Error>
where
    S: QuoteSource + ?Sized,
    R: Rng + Send + ?Sized,
{
    let total = source.count_candidates(filter).await?;
    if total == 0 {
        return Ok(RefreshOutcome::NoMore);
    }

    let by_id = match cursor.current_quote_id {
        Some(id) => source.position_of(filter, id).await?,
        None => None,
    };
    let position = by_id.or(cursor.current_page.filter(|p| (1..=total).contains(p)));

    let page = match filter.order {
        QuoteOrder::Newest => position.map_or(1, |p| p + 1),
        QuoteOrder::Random => random_page_excluding(rng, total, position),
    };

    let selection = fetch_with_wrap(source, filter, page, total, char_limit).await?;
    Ok(match selection {
        Some(s) if Some(s.quote.id) != cursor.current_quote_id => RefreshOutcome::Quote(s),
        _ => RefreshOutcome::NoMore,
    })
}

fn random_page_excluding<R: Rng + ?Sized>(rng: &mut R, total: u64, excluded: Option<u64>) -> u64 {
    match excluded {
        Some(skip) if total > 1 => {
            let draw = rng.random_range(1..total);
            if draw >= skip {
                draw + 1
            } else {
                draw
            }
        }
        _ => rng.random_range(1..=total),
    }
}

async fn fetch_with_wrap<S>(
    source: &S,
    filter: &QuoteFilter,
    page: u64,
    total: u64,
    char_limit: u32,
) -> Result<Option<QuoteSelection>, S::Error>
where
    S: QuoteSource + ?Sized,
{
    if total == 0 {
        return Ok(None);
    }

    let page = if (1..=total).contains(&page) { page } else { 1 };

    let mut found = source.fetch_page(filter, page).await?.map(|q| (q, page));
    if found.is_none() && page != 1 {
        // The candidate set shrank between count and fetch.
        found = source.fetch_page(filter, 1).await?.map(|q| (q, 1));
    }

    Ok(found.map(|(record, current_page)| QuoteSelection {
        quote: DisplayQuote::prepare(&record, char_limit),
        current_page,
        total_pages: total,
    }))
}
