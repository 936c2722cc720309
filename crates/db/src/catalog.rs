//! [`QuoteSource`] backed by the `quotes` table.

use async_trait::async_trait;
use quotes_core::quote::QuoteRecord;
use quotes_core::selection::{QuoteFilter, QuoteSource};
use quotes_core::types::DbId;

use crate::repositories::QuoteRepo;
use crate::DbPool;

/// Published quotes as seen by the widget runtime.
#[derive(Clone)]
pub struct QuoteCatalog {
    pool: DbPool,
}

impl QuoteCatalog {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuoteSource for QuoteCatalog {
    type Error = sqlx::Error;

    async fn count_candidates(&self, filter: &QuoteFilter) -> Result<u64, Self::Error> {
        let count = QuoteRepo::count_candidates(&self.pool, &filter.tags).await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn fetch_page(
        &self,
        filter: &QuoteFilter,
        page: u64,
    ) -> Result<Option<QuoteRecord>, Self::Error> {
        let Some(offset) = page.checked_sub(1).and_then(|o| i64::try_from(o).ok()) else {
            return Ok(None);
        };
        let row = QuoteRepo::candidate_at(&self.pool, &filter.tags, offset).await?;
        Ok(row.map(QuoteRecord::from))
    }

    async fn position_of(
        &self,
        filter: &QuoteFilter,
        quote_id: DbId,
    ) -> Result<Option<u64>, Self::Error> {
        let position = QuoteRepo::candidate_position(&self.pool, &filter.tags, quote_id).await?;
        Ok(position.and_then(|p| u64::try_from(p).ok()))
    }
}
