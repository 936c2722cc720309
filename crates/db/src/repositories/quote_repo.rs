//! Repository for the `quotes` table.
//!
//! Besides admin CRUD this provides the candidate queries behind
//! [`crate::QuoteCatalog`]: a candidate is a published quote carrying any of
//! the filter tags (or any published quote when the filter is empty), and
//! candidates are numbered newest-first starting at 1.

use quotes_core::quote::status;
use quotes_core::settings::normalize_tag_name;
use quotes_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::quote::{CreateQuote, Quote, QuoteListParams, UpdateQuote};
use crate::repositories::{clamp_limit, clamp_offset, placeholders, TagRepo, NOW_SQL};

/// Column list for `quotes` queries.
const QUOTE_COLUMNS: &str = "id, text, author, source, status, created_at, updated_at";

/// Newest-first order shared by listing and candidate paging.
const NEWEST_FIRST: &str = "ORDER BY q.created_at DESC, q.id DESC";

/// Provides CRUD and candidate queries for quotes.
pub struct QuoteRepo;

impl QuoteRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a quote and apply its tags in one transaction.
    pub async fn create(pool: &SqlitePool, input: &CreateQuote) -> Result<Quote, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO quotes (text, author, source, status) \
             VALUES (?, ?, ?, ?) \
             RETURNING {QUOTE_COLUMNS}"
        );
        let quote = sqlx::query_as::<_, Quote>(&query)
            .bind(&input.text)
            .bind(&input.author)
            .bind(&input.source)
            .bind(input.status.as_deref().unwrap_or(status::PUBLISH))
            .fetch_one(&mut *tx)
            .await?;

        if !input.tags.is_empty() {
            TagRepo::set_quote_tags_in(&mut tx, quote.id, &input.tags).await?;
        }

        tx.commit().await?;
        Ok(quote)
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?");
        sqlx::query_as::<_, Quote>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List quotes newest-first, optionally filtered by status and by one
    /// tag (matched by normalized name or id).
    pub async fn list(
        pool: &SqlitePool,
        params: &QuoteListParams,
    ) -> Result<Vec<Quote>, sqlx::Error> {
        let mut conditions = Vec::new();
        if params.status.is_some() {
            conditions.push("q.status = ?");
        }
        if params.tag.is_some() {
            conditions.push(
                "EXISTS (SELECT 1 FROM quote_tags qt JOIN tags t ON t.id = qt.tag_id \
                 WHERE qt.quote_id = q.id AND (t.name = ? OR CAST(t.id AS TEXT) = ?))",
            );
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let query = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q {where_clause} {NEWEST_FIRST} LIMIT ? OFFSET ?"
        );
        let mut q = sqlx::query_as::<_, Quote>(&query);
        if let Some(status) = &params.status {
            q = q.bind(status);
        }
        if let Some(tag) = &params.tag {
            q = q.bind(normalize_tag_name(tag)).bind(tag.trim().to_string());
        }
        q.bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Returns `None` if no quote with `id` exists.
    ///
    /// `author` and `source` use `Option<Option<String>>`: an explicit `null`
    /// clears the value, an absent field keeps it.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateQuote,
    ) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!(
            "UPDATE quotes SET \
                 text   = COALESCE(?, text), \
                 author = CASE WHEN ? THEN ? ELSE author END, \
                 source = CASE WHEN ? THEN ? ELSE source END, \
                 status = COALESCE(?, status), \
                 updated_at = {NOW_SQL} \
             WHERE id = ? \
             RETURNING {QUOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(&input.text)
            .bind(input.author.is_some())
            .bind(input.author.as_ref().and_then(|v| v.as_deref()))
            .bind(input.source.is_some())
            .bind(input.source.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.status)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a quote. Its tag links cascade.
    ///
    /// Returns `true` if a quote was deleted.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Widget candidates
    // -----------------------------------------------------------------------

    pub async fn count_candidates(pool: &SqlitePool, tags: &[DbId]) -> Result<i64, sqlx::Error> {
        let query = format!(
            "SELECT COUNT(*) FROM quotes q WHERE {}",
            candidate_clause("q", tags.len())
        );
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for tag in tags {
            q = q.bind(tag);
        }
        q.fetch_one(pool).await
    }

    /// The candidate at zero-based `offset` in newest-first order.
    pub async fn candidate_at(
        pool: &SqlitePool,
        tags: &[DbId],
        offset: i64,
    ) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!(
            "SELECT {QUOTE_COLUMNS} FROM quotes q WHERE {} {NEWEST_FIRST} LIMIT 1 OFFSET ?",
            candidate_clause("q", tags.len())
        );
        let mut q = sqlx::query_as::<_, Quote>(&query);
        for tag in tags {
            q = q.bind(tag);
        }
        q.bind(offset).fetch_optional(pool).await
    }

    /// One-based newest-first position of `quote_id` among the candidates,
    /// or `None` if it is not a candidate.
    pub async fn candidate_position(
        pool: &SqlitePool,
        tags: &[DbId],
        quote_id: DbId,
    ) -> Result<Option<i64>, sqlx::Error> {
        let query = format!(
            "SELECT 1 + (\
                 SELECT COUNT(*) FROM quotes q WHERE {} \
                 AND (q.created_at > c.created_at \
                      OR (q.created_at = c.created_at AND q.id > c.id))\
             ) \
             FROM quotes c WHERE c.id = ? AND {}",
            candidate_clause("q", tags.len()),
            candidate_clause("c", tags.len()),
        );
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for tag in tags {
            q = q.bind(tag);
        }
        q = q.bind(quote_id);
        for tag in tags {
            q = q.bind(tag);
        }
        q.fetch_optional(pool).await
    }
}

/// Condition selecting candidates under table alias `alias`, with one bind
/// parameter per filter tag.
fn candidate_clause(alias: &str, tag_count: usize) -> String {
    let mut clause = format!("{alias}.status = '{}'", status::PUBLISH);
    if tag_count > 0 {
        clause.push_str(&format!(
            " AND EXISTS (SELECT 1 FROM quote_tags qt \
             WHERE qt.quote_id = {alias}.id AND qt.tag_id IN ({}))",
            placeholders(tag_count)
        ));
    }
    clause
}
