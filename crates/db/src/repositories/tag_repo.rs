//! Repository for the `tags` and `quote_tags` tables.
//!
//! Provides tag creation, listing, autocomplete suggestions, quote-tag
//! links, and the vocabulary snapshots used by settings validation.

use quotes_core::settings::{normalize_tag_name, TagVocabulary};
use quotes_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::tag::{Tag, TagInfo, TagListParams, TagSuggestion};
use crate::repositories::{clamp_limit, clamp_offset, placeholders};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "id, name, display_name, created_at";

/// Default suggestion count for autocomplete.
const DEFAULT_SUGGEST_LIMIT: i64 = 10;

/// Maximum suggestion count for autocomplete.
const MAX_SUGGEST_LIMIT: i64 = 50;

/// Provides tag vocabulary and quote-tag operations.
pub struct TagRepo;

impl TagRepo {
    // -----------------------------------------------------------------------
    // Vocabulary
    // -----------------------------------------------------------------------

    /// Create a tag or return the existing one if the normalized name already exists.
    ///
    /// The `display_name` is updated on conflict so the most recent casing is
    /// preserved.
    pub async fn create_or_get(pool: &SqlitePool, display_name: &str) -> Result<Tag, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::create_or_get_in(&mut conn, display_name).await
    }

    async fn create_or_get_in(
        conn: &mut SqliteConnection,
        display_name: &str,
    ) -> Result<Tag, sqlx::Error> {
        let display_name = display_name.trim();
        let query = format!(
            "INSERT INTO tags (name, display_name) VALUES (?, ?) \
             ON CONFLICT (name) DO UPDATE SET display_name = excluded.display_name \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(normalize_tag_name(display_name))
            .bind(display_name)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tags alphabetically.
    pub async fn list(pool: &SqlitePool, params: &TagListParams) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY name LIMIT ? OFFSET ?");
        sqlx::query_as::<_, Tag>(&query)
            .bind(clamp_limit(params.limit))
            .bind(clamp_offset(params.offset))
            .fetch_all(pool)
            .await
    }

    /// Autocomplete suggestions: prefix-match on normalized name, most used first.
    pub async fn suggest(
        pool: &SqlitePool,
        prefix: &str,
        limit: Option<i64>,
    ) -> Result<Vec<TagSuggestion>, sqlx::Error> {
        let limit = limit
            .unwrap_or(DEFAULT_SUGGEST_LIMIT)
            .clamp(1, MAX_SUGGEST_LIMIT);
        let pattern = format!("{}%", escape_like(&normalize_tag_name(prefix)));

        sqlx::query_as::<_, TagSuggestion>(
            "SELECT t.id, t.name, t.display_name, \
                    (SELECT COUNT(*) FROM quote_tags qt WHERE qt.tag_id = t.id) AS usage_count \
             FROM tags t \
             WHERE t.name LIKE ? ESCAPE '\\' \
             ORDER BY usage_count DESC, t.name \
             LIMIT ?",
        )
        .bind(pattern)
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Vocabulary snapshot covering `tokens`, which may be names or ids.
    pub async fn vocabulary_for(
        pool: &SqlitePool,
        tokens: &[String],
    ) -> Result<TagVocabulary, sqlx::Error> {
        if tokens.is_empty() {
            return Ok(TagVocabulary::new());
        }
        let names: Vec<String> = tokens.iter().map(|t| normalize_tag_name(t)).collect();
        let ids: Vec<DbId> = tokens.iter().filter_map(|t| t.trim().parse().ok()).collect();

        let mut query = format!(
            "SELECT id, name, display_name FROM tags WHERE name IN ({})",
            placeholders(names.len())
        );
        if !ids.is_empty() {
            query.push_str(&format!(" OR id IN ({})", placeholders(ids.len())));
        }

        let mut q = sqlx::query_as::<_, TagInfo>(&query);
        for name in &names {
            q = q.bind(name);
        }
        for id in &ids {
            q = q.bind(id);
        }
        Ok(vocabulary_from(q.fetch_all(pool).await?))
    }

    /// Vocabulary snapshot of the tags in `ids` that still exist.
    pub async fn vocabulary_for_ids(
        pool: &SqlitePool,
        ids: &[DbId],
    ) -> Result<TagVocabulary, sqlx::Error> {
        if ids.is_empty() {
            return Ok(TagVocabulary::new());
        }
        let query = format!(
            "SELECT id, name, display_name FROM tags WHERE id IN ({})",
            placeholders(ids.len())
        );
        let mut q = sqlx::query_as::<_, TagInfo>(&query);
        for id in ids {
            q = q.bind(id);
        }
        Ok(vocabulary_from(q.fetch_all(pool).await?))
    }

    // -----------------------------------------------------------------------
    // Quote-tag links
    // -----------------------------------------------------------------------

    pub async fn tags_for_quote(
        pool: &SqlitePool,
        quote_id: DbId,
    ) -> Result<Vec<TagInfo>, sqlx::Error> {
        sqlx::query_as::<_, TagInfo>(
            "SELECT t.id, t.name, t.display_name \
             FROM quote_tags qt \
             JOIN tags t ON t.id = qt.tag_id \
             WHERE qt.quote_id = ? \
             ORDER BY t.name",
        )
        .bind(quote_id)
        .fetch_all(pool)
        .await
    }

    /// Replace the tag set of a quote by name.
    ///
    /// Tags are created on first use and blank names are skipped. Everything
    /// happens in one transaction; an empty list clears the quote's tags.
    pub async fn set_quote_tags(
        pool: &SqlitePool,
        quote_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        Self::set_quote_tags_in(&mut tx, quote_id, names).await?;
        tx.commit().await
    }

    /// [`Self::set_quote_tags`] on a connection the caller owns, typically
    /// inside a larger transaction.
    pub(crate) async fn set_quote_tags_in(
        conn: &mut SqliteConnection,
        quote_id: DbId,
        names: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut tag_ids: Vec<DbId> = Vec::new();
        for name in names {
            if normalize_tag_name(name).is_empty() {
                continue;
            }
            let tag = Self::create_or_get_in(conn, name).await?;
            if !tag_ids.contains(&tag.id) {
                tag_ids.push(tag.id);
            }
        }

        sqlx::query("DELETE FROM quote_tags WHERE quote_id = ?")
            .bind(quote_id)
            .execute(&mut *conn)
            .await?;

        for tag_id in &tag_ids {
            sqlx::query("INSERT INTO quote_tags (quote_id, tag_id) VALUES (?, ?)")
                .bind(quote_id)
                .bind(tag_id)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

fn vocabulary_from(rows: Vec<TagInfo>) -> TagVocabulary {
    let mut vocabulary = TagVocabulary::new();
    for row in rows {
        vocabulary.insert(row.id, row.display_name);
    }
    vocabulary
}

/// Escape `LIKE` wildcards so a prefix matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
