//! Repository for the `widget_instances` table.

use quotes_core::settings::WidgetSettings;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::widget::WidgetInstance;
use crate::repositories::NOW_SQL;

/// Column list for `widget_instances` queries.
const WIDGET_COLUMNS: &str = "\
    id, widget_id, title, show_author, show_source, ajax_refresh, auto_refresh, \
    random_refresh, refresh_interval, char_limit, tags, created_at, updated_at";

/// Prefix of assigned widget identifiers (`quotes-widget-7`).
pub const WIDGET_ID_PREFIX: &str = "quotes-widget-";

/// Provides placement, settings persistence, and removal of widget instances.
pub struct WidgetRepo;

impl WidgetRepo {
    /// Place a new instance with default settings under `title` and assign
    /// its identifier.
    pub async fn place(pool: &SqlitePool, title: &str) -> Result<WidgetInstance, sqlx::Error> {
        let defaults = WidgetSettings::default();
        let mut tx = pool.begin().await?;

        // The identifier derives from the row id. Writes are serialized, so
        // a fixed placeholder never outlives this transaction.
        let placeholder = format!("{WIDGET_ID_PREFIX}pending");
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO widget_instances \
                 (widget_id, title, show_author, show_source, ajax_refresh, auto_refresh, \
                  random_refresh, refresh_interval, char_limit, tags) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(&placeholder)
        .bind(title)
        .bind(defaults.show_author)
        .bind(defaults.show_source)
        .bind(defaults.ajax_refresh)
        .bind(defaults.auto_refresh)
        .bind(defaults.random_refresh)
        .bind(i64::from(defaults.refresh_interval))
        .bind(i64::from(defaults.char_limit))
        .bind(Json(&defaults.tags))
        .fetch_one(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE widget_instances SET widget_id = ? WHERE id = ? RETURNING {WIDGET_COLUMNS}"
        );
        let instance = sqlx::query_as::<_, WidgetInstance>(&query)
            .bind(format!("{WIDGET_ID_PREFIX}{id}"))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(instance)
    }

    pub async fn find(
        pool: &SqlitePool,
        widget_id: &str,
    ) -> Result<Option<WidgetInstance>, sqlx::Error> {
        let query = format!("SELECT {WIDGET_COLUMNS} FROM widget_instances WHERE widget_id = ?");
        sqlx::query_as::<_, WidgetInstance>(&query)
            .bind(widget_id)
            .fetch_optional(pool)
            .await
    }

    /// All placed instances in placement order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<WidgetInstance>, sqlx::Error> {
        let query = format!("SELECT {WIDGET_COLUMNS} FROM widget_instances ORDER BY id");
        sqlx::query_as::<_, WidgetInstance>(&query)
            .fetch_all(pool)
            .await
    }

    /// Persist validated settings. Returns `None` if the instance was removed.
    pub async fn save(
        pool: &SqlitePool,
        settings: &WidgetSettings,
    ) -> Result<Option<WidgetInstance>, sqlx::Error> {
        let query = format!(
            "UPDATE widget_instances SET \
                 title = ?, show_author = ?, show_source = ?, ajax_refresh = ?, \
                 auto_refresh = ?, random_refresh = ?, refresh_interval = ?, \
                 char_limit = ?, tags = ?, updated_at = {NOW_SQL} \
             WHERE widget_id = ? \
             RETURNING {WIDGET_COLUMNS}"
        );
        sqlx::query_as::<_, WidgetInstance>(&query)
            .bind(&settings.title)
            .bind(settings.show_author)
            .bind(settings.show_source)
            .bind(settings.ajax_refresh)
            .bind(settings.auto_refresh)
            .bind(settings.random_refresh)
            .bind(i64::from(settings.refresh_interval))
            .bind(i64::from(settings.char_limit))
            .bind(Json(&settings.tags))
            .bind(&settings.widget_id)
            .fetch_optional(pool)
            .await
    }

    /// Remove an instance. Returns `true` if one was deleted.
    pub async fn delete(pool: &SqlitePool, widget_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM widget_instances WHERE widget_id = ?")
            .bind(widget_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
