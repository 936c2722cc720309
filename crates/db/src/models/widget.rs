//! Placed widget instances.

use quotes_core::settings::{
    WidgetSettings, DEFAULT_CHAR_LIMIT, DEFAULT_REFRESH_INTERVAL, REFRESH_INTERVAL_MAX,
    REFRESH_INTERVAL_MIN,
};
use quotes_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `widget_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WidgetInstance {
    pub id: DbId,
    pub widget_id: String,
    pub title: String,
    pub show_author: bool,
    pub show_source: bool,
    pub ajax_refresh: bool,
    pub auto_refresh: bool,
    pub random_refresh: bool,
    pub refresh_interval: i64,
    pub char_limit: i64,
    pub tags: Json<Vec<DbId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WidgetInstance {
    /// Convert the row into domain settings.
    ///
    /// The table constraints keep numeric fields in range; anything that
    /// slips through falls back to the defaults.
    pub fn settings(&self) -> WidgetSettings {
        let refresh_interval = u32::try_from(self.refresh_interval)
            .ok()
            .filter(|v| (REFRESH_INTERVAL_MIN..=REFRESH_INTERVAL_MAX).contains(v))
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);
        let char_limit = u32::try_from(self.char_limit).unwrap_or(DEFAULT_CHAR_LIMIT);

        WidgetSettings {
            widget_id: self.widget_id.clone(),
            title: self.title.clone(),
            show_author: self.show_author,
            show_source: self.show_source,
            ajax_refresh: self.ajax_refresh,
            auto_refresh: self.auto_refresh,
            random_refresh: self.random_refresh,
            refresh_interval,
            char_limit,
            tags: self.tags.0.clone(),
        }
    }
}
