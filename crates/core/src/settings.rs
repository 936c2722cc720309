//! Widget instance settings: typed configuration, defaults, and validation
//! of administrator submissions.
//!
//! Validation never fails. Invalid numeric input is replaced with the field's
//! default and reported; unknown tags are dropped and reported. The caller
//! persists [`SettingsValidation::settings`] and shows
//! [`SettingsValidation::errors`] to the administrator.

use std::collections::HashMap;

use rust_i18n::t;
use serde::{Deserialize, Serialize};

use crate::selection::QuoteOrder;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_TITLE: &str = "Quotes Widget";
pub const DEFAULT_SHOW_AUTHOR: bool = true;
pub const DEFAULT_SHOW_SOURCE: bool = false;
pub const DEFAULT_AJAX_REFRESH: bool = true;
pub const DEFAULT_AUTO_REFRESH: bool = false;
pub const DEFAULT_RANDOM_REFRESH: bool = true;

pub const REFRESH_INTERVAL_MIN: u32 = 1;
pub const REFRESH_INTERVAL_MAX: u32 = 60;
pub const DEFAULT_REFRESH_INTERVAL: u32 = 5;

/// 0 disables truncation.
pub const DEFAULT_CHAR_LIMIT: u32 = 500;

// ---------------------------------------------------------------------------
// Stored configuration
// ---------------------------------------------------------------------------

/// Validated configuration of one placed widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetSettings {
    pub widget_id: String,
    pub title: String,
    pub show_author: bool,
    pub show_source: bool,
    pub ajax_refresh: bool,
    pub auto_refresh: bool,
    pub random_refresh: bool,
    /// Seconds between automatic refreshes, always in `[1, 60]`.
    pub refresh_interval: u32,
    pub char_limit: u32,
    /// Resolved tag ids; empty means no tag restriction.
    pub tags: Vec<DbId>,
}

impl WidgetSettings {
    /// Settings for a freshly placed widget.
    pub fn with_defaults(widget_id: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            title: DEFAULT_TITLE.to_string(),
            show_author: DEFAULT_SHOW_AUTHOR,
            show_source: DEFAULT_SHOW_SOURCE,
            ajax_refresh: DEFAULT_AJAX_REFRESH,
            auto_refresh: DEFAULT_AUTO_REFRESH,
            random_refresh: DEFAULT_RANDOM_REFRESH,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            char_limit: DEFAULT_CHAR_LIMIT,
            tags: Vec::new(),
        }
    }

    pub fn order(&self) -> QuoteOrder {
        if self.random_refresh {
            QuoteOrder::Random
        } else {
            QuoteOrder::Newest
        }
    }

    /// Render these settings back into submission form (tags as ids).
    pub fn to_submission(&self) -> SettingsSubmission {
        SettingsSubmission {
            title: Some(self.title.clone()),
            show_author: Some(FormValue::Bool(self.show_author)),
            show_source: Some(FormValue::Bool(self.show_source)),
            ajax_refresh: Some(FormValue::Bool(self.ajax_refresh)),
            auto_refresh: Some(FormValue::Bool(self.auto_refresh)),
            random_refresh: Some(FormValue::Bool(self.random_refresh)),
            refresh_interval: Some(FormValue::Int(i64::from(self.refresh_interval))),
            char_limit: Some(FormValue::Int(i64::from(self.char_limit))),
            tags: Some(FormValue::Text(join_ids(&self.tags))),
        }
    }
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self::with_defaults(String::new())
    }
}

fn join_ids(ids: &[DbId]) -> String {
    ids.iter()
        .map(DbId::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A single submitted form value.
///
/// HTML forms send everything as text; JSON clients may send booleans and
/// numbers directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FormValue {
    /// Checkbox semantics: empty, `0`, `false` and `off` are unchecked.
    pub fn is_truthy(&self) -> bool {
        match self {
            FormValue::Bool(b) => *b,
            FormValue::Int(i) => *i != 0,
            FormValue::Float(f) => *f != 0.0,
            FormValue::Text(s) => !matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "" | "0" | "false" | "off"
            ),
        }
    }

    /// The value as a finite number, if it looks numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormValue::Bool(_) => None,
            FormValue::Int(i) => Some(*i as f64),
            FormValue::Float(f) => f.is_finite().then_some(*f),
            FormValue::Text(s) => parse_numeric(s),
        }
    }

    /// The value as the administrator typed it, for error reporting.
    pub fn raw(&self) -> String {
        match self {
            FormValue::Bool(b) => b.to_string(),
            FormValue::Int(i) => i.to_string(),
            FormValue::Float(f) => f.to_string(),
            FormValue::Text(s) => s.clone(),
        }
    }
}

/// Lenient numeric check: optional surrounding whitespace, sign, decimal
/// point and exponent. `inf`, `nan`, hex and empty strings are rejected.
fn parse_numeric(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty()
        || !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Raw settings as submitted by the administrator.
///
/// Field names match the settings form: `title, show_author, show_source,
/// ajax_refresh, auto_refresh, random_refresh, refresh_interval, tags,
/// char_limit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsSubmission {
    pub title: Option<String>,
    pub show_author: Option<FormValue>,
    pub show_source: Option<FormValue>,
    pub ajax_refresh: Option<FormValue>,
    pub auto_refresh: Option<FormValue>,
    pub random_refresh: Option<FormValue>,
    pub refresh_interval: Option<FormValue>,
    pub char_limit: Option<FormValue>,
    /// Comma-separated tag names or ids.
    pub tags: Option<FormValue>,
}

impl SettingsSubmission {
    /// The non-empty, trimmed tag tokens of the submission, in input order.
    pub fn tag_tokens(&self) -> Vec<String> {
        self.tags
            .as_ref()
            .map(|v| split_tag_tokens(&v.raw()))
            .unwrap_or_default()
    }
}

/// Split a comma-separated tag list into trimmed, non-empty tokens.
pub fn split_tag_tokens(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Tag vocabulary
// ---------------------------------------------------------------------------

/// Existence check and resolution of tag tokens.
pub trait TagLookup {
    /// Resolve a token (tag name, case-insensitive, or numeric id) to a tag id.
    fn resolve(&self, token: &str) -> Option<DbId>;
}

/// A snapshot of (part of) the tag vocabulary.
///
/// Built by the persistence layer for the tokens of one submission, or by
/// hand in tests.
#[derive(Debug, Clone, Default)]
pub struct TagVocabulary {
    by_name: HashMap<String, DbId>,
    names: HashMap<DbId, String>,
}

impl TagVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: DbId, display_name: impl Into<String>) {
        let display_name = display_name.into();
        self.by_name.insert(normalize_tag_name(&display_name), id);
        self.names.insert(id, display_name);
    }

    pub fn with_tag(mut self, id: DbId, display_name: impl Into<String>) -> Self {
        self.insert(id, display_name);
        self
    }

    /// Display name of a tag that still exists.
    pub fn name_of(&self, id: DbId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }
}

impl TagLookup for TagVocabulary {
    /// An existing id wins over a tag whose name happens to be numeric, so
    /// that settings written back as ids resolve to the same tags.
    fn resolve(&self, token: &str) -> Option<DbId> {
        token
            .trim()
            .parse::<DbId>()
            .ok()
            .filter(|id| self.names.contains_key(id))
            .or_else(|| self.by_name.get(&normalize_tag_name(token)).copied())
    }
}

/// Normalize a tag name: trim whitespace and lowercase.
pub fn normalize_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsField {
    RefreshInterval,
    CharLimit,
}

/// A non-fatal problem found while validating a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum SettingsError {
    /// A numeric field was non-numeric or out of range; the default was used.
    RangeError {
        field: SettingsField,
        offending_value: String,
    },
    /// Some tags did not resolve and were removed from the filter.
    UnknownTag { offending_tags: Vec<String> },
}

impl SettingsError {
    /// Human-readable message for the settings form.
    pub fn message(&self, locale: &str) -> String {
        match self {
            SettingsError::RangeError {
                field: SettingsField::RefreshInterval,
                offending_value,
            } => t!(
                "settings.refresh_interval_invalid",
                locale = locale,
                min = REFRESH_INTERVAL_MIN,
                max = REFRESH_INTERVAL_MAX,
                value = offending_value
            )
            .to_string(),
            SettingsError::RangeError {
                field: SettingsField::CharLimit,
                offending_value,
            } => t!(
                "settings.char_limit_invalid",
                locale = locale,
                value = offending_value
            )
            .to_string(),
            SettingsError::UnknownTag { offending_tags } => {
                let tags = offending_tags.join(", ");
                t!("settings.unknown_tags", locale = locale, tags = tags).to_string()
            }
        }
    }
}

/// Corrected settings plus the problems found on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsValidation {
    pub settings: WidgetSettings,
    pub errors: Vec<SettingsError>,
}

impl SettingsValidation {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a settings submission against the previous settings of the same
/// widget. Every field is overwritten; only `widget_id` carries over.
pub fn validate_settings(
    submission: &SettingsSubmission,
    previous: &WidgetSettings,
    vocabulary: &impl TagLookup,
) -> SettingsValidation {
    let mut errors = Vec::new();
    let mut settings = previous.clone();

    settings.title = submission
        .title
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();

    settings.show_author = truthy(&submission.show_author);
    settings.show_source = truthy(&submission.show_source);
    settings.ajax_refresh = truthy(&submission.ajax_refresh);
    settings.auto_refresh = truthy(&submission.auto_refresh);
    settings.random_refresh = truthy(&submission.random_refresh);

    settings.refresh_interval = match bounded_int(
        submission.refresh_interval.as_ref(),
        REFRESH_INTERVAL_MIN,
        REFRESH_INTERVAL_MAX,
    ) {
        Some(v) => v,
        None => {
            errors.push(range_error(
                SettingsField::RefreshInterval,
                submission.refresh_interval.as_ref(),
            ));
            DEFAULT_REFRESH_INTERVAL
        }
    };

    settings.char_limit = match bounded_int(submission.char_limit.as_ref(), 0, u32::MAX) {
        Some(v) => v,
        None => {
            errors.push(range_error(
                SettingsField::CharLimit,
                submission.char_limit.as_ref(),
            ));
            DEFAULT_CHAR_LIMIT
        }
    };

    let (tags, unknown) = resolve_tags(&submission.tag_tokens(), vocabulary);
    settings.tags = tags;
    if !unknown.is_empty() {
        errors.push(SettingsError::UnknownTag {
            offending_tags: unknown,
        });
    }

    SettingsValidation { settings, errors }
}

/// Resolve tag tokens, returning deduplicated ids (first-seen order) and the
/// tokens that did not resolve.
pub fn resolve_tags(tokens: &[String], vocabulary: &impl TagLookup) -> (Vec<DbId>, Vec<String>) {
    let mut resolved: Vec<DbId> = Vec::new();
    let mut unknown = Vec::new();

    for token in tokens {
        match vocabulary.resolve(token) {
            Some(id) => {
                if !resolved.contains(&id) {
                    resolved.push(id);
                }
            }
            None => unknown.push(token.clone()),
        }
    }

    (resolved, unknown)
}

fn truthy(value: &Option<FormValue>) -> bool {
    value.as_ref().is_some_and(FormValue::is_truthy)
}

/// Parse a numeric form value, truncate toward zero, and check `[min, max]`.
pub fn bounded_int(value: Option<&FormValue>, min: u32, max: u32) -> Option<u32> {
    let n = value?.as_number()?.trunc();
    if n < f64::from(min) || n > f64::from(max) {
        return None;
    }
    Some(n as u32)
}

fn range_error(field: SettingsField, value: Option<&FormValue>) -> SettingsError {
    SettingsError::RangeError {
        field,
        offending_value: value.map(FormValue::raw).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// Form view
// ---------------------------------------------------------------------------

/// Settings as shown in the edit form: tag ids become the names of the tags
/// that still exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsForm {
    pub widget_id: String,
    pub title: String,
    pub show_author: bool,
    pub show_source: bool,
    pub ajax_refresh: bool,
    pub auto_refresh: bool,
    pub random_refresh: bool,
    pub refresh_interval: u32,
    pub char_limit: u32,
    pub tags: String,
}

impl SettingsForm {
    pub fn new(settings: &WidgetSettings, vocabulary: &TagVocabulary) -> Self {
        let tags = settings
            .tags
            .iter()
            .filter_map(|id| vocabulary.name_of(*id))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            widget_id: settings.widget_id.clone(),
            title: settings.title.clone(),
            show_author: settings.show_author,
            show_source: settings.show_source,
            ajax_refresh: settings.ajax_refresh,
            auto_refresh: settings.auto_refresh,
            random_refresh: settings.random_refresh,
            refresh_interval: settings.refresh_interval,
            char_limit: settings.char_limit,
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn text(s: &str) -> Option<FormValue> {
        Some(FormValue::Text(s.to_string()))
    }

    fn vocabulary() -> TagVocabulary {
        TagVocabulary::new()
            .with_tag(10, "existing")
            .with_tag(11, "News")
    }

    fn valid_submission() -> SettingsSubmission {
        SettingsSubmission {
            title: Some("  My quotes ".into()),
            show_author: text("on"),
            show_source: text("1"),
            ajax_refresh: text("1"),
            auto_refresh: None,
            random_refresh: text("0"),
            refresh_interval: text("10"),
            char_limit: text("200"),
            tags: text("news"),
        }
    }

    fn validate(submission: &SettingsSubmission) -> SettingsValidation {
        validate_settings(
            submission,
            &WidgetSettings::with_defaults("quotes-widget-1"),
            &vocabulary(),
        )
    }

    // -- Strings and booleans ----------------------------------------------

    #[test]
    fn title_is_trimmed_and_widget_id_kept() {
        let result = validate(&valid_submission());
        assert_eq!(result.settings.title, "My quotes");
        assert_eq!(result.settings.widget_id, "quotes-widget-1");
    }

    #[test]
    fn booleans_follow_checkbox_truthiness() {
        let result = validate(&valid_submission());
        assert!(result.settings.show_author);
        assert!(result.settings.show_source);
        assert!(result.settings.ajax_refresh);
        assert!(!result.settings.auto_refresh);
        assert!(!result.settings.random_refresh);
        assert!(result.is_clean());
    }

    #[test]
    fn json_values_are_accepted() {
        let submission: SettingsSubmission = serde_json::from_value(serde_json::json!({
            "title": "t",
            "show_author": false,
            "auto_refresh": true,
            "refresh_interval": 30,
            "char_limit": 0,
            "tags": ""
        }))
        .unwrap();
        let result = validate(&submission);
        assert!(!result.settings.show_author);
        assert!(result.settings.auto_refresh);
        assert_eq!(result.settings.refresh_interval, 30);
        assert_eq!(result.settings.char_limit, 0);
        assert!(result.is_clean());
    }

    // -- refresh_interval ----------------------------------------------------

    #[test]
    fn every_interval_in_range_is_accepted_unchanged() {
        for n in REFRESH_INTERVAL_MIN..=REFRESH_INTERVAL_MAX {
            let mut submission = valid_submission();
            submission.refresh_interval = text(&n.to_string());
            let result = validate(&submission);
            assert_eq!(result.settings.refresh_interval, n);
            assert!(result.is_clean(), "interval {n} should be valid");
        }
    }

    #[test]
    fn out_of_range_intervals_fall_back_to_default() {
        for bad in ["0", "61", "-3", "abc", "", "inf", "0x10"] {
            let mut submission = valid_submission();
            submission.refresh_interval = text(bad);
            let result = validate(&submission);
            assert_eq!(result.settings.refresh_interval, DEFAULT_REFRESH_INTERVAL);
            assert_eq!(
                result.errors,
                vec![SettingsError::RangeError {
                    field: SettingsField::RefreshInterval,
                    offending_value: bad.to_string(),
                }]
            );
        }
    }

    #[test]
    fn decimal_interval_is_truncated() {
        let mut submission = valid_submission();
        submission.refresh_interval = text(" 7.9 ");
        assert_eq!(validate(&submission).settings.refresh_interval, 7);
    }

    #[test]
    fn missing_interval_is_an_error_with_empty_value() {
        let mut submission = valid_submission();
        submission.refresh_interval = None;
        let result = validate(&submission);
        assert_matches!(
            result.errors.as_slice(),
            [SettingsError::RangeError { field: SettingsField::RefreshInterval, offending_value }]
                if offending_value.is_empty()
        );
    }

    // -- char_limit ------------------------------------------------------------

    #[test]
    fn non_negative_char_limits_are_accepted() {
        for n in [0u32, 1, 500, 10_000] {
            let mut submission = valid_submission();
            submission.char_limit = text(&n.to_string());
            let result = validate(&submission);
            assert_eq!(result.settings.char_limit, n);
            assert!(result.is_clean());
        }
    }

    #[test]
    fn negative_or_non_numeric_char_limit_falls_back() {
        for bad in ["-1", "-5", "lots", "1e20"] {
            let mut submission = valid_submission();
            submission.char_limit = text(bad);
            let result = validate(&submission);
            assert_eq!(result.settings.char_limit, DEFAULT_CHAR_LIMIT);
            assert_eq!(
                result.errors,
                vec![SettingsError::RangeError {
                    field: SettingsField::CharLimit,
                    offending_value: bad.to_string(),
                }]
            );
        }
    }

    // -- tags ----------------------------------------------------------------

    #[test]
    fn duplicate_and_unknown_tags() {
        let mut submission = valid_submission();
        submission.tags = text("existing, missing, existing");
        let result = validate(&submission);
        assert_eq!(result.settings.tags, vec![10]);
        assert_eq!(
            result.errors,
            vec![SettingsError::UnknownTag {
                offending_tags: vec!["missing".to_string()],
            }]
        );
    }

    #[test]
    fn tag_names_are_case_insensitive_and_ids_resolve() {
        let mut submission = valid_submission();
        submission.tags = text(" NEWS ,, 10 ,");
        let result = validate(&submission);
        assert_eq!(result.settings.tags, vec![11, 10]);
        assert!(result.is_clean());
    }

    #[test]
    fn unknown_numeric_id_is_reported() {
        let mut submission = valid_submission();
        submission.tags = text("999");
        let result = validate(&submission);
        assert!(result.settings.tags.is_empty());
        assert_eq!(result.errors.len(), 1);
    }

    // -- Whole submissions -----------------------------------------------------

    #[test]
    fn invalid_submission_end_to_end() {
        let submission = SettingsSubmission {
            refresh_interval: text("99"),
            char_limit: text("-5"),
            tags: text("news,bogus"),
            ..valid_submission()
        };
        let result = validate(&submission);

        assert_eq!(result.settings.refresh_interval, 5);
        assert_eq!(result.settings.char_limit, 500);
        assert_eq!(result.settings.tags, vec![11]);
        assert_eq!(result.errors.len(), 3);
        assert_matches!(
            &result.errors[2],
            SettingsError::UnknownTag { offending_tags } if offending_tags == &vec!["bogus".to_string()]
        );
    }

    #[test]
    fn revalidating_valid_settings_is_idempotent() {
        let first = validate(&valid_submission());
        let second = validate_settings(
            &first.settings.to_submission(),
            &first.settings,
            &vocabulary(),
        );
        assert_eq!(second.settings, first.settings);
        assert!(second.is_clean());
    }

    #[test]
    fn revalidating_corrected_settings_is_idempotent() {
        let submission = SettingsSubmission {
            refresh_interval: text("abc"),
            char_limit: text("-1"),
            tags: text("existing, nope"),
            ..valid_submission()
        };
        let first = validate(&submission);
        let second = validate_settings(
            &first.settings.to_submission(),
            &first.settings,
            &vocabulary(),
        );
        assert_eq!(second.settings, first.settings);
        assert!(second.is_clean());
    }

    #[test]
    fn numeric_tag_name_does_not_shadow_an_existing_id() {
        let vocabulary = TagVocabulary::new()
            .with_tag(1, "2024")
            .with_tag(2024, "history");
        let submission = SettingsSubmission {
            tags: text("history"),
            ..valid_submission()
        };
        let defaults = WidgetSettings::with_defaults("quotes-widget-1");

        let first = validate_settings(&submission, &defaults, &vocabulary);
        assert_eq!(first.settings.tags, vec![2024]);

        let second = validate_settings(&first.settings.to_submission(), &first.settings, &vocabulary);
        assert_eq!(second.settings.tags, vec![2024]);
        assert_eq!(second.settings, first.settings);
    }

    // -- Messages and form view ------------------------------------------------

    #[test]
    fn error_messages_include_offending_value() {
        let err = SettingsError::RangeError {
            field: SettingsField::RefreshInterval,
            offending_value: "99".into(),
        };
        let message = err.message("en");
        assert!(message.contains("99"));
        assert!(message.contains("60"));

        let err = SettingsError::UnknownTag {
            offending_tags: vec!["a".into(), "b".into()],
        };
        assert!(err.message("fr").contains("a, b"));
    }

    #[test]
    fn errors_serialize_with_kind_tag() {
        let err = SettingsError::RangeError {
            field: SettingsField::CharLimit,
            offending_value: "-5".into(),
        };
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "RangeError");
        assert_eq!(json["field"], "char_limit");
        assert_eq!(json["offending_value"], "-5");
    }

    #[test]
    fn form_view_lists_only_existing_tag_names() {
        let mut settings = WidgetSettings::with_defaults("w");
        settings.tags = vec![11, 404, 10];
        let form = SettingsForm::new(&settings, &vocabulary());
        assert_eq!(form.tags, "News, existing");
    }
}
