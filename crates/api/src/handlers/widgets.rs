//! Handlers for placed widget instances: placement, the settings form,
//! settings submission, removal, and server-side rendering.

use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::{Form, Json};
use chrono::Utc;
use quotes_core::i18n::default_title;
use quotes_core::render::{RenderContext, RenderedWidget};
use quotes_core::selection::{select_initial, QuoteFilter};
use quotes_core::settings::{
    validate_settings, SettingsError, SettingsForm, SettingsSubmission, WidgetSettings,
};
use quotes_core::tokens::REFRESH_ACTION;
use quotes_db::models::widget::WidgetInstance;
use quotes_db::repositories::{TagRepo, WidgetRepo};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::locale::request_locale;
use crate::query::LocaleParams;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// A settings submission sent either as JSON or as an HTML form.
pub struct SettingsPayload(pub SettingsSubmission);

impl<S> FromRequest<S> for SettingsPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        let submission = if is_json {
            let Json(submission) = Json::<SettingsSubmission>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            submission
        } else {
            let Form(submission) = Form::<SettingsSubmission>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.body_text()))?;
            submission
        };
        Ok(Self(submission))
    }
}

/// One settings error with its localized message.
#[derive(Debug, Serialize)]
pub struct SettingsErrorView {
    #[serde(flatten)]
    pub error: SettingsError,
    pub message: String,
}

/// Result of a settings submission: what was stored and what was corrected.
#[derive(Debug, Serialize)]
pub struct SettingsOutcome {
    pub settings: WidgetSettings,
    pub errors: Vec<SettingsErrorView>,
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

/// GET /api/v1/widgets
pub async fn list_widgets(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let widgets: Vec<WidgetSettings> = WidgetRepo::list(&state.pool)
        .await?
        .iter()
        .map(WidgetInstance::settings)
        .collect();
    Ok(Json(DataResponse { data: widgets }))
}

/// POST /api/v1/widgets
///
/// Place a new instance with default settings. The default title follows
/// the request locale.
pub async fn place_widget(
    State(state): State<AppState>,
    Query(params): Query<LocaleParams>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let locale = request_locale(&state, params.locale.as_deref(), &headers);
    let instance = WidgetRepo::place(&state.pool, &default_title(locale)).await?;

    tracing::info!(widget_id = %instance.widget_id, "Widget placed");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: instance.settings(),
        }),
    ))
}

/// GET /api/v1/widgets/{widget_id}
///
/// Settings form view: stored tag ids are shown as the names of the tags
/// that still exist.
pub async fn get_widget_form(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let settings = find_widget(&state, &widget_id).await?.settings();
    let vocabulary = TagRepo::vocabulary_for_ids(&state.pool, &settings.tags).await?;
    Ok(Json(DataResponse {
        data: SettingsForm::new(&settings, &vocabulary),
    }))
}

/// PUT /api/v1/widgets/{widget_id}
///
/// Validate and store a settings submission. Invalid fields are replaced by
/// their defaults and reported in `errors`; the request itself succeeds.
pub async fn submit_settings(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
    Query(params): Query<LocaleParams>,
    headers: HeaderMap,
    SettingsPayload(submission): SettingsPayload,
) -> AppResult<impl IntoResponse> {
    let previous = find_widget(&state, &widget_id).await?.settings();
    let vocabulary = TagRepo::vocabulary_for(&state.pool, &submission.tag_tokens()).await?;
    let validation = validate_settings(&submission, &previous, &vocabulary);

    let saved = WidgetRepo::save(&state.pool, &validation.settings)
        .await?
        .ok_or_else(|| widget_not_found(&widget_id))?;

    let locale = request_locale(&state, params.locale.as_deref(), &headers);
    let errors: Vec<SettingsErrorView> = validation
        .errors
        .into_iter()
        .map(|error| SettingsErrorView {
            message: error.message(locale),
            error,
        })
        .collect();

    tracing::info!(
        widget_id = %widget_id,
        error_count = errors.len(),
        "Widget settings saved",
    );

    Ok(Json(DataResponse {
        data: SettingsOutcome {
            settings: saved.settings(),
            errors,
        },
    }))
}

/// DELETE /api/v1/widgets/{widget_id}
pub async fn remove_widget(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if !WidgetRepo::delete(&state.pool, &widget_id).await? {
        return Err(widget_not_found(&widget_id));
    }

    tracing::info!(widget_id = %widget_id, "Widget removed");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// GET /api/v1/widgets/{widget_id}/render
///
/// The rendered fragment together with the client bootstrap data, for
/// hosts that place the markup and start the refresh controller themselves.
pub async fn render_widget(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
    Query(params): Query<LocaleParams>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let locale = request_locale(&state, params.locale.as_deref(), &headers);
    let rendered = render(&state, &widget_id, locale).await?;
    Ok(Json(DataResponse { data: rendered }))
}

/// GET /widgets/{widget_id}/fragment
///
/// The rendered fragment as HTML.
pub async fn render_fragment(
    State(state): State<AppState>,
    Path(widget_id): Path<String>,
    Query(params): Query<LocaleParams>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    let locale = request_locale(&state, params.locale.as_deref(), &headers);
    let rendered = render(&state, &widget_id, locale).await?;
    Ok(Html(rendered.html))
}

async fn render(state: &AppState, widget_id: &str, locale: &str) -> AppResult<RenderedWidget> {
    let settings = find_widget(state, widget_id).await?.settings();
    let filter = QuoteFilter {
        tags: settings.tags.clone(),
        order: settings.order(),
    };

    let mut rng = StdRng::from_rng(&mut rand::rng());
    let selection = select_initial(&state.catalog(), &filter, settings.char_limit, &mut rng).await?;

    let ctx = RenderContext {
        ajax_url: state.config.refresh_url(),
        nonce: state.signer.issue(REFRESH_ACTION, Utc::now()),
        locale: locale.to_string(),
    };
    let rendered = state.renderer.render(&settings, selection.as_ref(), &ctx)?;

    tracing::debug!(
        widget_id,
        quote_id = selection.as_ref().map(|s| s.quote.id),
        "Widget rendered",
    );

    Ok(rendered)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_widget(state: &AppState, widget_id: &str) -> AppResult<WidgetInstance> {
    WidgetRepo::find(&state.pool, widget_id)
        .await?
        .ok_or_else(|| widget_not_found(widget_id))
}

fn widget_not_found(widget_id: &str) -> AppError {
    AppError::NotFound(format!("Widget {widget_id} not found"))
}
