//! Handlers for the tag vocabulary.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quotes_core::settings::normalize_tag_name;
use quotes_db::models::tag::{CreateTag, TagListParams, TagSuggestParams};
use quotes_db::repositories::TagRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn list_tags(
    State(state): State<AppState>,
    Query(params): Query<TagListParams>,
) -> AppResult<impl IntoResponse> {
    let tags = TagRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// POST /api/v1/tags
///
/// Idempotent: creating an existing name (in any casing) returns that tag.
pub async fn create_tag(
    State(state): State<AppState>,
    Json(input): Json<CreateTag>,
) -> AppResult<impl IntoResponse> {
    if normalize_tag_name(&input.name).is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let tag = TagRepo::create_or_get(&state.pool, &input.name).await?;

    tracing::info!(tag_id = tag.id, name = %tag.name, "Tag created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: tag })))
}

/// GET /api/v1/tags/suggest
///
/// Autocomplete suggestions for the settings form. Returns tags matching the
/// given prefix, most used first.
pub async fn suggest_tags(
    State(state): State<AppState>,
    Query(params): Query<TagSuggestParams>,
) -> AppResult<impl IntoResponse> {
    let suggestions = TagRepo::suggest(&state.pool, &params.prefix, params.limit).await?;
    Ok(Json(DataResponse { data: suggestions }))
}
