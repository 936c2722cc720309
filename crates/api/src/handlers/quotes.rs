//! Handlers for quote administration.
//!
//! Quotes are created, edited, and deleted here; the widget runtime only
//! reads them through [`quotes_db::QuoteCatalog`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use quotes_core::error::CoreError;
use quotes_core::types::DbId;
use quotes_db::models::quote::{CreateQuote, Quote, QuoteListParams, QuoteWithTags, UpdateQuote};
use quotes_db::models::tag::SetQuoteTags;
use quotes_db::repositories::{QuoteRepo, TagRepo};
use quotes_db::DbPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/quotes
///
/// List quotes newest-first, optionally filtered by `tag` and `status`.
pub async fn list_quotes(
    State(state): State<AppState>,
    Query(params): Query<QuoteListParams>,
) -> AppResult<impl IntoResponse> {
    let quotes = QuoteRepo::list(&state.pool, &params).await?;
    Ok(Json(DataResponse { data: quotes }))
}

/// POST /api/v1/quotes
///
/// Create a quote and apply its tags (created on first use).
pub async fn create_quote(
    State(state): State<AppState>,
    Json(input): Json<CreateQuote>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if input.text.trim().is_empty() {
        return Err(CoreError::Validation("text must not be blank".into()).into());
    }

    let quote = QuoteRepo::create(&state.pool, &input).await?;
    let tags = TagRepo::tags_for_quote(&state.pool, quote.id).await?;

    tracing::info!(quote_id = quote.id, tag_count = tags.len(), "Quote created");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: QuoteWithTags { quote, tags },
        }),
    ))
}

/// GET /api/v1/quotes/{id}
pub async fn get_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let quote = find_quote(&state.pool, quote_id).await?;
    let tags = TagRepo::tags_for_quote(&state.pool, quote_id).await?;
    Ok(Json(DataResponse {
        data: QuoteWithTags { quote, tags },
    }))
}

/// PUT /api/v1/quotes/{id}
///
/// Partial update; `"author": null` or `"source": null` clears the field.
pub async fn update_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<DbId>,
    Json(input): Json<UpdateQuote>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    if input.text.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(CoreError::Validation("text must not be blank".into()).into());
    }

    let quote = QuoteRepo::update(&state.pool, quote_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Quote",
            id: quote_id,
        }))?;

    tracing::info!(quote_id, "Quote updated");

    Ok(Json(DataResponse { data: quote }))
}

/// DELETE /api/v1/quotes/{id}
pub async fn delete_quote(
    State(state): State<AppState>,
    Path(quote_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = QuoteRepo::delete(&state.pool, quote_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Quote",
            id: quote_id,
        }));
    }

    tracing::info!(quote_id, "Quote deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Quote tags
// ---------------------------------------------------------------------------

/// GET /api/v1/quotes/{id}/tags
pub async fn get_quote_tags(
    State(state): State<AppState>,
    Path(quote_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_quote(&state.pool, quote_id).await?;
    let tags = TagRepo::tags_for_quote(&state.pool, quote_id).await?;
    Ok(Json(DataResponse { data: tags }))
}

/// PUT /api/v1/quotes/{id}/tags
///
/// Replace a quote's tags by name. Tags are created on first use; an empty
/// list clears them.
pub async fn set_quote_tags(
    State(state): State<AppState>,
    Path(quote_id): Path<DbId>,
    Json(input): Json<SetQuoteTags>,
) -> AppResult<impl IntoResponse> {
    find_quote(&state.pool, quote_id).await?;
    TagRepo::set_quote_tags(&state.pool, quote_id, &input.tag_names).await?;
    let tags = TagRepo::tags_for_quote(&state.pool, quote_id).await?;

    tracing::info!(quote_id, count = tags.len(), "Quote tags replaced");

    Ok(Json(DataResponse { data: tags }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_quote(pool: &DbPool, quote_id: DbId) -> AppResult<Quote> {
    QuoteRepo::find_by_id(pool, quote_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Quote",
            id: quote_id,
        }))
}
