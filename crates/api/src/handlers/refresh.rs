//! The refresh endpoint polled by widgets on the page.
//!
//! Responses are not enveloped: a success is a flat [`QuoteResponse`] object
//! and "nothing further to show" is the JSON literal `false`.

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use chrono::Utc;
use quotes_core::error::CoreError;
use quotes_core::refresh::{QuoteResponse, RefreshRequest};
use quotes_core::selection::{select_next, QuoteFilter, RefreshOutcome};
use quotes_core::settings::resolve_tags;
use quotes_core::tokens::REFRESH_ACTION;
use quotes_db::repositories::TagRepo;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/refresh
///
/// Return the quote following the client's cursor. Unknown tag tokens are
/// dropped; if tags were given and none resolve, nothing matches.
pub async fn refresh_quote(
    State(state): State<AppState>,
    Form(request): Form<RefreshRequest>,
) -> AppResult<Response> {
    if request.action != REFRESH_ACTION {
        return Err(AppError::BadRequest(format!(
            "Unknown action '{}'",
            request.action
        )));
    }
    if !state
        .signer
        .verify(&request.nonce, REFRESH_ACTION, Utc::now())
    {
        return Err(CoreError::Forbidden("Invalid or expired refresh token".into()).into());
    }

    let tokens = request.tag_tokens();
    let tags = if tokens.is_empty() {
        Vec::new()
    } else {
        let vocabulary = TagRepo::vocabulary_for(&state.pool, &tokens).await?;
        let (resolved, unknown) = resolve_tags(&tokens, &vocabulary);
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "Dropping unknown refresh tags");
        }
        if resolved.is_empty() {
            return Ok(no_more());
        }
        resolved
    };

    let filter = QuoteFilter {
        tags,
        order: request.order(),
    };
    let cursor = request.cursor();
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let outcome = select_next(
        &state.catalog(),
        &filter,
        cursor,
        request.char_limit(),
        &mut rng,
    )
    .await?;

    Ok(match outcome {
        RefreshOutcome::Quote(selection) => {
            tracing::debug!(
                widget_id = request.widget_id.as_deref(),
                from = cursor.current_quote_id,
                to = selection.quote.id,
                page = selection.current_page,
                "Quote refreshed",
            );
            Json(QuoteResponse::from(&selection)).into_response()
        }
        RefreshOutcome::NoMore => no_more(),
    })
}

fn no_more() -> Response {
    Json(false).into_response()
}
