use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireUser;
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{LegacyRatingRequest, RateRequest};
use crate::server::response::{ApiError, ApiJson, ApiPath, MessageResponse, internal_error};
use crate::server::validation::{non_blank, parse_stars, validate_comment};
use crate::types::{CommentUpdate, Stars};

/// Legacy endpoint: sets the value and leaves any stored comment alone.
pub async fn submit_rating(
    RequireUser(claims): RequireUser,
    State(state): State<Arc<AppState>>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(req): ApiJson<LegacyRatingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let stars = parse_stars(req.rating.as_ref())?;

    save_rating(&state, claims.id, store_id, stars, CommentUpdate::Keep)?;

    Ok(Json(MessageResponse::new("Rating saved")))
}

/// Sets the value and replaces the comment; an absent comment clears it.
pub async fn rate_store(
    RequireUser(claims): RequireUser,
    State(state): State<Arc<AppState>>,
    ApiPath(store_id): ApiPath<i64>,
    ApiJson(req): ApiJson<RateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let stars = parse_stars(req.rating.as_ref())?;
    let comment = non_blank(req.comment);
    validate_comment(comment.as_deref())?;

    save_rating(&state, claims.id, store_id, stars, CommentUpdate::Replace(comment))?;

    Ok(Json(MessageResponse::new("Rating saved")))
}

fn save_rating(
    state: &AppState,
    user_id: i64,
    store_id: i64,
    stars: Stars,
    comment: CommentUpdate,
) -> Result<(), ApiError> {
    match state.store.upsert_rating(user_id, store_id, stars, &comment) {
        Ok(()) => {
            tracing::info!(user_id, store_id, rating = stars.get(), "Rating saved");
            Ok(())
        }
        // Either side of the rating may have vanished; report which one.
        Err(Error::InvalidReference) => match state.store.get_store(store_id) {
            Ok(None) => Err(ApiError::not_found("Store not found")),
            Ok(Some(_)) => Err(ApiError::not_found("User not found")),
            Err(e) => Err(internal_error("Error saving rating", &e)),
        },
        Err(e) => Err(internal_error("Error saving rating", &e)),
    }
}
