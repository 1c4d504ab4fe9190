use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireOwner;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiQuery, Pagination, StoreResultExt};

/// Ratings across every store the caller owns, oldest first.
pub async fn list_my_store_ratings(
    RequireOwner(claims): RequireOwner,
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<Vec<(String, String)>>,
) -> impl IntoResponse {
    let pagination = Pagination::from_query(&query);

    let data = state
        .store
        .list_owner_ratings(claims.id, pagination.limit, pagination.offset())
        .api_err("Error fetching ratings")?;

    let total = state
        .store
        .count_owner_ratings(claims.id)
        .api_err("Error fetching ratings")?;

    Ok::<_, ApiError>(Json(pagination.wrap(total, data)))
}
