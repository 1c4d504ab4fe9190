use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::response::{ApiError, StoreResultExt};

pub async fn get_stats(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let stats = state.store.stats().api_err("Error fetching stats")?;

    Ok::<_, ApiError>(Json(stats))
}
