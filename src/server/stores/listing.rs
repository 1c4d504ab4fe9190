use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::server::AppState;
use crate::server::dto::StoreDetailResponse;
use crate::server::response::{ApiError, ApiPath, StoreOptionExt, StoreResultExt};

pub async fn list_stores(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let stores = state
        .store
        .list_stores_with_rating()
        .api_err("Error fetching stores")?;

    Ok::<_, ApiError>(Json(stores))
}

pub async fn get_store(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> impl IntoResponse {
    let store = state
        .store
        .get_store_with_rating(id)
        .api_err("Error fetching store")?
        .or_not_found("Store not found")?;

    let ratings = state
        .store
        .list_store_ratings(id)
        .api_err("Error fetching store")?;

    Ok::<_, ApiError>(Json(StoreDetailResponse { store, ratings }))
}

pub async fn list_store_ratings(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> impl IntoResponse {
    state
        .store
        .get_store(id)
        .api_err("Error fetching ratings")?
        .or_not_found("Store not found")?;

    let ratings = state
        .store
        .list_store_ratings(id)
        .api_err("Error fetching ratings")?;

    Ok::<_, ApiError>(Json(ratings))
}
